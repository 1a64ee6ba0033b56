use std::sync::mpsc::Receiver;
use std::sync::{
    Arc,
    Mutex,
};
use std::time::Duration;

use usrdev::config::Config;
use usrdev::dev::{
    dev_types,
    DeviceId,
    Driver,
};
use usrdev::net::Net;
use usrdev::{
    Error,
    Result,
};

lazy_static! {
    pub static ref ONE_SEC: Duration = Duration::from_secs(1);
}

/// What a recording driver has been asked to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Open(DeviceId),
    Close(DeviceId),
    Transmit(DeviceId, u16, Vec<u8>),
}

pub type Calls = Arc<Mutex<Vec<Call>>>;

/// A driver that records every hook invocation into a shared log.
pub struct Recorder {
    pub calls: Calls,
    pub fail_open: bool,
}

impl Driver for Recorder {
    fn open(&mut self, dev: DeviceId) -> Result<()> {
        if self.fail_open {
            return Err(Error::Driver("open refused"));
        }
        self.calls.lock().unwrap().push(Call::Open(dev));
        Ok(())
    }

    fn close(&mut self, dev: DeviceId) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Close(dev));
        Ok(())
    }

    fn transmit(&mut self, dev: DeviceId, ty: u16, buffer: &[u8], _: &[u8]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Transmit(dev, ty, buffer.to_vec()));
        Ok(())
    }
}

#[allow(dead_code)]
pub fn net() -> Net {
    Net::new(Config::default())
}

/// Registers a recording device with the given MTU that logs into calls.
#[allow(dead_code)]
pub fn recorder(net: &mut Net, calls: &Calls, mtu: u16, fail_open: bool) -> DeviceId {
    let mut dev = net.allocate(Recorder {
        calls: calls.clone(),
        fail_open: fail_open,
    }).unwrap();
    dev.dev_type = dev_types::ETHERNET;
    dev.mtu = mtu;
    net.register(dev).unwrap()
}

#[allow(dead_code)]
pub fn calls() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}

/// Waits up to a second for the next message from a handler.
#[allow(dead_code)]
pub fn recv<T>(rx: &Receiver<T>) -> T {
    rx.recv_timeout(*ONE_SEC).unwrap()
}
