use std::process;
use std::thread;

use usrdev::dev::DeviceId;
use usrdev::net::Net;
use usrdev::Result;

use cli::Args;

lazy_static! {
    pub static ref TEST_PAYLOAD: Vec<u8> = {
        // A captured ICMP echo request, IPv4 header first.
        vec![
            0x45, 0x00, 0x00, 0x30, 0x00, 0x80, 0x00, 0x00, 0xff, 0x01, 0xbd, 0x4a, 0x7f, 0x00,
            0x00, 0x01, 0x7f, 0x00, 0x00, 0x01, 0x08, 0x00, 0x35, 0x64, 0x00, 0x80, 0x00, 0x01,
            0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x30, 0x21, 0x40, 0x23, 0x24,
            0x25, 0x5e, 0x26, 0x2a, 0x28, 0x29,
        ]
    };
}

/// IPv4 EtherType, used as the protocol type of the test payload.
pub const TYPE_IPV4: u16 = 0x0800;

/// Exits with a message if setup failed.
#[allow(dead_code)]
pub fn or_exit<T>(result: Result<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{} failed: {:?}", what, err);
            process::exit(1);
        }
    }
}

/// Starts the stack, transmits the test payload args.count times, then
/// shuts the stack down.
#[allow(dead_code)]
pub fn run(mut net: Net, dev: DeviceId, args: &Args) {
    or_exit(net.run(), "Starting the stack");

    for _ in 0 .. args.count {
        if let Err(err) = net.output(dev, TYPE_IPV4, &TEST_PAYLOAD, &[]) {
            eprintln!("Output on {} failed: {:?}", dev, err);
        }
        thread::sleep(args.interval);
    }

    or_exit(net.shutdown(), "Shutting down the stack");
}
