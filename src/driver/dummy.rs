//! A device that drops everything it is asked to send.
//!
//! Every transmit raises `DUMMY_IRQ` to mimic a transmit-complete interrupt.

use dev::{
    dev_types,
    DeviceId,
    Driver,
};
use dump;
use intr::{
    Irq,
    IrqHandler,
    IrqRaiser,
    Share,
    IRQ_BASE,
};
use net::Net;
use Result;

pub const DUMMY_IRQ: Irq = IRQ_BASE;

pub const DUMMY_MTU: u16 = u16::MAX;

struct Dummy {
    raiser: IrqRaiser,
}

impl Driver for Dummy {
    fn transmit(&mut self, dev: DeviceId, ty: u16, buffer: &[u8], _dst: &[u8]) -> Result<()> {
        debug!(
            "Dropping payload on {}, type = 0x{:04x}, len = {}.",
            dev,
            ty,
            buffer.len()
        );
        dump::trace(buffer);
        self.raiser.raise(DUMMY_IRQ)
    }
}

fn isr(irq: Irq, dev: Option<DeviceId>) -> Result<()> {
    match dev {
        Some(dev) => debug!("Dummy IRQ {} on {}.", irq, dev),
        None => debug!("Dummy IRQ {}.", irq),
    }
    Ok(())
}

/// Registers a dummy device and its shared IRQ.
pub fn init(net: &mut Net) -> Result<DeviceId> {
    init_with(net, isr)
}

/// Registers a dummy device whose shared IRQ is handled by `isr`.
pub fn init_with<H>(net: &mut Net, isr: H) -> Result<DeviceId>
where
    H: IrqHandler + 'static,
{
    let driver = Dummy {
        raiser: net.raiser(),
    };

    let mut dev = net.allocate(driver)?;
    dev.dev_type = dev_types::DUMMY;
    dev.mtu = DUMMY_MTU;
    dev.hlen = 0;
    dev.alen = 0;

    let id = net.register(dev)?;
    net.request_irq(DUMMY_IRQ, isr, Share::Shared, &id.name(), Some(id))?;

    debug!("Initialized dummy device {}.", id);
    Ok(id)
}
