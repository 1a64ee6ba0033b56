//! A device that hands every transmitted payload back to the stack.
//!
//! Transmit queues the payload and raises `LOOPBACK_IRQ`; the handler drains
//! the queue on the dispatch thread and feeds each payload to the input hook.

use std::collections::VecDeque;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
};

use dev::{
    dev_flags,
    dev_types,
    DeviceId,
    Driver,
};
use intr::{
    Irq,
    IrqRaiser,
    Share,
    IRQ_BASE,
};
use net::{
    self,
    Net,
};
use {
    Error,
    Result,
};

pub const LOOPBACK_IRQ: Irq = IRQ_BASE + 1;

pub const LOOPBACK_MTU: u16 = u16::MAX;

/// Maximum number of payloads waiting for the handler.
pub const LOOPBACK_QUEUE_LIMIT: usize = 16;

struct Entry {
    ty: u16,
    buffer: Vec<u8>,
}

type Queue = Arc<Mutex<VecDeque<Entry>>>;

fn lock(queue: &Queue) -> MutexGuard<VecDeque<Entry>> {
    // A panicking handler leaves the queue itself intact.
    match queue.lock() {
        Ok(guard) => guard,
        Err(err) => err.into_inner(),
    }
}

struct Loopback {
    queue: Queue,
    raiser: IrqRaiser,
}

impl Driver for Loopback {
    fn transmit(&mut self, dev: DeviceId, ty: u16, buffer: &[u8], _dst: &[u8]) -> Result<()> {
        let pending = {
            let mut queue = lock(&self.queue);
            if queue.len() >= LOOPBACK_QUEUE_LIMIT {
                error!("Loopback queue on {} is full.", dev);
                return Err(Error::Exhausted);
            }

            queue.push_back(Entry {
                ty: ty,
                buffer: buffer.to_vec(),
            });
            queue.len()
        };

        debug!(
            "Queued payload on {}, type = 0x{:04x}, len = {}, pending = {}.",
            dev,
            ty,
            buffer.len(),
            pending
        );
        self.raiser.raise(LOOPBACK_IRQ)
    }
}

/// Registers a loopback device whose payloads return through `net::input`.
pub fn init(net: &mut Net) -> Result<DeviceId> {
    init_with(net, net::input)
}

/// Registers a loopback device whose payloads return through `input`.
pub fn init_with<F>(net: &mut Net, mut input: F) -> Result<DeviceId>
where
    F: FnMut(u16, &[u8], DeviceId) -> Result<()> + Send + 'static,
{
    let queue: Queue = Arc::new(Mutex::new(VecDeque::new()));

    let driver = Loopback {
        queue: queue.clone(),
        raiser: net.raiser(),
    };

    let mut dev = net.allocate(driver)?;
    dev.dev_type = dev_types::LOOPBACK;
    dev.mtu = LOOPBACK_MTU;
    dev.flags = dev_flags::LOOPBACK;
    dev.hlen = 0;
    dev.alen = 0;

    let id = net.register(dev)?;

    let isr = move |irq: Irq, dev: Option<DeviceId>| -> Result<()> {
        let dev = dev.ok_or(Error::NoDevice)?;

        loop {
            // Release the lock before calling up so transmit can requeue.
            let entry = lock(&queue).pop_front();
            let entry = match entry {
                Some(entry) => entry,
                None => break,
            };

            debug!(
                "Loopback IRQ {} on {}, type = 0x{:04x}, len = {}.",
                irq,
                dev,
                entry.ty,
                entry.buffer.len()
            );

            if let Err(err) = input(entry.ty, &entry.buffer, dev) {
                error!("Input on {} failed: {:?}.", dev, err);
            }
        }

        Ok(())
    };

    net.request_irq(LOOPBACK_IRQ, isr, Share::Exclusive, &id.name(), Some(id))?;

    debug!("Initialized loopback device {}.", id);
    Ok(id)
}
