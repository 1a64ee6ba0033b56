//! The device registry and the stack lifecycle built around it.

use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use config::Config;
use dev::{
    dev_flags,
    Device,
    DeviceId,
    Driver,
};
use dump;
use intr::{
    Intr,
    Irq,
    IrqHandler,
    IrqRaiser,
    Share,
};
use {
    Error,
    Result,
};

static NEXT_NET_TAG: AtomicUsize = AtomicUsize::new(0);

/// A network stack instance: registered devices plus the interrupt
/// subsystem their drivers raise IRQs on.
///
/// Devices and IRQ handlers are added during a single threaded setup phase.
/// `run` ends that phase; afterwards `register` and `request_irq` fail with
/// `Error::Running`.
pub struct Net {
    tag: usize,
    devices: Vec<Device>,
    next_index: u32,
    intr: Intr,
    config: Config,
    running: bool,
}

impl Net {
    /// Creates an empty stack.
    pub fn new(config: Config) -> Net {
        let intr = Intr::new(&config);
        info!("Initialized network stack.");

        Net {
            tag: NEXT_NET_TAG.fetch_add(1, Ordering::Relaxed),
            devices: Vec::new(),
            next_index: 0,
            intr: intr,
            config: config,
            running: false,
        }
    }

    /// Creates a zeroed, unregistered device backed by `driver`.
    pub fn allocate<D>(&self, driver: D) -> Result<Device>
    where
        D: Driver + 'static,
    {
        if self.devices.len() >= self.config.max_devices {
            error!(
                "Cannot allocate a device, limit of {} reached.",
                self.config.max_devices
            );
            return Err(Error::Exhausted);
        }

        Ok(Device::new(Box::new(driver)))
    }

    /// Assigns the next index and name to a device and adds it to the
    /// registry.
    pub fn register(&mut self, mut dev: Device) -> Result<DeviceId> {
        if self.running {
            error!("Cannot register a device after run.");
            return Err(Error::Running);
        }

        if self.devices.len() >= self.config.max_devices {
            error!(
                "Cannot register a device, limit of {} reached.",
                self.config.max_devices
            );
            return Err(Error::Exhausted);
        }

        let id = DeviceId::new(self.tag, self.next_index);
        self.next_index += 1;

        if dev.is_up() {
            debug!("Clearing UP flag set by the driver on {}.", id);
            dev.flags &= !dev_flags::UP;
        }

        dev.assign(id);
        info!(
            "Registered device {}, type = 0x{:04x}.",
            dev.name(),
            dev.dev_type
        );
        self.devices.push(dev);

        Ok(id)
    }

    /// Returns a registered device.
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|dev| dev.id() == Some(id))
    }

    /// Returns the registered devices, most recently registered first.
    pub fn devices<'a>(&'a self) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices.iter().rev()
    }

    /// Returns the interrupt subsystem.
    ///
    /// The subsystem is only reachable read-only, so it cannot be started
    /// behind the registry's back:
    ///
    /// ```compile_fail
    /// use usrdev::config::Config;
    /// use usrdev::net::Net;
    ///
    /// let mut net = Net::new(Config::default());
    /// net.intr().run().unwrap();
    /// ```
    pub fn intr(&self) -> &Intr {
        &self.intr
    }

    /// Attaches an IRQ handler. See `Intr::request_irq`.
    pub fn request_irq<H>(
        &mut self,
        irq: Irq,
        handler: H,
        share: Share,
        name: &str,
        dev: Option<DeviceId>,
    ) -> Result<()>
    where
        H: IrqHandler + 'static,
    {
        self.intr.request_irq(irq, handler, share, name, dev)
    }

    /// Returns a handle for raising IRQs on this stack.
    pub fn raiser(&self) -> IrqRaiser {
        self.intr.raiser()
    }

    /// Brings a device UP through its driver.
    pub fn open(&mut self, id: DeviceId) -> Result<()> {
        let dev = self.device_mut(id)?;

        if dev.is_up() {
            error!("Device {} is already up.", dev.name());
            return Err(Error::State);
        }

        if let Err(err) = dev.driver_mut().open(id) {
            error!("Failed to open device {}: {:?}.", dev.name(), err);
            return Err(err);
        }

        dev.flags |= dev_flags::UP;
        info!("Device {} is {}.", dev.name(), dev.state());
        Ok(())
    }

    /// Takes a device DOWN through its driver.
    pub fn close(&mut self, id: DeviceId) -> Result<()> {
        let dev = self.device_mut(id)?;

        if !dev.is_up() {
            error!("Device {} is already down.", dev.name());
            return Err(Error::State);
        }

        if let Err(err) = dev.driver_mut().close(id) {
            error!("Failed to close device {}: {:?}.", dev.name(), err);
            return Err(err);
        }

        dev.flags &= !dev_flags::UP;
        info!("Device {} is {}.", dev.name(), dev.state());
        Ok(())
    }

    /// Transmits a payload of protocol type `ty` on an UP device.
    ///
    /// The payload must fit in the device MTU. `dst` is the link destination
    /// handed to the driver as is.
    pub fn output(&mut self, id: DeviceId, ty: u16, buffer: &[u8], dst: &[u8]) -> Result<()> {
        let dev = self.device_mut(id)?;

        debug!(
            "Output on {}, type = 0x{:04x}, len = {}.",
            dev.name(),
            ty,
            buffer.len()
        );

        if !dev.is_up() {
            error!("Device {} is down.", dev.name());
            return Err(Error::State);
        }

        if buffer.len() > dev.mtu as usize {
            error!(
                "Payload too large for {}, len = {}, mtu = {}.",
                dev.name(),
                buffer.len(),
                dev.mtu
            );
            return Err(Error::Overflow);
        }

        dump::trace(buffer);

        if let Err(err) = dev.driver_mut().transmit(id, ty, buffer, dst) {
            error!(
                "Failed to transmit on {}, len = {}: {:?}.",
                dev.name(),
                buffer.len(),
                err
            );
            return Err(err);
        }

        Ok(())
    }

    /// Starts the interrupt thread, then opens every device.
    ///
    /// A device that fails to open is logged and skipped.
    pub fn run(&mut self) -> Result<()> {
        if let Err(err) = self.intr.run() {
            error!("Failed to start interrupts: {:?}.", err);
            return Err(err);
        }

        self.running = true;

        debug!("Opening all devices.");
        for id in self.ids() {
            let _ = self.open(id);
        }

        debug!("Running.");
        Ok(())
    }

    /// Closes every device, then stops the interrupt thread.
    ///
    /// Safe to call without a prior `run`; devices that are already down are
    /// logged and skipped. Only a failure to stop the interrupt thread is
    /// returned.
    pub fn shutdown(&mut self) -> Result<()> {
        debug!("Closing all devices.");
        for id in self.ids() {
            let _ = self.close(id);
        }

        if let Err(err) = self.intr.shutdown() {
            error!("Failed to stop interrupts: {:?}.", err);
            return Err(err);
        }

        debug!("Shut down.");
        Ok(())
    }

    fn ids(&self) -> Vec<DeviceId> {
        self.devices().filter_map(|dev| dev.id()).collect()
    }

    fn device_mut(&mut self, id: DeviceId) -> Result<&mut Device> {
        match self.devices.iter_mut().find(|dev| dev.id() == Some(id)) {
            Some(dev) => Ok(dev),
            None => {
                error!("No device {}.", id);
                Err(Error::NoDevice)
            }
        }
    }
}

/// Receives a payload of protocol type `ty` from a device.
///
/// Drivers call this for every frame they pull off the wire. No protocols
/// are bound yet, so the payload is traced and accepted.
pub fn input(ty: u16, buffer: &[u8], dev: DeviceId) -> Result<()> {
    debug!(
        "Input on {}, type = 0x{:04x}, len = {}.",
        dev,
        ty,
        buffer.len()
    );
    dump::trace(buffer);
    Ok(())
}
