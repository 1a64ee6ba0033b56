//! Network devices and the driver contract behind them.

use std::fmt;

use Result;

/// Length of the hardware address slots on a device.
pub const ADDR_LEN: usize = 16;

/// Prefix of every device name; the device index follows it.
pub const NAME_PREFIX: &'static str = "net";

pub mod dev_types {
    pub const DUMMY: u16 = 0x0000;

    pub const LOOPBACK: u16 = 0x0001;

    pub const ETHERNET: u16 = 0x0002;
}

pub mod dev_flags {
    pub const UP: u16 = 0x0001;

    pub const LOOPBACK: u16 = 0x0010;

    pub const BROADCAST: u16 = 0x0020;

    pub const P2P: u16 = 0x0040;

    pub const NEED_ARP: u16 = 0x0100;
}

/// A stable handle to a registered device.
///
/// The handle pairs the tag of the `Net` that issued it with the device
/// index, so it never owns the device and never names a device in another
/// stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId {
    net: usize,
    index: u32,
}

impl DeviceId {
    pub(crate) fn new(net: usize, index: u32) -> DeviceId {
        DeviceId {
            net: net,
            index: index,
        }
    }

    /// Returns the index assigned at registration.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the device name, e.g. net0.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", NAME_PREFIX, self.index)
    }
}

/// Operations a concrete driver provides to the device registry.
///
/// Only `transmit` is required. `open` and `close` succeed trivially unless a
/// driver has hardware (or a mock of it) to bring up or down. Any state the
/// driver needs lives in the implementing type itself.
pub trait Driver {
    /// Prepares the device for traffic. Called while the device is DOWN.
    fn open(&mut self, _dev: DeviceId) -> Result<()> {
        Ok(())
    }

    /// Stops traffic on the device. Called while the device is UP.
    fn close(&mut self, _dev: DeviceId) -> Result<()> {
        Ok(())
    }

    /// Sends a payload of protocol type `ty` toward the hardware address
    /// `dst`, which is empty for devices without addressing.
    fn transmit(&mut self, dev: DeviceId, ty: u16, buffer: &[u8], dst: &[u8]) -> Result<()>;
}

/// A network interface and the driver backing it.
///
/// Devices come from `Net::allocate` zeroed, the driver fills in the link
/// attributes, and `Net::register` gives the device its index and name.
pub struct Device {
    id: Option<DeviceId>,
    name: String,
    /// Link type, one of `dev_types`.
    pub dev_type: u16,
    /// Largest payload accepted by `Net::output`.
    pub mtu: u16,
    /// Bitwise OR of `dev_flags`. UP is owned by the registry and cleared
    /// by `Net::register`.
    pub flags: u16,
    /// Link header length.
    pub hlen: u16,
    /// Hardware address length.
    pub alen: u16,
    /// Hardware address.
    pub addr: [u8; ADDR_LEN],
    /// Peer address on P2P links, broadcast address otherwise.
    pub peer: [u8; ADDR_LEN],
    driver: Box<dyn Driver>,
}

impl Device {
    pub(crate) fn new(driver: Box<dyn Driver>) -> Device {
        Device {
            id: None,
            name: String::new(),
            dev_type: 0,
            mtu: 0,
            flags: 0,
            hlen: 0,
            alen: 0,
            addr: [0; ADDR_LEN],
            peer: [0; ADDR_LEN],
            driver: driver,
        }
    }

    pub(crate) fn assign(&mut self, id: DeviceId) {
        self.id = Some(id);
        self.name = id.name();
    }

    pub(crate) fn driver_mut(&mut self) -> &mut dyn Driver {
        &mut *self.driver
    }

    /// Returns the handle of a registered device.
    pub fn id(&self) -> Option<DeviceId> {
        self.id
    }

    /// Returns the device name, empty until the device is registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_up(&self) -> bool {
        self.flags & dev_flags::UP != 0
    }

    /// Returns "up" or "down" for logging.
    pub fn state(&self) -> &'static str {
        if self.is_up() {
            "up"
        } else {
            "down"
        }
    }

    /// Returns the broadcast address, which shares storage with the peer.
    pub fn broadcast(&self) -> &[u8; ADDR_LEN] {
        &self.peer
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("dev_type", &self.dev_type)
            .field("mtu", &self.mtu)
            .field("flags", &self.flags)
            .field("hlen", &self.hlen)
            .field("alen", &self.alen)
            .finish()
    }
}
