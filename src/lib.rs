//! Device and interrupt plumbing for a userspace network stack.
//!
//! Drivers allocate and register a `Device` with a `Net`, optionally request
//! interrupt lines from its `Intr`, and then the stack is brought up with
//! `Net::run` and torn down with `Net::shutdown`.

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate log;

pub mod config;
pub mod dev;
pub mod driver;
pub mod dump;
pub mod intr;
pub mod net;

#[derive(Debug)]
pub enum Error {
    /// Indicates an error where a registry, queue, etc. is full.
    Exhausted,
    /// Indicates an exclusive IRQ collided with another handler on the same line.
    Conflict,
    /// Indicates a device transition attempted from the wrong state.
    State,
    /// Indicates a payload larger than the device MTU.
    Overflow,
    /// Indicates a handle that does not name a registered device.
    NoDevice,
    /// Indicates a setup only operation attempted after the stack started running.
    Running,
    /// Indicates an error where the operation was not performed.
    NoOp,
    /// Indicates a driver hook reported a failure.
    Driver(&'static str),
    /// Indicates a generic IO error.
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
