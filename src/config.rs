//! Tunables for a network stack instance.

/// Default upper bound on the number of registered devices.
pub const DEFAULT_MAX_DEVICES: usize = 16;

/// Default name of the interrupt dispatch thread.
pub const DEFAULT_INTR_THREAD_NAME: &'static str = "intr";

/// Configuration for a `Net` and its interrupt subsystem.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of devices the registry accepts.
    pub max_devices: usize,
    /// Name given to the interrupt dispatch thread.
    pub intr_thread_name: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_devices: DEFAULT_MAX_DEVICES,
            intr_thread_name: DEFAULT_INTR_THREAD_NAME.to_string(),
        }
    }
}
