use std::time::Duration;

use clap;

use usrdev::config::{
    Config,
    DEFAULT_INTR_THREAD_NAME,
};

pub trait App {
    fn with_defaults(self) -> Self;
}

impl<'a, 'b> App for clap::App<'a, 'b> {
    fn with_defaults(self) -> Self {
        self.arg(
            clap::Arg::with_name("count")
                .long("count")
                .value_name("COUNT")
                .help("Number of payloads to transmit")
                .default_value("10")
                .takes_value(true),
        ).arg(
                clap::Arg::with_name("interval-ms")
                    .long("interval-ms")
                    .value_name("MILLIS")
                    .help("Delay between payloads")
                    .default_value("1000")
                    .takes_value(true),
            )
            .arg(
                clap::Arg::with_name("max-devices")
                    .long("max-devices")
                    .value_name("N")
                    .help("Maximum number of registered devices")
                    .default_value("16")
                    .takes_value(true),
            )
    }
}

/// Command line settings shared by the demos.
pub struct Args {
    pub count: usize,
    pub interval: Duration,
    pub config: Config,
}

impl<'a, 'b> From<&'b clap::ArgMatches<'a>> for Args {
    fn from(matches: &'b clap::ArgMatches<'a>) -> Args {
        let count = value_t!(matches, "count", usize).unwrap_or_else(|err| err.exit());
        let interval = value_t!(matches, "interval-ms", u64).unwrap_or_else(|err| err.exit());
        let max_devices = value_t!(matches, "max-devices", usize).unwrap_or_else(|err| err.exit());

        Args {
            count: count,
            interval: Duration::from_millis(interval),
            config: Config {
                max_devices: max_devices,
                intr_thread_name: DEFAULT_INTR_THREAD_NAME.to_string(),
            },
        }
    }
}
