#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate lazy_static;
extern crate usrdev;

mod cli;
mod env;

use cli::App;
use usrdev::driver::dummy;
use usrdev::net::Net;

/// Brings up a dummy device and periodically sends it a payload. Run with
/// RUST_LOG=debug to watch each transmit raise the dummy IRQ.
fn main() {
    env_logger::init();

    let matches = clap::App::new("dummy")
        .about("Transmits through a dummy device")
        .with_defaults()
        .get_matches();
    let args = cli::Args::from(&matches);

    let mut net = Net::new(args.config.clone());
    let dev = env::or_exit(dummy::init(&mut net), "Registering the dummy device");

    env::run(net, dev, &args);
}
