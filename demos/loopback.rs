#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate lazy_static;
extern crate usrdev;

mod cli;
mod env;

use cli::App;
use usrdev::driver::loopback;
use usrdev::net::Net;

/// Brings up a loopback device and periodically sends it a payload. Run
/// with RUST_LOG=trace to see each payload come back through the input hook.
fn main() {
    env_logger::init();

    let matches = clap::App::new("loopback")
        .about("Transmits through a loopback device")
        .with_defaults()
        .get_matches();
    let args = cli::Args::from(&matches);

    let mut net = Net::new(args.config.clone());
    let dev = env::or_exit(loopback::init(&mut net), "Registering the loopback device");

    env::run(net, dev, &args);
}
