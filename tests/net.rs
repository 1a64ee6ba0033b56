#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;
extern crate rand;
extern crate usrdev;

mod context;

use context::Call;
use usrdev::dev::DeviceId;
use usrdev::intr::{
    Irq,
    Share,
};
use usrdev::{
    Error,
    Result,
};

fn noop(_: Irq, _: Option<DeviceId>) -> Result<()> {
    Ok(())
}

#[test]
fn register_assigns_indices_in_call_order() {
    let mut net = context::net();
    let calls = context::calls();

    let ids: Vec<_> = (0 .. 8)
        .map(|_| context::recorder(&mut net, &calls, 1500, false))
        .collect();

    for (i, id) in ids.iter().enumerate() {
        assert_eq!(id.index() as usize, i);
        assert_eq!(net.device(*id).unwrap().name(), format!("net{}", i));
    }
}

#[test]
fn output_respects_mtu_and_state() {
    let mut net = context::net();
    let calls = context::calls();
    let dev = context::recorder(&mut net, &calls, 100, false);

    assert_matches!(net.output(dev, 0x0800, &[0; 50], &[]), Err(Error::State));

    net.open(dev).unwrap();
    assert_matches!(
        net.output(dev, 0x0800, &[0; 150], &[]),
        Err(Error::Overflow)
    );

    let payload: Vec<u8> = (0 .. 50).map(|_| rand::random::<u8>()).collect();
    net.output(dev, 0x0800, &payload, &[]).unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::Open(dev), Call::Transmit(dev, 0x0800, payload)]
    );
}

#[test]
fn run_and_shutdown_visit_newest_device_first() {
    let mut net = context::net();
    let calls = context::calls();
    let first = context::recorder(&mut net, &calls, 1500, false);
    let second = context::recorder(&mut net, &calls, 1500, false);

    net.run().unwrap();
    assert!(net.intr().is_running());
    net.shutdown().unwrap();
    assert!(!net.intr().is_running());

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Open(second),
            Call::Open(first),
            Call::Close(second),
            Call::Close(first),
        ]
    );
}

#[test]
fn run_continues_past_failed_open() {
    let mut net = context::net();
    let calls = context::calls();
    let good = context::recorder(&mut net, &calls, 1500, false);
    let bad = context::recorder(&mut net, &calls, 1500, true);

    net.run().unwrap();

    assert!(net.device(good).unwrap().is_up());
    assert!(!net.device(bad).unwrap().is_up());
    assert_eq!(*calls.lock().unwrap(), vec![Call::Open(good)]);

    net.shutdown().unwrap();
    assert!(!net.device(good).unwrap().is_up());
}

#[test]
fn shutdown_without_run() {
    let mut net = context::net();
    let calls = context::calls();
    let dev = context::recorder(&mut net, &calls, 1500, false);

    net.shutdown().unwrap();

    assert!(!net.device(dev).unwrap().is_up());
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn setup_is_closed_after_run() {
    let mut net = context::net();
    let calls = context::calls();
    context::recorder(&mut net, &calls, 1500, false);

    net.run().unwrap();

    let late = net.allocate(context::Recorder {
        calls: calls.clone(),
        fail_open: false,
    }).unwrap();
    assert_matches!(net.register(late), Err(Error::Running));
    assert_matches!(
        net.request_irq(40, noop, Share::Shared, "late", None),
        Err(Error::Running)
    );
    assert_matches!(net.run(), Err(Error::Running));

    net.shutdown().unwrap();
}

#[test]
fn stacks_are_independent() {
    let mut a = context::net();
    let mut b = context::net();
    let calls = context::calls();

    let in_a = context::recorder(&mut a, &calls, 1500, false);
    let in_b = context::recorder(&mut b, &calls, 1500, false);

    assert_eq!(in_a.index(), 0);
    assert_eq!(in_b.index(), 0);
    assert!(in_a != in_b);

    assert_matches!(a.open(in_b), Err(Error::NoDevice));
    assert_matches!(b.output(in_a, 0x0800, &[0; 4], &[]), Err(Error::NoDevice));
    assert!(calls.lock().unwrap().is_empty());

    a.run().unwrap();
    assert!(!b.device(in_b).unwrap().is_up());
    a.shutdown().unwrap();
    b.shutdown().unwrap();
}
