use super::*;
use std::time::Duration;

#[test]
fn positions_pass_in_order_regardless_of_arrival() {
    let gate = Turnstile::new();
    let seen = Mutex::new(Vec::new());

    std::thread::scope(|s| {
        // Spawn in reverse so later positions are usually waiting first.
        for pos in (0..8usize).rev() {
            let gate = &gate;
            let seen = &seen;
            s.spawn(move || {
                std::thread::sleep(Duration::from_millis((8 - pos as u64) * 2));
                let _turn = gate.wait_for(pos);
                seen.lock().push(pos);
            });
        }
    });

    assert_eq!(*seen.lock(), (0..8).collect::<Vec<_>>());
    assert_eq!(*gate.next.lock(), 8);
}

#[test]
fn dropping_the_guard_advances() {
    let gate = Turnstile::new();
    {
        let _turn = gate.wait_for(0);
        assert_eq!(*gate.next.lock(), 0);
    }
    assert_eq!(*gate.next.lock(), 1);
    let _turn = gate.wait_for(1);
}

#[test]
fn a_panicking_holder_still_passes_the_turn() {
    let gate = Turnstile::new();
    std::thread::scope(|s| {
        let first = s.spawn(|| {
            let _turn = gate.wait_for(0);
            panic!("widget blew up");
        });
        let second = s.spawn(|| {
            let _turn = gate.wait_for(1);
        });
        assert!(first.join().is_err());
        assert!(second.join().is_ok());
    });
    assert_eq!(*gate.next.lock(), 2);
}
