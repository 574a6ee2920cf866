use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[test]
fn zero_capacity_is_coerced_to_one() {
    let pool = ConcurrencyPool::new(0);
    assert_eq!(pool.capacity(), 1);
    assert_eq!(pool.available(), 1);
}

#[test]
fn try_acquire_respects_capacity() {
    let pool = ConcurrencyPool::new(2);
    let a = pool.try_acquire().unwrap();
    let _b = pool.try_acquire().unwrap();
    assert!(pool.try_acquire().is_none());
    assert_eq!(pool.available(), 0);

    a.release();
    assert_eq!(pool.available(), 1);
    assert!(pool.try_acquire().is_some());
    assert_eq!(pool.available(), 1);
}

#[test]
fn blocking_acquire_never_exceeds_capacity() {
    let pool = ConcurrencyPool::new(3);
    let active = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                let _permit = pool.acquire();
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                active.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 1);
    assert_eq!(pool.available(), 3);
}
