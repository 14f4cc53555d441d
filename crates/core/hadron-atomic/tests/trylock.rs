use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use hadron_atomic::{CAPABILITIES, Capabilities, Flag, WORD_BITS, log2, try_lock_byte};

#[test]
#[cfg_attr(miri, ignore)]
fn one_of_many_concurrent_attempts_wins() {
    const THREADS: usize = 8;

    for _ in 0..100 {
        let flag = Arc::new(Flag::new(0));
        let start = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let flag = Arc::clone(&flag);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    try_lock_byte(&flag)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(flag.load(Ordering::Relaxed), 1);

        flag.store(0, Ordering::Release);
        assert!(try_lock_byte(&flag), "released flag is free again");
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn spin_lock_serializes_critical_sections() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 10_000;

    let flag = Arc::new(Flag::new(0));
    let inside = Arc::new(AtomicUsize::new(0));
    let total = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let flag = Arc::clone(&flag);
            let inside = Arc::clone(&inside);
            let total = Arc::clone(&total);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    while !try_lock_byte(&flag) {
                        core::hint::spin_loop();
                    }
                    assert_eq!(inside.fetch_add(1, Ordering::Relaxed), 0);
                    // Non-atomic read-modify-write; only correct under the lock.
                    let seen = total.load(Ordering::Relaxed);
                    total.store(seen + 1, Ordering::Relaxed);
                    inside.fetch_sub(1, Ordering::Relaxed);
                    flag.store(0, Ordering::Release);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(total.load(Ordering::Relaxed), THREADS * ROUNDS);
}

#[test]
fn log2_through_public_api() {
    assert_eq!(log2(1), 0);
    assert_eq!(log2(1024), 10);
    assert_eq!(log2(1023), 9);
    assert_eq!(log2(usize::MAX), WORD_BITS - 1);
}

#[test]
fn capabilities_match_host() {
    assert_eq!(
        CAPABILITIES.contains(Capabilities::WORD_64),
        cfg!(target_pointer_width = "64")
    );
    assert_eq!(
        CAPABILITIES.contains(Capabilities::BIG_ENDIAN),
        cfg!(target_endian = "big")
    );
}
