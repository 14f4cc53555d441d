//! Memory fences.
//!
//! | Fence | Orders | Power |
//! |-------|--------|-------|
//! | [`control_fence`] | a data-dependent branch before later accesses | `isync` |
//! | [`acquire_fence`] | earlier loads before later accesses | `lwsync` |
//! | [`release_fence`] | earlier accesses before later stores | `lwsync` |
//! | [`full_fence`] | everything, both directions | `sync` |
//!
//! Acquire and release only need one direction and use the lighter
//! `lwsync`. All four are also compiler barriers.

use crate::arch::backend;

/// Orders a preceding load-fed conditional branch against every later
/// memory access, so nothing past the branch executes speculatively before
/// the loaded value is confirmed.
#[inline(always)]
pub fn control_fence() {
    backend::control_fence();
}

/// Prevents later memory accesses from being reordered before this point.
#[inline(always)]
pub fn acquire_fence() {
    backend::acquire_fence();
}

/// Prevents earlier memory accesses from being reordered after this point.
#[inline(always)]
pub fn release_fence() {
    backend::release_fence();
}

/// No memory access crosses this point in either direction; all full
/// fences (and every CAS) are totally ordered.
#[inline(always)]
pub fn full_fence() {
    backend::full_fence();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn release_and_acquire_fences_pair_up() {
        for _ in 0..200 {
            let data = Arc::new(AtomicU32::new(0));
            let ready = Arc::new(AtomicBool::new(false));

            let producer = {
                let data = Arc::clone(&data);
                let ready = Arc::clone(&ready);
                thread::spawn(move || {
                    data.store(42, Ordering::Relaxed);
                    release_fence();
                    ready.store(true, Ordering::Relaxed);
                })
            };

            while !ready.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
            acquire_fence();
            assert_eq!(data.load(Ordering::Relaxed), 42);
            producer.join().unwrap();
        }
    }

    // Store buffering: with a full fence between each thread's store and
    // load, both threads reading 0 is forbidden.
    #[test]
    fn full_fence_forbids_store_buffering() {
        for _ in 0..200 {
            let x = Arc::new(AtomicU32::new(0));
            let y = Arc::new(AtomicU32::new(0));

            let other = {
                let (x, y) = (Arc::clone(&x), Arc::clone(&y));
                thread::spawn(move || {
                    y.store(1, Ordering::Relaxed);
                    full_fence();
                    x.load(Ordering::Relaxed)
                })
            };
            x.store(1, Ordering::Relaxed);
            full_fence();
            let seen_y = y.load(Ordering::Relaxed);
            let seen_x = other.join().unwrap();
            assert!(seen_x == 1 || seen_y == 1);
        }
    }

    #[test]
    fn control_fence_after_branch() {
        let flag = AtomicU32::new(1);
        if flag.load(Ordering::Relaxed) == 1 {
            control_fence();
        }
        assert_eq!(flag.load(Ordering::Relaxed), 1);
    }
}
