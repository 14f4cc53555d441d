//! Single-attempt spin trylock.
//!
//! The lock is a 4-byte [`Flag`]: 0 is unlocked, 1 is locked.
//! [`try_lock_byte`] makes exactly one attempt; spinning, backoff and
//! unlocking (storing 0 back, normally with release ordering) belong to the
//! caller.

use core::sync::atomic::AtomicU32;

use crate::machine::cas_4;

/// Lock word for [`try_lock_byte`]. Starts at 0 (unlocked).
pub type Flag = AtomicU32;

/// Tries once to take the lock: `CAS(flag, 1, 0)`.
///
/// Returns `true` iff the CAS observed 0, i.e. this call acquired the lock.
/// Never blocks or retries. The CAS is fully fenced, so a successful call
/// also acts as an acquire barrier for the critical section.
#[inline]
pub fn try_lock_byte(flag: &Flag) -> bool {
    // SAFETY: a `&AtomicU32` is valid, aligned, and only accessed
    // atomically.
    unsafe { cas_4(flag.as_ptr(), 1, 0) == 0 }
}


#[cfg(all(test, shuttle))]
mod shuttle_tests {
    use shuttle::sync::Arc;
    use shuttle::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use shuttle::thread;

    use crate::arch::Reservation;
    use crate::word::cas_word;

    struct ModelFlag(AtomicU32);

    impl Reservation for ModelFlag {
        type Word = u32;

        fn load_reserved(&self) -> u32 {
            self.0.load(Ordering::Relaxed)
        }

        fn store_conditional(&self, reserved: u32, new: u32) -> bool {
            self.0
                .compare_exchange(reserved, new, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
        }
    }

    // Same protocol as `try_lock_byte`, on a shuttle-visible word.
    fn try_lock(flag: &ModelFlag) -> bool {
        cas_word(flag, 1, 0) == 0
    }

    #[test]
    fn spinning_callers_exclude_each_other() {
        shuttle::check_random(
            || {
                let flag = Arc::new(ModelFlag(AtomicU32::new(0)));
                let inside = Arc::new(AtomicUsize::new(0));
                let handles: Vec<_> = (0..3)
                    .map(|_| {
                        let flag = Arc::clone(&flag);
                        let inside = Arc::clone(&inside);
                        thread::spawn(move || {
                            while !try_lock(&flag) {
                                thread::yield_now();
                            }
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            inside.fetch_sub(1, Ordering::SeqCst);
                            flag.0.store(0, Ordering::Release);
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
                assert_eq!(flag.0.load(Ordering::Relaxed), 0);
            },
            1000,
        );
    }
}
