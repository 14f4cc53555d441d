//! Word-granularity compare-and-swap.
//!
//! The loop every CAS in this crate bottoms out in: reserve, compare,
//! conditionally store, retry on a lost reservation. Fencing is added by the
//! callers in [`machine`](crate::machine).

use crate::arch::Reservation;
use crate::stat;

/// Replaces the word with `new` if it equals `expected`.
///
/// Returns the value observed at the moment of comparison; the CAS succeeded
/// iff that value equals `expected`. A mismatch returns immediately without
/// storing. A lost reservation retries from the reserved load, without
/// bound.
#[inline(always)]
pub(crate) fn cas_word<R: Reservation>(word: &R, new: R::Word, expected: R::Word) -> R::Word {
    stat::record_cas();
    loop {
        let current = word.load_reserved();
        if current != expected {
            stat::record_mismatch();
            return current;
        }
        if word.store_conditional(current, new) {
            return current;
        }
        stat::record_reservation_lost();
    }
}


#[cfg(all(test, shuttle))]
mod shuttle_tests {
    use shuttle::sync::Arc;
    use shuttle::sync::atomic::{AtomicU32, Ordering};
    use shuttle::thread;

    use super::*;

    struct ModelWord(AtomicU32);

    impl Reservation for ModelWord {
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

    #[test]
    fn same_expected_succeeds_once() {
        shuttle::check_random(
            || {
                let word = Arc::new(ModelWord(AtomicU32::new(0)));
                let handles: Vec<_> = (1..=3)
                    .map(|id| {
                        let word = Arc::clone(&word);
                        thread::spawn(move || cas_word(&*word, id, 0) == 0)
                    })
                    .collect();
                let wins = handles
                    .into_iter()
                    .map(|h| h.join().unwrap())
                    .filter(|&won| won)
                    .count();
                assert_eq!(wins, 1);
            },
            1000,
        );
    }

    #[test]
    fn increment_loops_lose_nothing() {
        shuttle::check_random(
            || {
                let word = Arc::new(ModelWord(AtomicU32::new(0)));
                let handles: Vec<_> = (0..2)
                    .map(|_| {
                        let word = Arc::clone(&word);
                        thread::spawn(move || {
                            for _ in 0..5 {
                                let mut current = word.0.load(Ordering::Relaxed);
                                loop {
                                    let seen = cas_word(&*word, current + 1, current);
                                    if seen == current {
                                        break;
                                    }
                                    current = seen;
                                }
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
                assert_eq!(word.0.load(Ordering::Relaxed), 10);
            },
            1000,
        );
    }
}
