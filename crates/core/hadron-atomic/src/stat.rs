//! CAS contention statistics.
//!
//! Counts CAS calls, comparand mismatches and lost reservations, to show
//! how often the unbounded retry loops actually retry. Gated behind
//! `cfg(hadron_atomic_stat)`; without it the `record_*` hooks compile to
//! nothing and [`snapshot`] reports zeros.
//!
//! Counters are relaxed and global. Values read while other threads run are
//! approximate, but never torn.

#[cfg(hadron_atomic_stat)]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(hadron_atomic_stat)]
static CAS_CALLS: AtomicUsize = AtomicUsize::new(0);
#[cfg(hadron_atomic_stat)]
static MISMATCHES: AtomicUsize = AtomicUsize::new(0);
#[cfg(hadron_atomic_stat)]
static RESERVATIONS_LOST: AtomicUsize = AtomicUsize::new(0);

/// A point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// CAS operations started, all widths.
    pub cas_calls: usize,
    /// CAS operations that returned because the comparand did not match.
    pub mismatches: usize,
    /// Conditional stores that failed and forced a retry.
    pub reservations_lost: usize,
}

impl Snapshot {
    /// Counter-wise difference `self - earlier`, saturating at zero.
    #[must_use]
    pub fn since(self, earlier: Snapshot) -> Snapshot {
        Snapshot {
            cas_calls: self.cas_calls.saturating_sub(earlier.cas_calls),
            mismatches: self.mismatches.saturating_sub(earlier.mismatches),
            reservations_lost: self
                .reservations_lost
                .saturating_sub(earlier.reservations_lost),
        }
    }
}

#[inline(always)]
pub(crate) fn record_cas() {
    #[cfg(hadron_atomic_stat)]
    CAS_CALLS.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub(crate) fn record_mismatch() {
    #[cfg(hadron_atomic_stat)]
    MISMATCHES.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub(crate) fn record_reservation_lost() {
    #[cfg(hadron_atomic_stat)]
    RESERVATIONS_LOST.fetch_add(1, Ordering::Relaxed);
}

/// Reads the current counters.
pub fn snapshot() -> Snapshot {
    #[cfg(hadron_atomic_stat)]
    {
        Snapshot {
            cas_calls: CAS_CALLS.load(Ordering::Relaxed),
            mismatches: MISMATCHES.load(Ordering::Relaxed),
            reservations_lost: RESERVATIONS_LOST.load(Ordering::Relaxed),
        }
    }
    #[cfg(not(hadron_atomic_stat))]
    {
        Snapshot::default()
    }
}

/// Writes the counters to `w`.
///
/// ```text
/// CAS_CALLS   MISMATCHES   RESERVATIONS_LOST
///    123456           42                   7
/// ```
#[cfg(hadron_atomic_stat)]
pub fn dump_stats(w: &mut impl core::fmt::Write) -> core::fmt::Result {
    let snap = snapshot();
    writeln!(
        w,
        "{:>10} {:>12} {:>19}",
        "CAS_CALLS", "MISMATCHES", "RESERVATIONS_LOST"
    )?;
    writeln!(
        w,
        "{:>10} {:>12} {:>19}",
        snap.cas_calls, snap.mismatches, snap.reservations_lost
    )
}
