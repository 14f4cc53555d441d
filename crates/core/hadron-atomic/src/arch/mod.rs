//! Backend interface and build-time backend selection.
//!
//! Everything architecture-specific sits behind this module: reservations,
//! ordered access, fences and the leading-zero count. `build.rs` decides
//! which backend is compiled; exactly one of them is, and the rest of the
//! crate only sees `backend::*`.

#[cfg(hadron_atomic_reservation)]
pub(crate) mod powerpc;
#[cfg(hadron_atomic_reservation)]
pub(crate) use powerpc as backend;

#[cfg(not(hadron_atomic_reservation))]
pub(crate) mod portable;
#[cfg(not(hadron_atomic_reservation))]
pub(crate) use portable as backend;

/// A word-sized location accessed through a load-reserved /
/// store-conditional pair.
///
/// The CAS loops in [`word`](crate::word) and [`subword`](crate::subword)
/// are written once against this trait. Implementations must guarantee
/// that [`store_conditional`](Self::store_conditional) succeeds only if no
/// other store to the word happened since the matching
/// [`load_reserved`](Self::load_reserved); they may fail spuriously.
pub(crate) trait Reservation {
    /// The reserved unit (`u32` or `u64`).
    type Word: Copy + Eq;

    /// Loads the word and takes a reservation on it.
    fn load_reserved(&self) -> Self::Word;

    /// Stores `new` if the reservation taken by the last
    /// [`load_reserved`](Self::load_reserved) (which returned `reserved`)
    /// is still held. Returns whether the store happened.
    ///
    /// Hardware reservations ignore `reserved`; emulated ones compare
    /// against it.
    fn store_conditional(&self, reserved: Self::Word, new: Self::Word) -> bool;
}

/// Single-copy atomic access to a naturally aligned location of one width.
///
/// # Safety
///
/// For every method, `ptr` must be non-null, aligned to `size_of::<Self>()`
/// and valid for the access for its whole duration.
pub(crate) trait Access: Copy {
    /// Load, then acquire ordering.
    unsafe fn load_acquire(ptr: *const Self) -> Self;
    /// Release ordering, then store.
    unsafe fn store_release(ptr: *mut Self, value: Self);
    /// Load with no ordering.
    unsafe fn load_relaxed(ptr: *const Self) -> Self;
    /// Store with no ordering.
    unsafe fn store_relaxed(ptr: *mut Self, value: Self);
}
