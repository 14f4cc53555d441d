//! Portable backend over `core::sync::atomic`.
//!
//! There is no reservation hardware to use here, so a reservation is
//! emulated: [`load_reserved`](Reservation::load_reserved) is a relaxed
//! load and [`store_conditional`](Reservation::store_conditional) is a weak
//! compare-exchange against the value it returned. The conditional store
//! fails whenever the word changed in between (including spuriously), which
//! is exactly the contract the CAS loops need.

use core::sync::atomic::{self, AtomicU8, AtomicU16, AtomicU32, Ordering};

#[cfg(hadron_atomic_64bit)]
use core::sync::atomic::AtomicU64;

use super::{Access, Reservation};

/// A reservable word at a raw address.
///
/// Sub-word CAS reserves the enclosing `u32` through this type while other
/// threads may access the same bytes as `AtomicU8`/`AtomicU16`. The Rust
/// memory model does not define such mixed-size concurrent access; it holds
/// on every supported host in practice, but Miri rejects it and the concurrent
/// sub-word tests are skipped there.
pub(crate) struct WordRef<W> {
    ptr: *mut W,
}

impl<W> WordRef<W> {
    /// Wraps the word at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, aligned to `size_of::<W>()`, valid for reads
    /// and writes while the returned value is in use, and only accessed
    /// atomically by everyone else during that time.
    #[inline(always)]
    pub(crate) const unsafe fn new(ptr: *mut W) -> Self {
        Self { ptr }
    }
}

macro_rules! reservation {
    ($word:ty, $atomic:ty) => {
        impl WordRef<$word> {
            #[inline(always)]
            fn atomic(&self) -> &$atomic {
                // SAFETY: `WordRef::new` requires a valid, aligned word that is
                // only accessed atomically. Neighbouring narrower atomics on the
                // same word are a mixed-size access the memory model leaves
                // undefined (see `WordRef`).
                unsafe { <$atomic>::from_ptr(self.ptr) }
            }
        }

        impl Reservation for WordRef<$word> {
            type Word = $word;

            #[inline(always)]
            fn load_reserved(&self) -> $word {
                self.atomic().load(Ordering::Relaxed)
            }

            #[inline(always)]
            fn store_conditional(&self, reserved: $word, new: $word) -> bool {
                self.atomic()
                    .compare_exchange_weak(reserved, new, Ordering::SeqCst, Ordering::Relaxed)
                    .is_ok()
            }
        }
    };
}

reservation!(u32, AtomicU32);
#[cfg(hadron_atomic_64bit)]
reservation!(u64, AtomicU64);

macro_rules! access {
    ($ty:ty, $atomic:ty) => {
        impl Access for $ty {
            #[inline(always)]
            unsafe fn load_acquire(ptr: *const Self) -> Self {
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe { <$atomic>::from_ptr(ptr.cast_mut()) }.load(Ordering::Acquire)
            }

            #[inline(always)]
            unsafe fn store_release(ptr: *mut Self, value: Self) {
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe { <$atomic>::from_ptr(ptr) }.store(value, Ordering::Release);
            }

            #[inline(always)]
            unsafe fn load_relaxed(ptr: *const Self) -> Self {
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe { <$atomic>::from_ptr(ptr.cast_mut()) }.load(Ordering::Relaxed)
            }

            #[inline(always)]
            unsafe fn store_relaxed(ptr: *mut Self, value: Self) {
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe { <$atomic>::from_ptr(ptr) }.store(value, Ordering::Relaxed);
            }
        }
    };
}

access!(u8, AtomicU8);
access!(u16, AtomicU16);
access!(u32, AtomicU32);
#[cfg(hadron_atomic_64bit)]
access!(u64, AtomicU64);

/// Orders a preceding data-dependent branch against later accesses.
#[inline(always)]
pub(crate) fn control_fence() {
    atomic::fence(Ordering::Acquire);
}

/// Keeps later accesses after this point.
#[inline(always)]
pub(crate) fn acquire_fence() {
    atomic::fence(Ordering::Acquire);
}

/// Keeps earlier accesses before this point.
#[inline(always)]
pub(crate) fn release_fence() {
    atomic::fence(Ordering::Release);
}

/// Total order in both directions.
#[inline(always)]
pub(crate) fn full_fence() {
    atomic::fence(Ordering::SeqCst);
}

/// Counts leading zero bits of a native word.
#[inline(always)]
pub(crate) fn leading_zeros(x: usize) -> u32 {
    x.leading_zeros()
}
