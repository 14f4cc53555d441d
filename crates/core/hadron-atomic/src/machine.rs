//! Width-indexed entry points.
//!
//! [`MachineWord`] is implemented for `u8`, `u16`, `u32` and (when
//! [`HAS_64BIT_ATOMICS`](crate::HAS_64BIT_ATOMICS)) `u64`. Every call site
//! knows its width statically, so dispatch is resolved at compile time. The
//! free functions are thin generic wrappers; `cas_1` .. `cas_8` are the
//! monomorphic spellings.
//!
//! # Safety
//!
//! Every function here takes a raw address. Unless stated otherwise the
//! caller guarantees that:
//!
//! - `ptr` is non-null and aligned to the width of `T`;
//! - the location is valid for reads and writes for the duration of the
//!   call;
//! - every concurrent access to the location goes through this crate (or
//!   another atomic access of the same width);
//! - for `u8`/`u16`, the same holds for the whole enclosing aligned 4-byte
//!   word, since the CAS emulation reads and rewrites it.

use crate::arch::{Access, backend};
use crate::fence::full_fence;
use crate::subword::{self, ENCLOSING_WORD};
use crate::word;

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    #[cfg(hadron_atomic_64bit)]
    impl Sealed for u64 {}
}

/// A value width the machine can operate on atomically.
///
/// Sealed: implemented for `u8`, `u16`, `u32` and, where available, `u64`.
#[allow(private_bounds)]
pub trait MachineWord: Access + Copy + Eq + sealed::Sealed {
    /// Width in bytes.
    const SIZE: usize;

    /// See [`compare_and_swap`].
    ///
    /// # Safety
    ///
    /// See the [module documentation](self).
    unsafe fn cas(ptr: *mut Self, new: Self, expected: Self) -> Self;
}

macro_rules! sub_word {
    ($ty:ty) => {
        impl MachineWord for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            unsafe fn cas(ptr: *mut Self, new: Self, expected: Self) -> Self {
                assert_precondition!(ptr.is_aligned(), "misaligned {}-byte CAS at {:p}", Self::SIZE, ptr);
                let (word, lane) = subword::locate(ptr);
                // SAFETY: the caller guarantees the enclosing word is valid and
                // only accessed atomically; `locate` aligned it down to
                // `ENCLOSING_WORD`.
                let word = unsafe { backend::WordRef::new(word) };
                full_fence();
                let seen = subword::cas_lane(&word, lane, u32::from(new), u32::from(expected));
                full_fence();
                seen as $ty
            }
        }
    };
}

macro_rules! full_word {
    ($ty:ty) => {
        impl MachineWord for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();

            #[inline]
            unsafe fn cas(ptr: *mut Self, new: Self, expected: Self) -> Self {
                assert_precondition!(ptr.is_aligned(), "misaligned {}-byte CAS at {:p}", Self::SIZE, ptr);
                // SAFETY: guaranteed by the caller.
                let word = unsafe { backend::WordRef::new(ptr) };
                full_fence();
                let seen = word::cas_word(&word, new, expected);
                full_fence();
                seen
            }
        }
    };
}

sub_word!(u8);
sub_word!(u16);
full_word!(u32);
#[cfg(hadron_atomic_64bit)]
full_word!(u64);

const _: () = assert!(<u16 as MachineWord>::SIZE < ENCLOSING_WORD);

/// Atomically replaces `*ptr` with `new` if it equals `expected`.
///
/// Returns the value observed at the moment of comparison, whether or not
/// the store happened; the CAS succeeded iff the result equals `expected`.
/// Sequentially consistent: full fences are issued before and after.
///
/// Lock-free, not wait-free. A lost reservation is retried without bound;
/// a comparand mismatch returns at once and retry policy is up to the
/// caller.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn compare_and_swap<T: MachineWord>(ptr: *mut T, new: T, expected: T) -> T {
    // SAFETY: forwarded.
    unsafe { T::cas(ptr, new, expected) }
}

/// Reads `*ptr`, then orders every later access of this thread after it.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn load_acquire<T: MachineWord>(ptr: *const T) -> T {
    assert_precondition!(ptr.is_aligned());
    // SAFETY: forwarded.
    unsafe { T::load_acquire(ptr) }
}

/// Orders every earlier access of this thread before it, then writes
/// `value` to `*ptr`.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn store_release<T: MachineWord>(ptr: *mut T, value: T) {
    assert_precondition!(ptr.is_aligned());
    // SAFETY: forwarded.
    unsafe { T::store_release(ptr, value) }
}

/// Reads `*ptr` as one single-copy atomic access, with no ordering.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn load_relaxed<T: MachineWord>(ptr: *const T) -> T {
    assert_precondition!(ptr.is_aligned());
    // SAFETY: forwarded.
    unsafe { T::load_relaxed(ptr) }
}

/// Writes `value` to `*ptr` as one single-copy atomic access, with no
/// ordering.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn store_relaxed<T: MachineWord>(ptr: *mut T, value: T) {
    assert_precondition!(ptr.is_aligned());
    // SAFETY: forwarded.
    unsafe { T::store_relaxed(ptr, value) }
}

/// 1-byte [`compare_and_swap`], emulated on the enclosing word.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn cas_1(ptr: *mut u8, new: u8, expected: u8) -> u8 {
    // SAFETY: forwarded.
    unsafe { compare_and_swap(ptr, new, expected) }
}

/// 2-byte [`compare_and_swap`], emulated on the enclosing word.
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn cas_2(ptr: *mut u16, new: u16, expected: u16) -> u16 {
    // SAFETY: forwarded.
    unsafe { compare_and_swap(ptr, new, expected) }
}

/// 4-byte [`compare_and_swap`].
///
/// # Safety
///
/// See the [module documentation](self).
#[inline]
pub unsafe fn cas_4(ptr: *mut u32, new: u32, expected: u32) -> u32 {
    // SAFETY: forwarded.
    unsafe { compare_and_swap(ptr, new, expected) }
}

/// 8-byte [`compare_and_swap`]. Only exists when
/// [`HAS_64BIT_ATOMICS`](crate::HAS_64BIT_ATOMICS) is true.
///
/// # Safety
///
/// See the [module documentation](self).
#[cfg(hadron_atomic_64bit)]
#[inline]
pub unsafe fn cas_8(ptr: *mut u64, new: u64, expected: u64) -> u64 {
    // SAFETY: forwarded.
    unsafe { compare_and_swap(ptr, new, expected) }
}
