//! Power Architecture backend.
//!
//! Reservations are `lwarx`/`stwcx.` (and `ldarx`/`stdcx.` for 8 bytes),
//! fences are `isync` (control), `lwsync` (acquire/release) and `sync`
//! (full), and the bit length uses `cntlzw`/`cntlzd`.
//!
//! The reserved load and the conditional store are separate `asm!` blocks.
//! Between them the CAS loops only compare and shift in registers; no store
//! to the reservation granule may be placed in that window, or the
//! conditional store fails every time.
//!
//! 8-byte operations on 32-bit Power (`cfg(hadron_atomic_64bit)` without
//! `hadron_atomic_word64`) move the value through memory, since a 64-bit
//! value does not fit one general-purpose register in 32-bit mode. Those
//! instructions are only legal on 64-bit hardware, which is why that
//! configuration is opt-in.

use core::arch::asm;

use super::{Access, Reservation};

/// A reservable word at a raw address.
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

impl Reservation for WordRef<u32> {
    type Word = u32;

    #[inline(always)]
    fn load_reserved(&self) -> u32 {
        let value: u32;
        // SAFETY: `WordRef::new` requires a valid, aligned word.
        unsafe {
            asm!(
                "lwarx {v}, 0, {p}",
                v = out(reg) value,
                p = in(reg_nonzero) self.ptr,
                options(nostack, preserves_flags),
            );
        }
        value
    }

    #[inline(always)]
    fn store_conditional(&self, _reserved: u32, new: u32) -> bool {
        let stored: u32;
        // SAFETY: `WordRef::new` requires a valid, aligned word.
        unsafe {
            asm!(
                "li {ok}, 0",
                "stwcx. {v}, 0, {p}",
                "bne- 2f",
                "li {ok}, 1",
                "2:",
                ok = out(reg) stored,
                v = in(reg) new,
                p = in(reg_nonzero) self.ptr,
                out("cr0") _,
                options(nostack),
            );
        }
        stored != 0
    }
}

#[cfg(all(hadron_atomic_64bit, hadron_atomic_word64))]
impl Reservation for WordRef<u64> {
    type Word = u64;

    #[inline(always)]
    fn load_reserved(&self) -> u64 {
        let value: u64;
        // SAFETY: `WordRef::new` requires a valid, aligned doubleword.
        unsafe {
            asm!(
                "ldarx {v}, 0, {p}",
                v = out(reg) value,
                p = in(reg_nonzero) self.ptr,
                options(nostack, preserves_flags),
            );
        }
        value
    }

    #[inline(always)]
    fn store_conditional(&self, _reserved: u64, new: u64) -> bool {
        let stored: u64;
        // SAFETY: `WordRef::new` requires a valid, aligned doubleword.
        unsafe {
            asm!(
                "li {ok}, 0",
                "stdcx. {v}, 0, {p}",
                "bne- 2f",
                "li {ok}, 1",
                "2:",
                ok = out(reg) stored,
                v = in(reg) new,
                p = in(reg_nonzero) self.ptr,
                out("cr0") _,
                options(nostack),
            );
        }
        stored != 0
    }
}

#[cfg(all(hadron_atomic_64bit, not(hadron_atomic_word64)))]
impl Reservation for WordRef<u64> {
    type Word = u64;

    #[inline(always)]
    fn load_reserved(&self) -> u64 {
        let mut value = 0u64;
        // SAFETY: `WordRef::new` requires a valid, aligned doubleword;
        // `value` is a local of the right size and alignment.
        unsafe {
            asm!(
                "ldarx {t}, 0, {p}",
                "std {t}, 0({dst})",
                t = out(reg) _,
                p = in(reg_nonzero) self.ptr,
                dst = in(reg_nonzero) &raw mut value,
                options(nostack, preserves_flags),
            );
        }
        value
    }

    #[inline(always)]
    fn store_conditional(&self, _reserved: u64, new: u64) -> bool {
        let stored: u32;
        // SAFETY: as above; `new` is read from the stack.
        unsafe {
            asm!(
                "ld {t}, 0({src})",
                "li {ok}, 0",
                "stdcx. {t}, 0, {p}",
                "bne- 2f",
                "li {ok}, 1",
                "2:",
                t = out(reg) _,
                ok = out(reg) stored,
                src = in(reg_nonzero) &raw const new,
                p = in(reg_nonzero) self.ptr,
                out("cr0") _,
                options(nostack),
            );
        }
        stored != 0
    }
}

// Load-acquire is load; compare the value with itself; branch on the result;
// `isync`. The branch makes later instructions depend on the loaded value,
// and `isync` keeps them from starting before the branch resolves.
macro_rules! access {
    ($ty:ty, $ld:literal, $st:literal, $cmp:literal) => {
        impl Access for $ty {
            #[inline(always)]
            unsafe fn load_acquire(ptr: *const Self) -> Self {
                let value: $ty;
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe {
                    asm!(
                        concat!($ld, " {v}, 0({p})"),
                        concat!($cmp, " {v}, {v}"),
                        "bne- 2f",
                        "2:",
                        "isync",
                        v = out(reg) value,
                        p = in(reg_nonzero) ptr,
                        out("cr0") _,
                        options(nostack),
                    );
                }
                value
            }

            #[inline(always)]
            unsafe fn store_release(ptr: *mut Self, value: Self) {
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe {
                    asm!(
                        "lwsync",
                        concat!($st, " {v}, 0({p})"),
                        v = in(reg) value,
                        p = in(reg_nonzero) ptr,
                        options(nostack, preserves_flags),
                    );
                }
            }

            #[inline(always)]
            unsafe fn load_relaxed(ptr: *const Self) -> Self {
                let value: $ty;
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe {
                    asm!(
                        concat!($ld, " {v}, 0({p})"),
                        v = out(reg) value,
                        p = in(reg_nonzero) ptr,
                        options(nostack, preserves_flags, readonly),
                    );
                }
                value
            }

            #[inline(always)]
            unsafe fn store_relaxed(ptr: *mut Self, value: Self) {
                // SAFETY: guaranteed by the caller (see `Access`).
                unsafe {
                    asm!(
                        concat!($st, " {v}, 0({p})"),
                        v = in(reg) value,
                        p = in(reg_nonzero) ptr,
                        options(nostack, preserves_flags),
                    );
                }
            }
        }
    };
}

access!(u8, "lbz", "stb", "cmpw");
access!(u16, "lhz", "sth", "cmpw");
access!(u32, "lwz", "stw", "cmpw");
#[cfg(all(hadron_atomic_64bit, hadron_atomic_word64))]
access!(u64, "ld", "std", "cmpd");

#[cfg(all(hadron_atomic_64bit, not(hadron_atomic_word64)))]
impl Access for u64 {
    #[inline(always)]
    unsafe fn load_acquire(ptr: *const Self) -> Self {
        let mut value = 0u64;
        // SAFETY: guaranteed by the caller (see `Access`).
        unsafe {
            asm!(
                "ld {t}, 0({p})",
                "std {t}, 0({dst})",
                "cmpd {t}, {t}",
                "bne- 2f",
                "2:",
                "isync",
                t = out(reg) _,
                p = in(reg_nonzero) ptr,
                dst = in(reg_nonzero) &raw mut value,
                out("cr0") _,
                options(nostack),
            );
        }
        value
    }

    #[inline(always)]
    unsafe fn store_release(ptr: *mut Self, value: Self) {
        // SAFETY: guaranteed by the caller (see `Access`).
        unsafe {
            asm!(
                "lwsync",
                "ld {t}, 0({src})",
                "std {t}, 0({p})",
                t = out(reg) _,
                src = in(reg_nonzero) &raw const value,
                p = in(reg_nonzero) ptr,
                options(nostack, preserves_flags),
            );
        }
    }

    #[inline(always)]
    unsafe fn load_relaxed(ptr: *const Self) -> Self {
        let mut value = 0u64;
        // SAFETY: guaranteed by the caller (see `Access`).
        unsafe {
            asm!(
                "ld {t}, 0({p})",
                "std {t}, 0({dst})",
                t = out(reg) _,
                p = in(reg_nonzero) ptr,
                dst = in(reg_nonzero) &raw mut value,
                options(nostack, preserves_flags),
            );
        }
        value
    }

    #[inline(always)]
    unsafe fn store_relaxed(ptr: *mut Self, value: Self) {
        // SAFETY: guaranteed by the caller (see `Access`).
        unsafe {
            asm!(
                "ld {t}, 0({src})",
                "std {t}, 0({p})",
                t = out(reg) _,
                src = in(reg_nonzero) &raw const value,
                p = in(reg_nonzero) ptr,
                options(nostack, preserves_flags),
            );
        }
    }
}

/// `isync`: orders a preceding data-dependent branch against later accesses.
#[inline(always)]
pub(crate) fn control_fence() {
    // SAFETY: barrier only.
    unsafe { asm!("isync", options(nostack, preserves_flags)) };
}

/// `lwsync`: keeps later accesses after this point.
#[inline(always)]
pub(crate) fn acquire_fence() {
    // SAFETY: barrier only.
    unsafe { asm!("lwsync", options(nostack, preserves_flags)) };
}

/// `lwsync`: keeps earlier accesses before this point.
#[inline(always)]
pub(crate) fn release_fence() {
    // SAFETY: barrier only.
    unsafe { asm!("lwsync", options(nostack, preserves_flags)) };
}

/// `sync`: total order in both directions.
#[inline(always)]
pub(crate) fn full_fence() {
    // SAFETY: barrier only.
    unsafe { asm!("sync", options(nostack, preserves_flags)) };
}

/// `cntlzw`/`cntlzd`: counts leading zero bits of a native word. Leaves
/// `cr0` alone.
#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn leading_zeros(x: usize) -> u32 {
    let count: usize;
    // SAFETY: register-only arithmetic.
    unsafe {
        #[cfg(hadron_atomic_word64)]
        asm!(
            "cntlzd {n}, {x}",
            n = lateout(reg) count,
            x = in(reg) x,
            options(pure, nomem, nostack, preserves_flags),
        );
        #[cfg(not(hadron_atomic_word64))]
        asm!(
            "cntlzw {n}, {x}",
            n = lateout(reg) count,
            x = in(reg) x,
            options(pure, nomem, nostack, preserves_flags),
        );
    }
    count as u32
}
