//! Machine capability constants.
//!
//! All values come from `cfg` flags emitted by `build.rs`, so they are fixed
//! for the lifetime of the program and usable in `const` contexts. The
//! assertions at the bottom cross-check the build script against what the
//! compiler itself knows about the target.

use bitflags::bitflags;

/// Byte order of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Most significant byte at the lowest address.
    Big,
    /// Least significant byte at the lowest address.
    Little,
}

impl Endianness {
    /// Returns `"big"` or `"little"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Big => "big",
            Self::Little => "little",
        }
    }
}

/// Native machine word size in bytes (4 or 8).
pub const WORD_SIZE: usize = if cfg!(hadron_atomic_word64) { 8 } else { 4 };

/// Native machine word size in bits.
#[allow(clippy::cast_possible_truncation)]
pub const WORD_BITS: u32 = (WORD_SIZE * 8) as u32;

/// Byte order of the target.
pub const ENDIANNESS: Endianness = if cfg!(hadron_atomic_big_endian) {
    Endianness::Big
} else {
    Endianness::Little
};

/// Whether 8-byte atomics are available.
///
/// On 32-bit targets this may be `false`; the 8-byte entry points
/// ([`cas_8`](crate::machine::cas_8) and the `u64` impl of
/// [`MachineWord`](crate::MachineWord)) are then not compiled at all.
pub const HAS_64BIT_ATOMICS: bool = cfg!(hadron_atomic_64bit);

bitflags! {
    /// The machine capability set as one value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The native word is 8 bytes.
        const WORD_64 = 1 << 0;
        /// The target is big-endian.
        const BIG_ENDIAN = 1 << 1;
        /// 8-byte atomics may be used.
        const ATOMIC_64 = 1 << 2;
        /// CAS runs on hardware reservations rather than the portable
        /// compare-exchange backend.
        const RESERVATION = 1 << 3;
    }
}

/// The capability set of this build.
pub const CAPABILITIES: Capabilities = {
    let mut caps = Capabilities::empty();
    if WORD_SIZE == 8 {
        caps = caps.union(Capabilities::WORD_64);
    }
    if matches!(ENDIANNESS, Endianness::Big) {
        caps = caps.union(Capabilities::BIG_ENDIAN);
    }
    if HAS_64BIT_ATOMICS {
        caps = caps.union(Capabilities::ATOMIC_64);
    }
    if cfg!(hadron_atomic_reservation) {
        caps = caps.union(Capabilities::RESERVATION);
    }
    caps
};

const _: () = assert!(
    WORD_SIZE == core::mem::size_of::<usize>(),
    "build.rs word size disagrees with the target pointer width"
);
const _: () = assert!(
    matches!(ENDIANNESS, Endianness::Big) == cfg!(target_endian = "big"),
    "build.rs endianness disagrees with the target"
);
const _: () = assert!(
    WORD_SIZE == 4 || HAS_64BIT_ATOMICS,
    "64-bit words imply 8-byte atomics"
);
