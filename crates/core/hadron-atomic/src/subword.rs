//! Byte and halfword CAS emulated on the enclosing word.
//!
//! The hardware can only reserve whole aligned words, so a 1- or 2-byte CAS
//! reserves the 4-byte word containing the target, checks the target's
//! bits, and conditionally stores the whole word with only those bits
//! replaced. The bits outside the target are always taken from the word
//! just reserved, never from an earlier read: if a neighbor changes between
//! the reserved load and the conditional store, the store fails and the
//! whole sequence runs again against the new neighbor value.
//!
//! Where the target sits inside the word depends on byte order. Byte offset
//! 0 of a 4-byte word is its most significant byte on a big-endian machine
//! (shift 24) and its least significant byte on a little-endian one (shift
//! 0). [`Lane`] captures that mapping; it takes the byte order as a
//! parameter so both layouts can be checked on any host.

use crate::arch::Reservation;
use crate::config::Endianness;
use crate::stat;

/// Size of the enclosing word in bytes. `lwarx`/`stwcx.` is the narrowest
/// reservation on both 32- and 64-bit Power, so this is 4 everywhere.
pub const ENCLOSING_WORD: usize = 4;

/// Position of a sub-word value inside its enclosing word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    shift: u32,
    mask: u32,
}

impl Lane {
    /// Lane of a `width`-byte value at byte `offset` of a word laid out in
    /// `endian` byte order.
    ///
    /// `width` must be 1 or 2, and `offset` a multiple of `width` below
    /// [`ENCLOSING_WORD`].
    #[must_use]
    #[inline]
    pub const fn new(offset: usize, width: usize, endian: Endianness) -> Self {
        assert!(width == 1 || width == 2, "sub-word width must be 1 or 2");
        assert!(
            offset % width == 0 && offset + width <= ENCLOSING_WORD,
            "sub-word offset must be naturally aligned inside the word"
        );
        Self::place(offset, width, endian)
    }

    /// [`Lane::new`] without the checks. Out-of-range arguments give a
    /// meaningless lane, never a panic.
    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)]
    const fn place(offset: usize, width: usize, endian: Endianness) -> Self {
        let byte = match endian {
            Endianness::Little => offset,
            Endianness::Big => ENCLOSING_WORD.wrapping_sub(width).wrapping_sub(offset),
        };
        let shift = (byte as u32).wrapping_mul(8);
        let mask = (u32::MAX >> (32 - width as u32 * 8)).wrapping_shl(shift);
        Self { shift, mask }
    }

    /// Bit shift of the value's least significant bit.
    #[must_use]
    pub const fn shift(self) -> u32 {
        self.shift
    }

    /// Mask selecting the lane's bits in the word.
    #[must_use]
    pub const fn mask(self) -> u32 {
        self.mask
    }

    /// The lane's value in `word`, shifted down.
    #[must_use]
    pub const fn extract(self, word: u32) -> u32 {
        (word & self.mask) >> self.shift
    }

    /// `word` with the lane replaced by `value`; all other bits unchanged.
    /// Bits of `value` beyond the lane width are dropped.
    #[must_use]
    pub const fn insert(self, word: u32, value: u32) -> u32 {
        (word & !self.mask) | ((value << self.shift) & self.mask)
    }
}

/// Splits the address of a sub-word location into its enclosing word and
/// the lane it occupies there, using the target's byte order.
///
/// `T` must be `u8` or `u16` and `ptr` naturally aligned. The returned
/// pointer is only computed, never dereferenced.
#[must_use]
#[inline(always)]
pub fn locate<T>(ptr: *mut T) -> (*mut u32, Lane) {
    let width = const {
        let width = core::mem::size_of::<T>();
        assert!(width == 1 || width == 2, "sub-word width must be 1 or 2");
        width
    };
    let offset = ptr.addr() % ENCLOSING_WORD;
    assert_precondition!(offset % width == 0, "misaligned {}-byte sub-word at {:p}", width, ptr);
    let word = ptr.wrapping_byte_sub(offset).cast::<u32>();
    (word, Lane::place(offset, width, crate::config::ENDIANNESS))
}

/// CAS on one lane of a reservable word.
///
/// Returns the lane value observed at the moment of comparison, shifted
/// down. Succeeds iff that equals `expected`. `new` and `expected` must fit
/// the lane width.
#[inline(always)]
pub(crate) fn cas_lane<R: Reservation<Word = u32>>(
    word: &R,
    lane: Lane,
    new: u32,
    expected: u32,
) -> u32 {
    stat::record_cas();
    loop {
        let reserved = word.load_reserved();
        let current = lane.extract(reserved);
        if current != expected {
            stat::record_mismatch();
            return current;
        }
        if word.store_conditional(reserved, lane.insert(reserved, new)) {
            return current;
        }
        stat::record_reservation_lost();
    }
}
