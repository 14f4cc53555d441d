//! Bit-length query.

use crate::arch::backend;
use crate::config::WORD_BITS;

/// Index of the highest set bit of `x`, i.e. `floor(log2(x))`.
///
/// Uses the hardware count-leading-zeros instruction:
/// `(WORD_BITS - 1) - clz(x)`.
///
/// `x` must be non-zero. `log2(0)` is a caller bug: it panics in debug and
/// `cfg(hadron_hardened)` builds and returns an unspecified value
/// otherwise.
#[inline]
#[must_use]
pub fn log2(x: usize) -> u32 {
    assert_precondition!(x != 0, "log2(0) is undefined");
    (WORD_BITS - 1).wrapping_sub(backend::leading_zeros(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_powers_and_neighbors() {
        let cases: &[(usize, u32)] = &[
            (1, 0),
            (2, 1),
            (3, 1),
            (4, 2),
            (255, 7),
            (256, 8),
            (1023, 9),
            (1024, 10),
            (1 << 31, 31),
        ];
        for &(x, expected) in cases {
            assert_eq!(log2(x), expected, "log2({x})");
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn top_bit_of_64_bit_word() {
        assert_eq!(log2(1 << 63), 63);
        assert_eq!(log2(usize::MAX), 63);
    }

    #[test]
    fn agrees_with_ilog2() {
        let mut x = 1usize;
        while x != 0 {
            assert_eq!(log2(x), x.ilog2());
            assert_eq!(log2(x | (x >> 1)), x.ilog2());
            x <<= 1;
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "log2(0) is undefined")]
    fn zero_is_caught_in_debug() {
        let _ = log2(0);
    }
}
