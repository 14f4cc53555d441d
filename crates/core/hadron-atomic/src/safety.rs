//! Precondition checks for the primitive entry points.
//!
//! Callers of this crate promise things the primitives cannot cheaply
//! verify: natural alignment, a non-zero argument to [`log2`](crate::log2).
//! Violations are caller bugs with unspecified results, not reported errors.
//! [`assert_precondition!`] makes them loud where that is affordable.
//!
//! | Build configuration | Result |
//! |---------------------|--------|
//! | Debug (`debug_assertions`) | Panics on failure |
//! | Release + `hadron_hardened` cfg | Panics on failure |
//! | Release (default) | Compiled away (condition still type-checked) |

/// Checks a caller precondition of a primitive.
///
/// Panics with the stringified condition (or the given message) in debug
/// and `cfg(hadron_hardened)` builds. In release builds the check disappears
/// but the expression is still type-checked.
///
/// ```ignore
/// assert_precondition!(ptr.is_aligned());
/// assert_precondition!(x != 0, "log2(0) is undefined");
/// ```
#[macro_export]
macro_rules! assert_precondition {
    ($cond:expr $(,)?) => {
        $crate::assert_precondition!($cond, "precondition violated: {}", stringify!($cond))
    };
    ($cond:expr, $($arg:tt)+) => {
        #[cfg(any(debug_assertions, hadron_hardened))]
        {
            if !$cond {
                panic!($($arg)+);
            }
        }
        #[cfg(not(any(debug_assertions, hadron_hardened)))]
        {
            if false {
                let _ = $cond;
            }
        }
    };
}
