//! Machine-level atomic primitives for the Hadron lock-free runtime.
//!
//! This crate is the bottom layer of the concurrency stack: compare-and-swap
//! for 1, 2, 4 and 8 byte locations, acquire/release and relaxed access,
//! four fence strengths, a bit-length query and a single-attempt trylock.
//! Generic read-modify-write operations (fetch-add, swap, sequentially
//! consistent access) are built on top of these elsewhere.
//!
//! The target is the Power Architecture, whose only atomic read-modify-write
//! is a word-sized reservation (`lwarx`/`stwcx.`). Byte and halfword CAS are
//! emulated on the enclosing aligned word; see [`subword`]. Other targets
//! compile a portable backend with the same contract so everything here can
//! be tested on the host.
//!
//! # Build configuration
//!
//! `build.rs` resolves the [capability set](config) before compilation and
//! fails the build when anything is undeterminable. Overrides:
//!
//! | Variable | Values | Effect |
//! |---|---|---|
//! | `HADRON_ATOMIC_BACKEND` | `reservation`, `portable` | force a backend |
//! | `HADRON_ATOMIC_64BIT` | `0`, `1` | 8-byte atomics on 32-bit targets |
//!
//! Extra diagnostics are opt-in via `RUSTFLAGS`:
//! `--cfg hadron_atomic_stat` (retry counters, see [`stat`]) and
//! `--cfg hadron_hardened` (precondition checks in release builds).
//!
//! # Progress
//!
//! Every CAS is lock-free, not wait-free: a reservation lost to concurrent
//! interference is retried without bound, and each retry implies that some
//! other thread made progress.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(hadron_atomic_reservation, feature(asm_experimental_arch))]
#![warn(missing_docs)]

#[cfg(not(hadron_atomic_configured))]
compile_error!("hadron-atomic must be built through cargo so that build.rs can resolve the target");

#[macro_use]
pub mod safety;

mod arch;
pub mod bits;
pub mod config;
pub mod fence;
pub mod machine;
pub mod stat;
pub mod subword;
pub mod trylock;
mod word;

pub use bits::log2;
pub use config::{
    CAPABILITIES, Capabilities, ENDIANNESS, Endianness, HAS_64BIT_ATOMICS, WORD_BITS, WORD_SIZE,
};
pub use fence::{acquire_fence, control_fence, full_fence, release_fence};
#[cfg(hadron_atomic_64bit)]
pub use machine::cas_8;
pub use machine::{
    MachineWord, cas_1, cas_2, cas_4, compare_and_swap, load_acquire, load_relaxed, store_release,
    store_relaxed,
};
pub use trylock::{Flag, try_lock_byte};
