//! Build script for hadron-atomic: resolves the machine capability set.
//!
//! Everything the primitives depend on (word size, byte order, 8-byte
//! atomics, which backend to compile) is decided here, once, and handed to
//! the library as `cfg` flags. Anything that cannot be determined fails the
//! build; there is no silent default.

use std::env;

use anyhow::{Context, Result, bail};

/// Selects the backend: `reservation` or `portable`.
const BACKEND_VAR: &str = "HADRON_ATOMIC_BACKEND";

/// Opts 32-bit targets into 8-byte atomics (`1`) or forces them off (`0`).
const ATOMIC64_VAR: &str = "HADRON_ATOMIC_64BIT";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// `lwarx`/`stwcx.` inline assembly (Power Architecture only).
    Reservation,
    /// Native-width CAS loop over `core::sync::atomic`.
    Portable,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Endian {
    Big,
    Little,
}

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={BACKEND_VAR}");
    println!("cargo:rerun-if-env-changed={ATOMIC64_VAR}");

    let arch = cargo_cfg("TARGET_ARCH")?;
    let word_size = word_size()?;
    let endian = endianness()?;
    let backend = backend(&arch)?;
    let atomic64 = atomic64(word_size, backend)?;

    if backend == Backend::Portable && !has_atomic("32") {
        bail!("target `{arch}` has no 32-bit atomics; the portable backend cannot emulate sub-word CAS");
    }

    println!("--- hadron-atomic configuration ---");
    println!("arch:       {arch}");
    println!("word size:  {word_size}");
    println!(
        "endianness: {}",
        match endian {
            Endian::Big => "big",
            Endian::Little => "little",
        }
    );
    println!(
        "backend:    {}",
        match backend {
            Backend::Reservation => "reservation",
            Backend::Portable => "portable",
        }
    );
    println!("atomic64:   {atomic64}");

    println!("cargo:rustc-cfg=hadron_atomic_configured");
    if word_size == 8 {
        println!("cargo:rustc-cfg=hadron_atomic_word64");
    }
    if endian == Endian::Big {
        println!("cargo:rustc-cfg=hadron_atomic_big_endian");
    }
    if atomic64 {
        println!("cargo:rustc-cfg=hadron_atomic_64bit");
    }
    if backend == Backend::Reservation {
        println!("cargo:rustc-cfg=hadron_atomic_reservation");
    }

    Ok(())
}

fn cargo_cfg(name: &str) -> Result<String> {
    let var = format!("CARGO_CFG_{name}");
    env::var(&var).with_context(|| format!("${var} is not set; build through cargo"))
}

fn word_size() -> Result<usize> {
    match cargo_cfg("TARGET_POINTER_WIDTH")?.as_str() {
        "32" => Ok(4),
        "64" => Ok(8),
        other => bail!("unsupported pointer width `{other}`; expected 32 or 64"),
    }
}

fn endianness() -> Result<Endian> {
    let endian = cargo_cfg("TARGET_ENDIAN").context("cannot determine target endianness")?;
    match endian.as_str() {
        "big" => Ok(Endian::Big),
        "little" => Ok(Endian::Little),
        other => bail!("unsupported endianness `{other}`"),
    }
}

fn backend(arch: &str) -> Result<Backend> {
    let power = matches!(arch, "powerpc" | "powerpc64");
    match env::var(BACKEND_VAR).ok().as_deref() {
        None | Some("") => Ok(if power {
            Backend::Reservation
        } else {
            Backend::Portable
        }),
        Some("portable") => Ok(Backend::Portable),
        Some("reservation") if power => Ok(Backend::Reservation),
        Some("reservation") => {
            bail!("${BACKEND_VAR}=reservation requires a Power target, found `{arch}`")
        }
        Some(other) => bail!("${BACKEND_VAR}: unknown backend `{other}`"),
    }
}

fn atomic64(word_size: usize, backend: Backend) -> Result<bool> {
    let requested = match env::var(ATOMIC64_VAR).ok().as_deref() {
        None | Some("") => None,
        Some("0") => Some(false),
        Some("1") => Some(true),
        Some(other) => bail!("${ATOMIC64_VAR}: expected 0 or 1, found `{other}`"),
    };

    // 64-bit words always have them; the reservation backend relies on that.
    if word_size == 8 {
        if requested == Some(false) {
            bail!("${ATOMIC64_VAR}=0 is not supported on 64-bit targets");
        }
        if backend == Backend::Portable && !has_atomic("64") {
            bail!("64-bit target without 64-bit atomics is not supported");
        }
        return Ok(true);
    }

    match backend {
        // `ldarx`/`stdcx.` in 32-bit mode only work on 64-bit hardware, which
        // the build cannot verify. Off unless explicitly requested.
        Backend::Reservation => Ok(requested.unwrap_or(false)),
        Backend::Portable => {
            let available = has_atomic("64");
            match requested {
                Some(true) if !available => {
                    bail!("${ATOMIC64_VAR}=1 but the target has no 64-bit atomics")
                }
                Some(on) => Ok(on),
                None => Ok(available),
            }
        }
    }
}

fn has_atomic(width: &str) -> bool {
    env::var("CARGO_CFG_TARGET_HAS_ATOMIC")
        .map(|widths| widths.split(',').any(|w| w == width))
        .unwrap_or(false)
}
