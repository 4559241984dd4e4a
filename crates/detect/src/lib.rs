//! Runtime detection of the SIMD instruction sets usable on this machine.
//!
//! [`level`] reports the highest cumulative tier (SSE through AVX-512) that
//! both the processor and the operating system support. The `has_*` probes
//! report extensions outside that scale. Every query runs `cpuid` afresh;
//! use [`cache`] to detect once per process.
//!
//! On targets without `cpuid` every query answers the baseline: level 0 and
//! no extensions.

pub mod cache;
pub mod cpuid;
pub mod extension;
pub mod features;
pub mod level;

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
mod fallback;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

pub use cpuid::{Cpu, Native, Register, Registers};
pub use extension::{Extension, ParseExtensionError};
pub use features::Features;
pub use level::{Level, ParseLevelError};

/// Whether this machine can be queried at all.
pub fn available() -> bool {
    Native::new().is_some()
}

pub fn level() -> Level {
    match Native::new() {
        Some(cpu) => Level::classify(&cpu),
        None => Level::Baseline,
    }
}

pub fn has_fma3() -> bool {
    Extension::Fma3.detect()
}

pub fn has_fma4() -> bool {
    Extension::Fma4.detect()
}

pub fn has_xop() -> bool {
    Extension::Xop.detect()
}

pub fn has_avx512er() -> bool {
    Extension::Avx512er.detect()
}

pub fn has_f16c() -> bool {
    Extension::F16c.detect()
}

pub fn has_avx512vbmi() -> bool {
    Extension::Avx512vbmi.detect()
}

pub fn has_avx512vbmi2() -> bool {
    Extension::Avx512vbmi2.detect()
}
