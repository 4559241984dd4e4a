//! Process-wide memoization of the detection result.
//!
//! Nothing is detected until [`initialize`] or [`store`] runs; before that
//! every query reports the baseline.

use crate::extension::Extension;
use crate::features::Features;
use crate::level::Level;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

static ATOMIC_LEVEL: AtomicU8 = AtomicU8::new(0);
static ATOMIC_EXTENSIONS: AtomicU32 = AtomicU32::new(0);

pub fn initialize() {
    store(Features::detect());
}

/// Replaces the cached result, e.g. with a masked copy of a detection.
pub fn store(features: Features) {
    log::debug!(
        "simd level: {} ({}), extensions: [{}]",
        features.level,
        u32::from(features.level),
        features
            .extensions()
            .map(Extension::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    ATOMIC_EXTENSIONS.store(features.to_bits(), Ordering::Relaxed);
    ATOMIC_LEVEL.store(features.level as u8, Ordering::Relaxed);
}

pub fn detect_level() -> Level {
    Level::try_from(ATOMIC_LEVEL.load(Ordering::Relaxed) as u32).unwrap_or_default()
}

pub fn detect(extension: Extension) -> bool {
    detect_features().has(extension)
}

pub fn detect_features() -> Features {
    let mut features = Features::from_bits(
        detect_level(),
        ATOMIC_EXTENSIONS.load(Ordering::Relaxed),
    );
    // The two stores are not atomic together; a reader racing `store` must
    // not see an extension above the level it read.
    features.restrict(features.level);
    features
}
