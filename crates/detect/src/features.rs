use crate::cpuid::{Cpu, Native};
use crate::extension::Extension;
use crate::level::Level;
use serde::{Deserialize, Serialize};

/// Level and every extension flag, captured together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Features {
    pub level: Level,
    pub fma3: bool,
    pub fma4: bool,
    pub xop: bool,
    pub avx512er: bool,
    pub f16c: bool,
    pub avx512vbmi: bool,
    pub avx512vbmi2: bool,
}

impl Features {
    pub fn detect() -> Self {
        match Native::new() {
            Some(cpu) => Self::detect_with(&cpu),
            None => Self::default(),
        }
    }

    pub fn detect_with<C: Cpu + ?Sized>(cpu: &C) -> Self {
        let level = Level::classify(cpu);
        let mut features = Self {
            level,
            ..Self::default()
        };
        for extension in Extension::ALL {
            features.set(extension, extension.detect_at(cpu, level));
        }
        features
    }

    pub fn has(&self, extension: Extension) -> bool {
        match extension {
            Extension::Fma3 => self.fma3,
            Extension::Fma4 => self.fma4,
            Extension::Xop => self.xop,
            Extension::Avx512er => self.avx512er,
            Extension::F16c => self.f16c,
            Extension::Avx512vbmi => self.avx512vbmi,
            Extension::Avx512vbmi2 => self.avx512vbmi2,
        }
    }

    pub fn set(&mut self, extension: Extension, value: bool) {
        let flag = match extension {
            Extension::Fma3 => &mut self.fma3,
            Extension::Fma4 => &mut self.fma4,
            Extension::Xop => &mut self.xop,
            Extension::Avx512er => &mut self.avx512er,
            Extension::F16c => &mut self.f16c,
            Extension::Avx512vbmi => &mut self.avx512vbmi,
            Extension::Avx512vbmi2 => &mut self.avx512vbmi2,
        };
        *flag = value;
    }

    pub fn supports(&self, level: Level) -> bool {
        self.level >= level
    }

    pub fn extensions(&self) -> impl Iterator<Item = Extension> + '_ {
        Extension::ALL.into_iter().filter(move |&e| self.has(e))
    }

    /// Lowers the level to at most `max`, clearing every extension whose
    /// minimum level is no longer reached.
    pub fn restrict(&mut self, max: Level) {
        self.level = self.level.min(max);
        for extension in Extension::ALL {
            if self.level < extension.min_level() {
                self.set(extension, false);
            }
        }
    }

    pub(crate) fn to_bits(self) -> u32 {
        Extension::ALL
            .into_iter()
            .enumerate()
            .filter(|&(_, e)| self.has(e))
            .fold(0, |bits, (i, _)| bits | (1u32 << i))
    }

    pub(crate) fn from_bits(level: Level, bits: u32) -> Self {
        let mut features = Self {
            level,
            ..Self::default()
        };
        for (i, extension) in Extension::ALL.into_iter().enumerate() {
            features.set(extension, bits & (1u32 << i) != 0);
        }
        features
    }
}
