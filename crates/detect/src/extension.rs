use crate::cpuid::{Cpu, Native, Register};
use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Instruction set extensions that are not part of the cumulative
/// [`Level`] scale. Two processors at the same level may differ here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    Fma3,
    Fma4,
    Xop,
    Avx512er,
    F16c,
    Avx512vbmi,
    Avx512vbmi2,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown extension {name:?}.")]
pub struct ParseExtensionError {
    pub name: String,
}

/// Where an extension is reported: the level it depends on and the bit
/// that announces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub min_level: Level,
    pub leaf: u32,
    pub register: Register,
    pub bit: u32,
}

impl Extension {
    pub const ALL: [Extension; 7] = [
        Extension::Fma3,
        Extension::Fma4,
        Extension::Xop,
        Extension::Avx512er,
        Extension::F16c,
        Extension::Avx512vbmi,
        Extension::Avx512vbmi2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Extension::Fma3 => "fma3",
            Extension::Fma4 => "fma4",
            Extension::Xop => "xop",
            Extension::Avx512er => "avx512er",
            Extension::F16c => "f16c",
            Extension::Avx512vbmi => "avx512vbmi",
            Extension::Avx512vbmi2 => "avx512vbmi2",
        }
    }

    pub fn probe(self) -> Probe {
        let (min_level, leaf, register, bit) = match self {
            Extension::Fma3 => (Level::Avx, 1, Register::Ecx, 12),
            Extension::Fma4 => (Level::Avx, 0x8000_0001, Register::Ecx, 16),
            Extension::Xop => (Level::Avx, 0x8000_0001, Register::Ecx, 11),
            Extension::Avx512er => (Level::Avx512f, 7, Register::Ebx, 27),
            Extension::F16c => (Level::Avx, 1, Register::Ecx, 29),
            Extension::Avx512vbmi => (Level::Avx512f, 7, Register::Ecx, 1),
            Extension::Avx512vbmi2 => (Level::Avx512f, 7, Register::Ecx, 6),
        };
        Probe {
            min_level,
            leaf,
            register,
            bit,
        }
    }

    pub fn min_level(self) -> Level {
        self.probe().min_level
    }

    /// Probes the running processor. Always `false` without `cpuid`.
    pub fn detect(self) -> bool {
        match Native::new() {
            Some(cpu) => self.detect_with(&cpu),
            None => false,
        }
    }

    pub fn detect_with<C: Cpu + ?Sized>(self, cpu: &C) -> bool {
        self.detect_at(cpu, Level::classify(cpu))
    }

    /// Like [`Extension::detect_with`], reusing a level already classified
    /// for the same `cpu`.
    pub(crate) fn detect_at<C: Cpu + ?Sized>(self, cpu: &C, level: Level) -> bool {
        let probe = self.probe();
        if level < probe.min_level {
            return false;
        }
        match cpu.cpuid_checked(probe.leaf) {
            Some(registers) => registers.bit(probe.register, probe.bit),
            None => false,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extension {
    type Err = ParseExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match Extension::ALL
            .into_iter()
            .find(|extension| extension.name().eq_ignore_ascii_case(s))
        {
            Some(extension) => Ok(extension),
            // "fma" is the name most toolchains use for FMA3.
            None if s.eq_ignore_ascii_case("fma") => Ok(Extension::Fma3),
            None => Err(ParseExtensionError {
                name: s.to_string(),
            }),
        }
    }
}
