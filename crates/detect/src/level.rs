use crate::cpuid::{Cpu, Register};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Leaf 1.
const EDX_SSE: u32 = 25;
const EDX_SSE2: u32 = 26;
const ECX_SSE3: u32 = 0;
const ECX_SSSE3: u32 = 9;
const ECX_SSE41: u32 = 19;
const ECX_SSE42: u32 = 20;
const ECX_OSXSAVE: u32 = 27;
const ECX_AVX: u32 = 28;

// Leaf 7, sub-leaf 0.
const EBX_AVX2: u32 = 5;
const EBX_AVX512F: u32 = 16;
const EBX_AVX512DQ: u32 = 17;
const EBX_AVX512BW: u32 = 30;
const EBX_AVX512VL: u32 = 31;

// XCR0: SSE and AVX state.
const XCR0_AVX: u64 = 0x6;
// XCR0: opmask, ZMM_Hi256 and Hi16_ZMM state.
const XCR0_AVX512: u64 = 0xE0;

const SSE_TIERS: [(Register, u32, Level); 6] = [
    (Register::Edx, EDX_SSE, Level::Sse),
    (Register::Edx, EDX_SSE2, Level::Sse2),
    (Register::Ecx, ECX_SSE3, Level::Sse3),
    (Register::Ecx, ECX_SSSE3, Level::Ssse3),
    (Register::Ecx, ECX_SSE41, Level::Sse41),
    (Register::Ecx, ECX_SSE42, Level::Sse42),
];

/// Highest instruction set tier that is usable on this machine.
///
/// Levels are cumulative: every level implies all levels below it. AVX and
/// the AVX-512 tiers are only reached when the operating system saves the
/// corresponding register state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u8)]
pub enum Level {
    #[default]
    Baseline = 0,
    Sse = 1,
    Sse2 = 2,
    Sse3 = 3,
    Ssse3 = 4,
    Sse41 = 5,
    Sse42 = 6,
    Avx = 7,
    Avx2 = 8,
    Avx512f = 9,
    Avx512vl = 10,
    Avx512bw = 11,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLevelError {
    #[error("Level {0} is out of range, expected 0 to 11.")]
    OutOfRange(u32),
    #[error("Unknown instruction set level {name:?}.")]
    UnknownName { name: String },
}

impl Level {
    pub const ALL: [Level; 12] = [
        Level::Baseline,
        Level::Sse,
        Level::Sse2,
        Level::Sse3,
        Level::Ssse3,
        Level::Sse41,
        Level::Sse42,
        Level::Avx,
        Level::Avx2,
        Level::Avx512f,
        Level::Avx512vl,
        Level::Avx512bw,
    ];

    pub const MAX: Level = Level::Avx512bw;

    pub fn name(self) -> &'static str {
        match self {
            Level::Baseline => "baseline",
            Level::Sse => "sse",
            Level::Sse2 => "sse2",
            Level::Sse3 => "sse3",
            Level::Ssse3 => "ssse3",
            Level::Sse41 => "sse4.1",
            Level::Sse42 => "sse4.2",
            Level::Avx => "avx",
            Level::Avx2 => "avx2",
            Level::Avx512f => "avx512f",
            Level::Avx512vl => "avx512vl",
            Level::Avx512bw => "avx512bw",
        }
    }

    /// Classifies `cpu`, stopping at the first tier that is missing either
    /// on the processor or in the operating system.
    pub fn classify<C: Cpu + ?Sized>(cpu: &C) -> Level {
        let max_leaf = cpu.max_leaf();
        if max_leaf == 0 {
            return Level::Baseline;
        }
        let leaf1 = cpu.cpuid(1);
        let mut level = Level::Baseline;
        for (register, bit, tier) in SSE_TIERS {
            if !leaf1.bit(register, bit) {
                return level;
            }
            level = tier;
        }
        if !leaf1.bit(Register::Ecx, ECX_AVX) || !leaf1.bit(Register::Ecx, ECX_OSXSAVE) {
            return level;
        }
        // SAFETY: OSXSAVE is set.
        let xcr0 = unsafe { cpu.xgetbv(0) };
        if xcr0 & XCR0_AVX != XCR0_AVX {
            return level;
        }
        level = Level::Avx;
        if max_leaf < 7 {
            return level;
        }
        let leaf7 = cpu.cpuid(7);
        if !leaf7.bit(Register::Ebx, EBX_AVX2) {
            return level;
        }
        level = Level::Avx2;
        if !leaf7.bit(Register::Ebx, EBX_AVX512F) || xcr0 & XCR0_AVX512 != XCR0_AVX512 {
            return level;
        }
        level = Level::Avx512f;
        if !leaf7.bit(Register::Ebx, EBX_AVX512VL) {
            return level;
        }
        level = Level::Avx512vl;
        if !leaf7.bit(Register::Ebx, EBX_AVX512BW) || !leaf7.bit(Register::Ebx, EBX_AVX512DQ) {
            return level;
        }
        Level::Avx512bw
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> u32 {
        level as u32
    }
}

impl TryFrom<u32> for Level {
    type Error = ParseLevelError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Level::ALL
            .get(value as usize)
            .copied()
            .ok_or(ParseLevelError::OutOfRange(value))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a level name (`"avx2"`, `"sse4.1"`) or its number (`"8"`).
impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<u32>() {
            return Level::try_from(value);
        }
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError::UnknownName { name: s.to_string() })
    }
}
