#![allow(dead_code)]

use detect::cpuid::EXTENDED_LEAF_BASE;
use detect::{Cpu, Registers};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const LEAF1_EDX_SSE: u32 = 1 << 25;
pub const LEAF1_EDX_SSE2: u32 = LEAF1_EDX_SSE | 1 << 26;
pub const LEAF1_ECX_SSE3: u32 = 1;
pub const LEAF1_ECX_SSSE3: u32 = LEAF1_ECX_SSE3 | 1 << 9;
pub const LEAF1_ECX_SSE41: u32 = LEAF1_ECX_SSSE3 | 1 << 19;
pub const LEAF1_ECX_SSE42: u32 = LEAF1_ECX_SSE41 | 1 << 20;
pub const LEAF1_ECX_OSXSAVE: u32 = 1 << 27;
pub const LEAF1_ECX_AVX: u32 = 1 << 28;
pub const LEAF1_ECX_FMA3: u32 = 1 << 12;
pub const LEAF1_ECX_F16C: u32 = 1 << 29;

pub const LEAF7_EBX_AVX2: u32 = 1 << 5;
pub const LEAF7_EBX_AVX512F: u32 = 1 << 16;
pub const LEAF7_EBX_AVX512DQ: u32 = 1 << 17;
pub const LEAF7_EBX_AVX512ER: u32 = 1 << 27;
pub const LEAF7_EBX_AVX512BW: u32 = 1 << 30;
pub const LEAF7_EBX_AVX512VL: u32 = 1 << 31;
pub const LEAF7_ECX_AVX512VBMI: u32 = 1 << 1;
pub const LEAF7_ECX_AVX512VBMI2: u32 = 1 << 6;

pub const LEAF81_ECX_XOP: u32 = 1 << 11;
pub const LEAF81_ECX_FMA4: u32 = 1 << 16;

pub const XCR0_SSE: u64 = 0x3;
pub const XCR0_AVX: u64 = 0x7;
pub const XCR0_AVX512: u64 = 0xE7;

/// Replays a fixed register table and panics on any query a real processor
/// would answer with undefined values.
#[derive(Debug, Default)]
pub struct MockCpu {
    leaves: BTreeMap<u32, Registers>,
    xcr0: u64,
    queried: RefCell<Vec<u32>>,
    xgetbv_calls: Cell<usize>,
}

impl MockCpu {
    pub fn new(max_leaf: u32) -> Self {
        let mut cpu = Self::default();
        cpu.leaves.insert(
            0,
            Registers {
                eax: max_leaf,
                ..Default::default()
            },
        );
        cpu
    }

    pub fn leaf1(self, ecx: u32, edx: u32) -> Self {
        self.leaf(
            1,
            Registers {
                ecx,
                edx,
                ..Default::default()
            },
        )
    }

    pub fn leaf7(self, ebx: u32, ecx: u32) -> Self {
        self.leaf(
            7,
            Registers {
                ebx,
                ecx,
                ..Default::default()
            },
        )
    }

    pub fn extended(self, max_extended_leaf: u32, leaf81_ecx: u32) -> Self {
        self.leaf(
            EXTENDED_LEAF_BASE,
            Registers {
                eax: max_extended_leaf,
                ..Default::default()
            },
        )
        .leaf(
            0x8000_0001,
            Registers {
                ecx: leaf81_ecx,
                ..Default::default()
            },
        )
    }

    pub fn xcr0(mut self, xcr0: u64) -> Self {
        self.xcr0 = xcr0;
        self
    }

    pub fn leaf(mut self, leaf: u32, registers: Registers) -> Self {
        self.leaves.insert(leaf, registers);
        self
    }

    pub fn queried(&self) -> Vec<u32> {
        self.queried.borrow().clone()
    }

    pub fn queries_of(&self, leaf: u32) -> usize {
        self.queried.borrow().iter().filter(|&&l| l == leaf).count()
    }

    pub fn xgetbv_calls(&self) -> usize {
        self.xgetbv_calls.get()
    }

    fn raw(&self, leaf: u32) -> Registers {
        self.leaves.get(&leaf).copied().unwrap_or_default()
    }
}

impl Cpu for MockCpu {
    fn cpuid(&self, leaf: u32) -> Registers {
        self.queried.borrow_mut().push(leaf);
        if leaf != 0 && leaf != EXTENDED_LEAF_BASE {
            let max = if leaf > EXTENDED_LEAF_BASE {
                self.raw(EXTENDED_LEAF_BASE).eax
            } else {
                self.raw(0).eax
            };
            assert!(leaf <= max, "leaf {leaf:#x} queried beyond maximum {max:#x}");
        }
        self.raw(leaf)
    }

    unsafe fn xgetbv(&self, xcr: u32) -> u64 {
        assert_eq!(xcr, 0);
        assert!(
            self.raw(1).ecx & LEAF1_ECX_OSXSAVE != 0,
            "xgetbv without OSXSAVE"
        );
        self.xgetbv_calls.set(self.xgetbv_calls.get() + 1);
        self.xcr0
    }
}

/// SSE through SSE4.2, AVX with OS support, AVX2.
pub fn avx2_machine() -> MockCpu {
    MockCpu::new(7)
        .leaf1(LEAF1_ECX_SSE42 | LEAF1_ECX_OSXSAVE | LEAF1_ECX_AVX, LEAF1_EDX_SSE2)
        .leaf7(LEAF7_EBX_AVX2, 0)
        .xcr0(XCR0_AVX)
}

/// Every tier up to AVX512BW and AVX512DQ, with OS support.
pub fn avx512_machine(extra_ebx: u32, extra_ecx: u32) -> MockCpu {
    MockCpu::new(0xd)
        .leaf1(LEAF1_ECX_SSE42 | LEAF1_ECX_OSXSAVE | LEAF1_ECX_AVX, LEAF1_EDX_SSE2)
        .leaf7(
            LEAF7_EBX_AVX2
                | LEAF7_EBX_AVX512F
                | LEAF7_EBX_AVX512VL
                | LEAF7_EBX_AVX512BW
                | LEAF7_EBX_AVX512DQ
                | extra_ebx,
            extra_ecx,
        )
        .xcr0(XCR0_AVX512)
}
