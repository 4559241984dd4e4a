#[cfg(target_arch = "x86")]
use std::arch::x86::{__cpuid_count, _xgetbv};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{__cpuid_count, _xgetbv};

use crate::cpuid::{Cpu, Registers};

/// The processor this code is running on.
#[derive(Debug, Clone, Copy)]
pub struct Native {
    _private: (),
}

impl Native {
    /// Returns `None` if the processor has no `cpuid` instruction, which on
    /// 32-bit x86 means a pre-Pentium part.
    pub fn new() -> Option<Self> {
        #[cfg(target_arch = "x86")]
        {
            if !std::arch::x86::has_cpuid() {
                return None;
            }
        }
        Some(Self { _private: () })
    }
}

impl Cpu for Native {
    #[allow(unused_unsafe)]
    fn cpuid(&self, leaf: u32) -> Registers {
        // SAFETY: `Native` is only constructed when `cpuid` exists.
        let result = unsafe { __cpuid_count(leaf, 0) };
        Registers {
            eax: result.eax,
            ebx: result.ebx,
            ecx: result.ecx,
            edx: result.edx,
        }
    }

    unsafe fn xgetbv(&self, xcr: u32) -> u64 {
        // SAFETY: the caller has observed OSXSAVE.
        unsafe { _xgetbv(xcr) }
    }
}
