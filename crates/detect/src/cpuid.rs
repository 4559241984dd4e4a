/// First leaf of the vendor-extended CPUID range.
pub const EXTENDED_LEAF_BASE: u32 = 0x8000_0000;

/// The four registers written by one `cpuid` execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Registers {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Eax,
    Ebx,
    Ecx,
    Edx,
}

impl Registers {
    pub fn get(&self, register: Register) -> u32 {
        match register {
            Register::Eax => self.eax,
            Register::Ebx => self.ebx,
            Register::Ecx => self.ecx,
            Register::Edx => self.edx,
        }
    }

    pub fn bit(&self, register: Register, bit: u32) -> bool {
        debug_assert!(bit < 32);
        self.get(register) & (1u32 << bit) != 0
    }
}

/// Raw access to the processor identification instructions.
///
/// The detection logic is written against this trait so that the platform
/// backend stays in one place and so that tests can replay synthetic
/// register values.
pub trait Cpu {
    /// Executes `cpuid` for `leaf` with sub-leaf 0.
    ///
    /// Leaves above the maximum reported by leaf 0 (or by
    /// [`EXTENDED_LEAF_BASE`] for the extended range) return undefined
    /// values. Use [`Cpu::cpuid_checked`] unless the range is already known.
    fn cpuid(&self, leaf: u32) -> Registers;

    /// Reads the extended control register `xcr`.
    ///
    /// # Safety
    ///
    /// The caller must have observed OSXSAVE (leaf 1, ECX bit 27). Without
    /// it the instruction raises #UD.
    unsafe fn xgetbv(&self, xcr: u32) -> u64;

    /// Highest basic leaf, as reported by leaf 0.
    fn max_leaf(&self) -> u32 {
        self.cpuid(0).eax
    }

    /// Highest extended leaf, or 0 if the extended range is absent.
    fn max_extended_leaf(&self) -> u32 {
        let eax = self.cpuid(EXTENDED_LEAF_BASE).eax;
        if eax >= EXTENDED_LEAF_BASE {
            eax
        } else {
            0
        }
    }

    /// Executes `cpuid` only if `leaf` lies within the range the processor
    /// reports as valid.
    fn cpuid_checked(&self, leaf: u32) -> Option<Registers> {
        let max = if leaf >= EXTENDED_LEAF_BASE {
            self.max_extended_leaf()
        } else {
            self.max_leaf()
        };
        if leaf <= max {
            Some(self.cpuid(leaf))
        } else {
            None
        }
    }
}

impl<C: Cpu + ?Sized> Cpu for &C {
    fn cpuid(&self, leaf: u32) -> Registers {
        (**self).cpuid(leaf)
    }

    unsafe fn xgetbv(&self, xcr: u32) -> u64 {
        unsafe { (**self).xgetbv(xcr) }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use crate::x86::Native;

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub use crate::fallback::Native;
