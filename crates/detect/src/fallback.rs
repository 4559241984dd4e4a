use std::convert::Infallible;

use crate::cpuid::{Cpu, Registers};

/// Placeholder for targets without `cpuid`. It cannot be constructed, so
/// every query on these targets takes the baseline path.
#[derive(Debug, Clone, Copy)]
pub struct Native {
    never: Infallible,
}

impl Native {
    pub fn new() -> Option<Self> {
        None
    }
}

impl Cpu for Native {
    fn cpuid(&self, _: u32) -> Registers {
        match self.never {}
    }

    unsafe fn xgetbv(&self, _: u32) -> u64 {
        match self.never {}
    }
}
