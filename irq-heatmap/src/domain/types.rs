//! Domain types providing compile-time safety and self-documentation
//!
//! The kernel hands out two unrelated per-CPU numbers: the logical CPU id,
//! which indexes every counter table, and the topology `core_id`, which is
//! only meaningful for display. Keeping them in separate newtypes stops one
//! being used to index by the other.

use std::fmt;

/// Logical CPU id
///
/// The id the kernel uses for a CPU in `/proc/stat`, `/proc/interrupts` and
/// `/sys/devices/system/cpu/cpuN`. Densely packed from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpuId(pub u32);

impl CpuId {
    /// Position of this CPU in a per-CPU counter buffer
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU:{}", self.0)
    }
}

/// Kernel-reported core id from `topology/core_id`
///
/// Not contiguous on many machines. Carried for diagnostics, never used as an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreId(pub u32);

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core_id:{}", self.0)
    }
}
