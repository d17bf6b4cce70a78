//! Hardware topology model
//!
//! The tree is socket → thread slot → core, the same order the heatmap
//! columns are laid out in. A thread slot is a position among SMT siblings
//! (slot 0 holds the first hyperthread of every physical core on the socket,
//! slot 1 the second, ...). Slots are derived from the sibling sets, never
//! taken from kernel numbering.
//!
//! Built once by [`discover`] and read-only afterwards.

pub mod cpuset;
pub mod sysfs;

use std::fmt;

use log::{debug, info};

use crate::domain::{ConfigError, CoreId, CpuId, DiscoveryError};

pub use cpuset::{CpuSet, CpuSetFormat, HexMask, RangeList};
pub use sysfs::SysFs;

pub const MAX_SOCKETS: usize = 4;
pub const MAX_THREAD_SLOTS: usize = 4;
pub const MAX_CORES_PER_SLOT: usize = 64;
pub const MAX_CPUS: usize = MAX_SOCKETS * MAX_THREAD_SLOTS * MAX_CORES_PER_SLOT;

/// One logical CPU at a thread slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Core {
    pub cpu: CpuId,
    pub core_id: CoreId,
}

#[derive(Debug, Clone, Default)]
pub struct ThreadSlot {
    configured: bool,
    cores: Vec<Core>,
}

impl ThreadSlot {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Cores in the order they were discovered (increasing CPU id)
    #[must_use]
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }
}

#[derive(Debug, Clone, Default)]
pub struct Socket {
    configured: bool,
    slots: Vec<ThreadSlot>,
}

impl Socket {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Highest populated slot + 1
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.slots.len()
    }

    /// Populated thread slots with their index
    pub fn slots(&self) -> impl Iterator<Item = (usize, &ThreadSlot)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.is_configured())
    }
}

/// Immutable hardware hierarchy
#[derive(Debug, Clone)]
pub struct Topology {
    sockets: Vec<Socket>,
    cpu_count: usize,
    tick_ms: u32,
}

impl Topology {
    /// Sockets reported by NUMA, populated or not
    #[must_use]
    pub fn socket_count(&self) -> usize {
        self.sockets.len()
    }

    #[must_use]
    pub fn cpu_count(&self) -> usize {
        self.cpu_count
    }

    /// Length of one kernel accounting tick
    #[must_use]
    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    /// Populated sockets with their index
    pub fn sockets(&self) -> impl Iterator<Item = (usize, &Socket)> {
        self.sockets.iter().enumerate().filter(|(_, socket)| socket.is_configured())
    }

    /// Every core as `(socket, slot, core)` in display order
    pub fn cores(&self) -> impl Iterator<Item = (usize, usize, &Core)> {
        self.sockets().flat_map(|(s, socket)| {
            socket
                .slots()
                .flat_map(move |(t, slot)| slot.cores.iter().map(move |core| (s, t, core)))
        })
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "sockets: {}, cpus: {}, clock tick: {} ms",
            self.socket_count(),
            self.cpu_count,
            self.tick_ms
        )?;
        for (s, socket) in self.sockets.iter().enumerate() {
            let empty = if socket.configured { "" } else { " (empty)" };
            writeln!(f, "Socket {s}{empty}")?;
            for (t, slot) in socket.slots() {
                writeln!(f, "  Thread {t}: {} cores", slot.cores.len())?;
                for (c, core) in slot.cores.iter().enumerate() {
                    writeln!(f, "    core {c:<3} {:<12} {}", core.core_id, core.cpu)?;
                }
            }
        }
        Ok(())
    }
}

/// Incremental construction with capacity checks
#[derive(Debug)]
pub struct TopologyBuilder {
    sockets: Vec<Socket>,
    placed: Vec<bool>,
    tick_ms: u32,
}

impl TopologyBuilder {
    /// # Errors
    /// Fails when `socket_count` or `cpu_count` exceed the compiled limits
    pub fn new(socket_count: usize, cpu_count: usize, tick_ms: u32) -> Result<Self, ConfigError> {
        if socket_count > MAX_SOCKETS {
            return Err(ConfigError::TooManySockets {
                found: socket_count,
                max: MAX_SOCKETS,
            });
        }
        if cpu_count > MAX_CPUS {
            return Err(ConfigError::TooManyCpus {
                found: cpu_count,
                max: MAX_CPUS,
            });
        }
        Ok(Self {
            sockets: vec![Socket::default(); socket_count],
            placed: vec![false; cpu_count],
            tick_ms,
        })
    }

    /// Place `cpu` at (`socket`, `slot`)
    ///
    /// # Errors
    /// Out of range CPU or socket, a CPU placed twice, or a full slot/socket
    pub fn add_cpu(
        &mut self,
        cpu: CpuId,
        socket: usize,
        core_id: CoreId,
        slot: usize,
    ) -> Result<(), DiscoveryError> {
        let cpu_count = self.placed.len();
        let Some(placed) = self.placed.get_mut(cpu.index()) else {
            return Err(DiscoveryError::CpuOutOfRange { cpu, cpu_count });
        };
        if *placed {
            return Err(DiscoveryError::DuplicateCpu(cpu));
        }

        let sockets = self.sockets.len();
        let Some(sock) = self.sockets.get_mut(socket) else {
            return Err(DiscoveryError::PackageOutOfRange {
                cpu,
                package: socket,
                sockets,
            });
        };
        if slot >= MAX_THREAD_SLOTS {
            let max = MAX_THREAD_SLOTS;
            return Err(ConfigError::TooManyThreadSlots { socket, slot, max }.into());
        }
        if sock.slots.len() <= slot {
            sock.slots.resize_with(slot + 1, ThreadSlot::default);
        }
        let thread = &mut sock.slots[slot];
        if thread.cores.len() >= MAX_CORES_PER_SLOT {
            let max = MAX_CORES_PER_SLOT;
            return Err(ConfigError::TooManyCores { socket, slot, max }.into());
        }

        sock.configured = true;
        thread.configured = true;
        thread.cores.push(Core { cpu, core_id });
        *placed = true;
        Ok(())
    }

    /// # Errors
    /// Fails unless every CPU in `0..cpu_count` has been placed
    pub fn build(self) -> Result<Topology, DiscoveryError> {
        let placed = self.placed.iter().filter(|&&p| p).count();
        if placed != self.placed.len() {
            return Err(DiscoveryError::Incomplete {
                placed,
                expected: self.placed.len(),
            });
        }
        Ok(Topology {
            sockets: self.sockets,
            cpu_count: placed,
            tick_ms: self.tick_ms,
        })
    }
}

/// Duration of one `USER_HZ` tick in milliseconds
#[allow(unsafe_code)] // sysconf() requires unsafe
#[allow(clippy::useless_conversion)] // c_long is i32 on 32-bit targets
pub fn clock_tick_ms() -> Result<u32, DiscoveryError> {
    // SAFETY: sysconf only reads a configuration value
    let ticks = i64::from(unsafe { libc::sysconf(libc::_SC_CLK_TCK) });
    if ticks <= 0 {
        return Err(DiscoveryError::ClockTick(ticks));
    }
    u32::try_from(1000 / ticks).map_err(|_| DiscoveryError::ClockTick(ticks))
}

/// Thread slot of `cpu`: how many of its siblings have a lower CPU id
#[must_use]
pub fn thread_slot(cpu: CpuId, siblings: &CpuSet) -> usize {
    siblings.count_below(cpu)
}

/// Build the topology from sysfs
///
/// # Errors
/// Any missing or unparseable topology attribute is fatal; there is no
/// partial topology.
pub fn discover(sysfs: &SysFs) -> Result<Topology, DiscoveryError> {
    let Some(max_node) = sysfs.max_numa_node()? else {
        return Err(DiscoveryError::NumaUnavailable(sysfs.node_dir()));
    };
    let socket_count = max_node + 1;
    let cpu_count = sysfs.configured_cpu_count()?;
    let tick_ms = clock_tick_ms()?;

    let mut builder = TopologyBuilder::new(socket_count, cpu_count, tick_ms)?;

    for cpu in (0u32..).take(cpu_count).map(CpuId) {
        let package = sysfs.read_integer(cpu, "physical_package_id")? as usize;
        let core_id = CoreId(sysfs.read_integer(cpu, "core_id")?);
        let siblings = sysfs.read_siblings(cpu)?;
        let slot = thread_slot(cpu, &siblings);

        debug!("{cpu}: package {package}, {core_id}, thread slot {slot}");
        builder.add_cpu(cpu, package, core_id, slot)?;
    }

    let topology = builder.build()?;
    info!(
        "Topology: {} sockets, {} cpus, {} ms clock tick",
        topology.socket_count(),
        topology.cpu_count(),
        topology.tick_ms()
    );
    Ok(topology)
}
