//! Structured error types for irq-heatmap
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

use super::types::CpuId;

/// Limits or names supplied at startup that the program cannot honour.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At most {max} metrics can be displayed")]
    TooManyMetrics { max: usize },

    #[error("Missing required argument: at least one metric (-C, -I, -S, -M or -P)")]
    NoMetrics,

    #[error("Unknown cpu time field '{0}' (expected one of: {1})")]
    UnknownCpuField(String, String),

    #[error("Unknown softnet column '{0}' (expected one of: {1})")]
    UnknownSoftnetColumn(String, String),

    #[error("Empty label for {0} metric")]
    EmptyLabel(&'static str),

    #[error("{found} sockets found, at most {max} are supported")]
    TooManySockets { found: usize, max: usize },

    #[error("{found} cpus found, at most {max} are supported")]
    TooManyCpus { found: usize, max: usize },

    #[error("Socket {socket} needs thread slot {slot}, at most {max} slots are supported")]
    TooManyThreadSlots {
        socket: usize,
        slot: usize,
        max: usize,
    },

    #[error("Socket {socket} thread slot {slot} is full ({max} cores)")]
    TooManyCores {
        socket: usize,
        slot: usize,
        max: usize,
    },
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("NUMA topology is not available ({} has no node directories)", .0.display())]
    NumaUnavailable(PathBuf),

    #[error("No cpus listed under {}", .0.display())]
    NoCpus(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected contents in {}: {content:?}", path.display())]
    Parse { path: PathBuf, content: String },

    #[error("No thread sibling set readable for {0}")]
    NoSiblingSet(CpuId),

    #[error("{cpu} reports package {package}, but only {sockets} NUMA nodes exist")]
    PackageOutOfRange {
        cpu: CpuId,
        package: usize,
        sockets: usize,
    },

    #[error("{cpu} is outside the {cpu_count} configured cpus")]
    CpuOutOfRange { cpu: CpuId, cpu_count: usize },

    #[error("{0} placed in the topology twice")]
    DuplicateCpu(CpuId),

    #[error("Topology incomplete: {placed} of {expected} cpus placed")]
    Incomplete { placed: usize, expected: usize },

    #[error("Clock tick rate unavailable (sysconf returned {0})")]
    ClockTick(i64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum GatherError {
    #[error("Could not find label {label} in file {}", path.display())]
    LabelNotFound { label: String, path: PathBuf },

    #[error("Source {} unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed line in {}: {line:?}", path.display())]
    Malformed { path: PathBuf, line: String },
}

impl GatherError {
    /// True when the source may come back on a later cycle.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, GatherError::SourceUnavailable { .. })
    }
}
