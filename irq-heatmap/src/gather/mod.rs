//! Metric gatherers
//!
//! Each gatherer re-reads one kernel table and overwrites
//! `metric.current[0..cpu_count]`. `previous` is never touched here.
//! The table is opened, read and closed inside a single call.

pub mod cpu_time;
pub mod fields;
pub mod softnet;
pub mod tagged;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::GatherError;
use crate::metrics::{Metric, MetricKind};
use crate::topology::Topology;

pub use cpu_time::CpuField;
pub use softnet::SoftnetColumn;

/// Location of the procfs mount
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn stat(&self) -> PathBuf {
        self.root.join("stat")
    }

    #[must_use]
    pub fn interrupts(&self) -> PathBuf {
        self.root.join("interrupts")
    }

    #[must_use]
    pub fn softirqs(&self) -> PathBuf {
        self.root.join("softirqs")
    }

    #[must_use]
    pub fn softnet_stat(&self) -> PathBuf {
        self.root.join("net/softnet_stat")
    }

    /// Table a metric of `kind` is read from
    #[must_use]
    pub fn source_for(&self, kind: &MetricKind) -> PathBuf {
        match kind {
            MetricKind::CpuTime(_) => self.stat(),
            MetricKind::Interrupt(_) | MetricKind::MatchedSum(_) => self.interrupts(),
            MetricKind::SoftIrq(_) => self.softirqs(),
            MetricKind::Softnet(_) => self.softnet_stat(),
        }
    }
}

fn read_table(path: &Path) -> Result<String, GatherError> {
    fs::read_to_string(path).map_err(|source| GatherError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Refresh `metric.current` from its kernel table
///
/// # Errors
/// [`GatherError::SourceUnavailable`] if the table cannot be read (the buffer
/// is left as it was), otherwise lookup or parse failures.
pub fn gather(
    metric: &mut Metric,
    topology: &Topology,
    procfs: &ProcFs,
) -> Result<(), GatherError> {
    let path = procfs.source_for(metric.kind());
    let table = read_table(&path)?;
    let (kind, current) = metric.kind_and_current(topology.cpu_count());

    match kind {
        MetricKind::CpuTime(field) => cpu_time::parse(&table, *field, &path, current),
        MetricKind::Interrupt(label) | MetricKind::SoftIrq(label) => {
            tagged::parse_tagged(&table, label, &path, current)
        }
        MetricKind::MatchedSum(pattern) => {
            tagged::parse_matched_sum(&table, pattern, &path, current)
        }
        MetricKind::Softnet(column) => softnet::parse(&table, *column, &path, current),
    }
}
