//! Metric definitions and the double-buffered metric store
//!
//! Every metric keeps two per-CPU snapshots. A cycle gathers into `current`,
//! renders `current - previous`, then [`MetricStore::advance`] copies
//! `current` over `previous`, so deltas always span exactly one interval.

use log::{debug, info};

use crate::domain::{ConfigError, CpuId, GatherError};
use crate::gather::{self, CpuField, ProcFs, SoftnetColumn};
use crate::topology::{Topology, MAX_CPUS};

pub const MAX_METRICS: usize = 8;

/// What a metric counts and how its table row/column is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricKind {
    /// A `/proc/stat` time field
    CpuTime(CpuField),
    /// A `/proc/interrupts` vector by label (`75`, `NMI`)
    Interrupt(String),
    /// A `/proc/softirqs` vector by label (`NET_RX`)
    SoftIrq(String),
    /// Sum of `/proc/interrupts` lines whose device name starts with a pattern
    MatchedSum(String),
    /// A `/proc/net/softnet_stat` column
    Softnet(SoftnetColumn),
}

impl MetricKind {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            MetricKind::CpuTime(_) => "cpu-time",
            MetricKind::Interrupt(_) => "irq",
            MetricKind::SoftIrq(_) => "softirq",
            MetricKind::MatchedSum(_) => "irq-sum",
            MetricKind::Softnet(_) => "softnet",
        }
    }

    /// Header label when none is given
    #[must_use]
    pub fn default_label(&self) -> String {
        match self {
            MetricKind::CpuTime(field) => format!("cpu {field}"),
            MetricKind::Interrupt(label) | MetricKind::SoftIrq(label) => label.clone(),
            MetricKind::MatchedSum(pattern) => pattern.clone(),
            MetricKind::Softnet(column) => format!("softnet {column}"),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MetricKind::Interrupt(label) | MetricKind::SoftIrq(label) if label.is_empty() => {
                Err(ConfigError::EmptyLabel(self.type_name()))
            }
            MetricKind::MatchedSum(pattern) if pattern.is_empty() => {
                Err(ConfigError::EmptyLabel(self.type_name()))
            }
            _ => Ok(()),
        }
    }
}

/// One displayed series
#[derive(Debug, Clone)]
pub struct Metric {
    kind: MetricKind,
    label: String,
    current: Vec<u64>,
    previous: Vec<u64>,
}

impl Metric {
    #[must_use]
    pub fn new(kind: MetricKind) -> Self {
        let label = kind.default_label();
        Self::with_label(kind, label)
    }

    #[must_use]
    pub fn with_label(kind: MetricKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            current: vec![0; MAX_CPUS],
            previous: vec![0; MAX_CPUS],
        }
    }

    #[must_use]
    pub fn kind(&self) -> &MetricKind {
        &self.kind
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn current(&self) -> &[u64] {
        &self.current
    }

    #[must_use]
    pub fn previous(&self) -> &[u64] {
        &self.previous
    }

    /// Signed change of `cpu`'s counter over the last interval.
    /// Negative after a counter reset.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn delta(&self, cpu: CpuId) -> i64 {
        let i = cpu.index();
        self.current[i].wrapping_sub(self.previous[i]) as i64
    }

    /// The kind together with the writable part of `current`
    pub(crate) fn kind_and_current(&mut self, cpu_count: usize) -> (&MetricKind, &mut [u64]) {
        (&self.kind, &mut self.current[..cpu_count])
    }

    fn advance(&mut self) {
        self.previous.copy_from_slice(&self.current);
    }
}

/// All configured metrics, in display order
#[derive(Debug, Clone)]
pub struct MetricStore {
    metrics: Vec<Metric>,
}

impl MetricStore {
    /// # Errors
    /// No metrics, more than [`MAX_METRICS`], or an empty label
    pub fn new(metrics: Vec<Metric>) -> Result<Self, ConfigError> {
        if metrics.is_empty() {
            return Err(ConfigError::NoMetrics);
        }
        if metrics.len() > MAX_METRICS {
            return Err(ConfigError::TooManyMetrics { max: MAX_METRICS });
        }
        for metric in &metrics {
            metric.kind.validate()?;
            info!("Metric '{}' ({})", metric.label, metric.kind.type_name());
        }
        Ok(Self { metrics })
    }

    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Run every metric's gatherer
    ///
    /// A table that cannot be opened leaves that metric's snapshot as it was
    /// for this cycle.
    ///
    /// # Errors
    /// The first lookup or parse failure
    pub fn gather_all(&mut self, topology: &Topology, procfs: &ProcFs) -> Result<(), GatherError> {
        for metric in &mut self.metrics {
            match gather::gather(metric, topology, procfs) {
                Ok(()) => {}
                Err(e) if e.is_transient() => debug!("Skipping '{}' this cycle: {e}", metric.label),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Swap snapshots: `previous` becomes this cycle's `current`
    pub fn advance(&mut self) {
        for metric in &mut self.metrics {
            metric.advance();
        }
    }

    /// Take a baseline snapshot so the first rendered row shows a real delta
    ///
    /// # Errors
    /// As [`MetricStore::gather_all`]
    pub fn prime(&mut self, topology: &Topology, procfs: &ProcFs) -> Result<(), GatherError> {
        self.gather_all(topology, procfs)?;
        self.advance();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(kind: MetricKind) -> String {
        Metric::new(kind).label().to_string()
    }

    #[test]
    fn test_default_labels() {
        let dropped = MetricKind::Softnet(SoftnetColumn::Dropped);
        assert_eq!(label(MetricKind::CpuTime(CpuField::All)), "cpu all");
        assert_eq!(label(dropped), "softnet dropped");
        assert_eq!(label(MetricKind::SoftIrq("NET_RX".into())), "NET_RX");
    }

    #[test]
    fn test_buffers_sized_to_max_cpus() {
        let metric = Metric::new(MetricKind::Interrupt("NMI".into()));
        assert_eq!(metric.current().len(), MAX_CPUS);
        assert_eq!(metric.previous().len(), MAX_CPUS);
    }

    #[test]
    fn test_delta_and_advance() {
        let mut metric = Metric::new(MetricKind::Interrupt("NMI".into()));
        metric.current[1] = 40;
        metric.previous[1] = 8;
        assert_eq!(metric.delta(CpuId(1)), 32);
        metric.advance();
        assert_eq!(metric.delta(CpuId(1)), 0);
        assert_eq!(metric.previous()[1], 40);
    }

    #[test]
    fn test_delta_negative_after_reset() {
        let mut metric = Metric::new(MetricKind::Interrupt("NMI".into()));
        metric.previous[0] = 100;
        metric.current[0] = 3;
        assert_eq!(metric.delta(CpuId(0)), -97);
    }

    #[test]
    fn test_store_limits() {
        let err = MetricStore::new(vec![]).unwrap_err();
        assert_eq!(err, ConfigError::NoMetrics);

        let timer = Metric::new(MetricKind::SoftIrq("TIMER".into()));
        let many = vec![timer.clone(); MAX_METRICS + 1];
        assert_eq!(
            MetricStore::new(many).unwrap_err(),
            ConfigError::TooManyMetrics { max: MAX_METRICS }
        );

        let exact = vec![timer; MAX_METRICS];
        assert_eq!(MetricStore::new(exact).unwrap().len(), MAX_METRICS);
    }

    #[test]
    fn test_store_rejects_empty_match() {
        let empty = Metric::new(MetricKind::MatchedSum(String::new()));
        let err = MetricStore::new(vec![empty]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyLabel("irq-sum"));
    }
}
