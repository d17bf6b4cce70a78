//! Pre-flight checks for irq-heatmap
//!
//! Validates that the kernel tables the selected metrics read from are
//! present before the polling loop starts.

use anyhow::{bail, Context, Result};
use log::warn;
use std::fs;

use crate::gather::ProcFs;
use crate::metrics::MetricStore;

/// Run all pre-flight checks before polling
///
/// # Errors
/// Unsupported platform or no readable `/proc/stat`
pub fn run_preflight_checks(procfs: &ProcFs, store: &MetricStore) -> Result<()> {
    check_platform()?;
    check_proc_stat(procfs)?;
    check_sources(procfs, store);
    Ok(())
}

/// The counter tables only exist on Linux
fn check_platform() -> Result<()> {
    if cfg!(target_os = "linux") {
        return Ok(());
    }
    bail!(
        "Unsupported platform: irq-heatmap reads Linux /proc and /sys tables.\n\n\
         Run it on the Linux host you want to observe."
    );
}

/// `/proc/stat` is always present when procfs is mounted
fn check_proc_stat(procfs: &ProcFs) -> Result<()> {
    let path = procfs.stat();
    fs::read_to_string(&path).with_context(|| {
        format!(
            "Cannot read {}\n\n\
             This usually means /proc is not mounted in this environment",
            path.display()
        )
    })?;
    Ok(())
}

/// Tables that are missing now are re-read every cycle and may appear later,
/// so only warn
fn check_sources(procfs: &ProcFs, store: &MetricStore) {
    for metric in store.metrics() {
        let path = procfs.source_for(metric.kind());
        if let Err(e) = fs::File::open(&path) {
            warn!(
                "'{}' reads {}, which is not readable yet: {e}",
                metric.label(),
                path.display()
            );
        }
    }
}
