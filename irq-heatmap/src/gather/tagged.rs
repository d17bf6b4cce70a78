//! Gatherers for the per-vector interrupt tables
//!
//! `/proc/interrupts` and `/proc/softirqs` share one shape:
//!
//! ```text
//!             CPU0       CPU1       CPU2       CPU3
//!   77:   81913889          0          0          0   PCI-MSI-edge      eth0-TxRx-0
//!  NMI:     137218     111219      82276      75520   Non-maskable interrupts
//! ```
//!
//! Offline CPUs have no column, so when the `CPUn` header is present it maps
//! columns to CPU ids; without it columns are taken in CPU order.

use std::path::Path;

use super::fields::{after_label, parse_fields};
use crate::domain::GatherError;

/// CPU id for each counter column of `table`
fn column_cpus(table: &str, cpu_count: usize) -> Vec<usize> {
    let header = table.lines().next().and_then(|line| {
        line.split_whitespace()
            .map(|token| token.strip_prefix("CPU")?.parse::<usize>().ok())
            .collect::<Option<Vec<usize>>>()
    });

    match header {
        Some(cpus) if !cpus.is_empty() => cpus,
        _ => (0..cpu_count).collect(),
    }
}

/// Apply `op` to `out[cpu]` for every counter on the line. Short lines
/// (`ERR:`, `MIS:`) simply cover fewer CPUs.
fn scatter(counters: &str, columns: &[usize], out: &mut [u64], op: impl Fn(&mut u64, u64)) {
    for (&cpu, value) in columns.iter().zip(parse_fields(counters, 10)) {
        if let Some(slot) = out.get_mut(cpu) {
            op(slot, value);
        }
    }
}

/// Fill `out` from the first line whose label starts with `label`
///
/// # Errors
/// [`GatherError::LabelNotFound`] when no line carries the label
pub fn parse_tagged(
    table: &str,
    label: &str,
    source: &Path,
    out: &mut [u64],
) -> Result<(), GatherError> {
    let columns = column_cpus(table, out.len());

    let counters = table
        .lines()
        .filter(|line| line.trim_start().starts_with(label))
        .find_map(after_label)
        .ok_or_else(|| GatherError::LabelNotFound {
            label: label.to_string(),
            path: source.to_path_buf(),
        })?;

    out.fill(0);
    scatter(counters, &columns, out, |slot, value| *slot = value);
    Ok(())
}

/// Sum into `out` every line whose trailing field starts with `pattern`
///
/// Lets several hardware queues of one device (`eth0-TxRx-0`, `eth0-TxRx-1`, ...)
/// show up as a single series.
///
/// # Errors
/// [`GatherError::LabelNotFound`] when no line matches
pub fn parse_matched_sum(
    table: &str,
    pattern: &str,
    source: &Path,
    out: &mut [u64],
) -> Result<(), GatherError> {
    let columns = column_cpus(table, out.len());
    out.fill(0);

    let mut matched = 0;
    for line in table.lines() {
        let Some(counters) = after_label(line) else {
            continue;
        };
        if !line.split_whitespace().last().is_some_and(|last| last.starts_with(pattern)) {
            continue;
        }
        matched += 1;
        scatter(counters, &columns, out, |slot, value| *slot += value);
    }

    if matched == 0 {
        return Err(GatherError::LabelNotFound {
            label: pattern.to_string(),
            path: source.to_path_buf(),
        });
    }
    Ok(())
}
