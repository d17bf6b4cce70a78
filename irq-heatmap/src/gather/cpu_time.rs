//! CPU time gatherer for `/proc/stat`
//!
//! ```text
//! cpu  10132153 290696 3084719 46828483 16683 0 25195 0 0 0
//! cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0
//! cpu1 1335331 31339 603426 13325234 2917 0 1498 0 0 0
//! intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]
//! ```
//!
//! Values are in `USER_HZ` ticks. Only the classic seven fields are read.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::fields::parse_fields;
use crate::domain::{ConfigError, GatherError};

/// Fields read from each per-CPU line: user nice system idle iowait irq softirq
const FIELD_COUNT: usize = 7;
const IDLE_POSITION: usize = 3;

/// A `/proc/stat` column, or the sum of every non-idle column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuField {
    All,
    User,
    Nice,
    Sys,
    Idle,
    Wio,
    Irq,
    SoftIrq,
}

const NAMES: &[(&str, CpuField)] = &[
    ("all", CpuField::All),
    ("user", CpuField::User),
    ("nice", CpuField::Nice),
    ("sys", CpuField::Sys),
    ("system", CpuField::Sys),
    ("idle", CpuField::Idle),
    ("wio", CpuField::Wio),
    ("iowait", CpuField::Wio),
    ("irq", CpuField::Irq),
    ("softirq", CpuField::SoftIrq),
];

impl CpuField {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CpuField::All => "all",
            CpuField::User => "user",
            CpuField::Nice => "nice",
            CpuField::Sys => "sys",
            CpuField::Idle => "idle",
            CpuField::Wio => "wio",
            CpuField::Irq => "irq",
            CpuField::SoftIrq => "softirq",
        }
    }

    /// Column among the seven per-CPU fields; `None` for [`CpuField::All`]
    #[must_use]
    pub fn position(self) -> Option<usize> {
        match self {
            CpuField::All => None,
            CpuField::User => Some(0),
            CpuField::Nice => Some(1),
            CpuField::Sys => Some(2),
            CpuField::Idle => Some(IDLE_POSITION),
            CpuField::Wio => Some(4),
            CpuField::Irq => Some(5),
            CpuField::SoftIrq => Some(6),
        }
    }

    fn select(self, fields: &[u64]) -> u64 {
        match self.position() {
            Some(position) => fields[position],
            None => fields
                .iter()
                .enumerate()
                .filter(|&(position, _)| position != IDLE_POSITION)
                .map(|(_, value)| value)
                .sum(),
        }
    }
}

impl FromStr for CpuField {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|&(_, field)| field)
            .ok_or_else(|| {
                ConfigError::UnknownCpuField(
                    name.to_string(),
                    "all, user, nice, sys, idle, wio, irq, softirq".to_string(),
                )
            })
    }
}

impl fmt::Display for CpuField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fill `out[cpu]` with `field` for every `cpuN` line of `table`
///
/// The CPU is taken from the line's own `cpuN` token. The aggregate `cpu`
/// line is skipped and parsing stops at the first non-CPU line.
///
/// # Errors
/// A CPU line with fewer than seven numeric fields
pub fn parse(
    table: &str,
    field: CpuField,
    source: &Path,
    out: &mut [u64],
) -> Result<(), GatherError> {
    out.fill(0);

    for line in table.lines().skip(1) {
        let Some((token, rest)) = line.split_once(char::is_whitespace) else {
            break;
        };
        let Some(Ok(cpu)) = token.strip_prefix("cpu").map(str::parse::<usize>) else {
            break;
        };

        let fields: Vec<u64> = parse_fields(rest, 10).take(FIELD_COUNT).collect();
        if fields.len() < FIELD_COUNT {
            return Err(GatherError::Malformed {
                path: source.to_path_buf(),
                line: line.to_string(),
            });
        }

        if let Some(slot) = out.get_mut(cpu) {
            *slot = field.select(&fields);
        }
    }

    Ok(())
}
