//! Softnet column gatherer for `/proc/net/softnet_stat`
//!
//! One line per online CPU, every field in hex:
//!
//! ```text
//! 0000a2f1 00000000 00000003 00000000 00000000 00000000 00000000 00000000 00000000 00000000 00000000 00000000 00000000
//! ```
//!
//! processed, dropped, time_squeeze, five unused fields, cpu_collision,
//! received_rps, flow_limit_count, backlog length and, on newer kernels,
//! the CPU index.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::fields::{nth_field, parse_fields};
use crate::domain::{ConfigError, GatherError};

const CPU_INDEX_POSITION: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftnetColumn {
    Packets,
    Dropped,
    Squeeze,
    Collision,
    RecvRps,
    FlowLimit,
}

impl SoftnetColumn {
    pub const ALL: [SoftnetColumn; 6] = [
        SoftnetColumn::Packets,
        SoftnetColumn::Dropped,
        SoftnetColumn::Squeeze,
        SoftnetColumn::Collision,
        SoftnetColumn::RecvRps,
        SoftnetColumn::FlowLimit,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SoftnetColumn::Packets => "packets",
            SoftnetColumn::Dropped => "dropped",
            SoftnetColumn::Squeeze => "squeeze",
            SoftnetColumn::Collision => "collision",
            SoftnetColumn::RecvRps => "recv_rps",
            SoftnetColumn::FlowLimit => "flow_limit",
        }
    }

    /// Field position on a softnet_stat line
    #[must_use]
    pub fn position(self) -> usize {
        match self {
            SoftnetColumn::Packets => 0,
            SoftnetColumn::Dropped => 1,
            SoftnetColumn::Squeeze => 2,
            SoftnetColumn::Collision => 8,
            SoftnetColumn::RecvRps => 9,
            SoftnetColumn::FlowLimit => 10,
        }
    }
}

impl FromStr for SoftnetColumn {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|column| column.name() == name).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
            ConfigError::UnknownSoftnetColumn(name.to_string(), known.join(", "))
        })
    }
}

impl fmt::Display for SoftnetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fill `out[cpu]` with `column` from every line of `table`
///
/// The CPU is the trailing index field when the kernel prints one, the line
/// number otherwise.
///
/// # Errors
/// A line too short to hold `column`
pub fn parse(
    table: &str,
    column: SoftnetColumn,
    source: &Path,
    out: &mut [u64],
) -> Result<(), GatherError> {
    out.fill(0);

    for (line_no, line) in table.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(value) = nth_field(line, column.position(), 16) else {
            return Err(GatherError::Malformed {
                path: source.to_path_buf(),
                line: line.to_string(),
            });
        };
        let cpu = parse_fields(line, 16)
            .nth(CPU_INDEX_POSITION)
            .and_then(|index| usize::try_from(index).ok())
            .unwrap_or(line_no);

        if let Some(slot) = out.get_mut(cpu) {
            *slot = value;
        }
    }

    Ok(())
}
