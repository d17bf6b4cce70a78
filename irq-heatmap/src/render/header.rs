//! The five line header block

use std::fmt;

use super::layout::{Layout, GUTTER};

/// Rows of the header, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine {
    Metric,
    Socket,
    Thread,
    CpuTens,
    CpuUnits,
}

impl HeaderLine {
    pub const ALL: [HeaderLine; 5] = [
        HeaderLine::Metric,
        HeaderLine::Socket,
        HeaderLine::Thread,
        HeaderLine::CpuTens,
        HeaderLine::CpuUnits,
    ];

    fn caption(self) -> &'static str {
        match self {
            HeaderLine::Metric => "Metric",
            HeaderLine::Socket => "Socket",
            HeaderLine::Thread => "Thread",
            HeaderLine::CpuTens => "Cpu",
            HeaderLine::CpuUnits => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    lines: [String; 5],
}

/// Write `text` at `column`, or straight after whatever is already there
fn put(line: &mut String, column: usize, text: &str) {
    let len = line.chars().count();
    if len < column {
        line.extend(std::iter::repeat(' ').take(column - len));
    }
    line.push_str(text);
}

/// As [`put`], but a label that would touch the one before it starts one
/// column further right
fn put_label(line: &mut String, column: usize, label: &str) {
    if column > GUTTER && line.chars().count() >= column {
        line.push(' ');
    }
    put(line, column, label);
}

impl Header {
    /// `labels[m]` names metric `m`
    #[must_use]
    pub fn new(layout: &Layout, labels: &[&str]) -> Self {
        let mut lines =
            HeaderLine::ALL.map(|line| format!("{:<width$}", line.caption(), width = GUTTER));

        for cell in layout.cells() {
            let column = cell.column;
            if cell.first_in_metric {
                let label = labels.get(cell.metric).copied().unwrap_or_default();
                put_label(&mut lines[HeaderLine::Metric as usize], column, label);
            }
            if cell.first_in_socket {
                let socket = (cell.socket % 10).to_string();
                put(&mut lines[HeaderLine::Socket as usize], column, &socket);
            }
            if cell.first_in_slot {
                let slot = (cell.slot % 10).to_string();
                put(&mut lines[HeaderLine::Thread as usize], column, &slot);
            }
            let tens = (cell.cpu.0 / 10 % 10).to_string();
            let units = (cell.cpu.0 % 10).to_string();
            put(&mut lines[HeaderLine::CpuTens as usize], column, &tens);
            put(&mut lines[HeaderLine::CpuUnits as usize], column, &units);
        }

        Self { lines }
    }

    #[must_use]
    pub fn line(&self, which: HeaderLine) -> &str {
        &self.lines[which as usize]
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoreId, CpuId};
    use crate::topology::TopologyBuilder;

    fn header(labels: &[&str]) -> Header {
        // cpus 0,12 on slot 0 and 1,13 on slot 1 of socket 0; cpu 2 on socket 1
        let mut builder = TopologyBuilder::new(2, 14, 10).unwrap();
        let placements = [(0, 0, 0), (12, 0, 0), (1, 0, 1), (13, 0, 1), (2, 1, 0)];
        for (cpu, socket, slot) in placements {
            builder.add_cpu(CpuId(cpu), socket, CoreId(0), slot).unwrap();
        }
        for cpu in 3..12 {
            builder.add_cpu(CpuId(cpu), 1, CoreId(0), 0).unwrap();
        }
        let topology = builder.build().unwrap();
        let layout = Layout::new(&topology, labels.len());
        Header::new(&layout, labels)
    }

    #[test]
    fn test_captions_fill_gutter() {
        let h = header(&["NMI"]);
        assert!(h.line(HeaderLine::Metric).starts_with("Metric    NMI"));
        assert!(h.line(HeaderLine::Socket).starts_with("Socket    0"));
        assert!(h.line(HeaderLine::Thread).starts_with("Thread    0"));
        assert!(h.line(HeaderLine::CpuTens).starts_with("Cpu       0"));
        assert!(h.line(HeaderLine::CpuUnits).starts_with("          0"));
    }

    #[test]
    fn test_cpu_digits() {
        let h = header(&["x"]);
        // socket 0: 0 12 | 1 13, socket 1: 2..11
        assert_eq!(&h.line(HeaderLine::CpuTens)[10..15], "01 01");
        assert_eq!(&h.line(HeaderLine::CpuUnits)[10..15], "02 13");
        assert_eq!(&h.line(HeaderLine::CpuTens)[16..26], "0000000011");
        assert_eq!(&h.line(HeaderLine::CpuUnits)[16..26], "2345678901");
    }

    #[test]
    fn test_group_indices() {
        let h = header(&["x"]);
        assert_eq!(h.line(HeaderLine::Socket), "Socket    0     1");
        assert_eq!(h.line(HeaderLine::Thread), "Thread    0  1  0");
    }

    #[test]
    fn test_second_metric_label_position() {
        let h = header(&["a", "b"]);
        // first metric spans 10..26, then a two character gap
        let expected = format!("Metric    a{}b", " ".repeat(17));
        assert_eq!(h.line(HeaderLine::Metric), expected);
    }

    #[test]
    fn test_long_label_pushes_right() {
        let h = header(&["a-very-long-label", "b"]);
        assert_eq!(h.line(HeaderLine::Metric), "Metric    a-very-long-label b");
    }

    #[test]
    fn test_label_filling_its_block_keeps_a_space() {
        // the first block spans columns 10..28, so an 18 character label ends
        // exactly where the second label starts
        let h = header(&["a-label-of-18-char", "b"]);
        assert_eq!(h.line(HeaderLine::Metric), "Metric    a-label-of-18-char b");
        assert_eq!(h.line(HeaderLine::CpuUnits).rfind("02 13"), Some(28));
    }

    #[test]
    fn test_display_is_five_lines() {
        assert_eq!(header(&["x"]).to_string().lines().count(), 5);
    }
}
