//! Heatmap renderer
//!
//! Each row is a `HH:MM:SS: ` stamp followed by one coloured hex digit per
//! core per metric. The digit is the magnitude class of the counter delta,
//! so the map still reads without colour.

pub mod header;
pub mod layout;
pub mod palette;

use std::io::{self, Write};

use chrono::NaiveTime;
use crossterm::style::ResetColor;

use crate::metrics::MetricStore;
use crate::topology::Topology;

pub use header::{Header, HeaderLine};
pub use layout::{Cell, Glyph, Layout, GUTTER};
pub use palette::{quantize, RAMP_SIZE};

/// Rows between header reprints
pub const HEADER_REPEAT: u64 = 60;

#[derive(Debug)]
pub struct Heatmap {
    layout: Layout,
    header: Header,
    rows: u64,
}

impl Heatmap {
    #[must_use]
    pub fn new(topology: &Topology, store: &MetricStore) -> Self {
        let layout = Layout::new(topology, store.len());
        let labels: Vec<&str> = store.metrics().iter().map(|m| m.label()).collect();
        let header = Header::new(&layout, &labels);
        Self {
            layout,
            header,
            rows: 0,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Rows written so far
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// # Errors
    /// Write failures on `out`
    pub fn write_header(&self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self.header)
    }

    /// Write one row for the store's current deltas, then the header again
    /// every [`HEADER_REPEAT`] rows
    ///
    /// # Errors
    /// Write failures on `out`
    pub fn write_row(
        &mut self,
        out: &mut impl Write,
        store: &MetricStore,
        at: NaiveTime,
    ) -> io::Result<()> {
        write!(out, "{:>8}: ", at.format("%H:%M:%S"))?;

        let metrics = store.metrics();
        for glyph in self.layout.glyphs() {
            match glyph {
                Glyph::Cell(cell) => {
                    let class = quantize(metrics[cell.metric].delta(cell.cpu));
                    write!(out, "{}{class:x}", palette::background(class))?;
                }
                Glyph::SlotGap => write!(out, "{}|", ResetColor)?,
                Glyph::SocketGap => write!(out, "{} ", ResetColor)?,
                Glyph::MetricGap => write!(out, "{}  ", ResetColor)?,
            }
        }
        writeln!(out)?;

        self.rows += 1;
        if self.rows % HEADER_REPEAT == 0 {
            self.write_header(out)?;
        }
        out.flush()
    }
}
