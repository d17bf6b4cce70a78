//! Column layout shared by the header and every data row
//!
//! The walk is metric → socket → thread slot → core. One glyph per core,
//! a one-character gap between slots and between sockets, and a
//! two-character gap after each metric. Header and rows both iterate the
//! same [`Layout`], so column N always addresses the same CPU.

use crate::domain::CpuId;
use crate::topology::Topology;

/// Width of the row prefix (`Metric    ` or `HH:MM:SS: `)
pub const GUTTER: usize = 10;

/// One core's column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub metric: usize,
    pub socket: usize,
    pub slot: usize,
    pub cpu: CpuId,
    /// Visible column, counted from the start of the line
    pub column: usize,
    pub first_in_metric: bool,
    pub first_in_socket: bool,
    pub first_in_slot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Cell(Cell),
    SlotGap,
    SocketGap,
    MetricGap,
}

impl Glyph {
    /// Visible characters the glyph occupies
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Glyph::Cell(_) | Glyph::SlotGap | Glyph::SocketGap => 1,
            Glyph::MetricGap => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    glyphs: Vec<Glyph>,
    width: usize,
}

impl Layout {
    #[must_use]
    pub fn new(topology: &Topology, metric_count: usize) -> Self {
        let mut glyphs = Vec::new();
        let mut column = GUTTER;

        let mut push = |glyph: Glyph, column: &mut usize| {
            *column += glyph.width();
            glyphs.push(glyph);
        };

        for metric in 0..metric_count {
            for (socket_pos, (socket, sock)) in topology.sockets().enumerate() {
                if socket_pos > 0 {
                    push(Glyph::SocketGap, &mut column);
                }
                for (slot_pos, (slot, thread)) in sock.slots().enumerate() {
                    if slot_pos > 0 {
                        push(Glyph::SlotGap, &mut column);
                    }
                    for (core_pos, core) in thread.cores().iter().enumerate() {
                        let cell = Cell {
                            metric,
                            socket,
                            slot,
                            cpu: core.cpu,
                            column,
                            first_in_metric: socket_pos == 0 && slot_pos == 0 && core_pos == 0,
                            first_in_socket: slot_pos == 0 && core_pos == 0,
                            first_in_slot: core_pos == 0,
                        };
                        push(Glyph::Cell(cell), &mut column);
                    }
                }
            }
            push(Glyph::MetricGap, &mut column);
        }

        Self {
            glyphs,
            width: column,
        }
    }

    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.glyphs.iter().filter_map(|glyph| match glyph {
            Glyph::Cell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Visible width of a full row, gutter included
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}
