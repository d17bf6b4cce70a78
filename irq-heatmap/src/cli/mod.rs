//! Command-line interface for irq-heatmap
//!
//! This module contains CLI argument parsing and metric selection

pub mod args;

pub use args::{parse_ordered, try_parse_ordered_from, Args};
