//! # irq-heatmap - Per-CPU Kernel Activity Heatmap
//!
//! Samples the kernel's per-CPU counters at a fixed interval and prints one
//! colour-coded row per sample, one column per logical CPU, grouped by
//! socket and hardware-thread slot.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Linux kernel                             │
//! │  /sys/devices/system/{cpu,node}     /proc/{stat,interrupts,      │
//! │                                      softirqs,net/softnet_stat}  │
//! └───────────────┬───────────────────────────────┬──────────────────┘
//!                 │ once, at startup              │ every interval
//!                 ▼                               ▼
//! ┌────────────────────────┐        ┌──────────────────────────────┐
//! │   topology (discover)  │        │   gather (one per table)     │
//! │ socket → slot → core   │──cpus─▶│   writes metric.current      │
//! └───────────┬────────────┘        └──────────────┬───────────────┘
//!             │                                    ▼
//!             │                     ┌──────────────────────────────┐
//!             │                     │   metrics (MetricStore)      │
//!             │                     │   current / previous swap    │
//!             │                     └──────────────┬───────────────┘
//!             ▼                                    ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │   render: Layout → Header (5 lines) + one row per cycle          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`topology`]: sysfs discovery of the socket / thread slot / core tree
//!   - `cpuset`: sibling-set encodings (range list, hex mask)
//!   - `sysfs`: topology attribute readers
//! - [`gather`]: parsers for `/proc/stat`, `/proc/interrupts`,
//!   `/proc/softirqs` and `/proc/net/softnet_stat`
//! - [`metrics`]: metric definitions and the double-buffered store
//! - [`render`]: colour ramp, column layout, header block and data rows
//! - [`cli`]: command-line arguments
//! - [`preflight`]: startup checks
//! - [`domain`]: newtypes and error types
//!
//! ## Cycle
//!
//! gather all metrics → render one row → swap buffers → sleep. The row shows
//! `current - previous`, so it always compares two complete snapshots one
//! interval apart.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Receive softirqs and the NIC's queue interrupts side by side
//! irq-heatmap -S NET_RX -M eth0-TxRx
//!
//! # Where is CPU time going, sampled every 2 seconds for a minute
//! irq-heatmap -C all -i 2 -t 60
//! ```

pub mod cli;
pub mod domain;
pub mod gather;
pub mod metrics;
pub mod preflight;
pub mod render;
pub mod topology;
