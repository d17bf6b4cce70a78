//! CLI argument definitions

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::gather::{CpuField, SoftnetColumn};
use crate::metrics::MetricKind;

#[derive(Parser, Debug)]
#[command(
    name = "irq-heatmap",
    version,
    about = "Per-CPU heatmap of interrupts, softirqs, softnet and CPU time",
    after_help = "\
Each cell is the bit length of the counter's change over one interval
(0 = idle, f = 16384 or more), coloured dark blue through red to white.

EXAMPLES:
    irq-heatmap -C all                        CPU time, all non-idle fields
    irq-heatmap -S NET_RX -S NET_TX           receive and transmit softirqs
    irq-heatmap -M eth0-TxRx -P dropped       eth0 queue interrupts and softnet drops
    irq-heatmap -I NMI -i 5 -t 600            NMIs every 5s for 10 minutes"
)]
pub struct Args {
    /// CPU time from /proc/stat: all, user, nice, sys, idle, wio, irq, softirq
    #[arg(short = 'C', long = "cpu", value_name = "FIELD")]
    pub cpu: Vec<CpuField>,

    /// Interrupt vector from /proc/interrupts (e.g. 75, NMI)
    #[arg(short = 'I', long = "irq", value_name = "LABEL")]
    pub irq: Vec<String>,

    /// Softirq vector from /proc/softirqs (e.g. SCHED, NET_RX)
    #[arg(short = 'S', long = "softirq", value_name = "LABEL")]
    pub softirq: Vec<String>,

    /// Sum every /proc/interrupts vector whose device name starts with this (e.g. p5p1-TxRx)
    #[arg(short = 'M', long = "match", value_name = "STRING")]
    pub matched: Vec<String>,

    /// Softnet column: packets, dropped, squeeze, collision, recv_rps, flow_limit
    #[arg(short = 'P', long = "softnet", value_name = "COLUMN")]
    pub softnet: Vec<SoftnetColumn>,

    /// Seconds between samples
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Stop after N seconds (default: run until interrupted)
    #[arg(short = 't', long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Print the discovered CPU topology and exit
    #[arg(long)]
    pub topology: bool,

    #[arg(long, hide = true, default_value = "/proc")]
    pub proc_root: PathBuf,

    #[arg(long, hide = true, default_value = "/sys")]
    pub sys_root: PathBuf,
}

impl Args {
    /// Selected metrics in command-line order, across all metric flags
    #[must_use]
    pub fn metric_kinds(&self, matches: &ArgMatches) -> Vec<MetricKind> {
        let mut ordered: Vec<(usize, MetricKind)> = Vec::new();
        let mut collect = |id: &str, kinds: Vec<MetricKind>| {
            if let Some(indices) = matches.indices_of(id) {
                ordered.extend(indices.zip(kinds));
            }
        };

        let cpu = self.cpu.iter().copied().map(MetricKind::CpuTime);
        let irq = self.irq.iter().cloned().map(MetricKind::Interrupt);
        let softirq = self.softirq.iter().cloned().map(MetricKind::SoftIrq);
        let matched = self.matched.iter().cloned().map(MetricKind::MatchedSum);
        let softnet = self.softnet.iter().copied().map(MetricKind::Softnet);

        collect("cpu", cpu.collect());
        collect("irq", irq.collect());
        collect("softirq", softirq.collect());
        collect("matched", matched.collect());
        collect("softnet", softnet.collect());

        ordered.sort_by_key(|(index, _)| *index);
        ordered.into_iter().map(|(_, kind)| kind).collect()
    }
}

/// Parse `argv`-style arguments, keeping metric order
///
/// # Errors
/// Usage errors, including unknown field or column names
pub fn try_parse_ordered_from<I, T>(args: I) -> Result<(Args, Vec<MetricKind>), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Args::command().try_get_matches_from(args)?;
    let args = Args::from_arg_matches(&matches)?;
    let kinds = args.metric_kinds(&matches);
    Ok((args, kinds))
}

/// Parse the process arguments, exiting with usage text on error
#[must_use]
pub fn parse_ordered() -> (Args, Vec<MetricKind>) {
    try_parse_ordered_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}
