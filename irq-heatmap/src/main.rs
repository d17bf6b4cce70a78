//! # irq-heatmap - Main Entry Point
//!
//! Discovers the CPU topology, then polls the selected kernel counters until
//! the optional duration elapses or the process is interrupted.

use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use irq_heatmap::cli;
use irq_heatmap::domain::{ConfigError, DiscoveryError};
use irq_heatmap::gather::ProcFs;
use irq_heatmap::metrics::{Metric, MetricStore};
use irq_heatmap::preflight::run_preflight_checks;
use irq_heatmap::render::Heatmap;
use irq_heatmap::topology::{discover, SysFs, Topology};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let discovery = err.downcast_ref::<DiscoveryError>();
    let is_config = err.downcast_ref::<ConfigError>().is_some()
        || matches!(discovery, Some(DiscoveryError::Config(_)));
    if is_config {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>().is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

fn run() -> Result<()> {
    let (args, kinds) = cli::parse_ordered();

    let sysfs = SysFs::new(&args.sys_root);
    let procfs = ProcFs::new(&args.proc_root);

    let topology = discover(&sysfs).context("Topology discovery failed")?;
    if args.topology {
        print!("{topology}");
        return Ok(());
    }

    let mut store = MetricStore::new(kinds.into_iter().map(Metric::new).collect())?;
    run_preflight_checks(&procfs, &store)?;

    let interval = Duration::from_secs(args.interval);
    let deadline = args.duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    info!("Sampling {} metrics every {}s", store.len(), args.interval);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match poll(&mut out, &topology, &procfs, &mut store, interval, deadline) {
        Err(e) if is_broken_pipe(&e) => Ok(()),
        result => result,
    }
}

/// gather → render → swap → sleep, until `deadline`
fn poll(
    out: &mut impl Write,
    topology: &Topology,
    procfs: &ProcFs,
    store: &mut MetricStore,
    interval: Duration,
    deadline: Option<Instant>,
) -> Result<()> {
    let mut heatmap = Heatmap::new(topology, store);

    store.prime(topology, procfs)?;
    heatmap.write_header(out)?;

    while !deadline.is_some_and(|end| Instant::now() >= end) {
        thread::sleep(interval);
        let now = Local::now().time();

        store.gather_all(topology, procfs)?;
        heatmap.write_row(out, store, now)?;
        store.advance();
    }

    info!("Duration reached after {} rows", heatmap.rows());
    Ok(())
}
