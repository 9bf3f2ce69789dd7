// Benchmark launcher: runs one benchmark across a list of process counts.
//
// Usage:
//   dmm_bench --bench <kind> --procs <P>... --size <N> [--gpus <G>]
//             [--roots roots.json] [--dry-run] [--json-file out.json] [-v]

use std::fs;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dmm_weak_scaling::cli::BenchArgs;
use dmm_weak_scaling::{Dispatcher, DryRunExecutor, LibraryRoots, SubprocessExecutor};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dmm_weak_scaling={0},dmm_bench={0}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = BenchArgs::parse();
    init_logging(args.verbose);

    // The environment is read here, once; everything below gets it explicitly.
    let mut roots = LibraryRoots::from_lookup(|name| std::env::var_os(name));
    if let Some(path) = &args.roots {
        debug!("loading library roots from {}", path.display());
        roots = roots.merge(LibraryRoots::from_json_file(path)?);
    }

    let stdout = io::stdout().lock();
    let records = if args.dry_run {
        info!("dry run: commands are printed, not launched");
        Dispatcher::new(DryRunExecutor, stdout).sweep(
            args.bench,
            args.size,
            args.gpus,
            &roots,
            &args.procs,
        )?
    } else {
        Dispatcher::new(SubprocessExecutor, stdout).sweep(
            args.bench,
            args.size,
            args.gpus,
            &roots,
            &args.procs,
        )?
    };

    if let Some(path) = &args.json_file {
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("run records written to {}", path.display());
    }

    Ok(())
}
