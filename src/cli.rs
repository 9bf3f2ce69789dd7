use std::path::PathBuf;

use clap::Parser;

use crate::variants::BenchKind;

/// Launch weak-scaling distributed matrix-multiply benchmarks
#[derive(Parser, Debug)]
#[command(name = "dmm_bench", version, about)]
pub struct BenchArgs {
    /// Benchmark to run
    #[arg(long, value_enum)]
    pub bench: BenchKind,

    /// Process counts to run on, one run each, in order (e.g. 1 2 4 8 or 1,2,4,8)
    #[arg(
        long,
        required = true,
        num_args = 1..,
        value_delimiter = ',',
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub procs: Vec<u64>,

    /// Matrix dimension on a single process; grows with the cube root of the process count
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub size: u64,

    /// GPUs per process, for cannon-gpu and legate-gpu
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub gpus: Option<u32>,

    /// JSON file of library roots (COSMA_DIR, CTF_DIR, ...) overriding the environment
    #[arg(long)]
    pub roots: Option<PathBuf>,

    /// Print the commands without launching them
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run records as JSON to this file
    #[arg(long)]
    pub json_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_procs_list() {
        let args = BenchArgs::try_parse_from([
            "dmm_bench", "--bench", "cannon", "--procs", "1", "2", "4", "--size", "1000",
        ])
        .unwrap();
        assert_eq!(args.bench, BenchKind::Cannon);
        assert_eq!(args.procs, vec![1, 2, 4]);
        assert_eq!(args.size, 1000);
        assert_eq!(args.gpus, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_parse_comma_procs_and_gpu_bench() {
        let args = BenchArgs::try_parse_from([
            "dmm_bench", "--bench", "cannon-gpu", "--procs", "8,16", "--size", "4096", "--gpus",
            "2", "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.bench, BenchKind::CannonGpu);
        assert_eq!(args.procs, vec![8, 16]);
        assert_eq!(args.gpus, Some(2));
        assert!(args.dry_run);
    }

    #[test]
    fn test_rejects_bad_input() {
        // zero processes
        assert!(BenchArgs::try_parse_from([
            "dmm_bench", "--bench", "cannon", "--procs", "0", "--size", "1000",
        ])
        .is_err());
        // unknown benchmark
        assert!(BenchArgs::try_parse_from([
            "dmm_bench", "--bench", "strassen", "--procs", "1", "--size", "1000",
        ])
        .is_err());
        // no process counts
        assert!(BenchArgs::try_parse_from(["dmm_bench", "--bench", "summa", "--size", "1000"])
            .is_err());
    }
}
