// Sequential dispatch of one benchmark over a list of process counts.
// Each count is built, printed, launched and reported before the next one;
// a failed launch or a closed output stream is reported and does not stop
// the sweep.

pub mod executor;

use std::fmt;
use std::io::Write;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::LibraryRoots;
use crate::error::ConfigError;
use crate::variants::{BenchKind, Benchmark, Command, RunShape};

pub use executor::{DryRunExecutor, Executor, RunOutput, SubprocessExecutor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed { success: bool, code: Option<i32> },
    Failed { error: String },
}

/// What happened for one process count.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub bench: &'static str,
    pub shape: RunShape,
    pub command_line: String,
    pub command: Command,
    pub outcome: Outcome,
}

pub struct Dispatcher<E, W> {
    executor: E,
    out: W,
    // Set after the first failed write; later writes are still attempted.
    out_broken: bool,
}

impl<E: Executor, W: Write> Dispatcher<E, W> {
    /// `out` receives the literal command lines and the relayed output.
    pub fn new(executor: E, out: W) -> Self {
        Dispatcher {
            executor,
            out,
            out_broken: false,
        }
    }

    /// Build the benchmark for `kind` and run it over `procs`.
    ///
    /// Configuration is validated before anything is launched, so a missing
    /// root or GPU count returns an error with the executor untouched.
    pub fn sweep(
        &mut self,
        kind: BenchKind,
        initial_size: u64,
        gpus: Option<u32>,
        roots: &LibraryRoots,
        procs: &[u64],
    ) -> Result<Vec<RunRecord>, ConfigError> {
        let bench = Benchmark::new(kind, initial_size, gpus, roots)?;
        info!(
            bench = kind.name(),
            size = bench.initial_size(),
            runs = procs.len(),
            "starting weak-scaling sweep"
        );
        Ok(self.run(&bench, procs))
    }

    /// Run `bench` once per entry of `procs`, in order.
    ///
    /// Launch failures and failures to write to `out` are logged and the
    /// sweep moves on; every count gets a record.
    pub fn run(&mut self, bench: &Benchmark, procs: &[u64]) -> Vec<RunRecord> {
        procs.iter().map(|&p| self.run_one(bench, p)).collect()
    }

    fn run_one(&mut self, bench: &Benchmark, procs: u64) -> RunRecord {
        let name = bench.kind().name();
        let shape = bench.shape(procs);
        let command = bench.command_for(procs);
        let command_line = command.to_string();

        info!(bench = name, procs, size = shape.size, "dispatching");
        self.emit(format_args!("Executing command: {}", command_line));

        let outcome = match self.executor.execute(&command) {
            Ok(output) => {
                self.emit(format_args!("{}", output.stdout));
                self.emit(format_args!("{}", output.stderr));
                if !output.success {
                    warn!(bench = name, procs, code = ?output.code, "benchmark exited unsuccessfully");
                }
                Outcome::Completed {
                    success: output.success,
                    code: output.code,
                }
            }
            Err(e) => {
                error!(bench = name, procs, "launch failed: {}", e);
                self.emit(format_args!("Failed with error: {}", e));
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        RunRecord {
            bench: name,
            shape,
            command_line,
            command,
            outcome,
        }
    }

    // Write one line to `out`. A closed pipe must not cost the remaining runs,
    // so errors are only logged, once.
    fn emit(&mut self, line: fmt::Arguments<'_>) {
        let result = writeln!(self.out, "{}", line).and_then(|_| self.out.flush());
        if let Err(e) = result {
            if !self.out_broken {
                warn!("failed to write benchmark output: {}", e);
                self.out_broken = true;
            }
        }
    }

    pub fn into_parts(self) -> (E, W) {
        (self.executor, self.out)
    }
}
