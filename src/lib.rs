// Weak-scaling launcher for distributed matrix-multiply benchmarks.
//
// For every requested process count a benchmark's matrix size is grown with
// the cube root of the count, its process grid is factored, and a
// launcher-specific command is built and dispatched.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod scaling;
pub mod variants;

pub use config::{LibraryRoot, LibraryRoots};
pub use dispatch::{Dispatcher, DryRunExecutor, Executor, Outcome, RunRecord, SubprocessExecutor};
pub use error::{ConfigError, LaunchError};
pub use variants::{BenchKind, Benchmark, Command};
