use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems detected before any command is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A library root required by the benchmark is not set.
    #[error("{var} is not set; it is required by the {bench} benchmark")]
    MissingRoot {
        /// Environment variable naming the root
        var: &'static str,
        /// Benchmark that needs it
        bench: &'static str,
    },

    /// A GPU benchmark was requested without a GPU count.
    #[error("the {bench} benchmark requires --gpus")]
    MissingGpus { bench: &'static str },

    #[error("failed to read library roots from {path}: {source}")]
    RootsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid library roots file {path}: {source}")]
    RootsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to launch a single benchmark command.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("command has no program to run")]
    EmptyCommand,

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
