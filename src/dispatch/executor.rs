// Execution side of the dispatcher: something that takes a built command,
// runs it to completion and hands back what it printed.

use std::process;

use tracing::debug;

use crate::error::LaunchError;
use crate::variants::Command;

/// Captured result of one launched command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// Exit code, `None` when killed by a signal or never run.
    pub code: Option<i32>,
}

pub trait Executor {
    /// Run `cmd` and block until it exits.
    fn execute(&mut self, cmd: &Command) -> Result<RunOutput, LaunchError>;
}

/// Spawns the command as a child process with its environment overlaid on
/// the inherited one.
#[derive(Debug, Default)]
pub struct SubprocessExecutor;

impl Executor for SubprocessExecutor {
    fn execute(&mut self, cmd: &Command) -> Result<RunOutput, LaunchError> {
        let program = cmd.program().ok_or(LaunchError::EmptyCommand)?;
        debug!(program, args = cmd.args().len(), "spawning");

        let output = process::Command::new(program)
            .args(cmd.args())
            .envs(cmd.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Launches nothing; every command "succeeds" with empty output.
#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl Executor for DryRunExecutor {
    fn execute(&mut self, cmd: &Command) -> Result<RunOutput, LaunchError> {
        cmd.program().ok_or(LaunchError::EmptyCommand)?;
        Ok(RunOutput {
            success: true,
            code: Some(0),
            ..RunOutput::default()
        })
    }
}
