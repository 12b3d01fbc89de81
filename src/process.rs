//! External process execution
//!
//! Runs one command to completion, optionally redirecting its standard output
//! into a file. Standard error is always inherited so the operator sees the
//! tool's own diagnostics.

use crate::error::{ProcessError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A fully described command invocation
#[derive(Clone, Debug)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    output: Option<PathBuf>,
    current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Start describing an invocation of `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output: None,
            current_dir: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Redirect standard output into `path` (created or truncated)
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Run the process inside `dir`
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// The program being invoked
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The argument list
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

/// Runs external commands and reports success or failure
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new runner
    pub fn new() -> Self {
        Self
    }

    /// Run `program` with `args`, capturing standard output into `output` when given
    ///
    /// Without an output file the child's standard output is inherited.
    ///
    /// # Errors
    ///
    /// - [`ProcessError::OutputFile`] if the output file cannot be created
    /// - [`ProcessError::Spawn`] if the process fails to start
    /// - [`ProcessError::ExitStatus`] if it exits non-zero
    pub async fn run<I, S>(&self, program: &Path, args: I, output: Option<&Path>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut invocation = Invocation::new(program).args(args);
        if let Some(path) = output {
            invocation = invocation.stdout_to(path);
        }
        self.execute(&invocation).await
    }

    /// Run a fully described [`Invocation`]
    pub async fn execute(&self, invocation: &Invocation) -> Result<()> {
        let program = invocation.program.display().to_string();
        debug!(
            program = %program,
            args = ?invocation.args,
            output = ?invocation.output,
            "running external command"
        );

        let stdout = match &invocation.output {
            Some(path) => {
                let file =
                    std::fs::File::create(path).map_err(|source| ProcessError::OutputFile {
                        path: path.clone(),
                        source,
                    })?;
                Stdio::from(file)
            }
            None => Stdio::inherit(),
        };

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::ExitStatus { program, status }.into());
        }
        Ok(())
    }
}
