//! External command execution with timeout, cancellation and message streaming.

use crate::sdk::{ManagedSdkError, MessageListener};
use crate::CancelToken;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

/// A program invocation, independent of any shell.
#[derive(Debug, Clone)]
pub(crate) struct StructuredCommand {
    pub(crate) program: PathBuf,
    pub(crate) args: Vec<OsString>,
    pub(crate) env_vars: Vec<(String, String)>,
}

impl StructuredCommand {
    pub(crate) fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env_vars: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn env(mut self, key: &str, value: &str) -> Self {
        self.env_vars.push((key.to_string(), value.to_string()));
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Run a command to completion and return its standard output.
///
/// Standard error is forwarded line by line to `listener` while the process
/// runs. The child is killed if `cancel` fires or `limit` elapses.
pub(crate) async fn run(
    cmd: &StructuredCommand,
    limit: Duration,
    listener: &dyn MessageListener,
    cancel: &CancelToken,
) -> Result<String, ManagedSdkError> {
    if cancel.is_cancelled() {
        return Err(ManagedSdkError::Cancelled);
    }

    let program = cmd.program_name();
    tracing::debug!(program = %program, args = ?cmd.args, "running command");

    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .envs(cmd.env_vars.iter().cloned())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group so helpers spawned by install scripts die with the child.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .map_err(|e| ManagedSdkError::CommandExecution {
            program: program.clone(),
            message: e.to_string(),
            fix: if e.kind() == std::io::ErrorKind::PermissionDenied {
                format!("Make {} executable or reinstall the Cloud SDK", program)
            } else {
                format!("Check that {} exists and can be executed", program)
            },
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let finished = {
        let collect = async {
            let out = async {
                let mut buf = Vec::new();
                if let Some(mut stdout) = stdout {
                    stdout.read_to_end(&mut buf).await?;
                }
                Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
            };
            let err = async {
                let mut captured = String::new();
                if let Some(stderr) = stderr {
                    let mut segments = BufReader::new(stderr).split(b'\n');
                    while let Some(segment) = segments.next_segment().await? {
                        let line = String::from_utf8_lossy(&segment);
                        let line = line.trim_end_matches('\r');
                        listener.message(line);
                        captured.push_str(line);
                        captured.push('\n');
                    }
                }
                Ok::<_, std::io::Error>(captured)
            };
            let (out, err) = tokio::try_join!(out, err)?;
            let status = child.wait().await?;
            Ok::<(ExitStatus, String, String), std::io::Error>((status, out, err))
        };

        tokio::select! {
            _ = cancel.cancelled() => None,
            result = timeout(limit, collect) => Some(result),
        }
    };

    let (status, stdout, stderr) = match finished {
        Some(Ok(Ok(output))) => output,
        Some(Ok(Err(e))) => {
            terminate(&program, &mut child).await;
            return Err(ManagedSdkError::CommandExecution {
                program,
                message: e.to_string(),
                fix: "Check the command output and try again".to_string(),
            });
        }
        Some(Err(_)) => {
            terminate(&program, &mut child).await;
            return Err(ManagedSdkError::Timeout {
                program,
                duration: limit,
                fix: "Check network connectivity or raise the command timeout".to_string(),
            });
        }
        None => {
            terminate(&program, &mut child).await;
            return Err(ManagedSdkError::Cancelled);
        }
    };

    if !status.success() {
        tracing::debug!(program = %program, code = ?status.code(), "command failed");
        return Err(ManagedSdkError::CommandExit {
            program,
            exit_code: status.code(),
            stderr,
            fix: "See the command's error output for details".to_string(),
        });
    }

    Ok(stdout)
}

/// Kill the child and everything it spawned, then reap it.
///
/// Returns only once the child has exited, so no process started by the
/// command keeps writing after the caller moves on.
async fn terminate(program: &str, child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // The child leads its own process group (see `run`).
            // SAFETY: killpg has no memory-safety preconditions.
            if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } != 0 {
                tracing::debug!(program, error = %std::io::Error::last_os_error(), "failed to kill process group");
            }
        }
    }
    if let Err(e) = child.start_kill() {
        tracing::debug!(program, error = %e, "child already exited");
    }
    if let Err(e) = child.wait().await {
        tracing::warn!(program, error = %e, "failed to reap terminated command");
    }
}
