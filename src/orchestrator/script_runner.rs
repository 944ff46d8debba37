use crate::error::{CollaboratorError, CollaboratorResult};
use indicatif::{ProgressBar as IndicatifProgressBar, ProgressStyle};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Per-invocation options for [`ScriptRunner::run_command`]
#[derive(Debug, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Working directory of the child
    pub cwd: Option<&'a Path>,
    /// Text piped to the child's stdin
    pub stdin: Option<&'a str>,
    /// Hard wall-clock bound; the child is killed when it elapses
    pub timeout: Duration,
    /// Echo child output line by line to our stdout/stderr
    pub echo: bool,
}

impl<'a> RunOptions<'a> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            cwd: None,
            stdin: None,
            timeout,
            echo: false,
        }
    }

    pub fn cwd(mut self, cwd: &'a Path) -> Self {
        self.cwd = Some(cwd);
        self
    }

    pub fn stdin(mut self, input: &'a str) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

/// Runner for external CLI tools (claude, git, jira, gh)
///
/// Every call carries a timeout. Children are spawned with `kill_on_drop`, so
/// dropping the returned future (cancellation) also kills the child.
#[derive(Debug, Default, Clone)]
pub struct ScriptRunner {
    show_progress: bool,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a spinner while commands run (interactive use only)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run `program` with `args`, returning its stdout
    ///
    /// Fails with [`CollaboratorError::TimedOut`] once `options.timeout`
    /// elapses; by then the child has been killed and reaped.
    pub async fn run_command(
        &self,
        program: &str,
        args: &[String],
        options: RunOptions<'_>,
    ) -> CollaboratorResult<String> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if options.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = options.cwd {
            cmd.current_dir(cwd);
        }
        // Own process group so a timeout can take down anything the child forked
        #[cfg(unix)]
        cmd.process_group(0);

        let progress = self.show_progress.then(|| {
            let pb = IndicatifProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
            }
            pb.set_message(format!("Running {}...", program));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CollaboratorError::CommandUnavailable {
                program: program.to_string(),
            },
            _ => CollaboratorError::Io(e),
        })?;
        let pid = child.id();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CollaboratorError::Parse("failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CollaboratorError::Parse("failed to capture stderr".to_string()))?;
        let stdin = child.stdin.take();
        let echo = options.echo && progress.is_none();

        let outcome = tokio::time::timeout(options.timeout, async {
            if let (Some(mut pipe), Some(input)) = (stdin, options.stdin) {
                pipe.write_all(input.as_bytes()).await?;
                pipe.flush().await?;
                drop(pipe);
            }
            let (out, err) = read_streams(stdout, stderr, echo, progress.as_ref()).await?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        })
        .await;

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        let (status, output, stderr_output) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                #[cfg(unix)]
                {
                    if let Some(pid) = pid {
                        kill_group(pid, program);
                    }
                }
                // kill() sends SIGKILL and reaps the child
                if let Err(e) = child.kill().await {
                    tracing::warn!(program, error = %e, "failed to kill timed out process");
                }
                return Err(CollaboratorError::TimedOut {
                    program: program.to_string(),
                    after: options.timeout,
                    pid,
                });
            }
        };

        if !status.success() {
            let detail = if !stderr_output.trim().is_empty() {
                stderr_output.trim().to_string()
            } else if !output.trim().is_empty() {
                output.trim().to_string()
            } else {
                format!("exit code {:?}", status.code())
            };
            return Err(CollaboratorError::CommandFailed {
                program: program.to_string(),
                detail,
            });
        }

        Ok(output)
    }
}

/// Drain stdout and stderr concurrently to avoid backpressure deadlock
async fn read_streams<O, E>(
    stdout: O,
    stderr: E,
    echo: bool,
    progress: Option<&IndicatifProgressBar>,
) -> std::io::Result<(String, String)>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    let mut output = String::new();
    let mut stderr_output = String::new();
    let mut stdout_done = false;
    let mut stderr_done = false;

    while !stdout_done || !stderr_done {
        tokio::select! {
            line = stdout_reader.next_line(), if !stdout_done => {
                match line? {
                    Some(line) => {
                        if let Some(pb) = progress {
                            let short_line = if line.chars().count() > 60 {
                                let truncated: String = line.chars().take(60).collect();
                                format!("{}...", truncated)
                            } else {
                                line.clone()
                            };
                            pb.set_message(short_line);
                        } else if echo {
                            println!("{}", line);
                        }
                        output.push_str(&line);
                        output.push('\n');
                    }
                    None => stdout_done = true,
                }
            }
            line = stderr_reader.next_line(), if !stderr_done => {
                match line? {
                    Some(line) => {
                        if echo {
                            eprintln!("{}", line);
                        }
                        stderr_output.push_str(&line);
                        stderr_output.push('\n');
                    }
                    None => stderr_done = true,
                }
            }
        }
    }

    Ok((output, stderr_output))
}

/// SIGKILL the process group led by `pid`
#[cfg(unix)]
fn kill_group(pid: u32, program: &str) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => tracing::warn!(program, pgid = raw, error = %e, "failed to kill process group"),
    }
}

/// Whether a process with `pid` is alive (null-signal check)
#[cfg(unix)]
pub fn process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    // EPERM means the process exists but belongs to someone else
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(windows)]
pub fn process_alive(pid: u32) -> bool {
    std::process::Command::new("tasklist")
        .arg("/FI")
        .arg(format!("PID eq {}", pid))
        .output()
        .map(|output| {
            let stdout = String::from_utf8_lossy(&output.stdout);
            stdout.contains(&pid.to_string())
        })
        .unwrap_or(false)
}
