//! Process supervision for render jobs.
//!
//! Spawns the rendering tool, drains stdout and stderr on dedicated tasks
//! while the child runs (so it never stalls on a full pipe), and resolves
//! to exactly one [`ProcessOutcome`].

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use builder_core::config::render::RenderSettings;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::RenderError;
use crate::models::{ProcessOutcome, RenderJobSpec};

/// How long to wait for output readers after killing a timed-out child.
/// Grandchildren that inherited the pipes can keep them open forever.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Executes a render job to a terminal outcome.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Run `spec` once. `Err` is reserved for failures of the supervisor
    /// itself, never for the tool failing.
    async fn run(&self, spec: &RenderJobSpec) -> Result<ProcessOutcome, RenderError>;
}

/// [`JobRunner`] backed by a real child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    log_output: bool,
}

impl ProcessRunner {
    /// Runner with no working directory override, no deadline and no
    /// output forwarding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner configured from the render settings. The child runs inside
    /// the installation directory when it exists.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        let install_dir = settings.effective_install_dir();
        Self {
            working_dir: install_dir.is_dir().then_some(install_dir),
            timeout: settings.timeout(),
            log_output: settings.log_tool_output,
        }
    }

    /// Set the child's working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill the child if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Forward output lines to the log as they arrive.
    pub fn with_output_logging(mut self, enabled: bool) -> Self {
        self.log_output = enabled;
        self
    }

    /// The configured deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl JobRunner for ProcessRunner {
    async fn run(&self, spec: &RenderJobSpec) -> Result<ProcessOutcome, RenderError> {
        let mut cmd = Command::new(&spec.executable_path);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd.args(&spec.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        info!(command = %spec.command_line(), "Starting render process");

        let start = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(
                    executable = %spec.executable_path,
                    error = %e,
                    "Failed to start render process"
                );
                return Ok(ProcessOutcome::LaunchFailure {
                    error: e.to_string(),
                });
            }
        };

        let stdout_drain = child
            .stdout
            .take()
            .map(|out| Drain::spawn(out, OutputStream::Stdout, self.log_output));
        let stderr_drain = child
            .stderr
            .take()
            .map(|err| Drain::spawn(err, OutputStream::Stderr, self.log_output));

        let status = match self.timeout {
            None => child.wait().await?,
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    warn!(
                        timeout_ms = limit.as_millis() as u64,
                        "Render exceeded its deadline, killing process"
                    );
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "Failed to kill render process");
                    }
                    let stdout = finish(stdout_drain, Some(DRAIN_GRACE)).await?;
                    let stderr = finish(stderr_drain, Some(DRAIN_GRACE)).await?;
                    return Ok(ProcessOutcome::Timeout {
                        timeout_seconds: limit.as_secs(),
                        stdout,
                        stderr,
                    });
                }
            },
        };

        let stdout = finish(stdout_drain, None).await?;
        let stderr = finish(stderr_drain, None).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if status.success() {
            info!(elapsed_ms, "Render process completed");
            Ok(ProcessOutcome::Success)
        } else {
            error!(
                exit_code = ?status.code(),
                elapsed_ms,
                "Render process failed"
            );
            Ok(ProcessOutcome::ToolFailure {
                exit_code: status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Background reader for one output stream.
///
/// Bytes land in a shared buffer as they arrive, so output read before
/// the reader is aborted is still available.
struct Drain {
    task: JoinHandle<()>,
    captured: Arc<Mutex<Vec<u8>>>,
}

impl Drain {
    fn spawn<R>(reader: R, stream: OutputStream, log_lines: bool) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(drain(reader, stream, log_lines, Arc::clone(&captured)));
        Self { task, captured }
    }

    /// Everything captured so far.
    fn take_output(&self) -> String {
        let mut captured = self.captured.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&std::mem::take(&mut *captured)).into_owned()
    }
}

/// Read `reader` to EOF, appending every byte to `captured` in arrival
/// order.
async fn drain<R>(
    reader: R,
    stream: OutputStream,
    log_lines: bool,
    captured: Arc<Mutex<Vec<u8>>>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await;
        if !line.is_empty() {
            if log_lines {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end();
                match stream {
                    OutputStream::Stdout => debug!(target: "blender", "{text}"),
                    OutputStream::Stderr => warn!(target: "blender", "{text}"),
                }
            }
            captured
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(&line);
        }
        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(stream = ?stream, error = %e, "Failed reading render output");
                break;
            }
        }
    }
}

/// Join a drain task and return its output. With a grace period, a
/// reader that does not finish in time is aborted and keeps what it
/// captured before the abort.
async fn finish(drain: Option<Drain>, grace: Option<Duration>) -> Result<String, RenderError> {
    let Some(mut drain) = drain else {
        return Ok(String::new());
    };

    match grace {
        None => (&mut drain.task).await?,
        Some(grace) => match tokio::time::timeout(grace, &mut drain.task).await {
            Ok(joined) => joined?,
            Err(_) => {
                debug!("Output reader still open after kill, aborting it");
                drain.task.abort();
            }
        },
    }

    Ok(drain.take_output())
}
