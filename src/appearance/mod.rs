// Appearance module - observes the desktop's theme setting through gsettings
//
// Two delivery modes:
// - query(): run the one-shot query command and return its output
// - subscribe(): run the monitor command and stream every output line
//
// The monitor is expected to run forever. If it exits or its output ends
// without close() having been called, the subscription delivers a single
// WatchEvent::Crashed and then ends. Nothing here resubscribes.

use crate::config::EnvironmentConfig;
use crate::error::{SyncError, SyncResult};
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};

/// How long to wait for a dead monitor's exit status and stderr
const CRASH_REPORT_TIMEOUT: Duration = Duration::from_secs(2);

/// Raw text observation of the desktop appearance, e.g. `'Adwaita-dark'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppearanceSignal(String);

impl AppearanceSignal {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppearanceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Item delivered by a Subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// One line of monitor output
    Signal(AppearanceSignal),
    /// The monitor terminated on its own; carries the diagnostic text
    Crashed(String),
}

/// Runs the configured query/monitor commands
#[derive(Debug, Clone)]
pub struct AppearanceWatcher {
    query_command: Vec<String>,
    monitor_command: Vec<String>,
}

impl AppearanceWatcher {
    pub fn new(query_command: Vec<String>, monitor_command: Vec<String>) -> Self {
        Self {
            query_command,
            monitor_command,
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(config.query_command.clone(), config.monitor_command.clone())
    }

    /// Current appearance, from one run of the query command
    pub async fn query(&self) -> SyncResult<AppearanceSignal> {
        let command_line = self.query_command.join(" ");
        let mut command =
            build_command(&self.query_command).map_err(SyncError::EnvironmentProbe)?;

        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                SyncError::EnvironmentProbe(format!(
                    "failed to run `{}`: {}",
                    command_line, e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::debug!(
                command = %command_line,
                status = %output.status,
                stderr = %stderr.trim(),
                "Appearance query failed"
            );
            return Err(SyncError::EnvironmentProbe(describe_exit(
                &command_line,
                output.status,
                &stderr,
            )));
        }

        let value = stdout.trim();
        if value.is_empty() {
            let reason = if stderr.trim().is_empty() {
                format!("`{}` printed nothing", command_line)
            } else {
                stderr.trim().to_string()
            };
            return Err(SyncError::EnvironmentProbe(reason));
        }

        tracing::debug!(command = %command_line, signal = value, "Queried system appearance");
        Ok(AppearanceSignal::new(value))
    }

    /// Start the monitor command and stream its output
    ///
    /// Fails with `MonitorCrash` when the process cannot be started at all.
    pub fn subscribe(&self) -> SyncResult<Subscription> {
        let command_line = self.monitor_command.join(" ");
        let mut command =
            build_command(&self.monitor_command).map_err(SyncError::MonitorCrash)?;

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SyncError::MonitorCrash(format!("failed to run `{}`: {}", command_line, e))
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(SyncError::MonitorCrash(format!(
                "`{}` started without output pipes",
                command_line
            )));
        };

        tracing::info!(command = %command_line, pid = ?child.id(), "Theme monitor started");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        tokio::spawn(pump_monitor(
            command_line, child, stdout, stderr, event_tx, close_rx,
        ));

        Ok(Subscription {
            events: event_rx,
            close_tx: Some(close_tx),
        })
    }
}

/// Build a tokio Command from an argv list
fn build_command(argv: &[String]) -> Result<Command, String> {
    let Some((program, args)) = argv.split_first() else {
        return Err("no command configured".to_string());
    };
    let mut command = Command::new(program);
    command.args(args);
    Ok(command)
}

fn describe_exit(command: &str, status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("`{}` exited with {}", command, status)
    } else {
        format!("`{}` exited with {}: {}", command, status, stderr)
    }
}

/// Forward monitor output lines until the process dies or the subscription closes
async fn pump_monitor(
    command_line: String,
    mut child: Child,
    stdout: ChildStdout,
    mut stderr: ChildStderr,
    events: mpsc::UnboundedSender<WatchEvent>,
    mut close_rx: oneshot::Receiver<()>,
) {
    let mut lines = BufReader::new(stdout).lines();

    let failure = loop {
        tokio::select! {
            biased;

            // Explicit close, or the Subscription was dropped
            _ = &mut close_rx => break None,

            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!(signal = line, "Theme monitor output");
                    if events.send(WatchEvent::Signal(AppearanceSignal::new(line))).is_err() {
                        break None;
                    }
                }
                Ok(None) => break Some("output ended".to_string()),
                Err(e) => break Some(format!("failed to read output: {}", e)),
            },
        }
    };

    match failure {
        None => release(&mut child, &command_line).await,
        Some(reason) => {
            let report = crash_report(&mut child, &mut stderr, &command_line, reason).await;
            tracing::error!(command = %command_line, "Theme monitor crashed: {}", report);
            let _ = events.send(WatchEvent::Crashed(report));
        }
    }
}

/// Stop the monitor unless it already exited. Never waits on the caller's behalf.
async fn release(child: &mut Child, command_line: &str) {
    match child.try_wait() {
        Ok(Some(status)) => {
            tracing::debug!(command = %command_line, %status, "Theme monitor already exited");
        }
        _ => {
            if let Err(e) = child.start_kill() {
                tracing::debug!(
                    command = %command_line,
                    "Could not stop theme monitor: {}",
                    e
                );
            }
            // Reap so the process does not linger as a zombie
            let _ = tokio::time::timeout(CRASH_REPORT_TIMEOUT, child.wait()).await;
            tracing::info!(command = %command_line, "Theme monitor stopped");
        }
    }
}

async fn crash_report(
    child: &mut Child,
    stderr: &mut ChildStderr,
    command_line: &str,
    reason: String,
) -> String {
    let mut diagnostic = String::new();
    let _ = tokio::time::timeout(CRASH_REPORT_TIMEOUT, stderr.read_to_string(&mut diagnostic))
        .await;

    match tokio::time::timeout(CRASH_REPORT_TIMEOUT, child.wait()).await {
        Ok(Ok(status)) => describe_exit(command_line, status, &diagnostic),
        _ => {
            let _ = child.start_kill();
            let diagnostic = diagnostic.trim();
            if diagnostic.is_empty() {
                format!("`{}` {}", command_line, reason)
            } else {
                format!("`{}` {}: {}", command_line, reason, diagnostic)
            }
        }
    }
}

/// Live stream of appearance signals from the monitor command
///
/// Released exactly once: by `close()` or, failing that, on drop.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<WatchEvent>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl Subscription {
    /// Stop the monitor. Returns false if it was already closed.
    ///
    /// Does not wait for the process; a monitor that already exited is left alone.
    pub fn close(&mut self) -> bool {
        match self.close_tx.take() {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }
}

impl Stream for Subscription {
    type Item = WatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
