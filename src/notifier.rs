// Notifier - user-visible messages about theme switches and failures
//
// Every message is also logged through tracing. Where it is shown depends on
// the [notifications] config: the terminal, a desktop notification via
// `notify-send`, or only the log.

use crate::config::NotificationsConfig;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::runtime::Handle;

/// App name shown by the desktop notification daemon
const APP_NAME: &str = "gtk-theme-sync";

const NOTIFY_SEND: &str = "notify-send";

/// Sink for user-facing messages
pub trait Notifier: Send + Sync {
    /// Informational message, e.g. "Theme changed to Nord!"
    fn info(&self, message: &str);

    /// Error message with optional diagnostic detail
    fn error(&self, message: &str, detail: Option<&str>);
}

/// Build the notifier described by the config
pub fn from_config(config: &NotificationsConfig) -> Arc<dyn Notifier> {
    let console = ConsoleNotifier {
        echo: config.enabled,
    };
    if config.enabled && config.desktop {
        Arc::new(DesktopNotifier::new(console))
    } else {
        Arc::new(console)
    }
}

/// Logs every message; with `echo` also prints it to the terminal
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    pub echo: bool,
}

impl ConsoleNotifier {
    fn print_info(&self, message: &str) {
        if self.echo {
            println!("{}", message);
        }
    }

    fn print_error(&self, message: &str, detail: Option<&str>) {
        if self.echo {
            match detail {
                Some(detail) => eprintln!("{}\n  {}", message, detail),
                None => eprintln!("{}", message),
            }
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
        self.print_info(message);
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        log_error(message, detail);
        self.print_error(message, detail);
    }
}

fn log_error(message: &str, detail: Option<&str>) {
    match detail {
        Some(detail) => tracing::error!(detail, "{}", message),
        None => tracing::error!("{}", message),
    }
}

/// Sends desktop notifications, falling back to the terminal when
/// `notify-send` is unavailable or fails
///
/// Delivery runs on a background task so callers never wait on the
/// notification daemon.
pub struct DesktopNotifier {
    program: String,
    fallback: ConsoleNotifier,
}

impl DesktopNotifier {
    pub fn new(fallback: ConsoleNotifier) -> Self {
        Self {
            program: NOTIFY_SEND.to_string(),
            fallback,
        }
    }

    fn send<F>(&self, urgency: &str, summary: &str, body: Option<&str>, on_failure: F)
    where
        F: FnOnce(ConsoleNotifier) + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            on_failure(self.fallback);
            return;
        };

        let mut command = Command::new(&self.program);
        command
            .arg(format!("--app-name={}", APP_NAME))
            .arg(format!("--urgency={}", urgency))
            .arg(summary);
        if let Some(body) = body {
            command.arg(body);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let fallback = self.fallback;
        runtime.spawn(async move {
            let delivered = match command.status().await {
                Ok(status) if status.success() => true,
                Ok(status) => {
                    tracing::debug!(%status, "notify-send failed");
                    false
                }
                Err(e) => {
                    tracing::debug!("notify-send unavailable: {}", e);
                    false
                }
            };
            if !delivered {
                on_failure(fallback);
            }
        });
    }
}

impl Notifier for DesktopNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
        let owned = message.to_string();
        self.send("low", message, None, move |console| console.print_info(&owned));
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        log_error(message, detail);
        let owned = message.to_string();
        let owned_detail = detail.map(str::to_string);
        self.send("critical", message, detail, move |console| {
            console.print_error(&owned, owned_detail.as_deref())
        });
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// Executable script that hangs like an unresponsive notification daemon
    fn hanging_program(dir: &TempDir) -> String {
        let path = dir.path().join("notify-send");
        // Written by a child so no descriptor to the script stays open here
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg("printf '#!/bin/sh\\nexec sleep 5\\n' > \"$1\" && chmod 755 \"$1\"")
            .arg("sh")
            .arg(&path)
            .status()
            .unwrap();
        assert!(status.success());
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_slow_notification_daemon_does_not_block_caller() {
        let dir = TempDir::new().unwrap();
        let notifier = DesktopNotifier {
            program: hanging_program(&dir),
            fallback: ConsoleNotifier { echo: false },
        };

        let started = Instant::now();
        notifier.info("Theme changed to Nord!");
        notifier.error("The theme monitor crashed!", Some("exit status: 1"));

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_desktop_notifier_outside_runtime_uses_fallback() {
        let notifier = DesktopNotifier::new(ConsoleNotifier { echo: false });
        notifier.info("Theme changed to Nord!");
    }
}
