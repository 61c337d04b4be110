// Daemon - keeps the editor theme in sync until shutdown
//
// Three triggers feed the synchronizer:
// - a one-shot probe at startup
// - every line from the gsettings monitor subscription
// - edits to the light/dark preferences in the settings file
//
// They are multiplexed on a single task. Last write wins; the only ordering
// guarantee is the monitor's own line order.

use crate::appearance::{Subscription, WatchEvent};
use crate::preferences::{PreferenceTracker, PreferenceWatcher};
use crate::sync::Synchronizer;
use std::future::Future;
use std::path::Path;
use tokio_stream::StreamExt;

const MONITOR_CRASHED: &str = "The theme monitor crashed!";

/// Run until `shutdown` resolves
pub async fn run(
    sync: &Synchronizer,
    settings_path: &Path,
    shutdown: impl Future<Output = ()>,
) {
    let notifier = sync.notifier();

    match sync.resync().await {
        Ok(theme) => tracing::info!(%theme, "Initial theme applied"),
        Err(e) => notifier.error(
            "Could not apply the initial theme",
            Some(e.to_string().as_str()),
        ),
    }

    let mut subscription = match sync.watcher().subscribe() {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            notifier.error(MONITOR_CRASHED, Some(e.to_string().as_str()));
            None
        }
    };

    let mut preferences = match PreferenceWatcher::start(settings_path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!("Preference changes will not be picked up: {:#}", e);
            None
        }
    };
    let mut tracker = PreferenceTracker::new(sync.preferences());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            event = next_event(&mut subscription) => match event {
                Some(WatchEvent::Signal(signal)) => {
                    if let Err(e) = sync.handle_signal(&signal) {
                        notifier.error("Could not change theme", Some(e.to_string().as_str()));
                    }
                }
                Some(WatchEvent::Crashed(report)) => {
                    notifier.error(MONITOR_CRASHED, Some(report.as_str()));
                }
                None => {
                    tracing::debug!("Theme monitor subscription ended");
                    subscription = None;
                }
            },

            changed = next_change(&mut preferences) => match changed {
                Some(()) => {
                    if tracker.observe(sync.preferences()) {
                        tracing::info!("Theme preferences changed, resyncing");
                        if let Err(e) = sync.resync().await {
                            let detail = e.to_string();
                            notifier.error("Could not apply theme", Some(detail.as_str()));
                        }
                    }
                }
                None => preferences = None,
            },
        }
    }

    tracing::info!("Shutting down...");
    if let Some(mut subscription) = subscription {
        if subscription.close() {
            tracing::debug!("Theme monitor released");
        }
    }
}

/// Next monitor event; pending forever once the subscription is gone
async fn next_event(subscription: &mut Option<Subscription>) -> Option<WatchEvent> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

/// Next preference file touch; pending forever without a watcher
async fn next_change(preferences: &mut Option<PreferenceWatcher>) -> Option<()> {
    match preferences {
        Some(watcher) => watcher.changed().await,
        None => std::future::pending().await,
    }
}
