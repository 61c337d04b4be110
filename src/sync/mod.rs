// Sync module - maps the observed system appearance onto an editor theme
//
// The policy is small:
// 1. classify the appearance signal as Light or Dark ("dark" anywhere wins)
// 2. look up the user's theme name for that mode, falling back to a default
// 3. write it to the editor's color theme setting
//
// Preferences are re-read from the settings store on every call. Nothing
// caches the resolved name, so the applied theme always reflects the current
// preferences and the latest signal.

use crate::appearance::{AppearanceSignal, AppearanceWatcher};
use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::notifier::{self, Notifier};
use crate::prompt::{Prompt, StdinPrompt};
use crate::settings::{JsonSettingsStore, SettingsKeys, SettingsStore};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_LIGHT_THEME: &str = "Default Light+";
pub const DEFAULT_DARK_THEME: &str = "Default Dark+";

/// The two appearance states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Light,
    Dark,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Light, Mode::Dark];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
        }
    }

    /// Theme used when the user has not configured one
    pub fn default_theme(&self) -> &'static str {
        match self {
            Mode::Light => DEFAULT_LIGHT_THEME,
            Mode::Dark => DEFAULT_DARK_THEME,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an appearance signal. Case-insensitive substring test, never fails.
pub fn classify(signal: &str) -> Mode {
    if signal.to_lowercase().contains("dark") {
        Mode::Dark
    } else {
        Mode::Light
    }
}

/// User-configured theme name per mode. Absent entries fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePreferences {
    names: HashMap<Mode, String>,
}

impl ThemePreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mode: Mode, name: impl Into<String>) -> Self {
        self.names.insert(mode, name.into());
        self
    }

    pub fn get(&self, mode: Mode) -> Option<&str> {
        self.names.get(&mode).map(String::as_str)
    }

    /// Read both preferences from the store
    ///
    /// A store that cannot be read counts as "nothing configured" so a broken
    /// settings file still resolves to the defaults.
    pub fn load(store: &dyn SettingsStore, keys: &SettingsKeys) -> Self {
        let mut prefs = Self::new();
        for mode in Mode::ALL {
            let key = keys.preference(mode);
            match store.get(key) {
                Ok(Some(name)) => prefs = prefs.with(mode, name),
                Ok(None) => {}
                Err(e) => tracing::warn!(key, "Could not read theme preference: {:#}", e),
            }
        }
        prefs
    }

    /// Full mode -> name table with defaults filled in
    pub fn theme_map(&self) -> HashMap<Mode, String> {
        Mode::ALL
            .into_iter()
            .map(|mode| (mode, resolve_theme_name(mode, self)))
            .collect()
    }
}

/// `prefs[mode]`, or the hard-coded default for that mode
pub fn resolve_theme_name(mode: Mode, prefs: &ThemePreferences) -> String {
    prefs
        .get(mode)
        .unwrap_or_else(|| mode.default_theme())
        .to_string()
}

/// Translates appearance signals into editor theme changes
pub struct Synchronizer {
    store: Arc<dyn SettingsStore>,
    keys: SettingsKeys,
    watcher: AppearanceWatcher,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn Prompt>,
}

impl Synchronizer {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        keys: SettingsKeys,
        watcher: AppearanceWatcher,
        notifier: Arc<dyn Notifier>,
        prompt: Arc<dyn Prompt>,
    ) -> Self {
        Self {
            store,
            keys,
            watcher,
            notifier,
            prompt,
        }
    }

    /// Wire up the real collaborators: settings file, gsettings, terminal prompt
    pub fn from_config(config: &Config) -> Self {
        let store = JsonSettingsStore::new(&config.editor.settings_path);
        tracing::debug!(path = %store.path().display(), "Using editor settings");

        Self::new(
            Arc::new(store),
            config.editor.keys(),
            AppearanceWatcher::from_config(&config.environment),
            notifier::from_config(&config.notifications),
            Arc::new(StdinPrompt),
        )
    }

    pub fn watcher(&self) -> &AppearanceWatcher {
        &self.watcher
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Current preferences, read fresh from the store
    pub fn preferences(&self) -> ThemePreferences {
        ThemePreferences::load(self.store.as_ref(), &self.keys)
    }

    /// Write the theme configured for `mode` and return its name
    pub fn apply_theme(&self, mode: Mode) -> SyncResult<String> {
        let themes = self.preferences().theme_map();
        let name = themes
            .get(&mode)
            .cloned()
            .ok_or(SyncError::PreferenceLookup(mode))?;

        self.store
            .set(&self.keys.color_theme, &name)
            .map_err(|e| SyncError::ConfigurationWrite(format!("{:#}", e)))?;

        tracing::info!(%mode, theme = %name, "Applied editor theme");
        Ok(name)
    }

    /// Apply the theme for a monitor signal and tell the user
    pub fn handle_signal(&self, signal: &AppearanceSignal) -> SyncResult<String> {
        let mode = classify(signal.as_str());
        tracing::debug!(%signal, %mode, "Classified appearance signal");

        let name = self.apply_theme(mode)?;
        self.notifier.info(&format!("Theme changed to {}!", name));
        Ok(name)
    }

    /// Probe the current appearance once and apply the matching theme
    pub async fn resync(&self) -> SyncResult<String> {
        let signal = self.watcher.query().await?;
        let mode = classify(signal.as_str());
        tracing::debug!(%signal, %mode, "Resyncing from current appearance");
        self.apply_theme(mode)
    }

    /// Change the preferred theme for `mode`, then resync
    ///
    /// With no name the user is prompted; an empty or cancelled answer does
    /// nothing and returns `Ok(None)`. The resync uses the *current* system
    /// appearance, so editing the preference of the inactive mode leaves the
    /// editor theme unchanged.
    pub async fn set_preferred_theme(
        &self,
        mode: Mode,
        name: Option<String>,
    ) -> SyncResult<Option<String>> {
        let name = match name {
            Some(name) => name,
            None => {
                let question = format!("Editor theme to use in {} mode:", mode);
                // Terminal reads block, keep them off the runtime threads
                let prompt = Arc::clone(&self.prompt);
                let answer = tokio::task::spawn_blocking(move || prompt.ask(&question))
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!("Theme prompt failed: {}", e);
                        None
                    });
                match answer {
                    Some(answer) if !answer.is_empty() => answer,
                    _ => {
                        tracing::debug!(%mode, "Theme prompt cancelled");
                        return Ok(None);
                    }
                }
            }
        };

        self.store
            .set(self.keys.preference(mode), &name)
            .map_err(|e| SyncError::ConfigurationWrite(format!("{:#}", e)))?;
        tracing::info!(%mode, theme = %name, "Saved preferred theme");

        self.resync().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::testing::RecordingNotifier;
    use crate::prompt::testing::ScriptedPrompt;
    use crate::settings::memory::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const COLOR_THEME: &str = "editor.colorTheme";

    struct Harness {
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        prompt: Arc<ScriptedPrompt>,
        sync: Synchronizer,
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    /// Synchronizer whose probe prints `appearance`
    fn harness(store: MemoryStore, appearance: &str, answer: Option<&str>) -> Harness {
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let prompt = Arc::new(ScriptedPrompt::answering(answer));
        let watcher = AppearanceWatcher::new(
            sh(&format!("echo \"{}\"", appearance)),
            sh("exec sleep 30"),
        );
        let sync = Synchronizer::new(
            store.clone(),
            SettingsKeys::default(),
            watcher,
            notifier.clone(),
            prompt.clone(),
        );
        Harness {
            store,
            notifier,
            prompt,
            sync,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // classify / resolve
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_classify_dark_in_any_case_or_position() {
        for signal in [
            "dark",
            "DARK",
            "Dark",
            "Adwaita-dark",
            "'gtk-dark'",
            "gtk-theme: 'Yaru-DaRk'",
            "darkness",
        ] {
            assert_eq!(classify(signal), Mode::Dark, "signal: {:?}", signal);
        }
    }

    #[test]
    fn test_classify_everything_else_is_light() {
        for signal in ["", "Adwaita", "Adwaita-light", "'HighContrast'", "d a r k", "drak"] {
            assert_eq!(classify(signal), Mode::Light, "signal: {:?}", signal);
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let prefs = ThemePreferences::new();
        assert_eq!(resolve_theme_name(Mode::Light, &prefs), "Default Light+");
        assert_eq!(resolve_theme_name(Mode::Dark, &prefs), "Default Dark+");
    }

    #[test]
    fn test_resolve_prefers_configured_name() {
        let prefs = ThemePreferences::new().with(Mode::Dark, "Nord");
        assert_eq!(resolve_theme_name(Mode::Dark, &prefs), "Nord");
        assert_eq!(resolve_theme_name(Mode::Light, &prefs), "Default Light+");
    }

    #[test]
    fn test_theme_map_covers_both_modes() {
        let map = ThemePreferences::new()
            .with(Mode::Light, "Quiet Light")
            .theme_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Mode::Light], "Quiet Light");
        assert_eq!(map[&Mode::Dark], "Default Dark+");
    }

    #[test]
    fn test_load_reads_configured_keys() {
        let store = MemoryStore::new()
            .with("theme.light", "Solarized Light")
            .with("theme.dark", "Solarized Dark");
        let prefs = ThemePreferences::load(&store, &SettingsKeys::default());
        assert_eq!(prefs.get(Mode::Light), Some("Solarized Light"));
        assert_eq!(prefs.get(Mode::Dark), Some("Solarized Dark"));
    }

    // ─────────────────────────────────────────────────────────────────────
    // apply_theme
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_theme_writes_and_returns_name() {
        let h = harness(MemoryStore::new().with("theme.dark", "Nord"), "x", None);

        assert_eq!(h.sync.apply_theme(Mode::Dark).unwrap(), "Nord");
        assert_eq!(h.store.writes_to(COLOR_THEME), vec!["Nord"]);
    }

    #[test]
    fn test_apply_theme_twice_writes_twice() {
        let h = harness(MemoryStore::new(), "x", None);

        assert_eq!(h.sync.apply_theme(Mode::Light).unwrap(), "Default Light+");
        assert_eq!(h.sync.apply_theme(Mode::Light).unwrap(), "Default Light+");
        assert_eq!(
            h.store.writes_to(COLOR_THEME),
            vec!["Default Light+", "Default Light+"]
        );
    }

    #[test]
    fn test_apply_theme_reads_preferences_fresh() {
        let h = harness(MemoryStore::new().with("theme.dark", "Nord"), "x", None);
        assert_eq!(h.sync.apply_theme(Mode::Dark).unwrap(), "Nord");

        h.store.set("theme.dark", "Dracula").unwrap();
        assert_eq!(h.sync.apply_theme(Mode::Dark).unwrap(), "Dracula");
    }

    #[test]
    fn test_apply_theme_write_failure_is_configuration_error() {
        let h = harness(MemoryStore::new(), "x", None);
        h.store.fail_writes();

        match h.sync.apply_theme(Mode::Dark) {
            Err(SyncError::ConfigurationWrite(msg)) => assert!(msg.contains("read-only")),
            other => panic!("expected ConfigurationWrite, got {:?}", other),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // handle_signal
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_gtk_dark_signal_applies_configured_dark_theme() {
        let h = harness(MemoryStore::new().with("theme.dark", "Nord"), "x", None);

        let applied = h
            .sync
            .handle_signal(&AppearanceSignal::new("'gtk-dark'"))
            .unwrap();

        assert_eq!(applied, "Nord");
        assert_eq!(h.store.writes_to(COLOR_THEME), vec!["Nord"]);
        assert_eq!(h.notifier.infos(), vec!["Theme changed to Nord!"]);
    }

    #[test]
    fn test_signal_sequence_applies_in_order() {
        let store = MemoryStore::new()
            .with("theme.light", "Quiet Light")
            .with("theme.dark", "Monokai");
        let h = harness(store, "x", None);

        for raw in ["Adwaita-light", "Adwaita-dark", "Adwaita-light"] {
            h.sync.handle_signal(&AppearanceSignal::new(raw)).unwrap();
        }

        assert_eq!(
            h.store.writes_to(COLOR_THEME),
            vec!["Quiet Light", "Monokai", "Quiet Light"]
        );
    }

    #[test]
    fn test_failed_signal_does_not_notify_success() {
        let h = harness(MemoryStore::new(), "x", None);
        h.store.fail_writes();

        assert!(h.sync.handle_signal(&AppearanceSignal::new("dark")).is_err());
        assert!(h.notifier.infos().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // resync / set_preferred_theme (probe runs through sh)
    // ─────────────────────────────────────────────────────────────────────

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resync_uses_probe_result() {
        let h = harness(
            MemoryStore::new().with("theme.dark", "Nord"),
            "'Adwaita-dark'",
            None,
        );

        assert_eq!(h.sync.resync().await.unwrap(), "Nord");
        assert_eq!(h.store.writes_to(COLOR_THEME), vec!["Nord"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resync_probe_failure_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let sync = Synchronizer::new(
            store.clone(),
            SettingsKeys::default(),
            AppearanceWatcher::new(sh("exit 1"), sh("exit 1")),
            Arc::new(RecordingNotifier::default()),
            Arc::new(ScriptedPrompt::answering(None)),
        );

        assert!(matches!(
            sync.resync().await,
            Err(SyncError::EnvironmentProbe(_))
        ));
        assert!(store.writes().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_preferred_theme_with_name_writes_then_resyncs() {
        let h = harness(MemoryStore::new(), "'Adwaita-dark'", None);

        let applied = h
            .sync
            .set_preferred_theme(Mode::Dark, Some("Nord".to_string()))
            .await
            .unwrap();

        assert_eq!(applied, Some("Nord".to_string()));
        assert_eq!(h.prompt.times_asked(), 0);
        assert_eq!(
            h.store.writes(),
            vec![
                ("theme.dark".to_string(), "Nord".to_string()),
                (COLOR_THEME.to_string(), "Nord".to_string()),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_editing_inactive_mode_keeps_current_theme() {
        let h = harness(
            MemoryStore::new().with("theme.dark", "Nord"),
            "'Adwaita-dark'",
            None,
        );

        let applied = h
            .sync
            .set_preferred_theme(Mode::Light, Some("Quiet Light".to_string()))
            .await
            .unwrap();

        // System is dark, so the dark theme is re-applied
        assert_eq!(applied, Some("Nord".to_string()));
        assert_eq!(h.store.get("theme.light").unwrap().as_deref(), Some("Quiet Light"));
        assert_eq!(h.store.writes_to(COLOR_THEME), vec!["Nord"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_preferred_theme_prompts_when_name_absent() {
        let h = harness(MemoryStore::new(), "Adwaita", Some("Solarized Light"));

        let applied = h
            .sync
            .set_preferred_theme(Mode::Light, None)
            .await
            .unwrap();

        assert_eq!(h.prompt.times_asked(), 1);
        assert_eq!(applied, Some("Solarized Light".to_string()));
        assert_eq!(h.store.writes_to("theme.light"), vec!["Solarized Light"]);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_noop() {
        let h = harness(MemoryStore::new(), "Adwaita", Some(""));

        let applied = h
            .sync
            .set_preferred_theme(Mode::Light, None)
            .await
            .unwrap();

        assert_eq!(applied, None);
        assert_eq!(h.prompt.times_asked(), 1);
        assert!(h.store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_prompt_is_noop() {
        let h = harness(MemoryStore::new(), "Adwaita", None);

        let applied = h.sync.set_preferred_theme(Mode::Dark, None).await.unwrap();

        assert_eq!(applied, None);
        assert!(h.store.writes().is_empty());
    }

    /// Answers only once `ready` is set, or gives up after a second
    struct PatientPrompt {
        ready: Arc<AtomicBool>,
    }

    impl Prompt for PatientPrompt {
        fn ask(&self, _question: &str) -> Option<String> {
            for _ in 0..50 {
                if self.ready.load(Ordering::SeqCst) {
                    return Some("Nord".to_string());
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            None
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_waiting_prompt_does_not_stall_other_tasks() {
        let ready = Arc::new(AtomicBool::new(false));
        let store = Arc::new(MemoryStore::new());
        let sync = Synchronizer::new(
            store.clone(),
            SettingsKeys::default(),
            AppearanceWatcher::new(sh("echo Adwaita-dark"), sh("exec sleep 30")),
            Arc::new(RecordingNotifier::default()),
            Arc::new(PatientPrompt {
                ready: ready.clone(),
            }),
        );

        // Runs on the same thread as the test; only progresses if the prompt yields it
        let flag = ready.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let applied = sync.set_preferred_theme(Mode::Dark, None).await.unwrap();

        assert_eq!(applied, Some("Nord".to_string()));
        assert_eq!(store.writes_to("theme.dark"), vec!["Nord"]);
    }

    #[tokio::test]
    async fn test_preference_write_failure_skips_resync() {
        let h = harness(MemoryStore::new(), "Adwaita", None);
        h.store.fail_writes();

        let result = h
            .sync
            .set_preferred_theme(Mode::Dark, Some("Nord".to_string()))
            .await;

        assert!(matches!(result, Err(SyncError::ConfigurationWrite(_))));
        assert!(h.store.writes().is_empty());
    }
}
