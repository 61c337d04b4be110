//! Error types for theme synchronization
//!
//! Every failure is surfaced to the user (notification or CLI exit); none of
//! these are retried internally.

use crate::sync::Mode;
use std::fmt;

/// Errors that can occur while observing the system appearance or applying
/// an editor theme
#[derive(Debug)]
pub enum SyncError {
    /// The one-shot appearance query failed (spawn error, non-zero exit, no output)
    EnvironmentProbe(String),
    /// The continuous monitor terminated without being closed
    MonitorCrash(String),
    /// Writing to the editor settings failed
    ConfigurationWrite(String),
    /// A mode had no theme name in either the user settings or the defaults.
    /// Both modes always have a default, so this is an invariant violation.
    PreferenceLookup(Mode),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentProbe(msg) => write!(f, "Could not read the system theme: {}", msg),
            Self::MonitorCrash(msg) => write!(f, "The theme monitor crashed: {}", msg),
            Self::ConfigurationWrite(msg) => {
                write!(f, "Could not update editor settings: {}", msg)
            }
            Self::PreferenceLookup(mode) => {
                write!(f, "No editor theme configured for {} mode", mode)
            }
        }
    }
}

impl std::error::Error for SyncError {}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_diagnostic() {
        let err = SyncError::EnvironmentProbe("gsettings: not found".to_string());
        assert_eq!(
            err.to_string(),
            "Could not read the system theme: gsettings: not found"
        );
    }

    #[test]
    fn test_preference_lookup_names_mode() {
        let err = SyncError::PreferenceLookup(Mode::Dark);
        assert_eq!(err.to_string(), "No editor theme configured for dark mode");
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = SyncError::ConfigurationWrite("disk full".to_string()).into();
        assert!(err.to_string().contains("disk full"));
    }
}
