// settings.rs - Application Settings
//
// Settings are persisted as JSON under the platform config directory. The
// tray subsystem only ever reads an immutable snapshot of these; writes
// happen at the application layer after the user picks something from the
// menu.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// The application's current stay-awake policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AwakeMode {
    /// Off - the selected power plan stays in charge.
    #[default]
    Passive,
    /// Keep the machine awake until told otherwise.
    Indefinite,
    /// Keep the machine awake for a fixed interval.
    Timed,
    /// Keep the machine awake until an expiration date and time.
    Expirable,
}

/// Snapshot of the settings the tray menu is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraySettings {
    pub mode: AwakeMode,
    /// Whether the display is kept on while the machine is kept awake.
    pub keep_display_on: bool,
    /// Ordered label -> minutes shortcuts shown in the interval submenu.
    pub time_shortcuts: Vec<(String, u64)>,
}

/// Substitute shortcut set used at menu-build time when the configured one
/// is empty. Never written back to the stored settings.
pub fn default_time_shortcuts() -> Vec<(String, u64)> {
    vec![
        ("30 minutes".to_string(), 30),
        ("1 hour".to_string(), 60),
        ("2 hours".to_string(), 120),
    ]
}

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("staywake").join("settings.json"))
}

/// Load settings from disk, falling back to defaults on any failure.
/// A missing file is the normal first-run case and is not logged.
pub fn load() -> TraySettings {
    let Some(path) = settings_path() else {
        warn!("No config directory available, using default settings");
        return TraySettings::default();
    };

    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                TraySettings::default()
            }
        },
        Err(_) => TraySettings::default(),
    }
}

/// Persist settings as JSON under the config directory.
pub fn save(settings: &TraySettings) -> Result<()> {
    let path = settings_path().context("no config directory available")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&AwakeMode::Indefinite).unwrap();
        assert_eq!(json, "\"INDEFINITE\"");
        let back: AwakeMode = serde_json::from_str("\"EXPIRABLE\"").unwrap();
        assert_eq!(back, AwakeMode::Expirable);
    }

    #[test]
    fn settings_round_trip() {
        let settings = TraySettings {
            mode: AwakeMode::Timed,
            keep_display_on: true,
            time_shortcuts: vec![("45 minutes".to_string(), 45)],
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: TraySettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let back: TraySettings = serde_json::from_str("{\"mode\":\"INDEFINITE\"}").unwrap();
        assert_eq!(back.mode, AwakeMode::Indefinite);
        assert!(!back.keep_display_on);
        assert!(back.time_shortcuts.is_empty());
    }

    #[test]
    fn default_shortcuts_are_non_empty_and_ascending() {
        let shortcuts = default_time_shortcuts();
        assert!(!shortcuts.is_empty());
        let minutes: Vec<u64> = shortcuts.iter().map(|(_, m)| *m).collect();
        let mut sorted = minutes.clone();
        sorted.sort_unstable();
        assert_eq!(minutes, sorted);
    }
}
