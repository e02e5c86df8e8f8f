//! Persistent user settings and plan dialect presets.

use dirs_next as dirs;
use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::convert::ConvertOptions;
use crate::plan::Dialect;
use crate::sport::SpeedProfile;

/// Known plan dialects by name.
pub static PRESETS: phf::Map<&'static str, Dialect> = phf_map! {
    "comma" => Dialect::COMMA,
    "semicolon" => Dialect::SEMICOLON,
};

pub const DEFAULT_ENDPOINT: &str = "https://connect.garmin.com/gc-api/workout-service/workout";

#[derive(Debug, PartialEq, Eq)]
pub enum SettingsError {
    UnknownPreset {
        name: String,
        suggestion: Option<&'static str>,
    },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::UnknownPreset {
                name,
                suggestion: Some(s),
            } => write!(f, "unknown preset '{name}', did you mean '{s}'?"),
            SettingsError::UnknownPreset {
                name,
                suggestion: None,
            } => write!(f, "unknown preset '{name}'"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Look up a preset by name, case-insensitively.
pub fn preset(name: &str) -> Result<Dialect, SettingsError> {
    let key = name.trim().to_lowercase();
    if let Some(dialect) = PRESETS.get(key.as_str()) {
        return Ok(*dialect);
    }
    let suggestion = PRESETS
        .keys()
        .map(|k| (*k, strsim::levenshtein(&key, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| k);
    Err(SettingsError::UnknownPreset {
        name: name.to_string(),
        suggestion,
    })
}

fn default_preset() -> String {
    "comma".to_string()
}

fn default_submit_delay_ms() -> u64 {
    1500
}

/// Configuration read from `plan_to_workout.json` in the user config dir.
///
/// Every field falls back to its default when missing, so files written by
/// older versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Overrides the preset's delimiter.
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default = "default_running_speed")]
    pub running_speed_mps: f64,
    #[serde(default = "default_cycling_speed")]
    pub cycling_speed_mps: f64,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_running_speed() -> f64 {
    SpeedProfile::RUNNING_MPS
}

fn default_cycling_speed() -> f64 {
    SpeedProfile::CYCLING_MPS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            delimiter: None,
            running_speed_mps: default_running_speed(),
            cycling_speed_mps: default_cycling_speed(),
            endpoint: default_endpoint(),
            submit_delay_ms: default_submit_delay_ms(),
            csrf_token: None,
        }
    }
}

impl Settings {
    const FILE: &'static str = "plan_to_workout.json";

    pub fn path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load settings, writing a default file on first use.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            let settings = Self::default();
            settings.save();
            return settings;
        }
        match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("Ignoring unreadable settings {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(data) = serde_json::to_string_pretty(self) {
                if let Err(e) = std::fs::write(&path, data) {
                    log::warn!("Failed to save settings {}: {e}", path.display());
                }
            }
        }
    }

    /// The dialect to read plans with: the named preset, with the delimiter
    /// override applied if set.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        let mut dialect = preset(&self.preset)?;
        if let Some(delimiter) = self.delimiter {
            dialect.delimiter = delimiter;
        }
        Ok(dialect)
    }

    pub fn speeds(&self) -> SpeedProfile {
        SpeedProfile {
            running_mps: self.running_speed_mps,
            cycling_mps: self.cycling_speed_mps,
        }
    }

    pub fn convert_options(&self) -> Result<ConvertOptions, SettingsError> {
        Ok(ConvertOptions {
            dialect: self.dialect()?,
            speeds: self.speeds(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    /// Serializes tests that change process environment variables.
    pub(crate) static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn presets_resolve() {
        assert_eq!(preset("comma"), Ok(Dialect::COMMA));
        assert_eq!(preset(" Semicolon "), Ok(Dialect::SEMICOLON));
    }

    #[test]
    fn unknown_preset_suggests_closest() {
        let err = preset("semicoln").unwrap_err();
        assert_eq!(
            err,
            SettingsError::UnknownPreset {
                name: "semicoln".into(),
                suggestion: Some("semicolon"),
            }
        );
        assert!(err.to_string().contains("did you mean 'semicolon'"));

        let err = preset("tab-separated").unwrap_err();
        assert!(matches!(err, SettingsError::UnknownPreset { suggestion: None, .. }));
    }

    #[test]
    fn delimiter_override_applies_to_preset() {
        let s = Settings {
            preset: "semicolon".into(),
            delimiter: Some('\t'),
            ..Settings::default()
        };
        let dialect = s.dialect().unwrap();
        assert_eq!(dialect.delimiter, '\t');
        assert_eq!(dialect.default_sport, Dialect::SEMICOLON.default_sport);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let s: Settings = serde_json::from_str(r#"{"preset": "semicolon"}"#).unwrap();
        assert_eq!(s.preset, "semicolon");
        assert_eq!(s.running_speed_mps, 2.94);
        assert_eq!(s.cycling_speed_mps, 6.94);
        assert_eq!(s.submit_delay_ms, 1500);
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
        assert!(s.csrf_token.is_none());
    }

    #[test]
    fn settings_persist_in_config_dir() {
        use std::env;
        use std::fs;

        let _guard = ENV_MUTEX.lock().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let prev_config = env::var_os("XDG_CONFIG_HOME");
        unsafe {
            env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        // First load writes the defaults.
        let first = Settings::load();
        assert_eq!(first, Settings::default());
        let path = Settings::path().unwrap();
        assert!(path.exists());

        let mut s = Settings::default();
        s.preset = "semicolon".into();
        s.cycling_speed_mps = 8.0;
        s.csrf_token = Some("abc".into());
        s.save();
        assert_eq!(Settings::load(), s);

        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(), Settings::default());

        if let Some(val) = prev_config {
            unsafe {
                env::set_var("XDG_CONFIG_HOME", val);
            }
        } else {
            unsafe {
                env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}
