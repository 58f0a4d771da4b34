//! TOML-based application configuration.
//!
//! Stores:
//! - Default interval durations and cycle count
//! - Body weight for calorie estimates
//! - Audio switches, music ducking and the remote speech endpoint
//! - Overrides for every spoken line and the work-move rotation
//!
//! Configuration is stored at `~/.config/fitcue/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::data_dir;
use crate::audio::{RouterOptions, DEFAULT_SPEECH_TIMEOUT_MS};
use crate::error::{ConfigError, ValidationError};
use crate::interval::IntervalConfig;
use crate::profile::Profile;
use crate::script::{CueScript, PlayerScript, VariantCatalog};

/// Audio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub beeps: bool,
    #[serde(default = "default_music_volume")]
    pub music_volume: f32,
    /// Music volume multiplier while speech plays.
    #[serde(default = "default_duck_ratio")]
    pub duck_ratio: f32,
    #[serde(default = "default_speech_timeout_ms")]
    pub speech_timeout_ms: u64,
    #[serde(default)]
    pub tts_endpoint: Option<Url>,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// Name of the environment variable holding the TTS key.
    #[serde(default = "default_tts_api_key_env")]
    pub tts_api_key_env: String,
}

/// Spoken-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptSettings {
    #[serde(default)]
    pub cues: CueScript,
    #[serde(default)]
    pub player: PlayerScript,
    /// Replaces the built-in move rotation when set.
    #[serde(default)]
    pub variants: Option<VariantCatalog>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/fitcue/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub interval: IntervalConfig,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub script: ScriptSettings,
}

fn default_true() -> bool {
    true
}
fn default_music_volume() -> f32 {
    0.6
}
fn default_duck_ratio() -> f32 {
    0.3
}
fn default_speech_timeout_ms() -> u64 {
    DEFAULT_SPEECH_TIMEOUT_MS
}
fn default_tts_voice() -> String {
    "coach".into()
}
fn default_tts_api_key_env() -> String {
    "FITCUE_TTS_KEY".into()
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            beeps: true,
            music_volume: default_music_volume(),
            duck_ratio: default_duck_ratio(),
            speech_timeout_ms: default_speech_timeout_ms(),
            tts_endpoint: None,
            tts_voice: default_tts_voice(),
            tts_api_key_env: default_tts_api_key_env(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }
        let mut parts = key.split('.').peekable();

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => parse_number(value)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Unset optional: take a number if it looks like one.
                    serde_json::Value::Null => parse_number(value)
                        .unwrap_or_else(|| serde_json::Value::String(value.into())),
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Where [`Config::load`] and [`Config::save`] read and write.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Self::path()
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                tracing::debug!(path = %path.display(), "config loaded");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default config");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory only.
    ///
    /// The value is parsed according to the type already stored under the
    /// key, and the result must still deserialize as a `Config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every leaf key with its current value, in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            flatten("", &json, &mut out);
        }
        out
    }

    /// Interval defaults, validated.
    pub fn interval_config(&self) -> Result<IntervalConfig, ValidationError> {
        self.interval.validate()?;
        Ok(self.interval)
    }

    /// Configured move rotation, or the built-in one.
    pub fn variant_catalog(&self) -> VariantCatalog {
        self.script.variants.clone().unwrap_or_default()
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            enabled: self.audio.enabled,
            beeps: self.audio.beeps,
        }
    }

    pub fn speech_timeout(&self) -> Duration {
        Duration::from_millis(self.audio.speech_timeout_ms)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default config");
            Self::default()
        })
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<u64>() {
        Some(serde_json::Value::Number(n.into()))
    } else {
        value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, v, out);
            }
        }
        serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.interval, IntervalConfig::default());
        assert_eq!(cfg.interval.work_secs, 40);
        assert_eq!(cfg.interval.total_cycles, 8);
        assert!(cfg.audio.enabled);
        assert!(cfg.audio.beeps);
        assert_eq!(cfg.audio.speech_timeout_ms, 2000);
        assert!(cfg.audio.tts_endpoint.is_none());
        assert!(cfg.profile.body_weight_kg.is_none());
        assert_eq!(cfg.variant_catalog().len(), 6);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(indoc! {r#"
            [interval]
            work_secs = 30

            [audio]
            beeps = false
        "#})
        .unwrap();
        assert_eq!(cfg.interval.work_secs, 30);
        assert_eq!(cfg.interval.rest_secs, 20);
        assert!(!cfg.audio.beeps);
        assert!(cfg.audio.enabled);
        assert_eq!(cfg.script.cues, CueScript::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("audio.beeps").as_deref(), Some("true"));
        assert_eq!(cfg.get("interval.work_secs").as_deref(), Some("40"));
        assert_eq!(cfg.get("script.cues.paused").as_deref(), Some("Paused."));
        assert!(cfg.get("audio.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("audio.beeps", "false").unwrap();
        cfg.set("interval.rest_secs", "15").unwrap();
        cfg.set("audio.duck_ratio", "0.5").unwrap();
        cfg.set("script.cues.paused", "Hold it.").unwrap();
        assert!(!cfg.audio.beeps);
        assert_eq!(cfg.interval.rest_secs, 15);
        assert!((cfg.audio.duck_ratio - 0.5).abs() < f32::EPSILON);
        assert_eq!(cfg.script.cues.paused, "Hold it.");
    }

    #[test]
    fn set_fills_unset_optionals() {
        let mut cfg = Config::default();
        cfg.set("profile.body_weight_kg", "82.5").unwrap();
        assert_eq!(cfg.profile.body_weight_kg, Some(82.5));

        cfg.set("audio.tts_endpoint", "https://tts.example.com/v1/speech")
            .unwrap();
        assert_eq!(
            cfg.audio.tts_endpoint.as_ref().map(Url::as_str),
            Some("https://tts.example.com/v1/speech")
        );
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("audio.nonexistent_key", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let err = cfg.set("audio.beeps", "not_a_bool").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = cfg.set("interval.work_secs", "-4").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn empty_variant_list_is_rejected() {
        let result: Result<Config, _> = toml::from_str(indoc! {r#"
            [script]
            variants = []
        "#});
        assert!(result.is_err());
    }

    #[test]
    fn interval_config_is_validated() {
        let mut cfg = Config::default();
        cfg.interval.total_cycles = 0;
        assert_eq!(
            cfg.interval_config(),
            Err(ValidationError::NonPositive {
                field: "total_cycles"
            })
        );
    }

    #[test]
    fn entries_lists_leaf_keys() {
        let entries = Config::default().entries();
        assert!(entries
            .iter()
            .any(|(k, v)| k == "interval.cooldown_secs" && v == "60"));
        assert!(entries.iter().any(|(k, _)| k == "script.cues.warmup.label"));
    }
}
