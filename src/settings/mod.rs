//! Live retrieval/generation settings and the snapshot taken at submit time.
//!
//! [`Settings`] is the mutable record the presentation layer edits.
//! [`ConfigurationSnapshot`] is an owned copy frozen when a question is
//! submitted, so edits made while a request is in flight only apply to the
//! next one.

pub mod models;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{SettingsError, SettingsResult};

pub use models::{ModelOption, CHAT_MODELS, EMBEDDER_MODELS};

/// Allowed range for `embedding_dim`.
pub const EMBEDDING_DIM_RANGE: (u32, u32) = (1, 4096);
/// Allowed range for the three top-k settings.
pub const TOP_K_RANGE: (u32, u32) = (1, 100);
/// Allowed range for `max_length`.
pub const MAX_LENGTH_RANGE: (u32, u32) = (1, 32768);
/// Allowed range for thresholds and temperature.
pub const UNIT_RANGE: (f64, f64) = (0.0, 1.0);

/// Live settings, editable at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: String,
    pub embedder_model: String,
    pub embedding_dim: u32,
    pub top_k_chunks: u32,
    pub top_k_rules: u32,
    pub top_k_situations: u32,
    pub threshold: f64,
    pub situation_threshold: f64,
    pub temperature: f64,
    pub max_length: u32,
    pub debug_mode: bool,
}

/// Immutable copy of [`Settings`] taken when a question is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    pub model: String,
    pub embedder_model: String,
    pub embedding_dim: u32,
    pub top_k_chunks: u32,
    pub top_k_rules: u32,
    pub top_k_situations: u32,
    pub threshold: f64,
    pub situation_threshold: f64,
    pub temperature: f64,
    pub max_length: u32,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_CHAT_MODEL.to_string(),
            embedder_model: models::DEFAULT_EMBEDDER_MODEL.to_string(),
            embedding_dim: 384,
            top_k_chunks: 10,
            top_k_rules: 3,
            top_k_situations: 2,
            threshold: 0.6,
            situation_threshold: 0.8,
            temperature: 0.0,
            max_length: 4096,
            debug_mode: false,
        }
    }
}

/// Name of a single tunable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingName {
    Model,
    EmbedderModel,
    EmbeddingDim,
    TopKChunks,
    TopKRules,
    TopKSituations,
    Threshold,
    SituationThreshold,
    Temperature,
    MaxLength,
    Debug,
}

impl SettingName {
    /// Every setting, in display order.
    pub const ALL: [SettingName; 11] = [
        SettingName::Model,
        SettingName::EmbedderModel,
        SettingName::EmbeddingDim,
        SettingName::TopKChunks,
        SettingName::TopKRules,
        SettingName::TopKSituations,
        SettingName::Threshold,
        SettingName::SituationThreshold,
        SettingName::Temperature,
        SettingName::MaxLength,
        SettingName::Debug,
    ];

    /// Name as typed by users; matches the request field where one exists.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingName::Model => "gpt_model",
            SettingName::EmbedderModel => "embedder_model_name",
            SettingName::EmbeddingDim => "embedding_dim",
            SettingName::TopKChunks => "top_k_chunks",
            SettingName::TopKRules => "top_k_rules",
            SettingName::TopKSituations => "top_k_situations",
            SettingName::Threshold => "threshold",
            SettingName::SituationThreshold => "situation_threshold",
            SettingName::Temperature => "temperature",
            SettingName::MaxLength => "max_length",
            SettingName::Debug => "debug",
        }
    }
}

impl fmt::Display for SettingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingName {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SettingName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| SettingsError::UnknownSetting {
                name: s.to_string(),
            })
    }
}

impl Settings {
    /// Freeze the current values into a snapshot.
    pub fn capture(&self) -> ConfigurationSnapshot {
        ConfigurationSnapshot {
            model: self.model.clone(),
            embedder_model: self.embedder_model.clone(),
            embedding_dim: self.embedding_dim,
            top_k_chunks: self.top_k_chunks,
            top_k_rules: self.top_k_rules,
            top_k_situations: self.top_k_situations,
            threshold: self.threshold,
            situation_threshold: self.situation_threshold,
            temperature: self.temperature,
            max_length: self.max_length,
            debug_mode: self.debug_mode,
        }
    }

    /// Parse `raw` for the named setting and apply it.
    ///
    /// A rejected value leaves the settings untouched.
    pub fn update(&mut self, name: SettingName, raw: &str) -> SettingsResult<()> {
        let raw = raw.trim();
        match name {
            SettingName::Model => {
                let model = parse_model(name, raw)?;
                if !models::is_known_chat_model(&model) {
                    warn!(model = %model, "Chat model is not in the catalog");
                }
                self.model = model;
            }
            SettingName::EmbedderModel => {
                let model = parse_model(name, raw)?;
                if !models::is_known_embedder_model(&model) {
                    warn!(model = %model, "Embedder model is not in the catalog");
                }
                self.embedder_model = model;
            }
            SettingName::EmbeddingDim => {
                self.embedding_dim = parse_bounded_int(name, raw, EMBEDDING_DIM_RANGE)?
            }
            SettingName::TopKChunks => {
                self.top_k_chunks = parse_bounded_int(name, raw, TOP_K_RANGE)?
            }
            SettingName::TopKRules => self.top_k_rules = parse_bounded_int(name, raw, TOP_K_RANGE)?,
            SettingName::TopKSituations => {
                self.top_k_situations = parse_bounded_int(name, raw, TOP_K_RANGE)?
            }
            SettingName::Threshold => self.threshold = parse_unit_float(name, raw)?,
            SettingName::SituationThreshold => {
                self.situation_threshold = parse_unit_float(name, raw)?
            }
            SettingName::Temperature => self.temperature = parse_unit_float(name, raw)?,
            SettingName::MaxLength => {
                self.max_length = parse_bounded_int(name, raw, MAX_LENGTH_RANGE)?
            }
            SettingName::Debug => self.debug_mode = parse_flag(name, raw)?,
        }
        Ok(())
    }

    /// Current value of a setting, rendered as text.
    pub fn value_of(&self, name: SettingName) -> String {
        match name {
            SettingName::Model => self.model.clone(),
            SettingName::EmbedderModel => self.embedder_model.clone(),
            SettingName::EmbeddingDim => self.embedding_dim.to_string(),
            SettingName::TopKChunks => self.top_k_chunks.to_string(),
            SettingName::TopKRules => self.top_k_rules.to_string(),
            SettingName::TopKSituations => self.top_k_situations.to_string(),
            SettingName::Threshold => self.threshold.to_string(),
            SettingName::SituationThreshold => self.situation_threshold.to_string(),
            SettingName::Temperature => self.temperature.to_string(),
            SettingName::MaxLength => self.max_length.to_string(),
            SettingName::Debug => self.debug_mode.to_string(),
        }
    }
}

fn parse_model(name: SettingName, raw: &str) -> SettingsResult<String> {
    if raw.is_empty() {
        return Err(SettingsError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            reason: "model name cannot be empty".to_string(),
        });
    }
    Ok(raw.to_string())
}

fn parse_bounded_int(name: SettingName, raw: &str, (min, max): (u32, u32)) -> SettingsResult<u32> {
    let value: i64 = raw.parse().map_err(|_| SettingsError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: "expected an integer".to_string(),
    })?;
    if value < i64::from(min) || value > i64::from(max) {
        return Err(SettingsError::OutOfRange {
            name: name.to_string(),
            value: raw.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value as u32)
}

fn parse_unit_float(name: SettingName, raw: &str) -> SettingsResult<f64> {
    let value: f64 = raw.parse().map_err(|_| SettingsError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: "expected a number".to_string(),
    })?;
    let (min, max) = UNIT_RANGE;
    // NaN fails both comparisons, so check finiteness explicitly.
    if !value.is_finite() || value < min || value > max {
        return Err(SettingsError::OutOfRange {
            name: name.to_string(),
            value: raw.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

fn parse_flag(name: SettingName, raw: &str) -> SettingsResult<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            reason: "expected true/false or on/off".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.embedder_model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(settings.embedding_dim, 384);
        assert_eq!(settings.top_k_chunks, 10);
        assert_eq!(settings.top_k_rules, 3);
        assert_eq!(settings.top_k_situations, 2);
        assert!((settings.threshold - 0.6).abs() < f64::EPSILON);
        assert!((settings.situation_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(settings.temperature, 0.0);
        assert_eq!(settings.max_length, 4096);
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_capture_copies_every_field() {
        let settings = Settings {
            model: "gpt-4o".to_string(),
            embedder_model: "custom/embedder".to_string(),
            embedding_dim: 768,
            top_k_chunks: 20,
            top_k_rules: 5,
            top_k_situations: 4,
            threshold: 0.5,
            situation_threshold: 0.7,
            temperature: 0.3,
            max_length: 1024,
            debug_mode: true,
        };
        let snapshot = settings.capture();
        assert_eq!(snapshot.model, "gpt-4o");
        assert_eq!(snapshot.embedder_model, "custom/embedder");
        assert_eq!(snapshot.embedding_dim, 768);
        assert_eq!(snapshot.top_k_chunks, 20);
        assert_eq!(snapshot.top_k_rules, 5);
        assert_eq!(snapshot.top_k_situations, 4);
        assert_eq!(snapshot.threshold, 0.5);
        assert_eq!(snapshot.situation_threshold, 0.7);
        assert_eq!(snapshot.temperature, 0.3);
        assert_eq!(snapshot.max_length, 1024);
        assert!(snapshot.debug_mode);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_updates() {
        let mut settings = Settings::default();
        let snapshot = settings.capture();

        settings.update(SettingName::TopKRules, "50").unwrap();
        settings.update(SettingName::Model, "gpt-4o").unwrap();
        settings.update(SettingName::Debug, "on").unwrap();

        assert_eq!(snapshot.top_k_rules, 3);
        assert_eq!(snapshot.model, "gpt-4o-mini");
        assert!(!snapshot.debug_mode);
    }

    #[test]
    fn test_setting_name_round_trip() {
        for name in SettingName::ALL {
            assert_eq!(name.as_str().parse::<SettingName>().unwrap(), name);
        }
    }

    #[test]
    fn test_setting_name_accepts_dashes_and_case() {
        assert_eq!("Top-K-Rules".parse::<SettingName>().unwrap(), SettingName::TopKRules);
    }

    #[test]
    fn test_setting_name_unknown() {
        let err = "font_size".parse::<SettingName>().unwrap_err();
        assert_eq!(
            err,
            SettingsError::UnknownSetting {
                name: "font_size".to_string()
            }
        );
    }

    #[test]
    fn test_update_integer_bounds() {
        let mut settings = Settings::default();
        settings.update(SettingName::TopKChunks, "100").unwrap();
        assert_eq!(settings.top_k_chunks, 100);

        let err = settings.update(SettingName::TopKChunks, "101").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { .. }));
        assert_eq!(settings.top_k_chunks, 100);

        let err = settings.update(SettingName::TopKSituations, "0").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { .. }));
        assert_eq!(settings.top_k_situations, 2);

        let err = settings.update(SettingName::MaxLength, "-5").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { .. }));

        settings.update(SettingName::MaxLength, "32768").unwrap();
        assert_eq!(settings.max_length, 32768);
    }

    #[test]
    fn test_update_integer_rejects_fractions() {
        let mut settings = Settings::default();
        let err = settings.update(SettingName::EmbeddingDim, "3.5").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert_eq!(settings.embedding_dim, 384);
    }

    #[test]
    fn test_update_unit_floats() {
        let mut settings = Settings::default();
        settings.update(SettingName::Temperature, "0.25").unwrap();
        assert_eq!(settings.temperature, 0.25);

        settings.update(SettingName::Threshold, "1").unwrap();
        assert_eq!(settings.threshold, 1.0);

        let err = settings.update(SettingName::SituationThreshold, "1.01").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { .. }));

        let err = settings.update(SettingName::Temperature, "NaN").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { .. }));
        assert_eq!(settings.temperature, 0.25);

        let err = settings.update(SettingName::Temperature, "warm").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
    }

    #[test]
    fn test_update_debug_flag() {
        let mut settings = Settings::default();
        settings.update(SettingName::Debug, "ON").unwrap();
        assert!(settings.debug_mode);
        settings.update(SettingName::Debug, "false").unwrap();
        assert!(!settings.debug_mode);
        assert!(settings.update(SettingName::Debug, "maybe").is_err());
    }

    #[test]
    fn test_update_model_accepts_uncatalogued_but_not_empty() {
        let mut settings = Settings::default();
        settings.update(SettingName::Model, "gpt-4.1").unwrap();
        assert_eq!(settings.model, "gpt-4.1");

        let err = settings.update(SettingName::Model, "   ").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert_eq!(settings.model, "gpt-4.1");
    }

    #[test]
    fn test_value_of() {
        let settings = Settings::default();
        assert_eq!(settings.value_of(SettingName::Model), "gpt-4o-mini");
        assert_eq!(settings.value_of(SettingName::TopKRules), "3");
        assert_eq!(settings.value_of(SettingName::Threshold), "0.6");
        assert_eq!(settings.value_of(SettingName::Debug), "false");
    }
}
