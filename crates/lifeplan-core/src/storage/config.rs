//! TOML-based application configuration.
//!
//! Stores:
//! - Device capability (low-end devices get lighter animations)
//! - Animation timings for the onboarding flow
//! - Notification defaults
//! - Referral share link base
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Device capability, read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub low_end: bool,
}

/// Animation timings in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_step_transition_ms")]
    pub step_transition_ms: u64,
    #[serde(default = "default_modal_fade_ms")]
    pub modal_fade_ms: u64,
    #[serde(default = "default_confetti_delay_ms")]
    pub confetti_delay_ms: u64,
    #[serde(default = "default_hierarchy_stagger_ms")]
    pub hierarchy_stagger_ms: u64,
    #[serde(default = "default_hierarchy_reveal_ms")]
    pub hierarchy_reveal_ms: u64,
    #[serde(default = "default_save_pulse_ms")]
    pub save_pulse_ms: u64,
    #[serde(default = "default_shake_ms")]
    pub shake_ms: u64,
    #[serde(default = "default_typing_interval_ms")]
    pub typing_interval_ms: u64,
    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_notification_duration_ms")]
    pub default_duration_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub referral: ReferralConfig,
}

fn default_step_transition_ms() -> u64 {
    400
}
fn default_modal_fade_ms() -> u64 {
    300
}
fn default_confetti_delay_ms() -> u64 {
    500
}
fn default_hierarchy_stagger_ms() -> u64 {
    200
}
fn default_hierarchy_reveal_ms() -> u64 {
    600
}
fn default_save_pulse_ms() -> u64 {
    250
}
fn default_shake_ms() -> u64 {
    350
}
fn default_typing_interval_ms() -> u64 {
    30
}
fn default_carousel_interval_ms() -> u64 {
    4000
}
fn default_notification_duration_ms() -> i64 {
    3000
}
fn default_share_base_url() -> String {
    "https://lifeplan.app/invite".into()
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_transition_ms: default_step_transition_ms(),
            modal_fade_ms: default_modal_fade_ms(),
            confetti_delay_ms: default_confetti_delay_ms(),
            hierarchy_stagger_ms: default_hierarchy_stagger_ms(),
            hierarchy_reveal_ms: default_hierarchy_reveal_ms(),
            save_pulse_ms: default_save_pulse_ms(),
            shake_ms: default_shake_ms(),
            typing_interval_ms: default_typing_interval_ms(),
            carousel_interval_ms: default_carousel_interval_ms(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_notification_duration_ms(),
        }
    }
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            share_base_url: default_share_base_url(),
        }
    }
}

impl ReferralConfig {
    /// Parsed share base URL.
    pub fn share_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.share_base_url).map_err(|e| ConfigError::InvalidValue {
            key: "referral.share_base_url".to_string(),
            message: e.to_string(),
        })
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
        key.split('.').try_fold(root, |current, part| current.get(part))
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

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut parent = root;
        if let Some(path) = parent_path {
            for part in path.split('.') {
                parent = parent.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = parent.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<i64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) => return Err(unknown()),
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
