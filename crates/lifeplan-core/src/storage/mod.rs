//! Persistence seam.
//!
//! Every screen talks to storage through [`KeyValueStore`]: an async,
//! string-keyed store of JSON values. Each component owns a disjoint set of
//! keys (see [`keys`]) and every write is a full-value overwrite.

mod config;
mod database;
mod memory;

pub use config::{AnimationConfig, Config, DeviceConfig, NotificationsConfig, ReferralConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StoreError};

/// Storage keys used across the app.
pub mod keys {
    pub const USER_PROFILE: &str = "userProfile";
    pub const LIFE_DIRECTION: &str = "lifeDirection";
    pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
    pub const AI_SIGNUP_COMPLETED: &str = "aiSignupCompleted";
    pub const AI_ASSISTANT_TOKENS: &str = "aiAssistantTokens";
    pub const STREAK_DATA: &str = "streakData";
    pub const REFERRAL_PROGRAM: &str = "referralProgram";
    pub const WIDGET_DATA_PREFIX: &str = "widget_data_";

    /// Key of the snapshot mirrored for a home-screen widget.
    pub fn widget_data(widget_id: &str) -> String {
        format!("{WIDGET_DATA_PREFIX}{widget_id}")
    }
}

/// Async key-value store holding JSON strings.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a raw value. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a raw value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and deserialize a JSON value.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Malformed {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw).await
}

/// Returns the data directory, creating it if needed.
///
/// `LIFEPLAN_HOME` overrides the location outright. Otherwise the directory is
/// `~/.config/lifeplan`, or `~/.config/lifeplan-dev` when `LIFEPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("LIFEPLAN_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LIFEPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lifeplan-dev")
            } else {
                base_dir.join("lifeplan")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
