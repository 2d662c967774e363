//! Invite-a-friend referral program.
//!
//! Entirely local: a generated code, a share link built from it, and a share
//! counter. Friend codes are checked for shape only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::links::{open_link, LinkOpener, LinkOutcome};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

pub const CODE_LEN: usize = 8;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferralError {
    #[error("Referral codes are 8 letters or numbers")]
    InvalidFormat,

    #[error("You can't use your own referral code")]
    OwnCode,

    #[error("You've already used a referral code")]
    AlreadyRedeemed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralState {
    pub code: String,
    pub shares: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub redeemed_code: Option<String>,
}

impl ReferralState {
    fn fresh() -> Self {
        Self {
            code: generate_code(&mut rand::thread_rng()),
            shares: 0,
            created_at: Utc::now(),
            redeemed_code: None,
        }
    }
}

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase user input.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

pub struct ReferralProgram {
    store: Arc<dyn KeyValueStore>,
    opener: Arc<dyn LinkOpener>,
    base_url: Url,
    state: ReferralState,
}

impl ReferralProgram {
    /// Load the stored program, creating (and saving) a code on first use.
    ///
    /// If the stored value cannot be read, a temporary code is used and the
    /// stored value is left alone.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        opener: Arc<dyn LinkOpener>,
        base_url: Url,
    ) -> Self {
        let state = match load_json::<ReferralState>(store.as_ref(), keys::REFERRAL_PROGRAM).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                let state = ReferralState::fresh();
                if let Err(e) = save_json(store.as_ref(), keys::REFERRAL_PROGRAM, &state).await {
                    tracing::warn!(error = %e, "failed to save new referral code");
                }
                state
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load referral program; using a temporary code");
                ReferralState::fresh()
            }
        };
        Self {
            store,
            opener,
            base_url,
            state,
        }
    }

    pub fn state(&self) -> &ReferralState {
        &self.state
    }

    pub fn code(&self) -> &str {
        &self.state.code
    }

    pub fn shares(&self) -> u32 {
        self.state.shares
    }

    pub fn share_link(&self) -> Url {
        let mut link = self.base_url.clone();
        link.query_pairs_mut().append_pair("code", &self.state.code);
        link
    }

    pub fn share_message(&self) -> String {
        format!(
            "I'm designing my life with Lifeplan. Join me with my code {}: {}",
            self.state.code,
            self.share_link()
        )
    }

    /// Count a share and open the share link.
    pub async fn share(&mut self) -> LinkOutcome {
        self.state.shares = self.state.shares.saturating_add(1);
        self.persist().await;
        open_link(self.opener.as_ref(), &self.share_link())
    }

    /// Check a code a friend gave us. Returns the normalized code.
    pub fn validate_friend_code(&self, entered: &str) -> Result<String, ReferralError> {
        let code = normalize_code(entered);
        if !is_valid_code(&code) {
            return Err(ReferralError::InvalidFormat);
        }
        if code == self.state.code {
            return Err(ReferralError::OwnCode);
        }
        Ok(code)
    }

    /// Remember a friend's code. Only one can ever be redeemed.
    pub async fn redeem(&mut self, entered: &str) -> Result<String, ReferralError> {
        if self.state.redeemed_code.is_some() {
            return Err(ReferralError::AlreadyRedeemed);
        }
        let code = self.validate_friend_code(entered)?;
        self.state.redeemed_code = Some(code.clone());
        self.persist().await;
        Ok(code)
    }

    async fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::REFERRAL_PROGRAM, &self.state).await {
            tracing::warn!(error = %e, "failed to persist referral program");
        }
    }
}
