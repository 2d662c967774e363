//! In-memory onboarding state and the records the flow persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::focus::{default_direction, Focus};
use super::steps::OnboardingStep;
use crate::storage::{keys, load_json, KeyValueStore};

/// Tokens granted when the user claims the welcome bonus.
pub const WELCOME_TOKEN_GRANT: u32 = 100;

/// Full-screen overlays shown after the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    Badge,
    AiSignup,
    Tutorial,
}

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum FlowPhase {
    Step(OnboardingStep),
    Badge,
    AiSignup,
    Tutorial,
    Done,
}

impl FlowPhase {
    pub fn modal(&self) -> Option<Modal> {
        match self {
            FlowPhase::Badge => Some(Modal::Badge),
            FlowPhase::AiSignup => Some(Modal::AiSignup),
            FlowPhase::Tutorial => Some(Modal::Tutorial),
            FlowPhase::Step(_) | FlowPhase::Done => None,
        }
    }
}

/// Overlay visibility. `show_ai_signup` and `show_tutorial` are never both set;
/// the badge and its confetti may be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalFlags {
    pub show_badge: bool,
    pub show_confetti: bool,
    pub show_ai_signup: bool,
    pub show_tutorial: bool,
}

impl ModalFlags {
    pub fn any(&self) -> bool {
        self.show_badge || self.show_confetti || self.show_ai_signup || self.show_tutorial
    }
}

/// Life direction statement.
///
/// Follows the focus template until the user edits it, then keeps the user's
/// text until [`LifeDirection::reset`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeDirection {
    text: String,
    edited: bool,
}

impl LifeDirection {
    pub fn new(focus: Option<Focus>) -> Self {
        Self {
            text: default_direction(focus),
            edited: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Re-derive from the focus unless the user has taken over.
    pub fn follow_focus(&mut self, focus: Option<Focus>) {
        if !self.edited {
            self.text = default_direction(focus);
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.edited = true;
    }

    pub fn reset(&mut self, focus: Option<Focus>) {
        self.edited = false;
        self.follow_focus(focus);
    }
}

/// State owned by the coordinator for one flow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingState {
    pub step: OnboardingStep,
    pub focus: Option<Focus>,
    pub life_direction: LifeDirection,
    pub modals: ModalFlags,
    pub tokens_claimed: bool,
    pub is_navigating: bool,
    pub done: bool,
}

impl OnboardingState {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::Welcome,
            focus: None,
            life_direction: LifeDirection::new(None),
            modals: ModalFlags::default(),
            tokens_claimed: false,
            is_navigating: false,
            done: false,
        }
    }

    pub fn step_index(&self) -> usize {
        self.step.index()
    }

    pub fn phase(&self) -> FlowPhase {
        if self.done {
            FlowPhase::Done
        } else if self.modals.show_tutorial {
            FlowPhase::Tutorial
        } else if self.modals.show_ai_signup {
            FlowPhase::AiSignup
        } else if self.modals.show_badge {
            FlowPhase::Badge
        } else {
            FlowPhase::Step(self.step)
        }
    }
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Profile stub written when the wizard completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub focus: Option<Focus>,
    pub life_direction: String,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// AI assistant token balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub balance: u32,
    pub claimed_at: DateTime<Utc>,
}

/// What the app needs at launch to decide whether to show onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub completed: bool,
    pub life_direction: Option<String>,
    pub profile: Option<UserProfile>,
    pub ai_signup_completed: bool,
    pub tokens: Option<TokenGrant>,
}

/// Read the persisted onboarding outcome. Unreadable keys count as absent.
pub async fn load_status(store: &dyn KeyValueStore) -> OnboardingStatus {
    async fn read<T: serde::de::DeserializeOwned>(
        store: &dyn KeyValueStore,
        key: &str,
    ) -> Option<T> {
        match load_json(store, key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable onboarding key");
                None
            }
        }
    }

    OnboardingStatus {
        completed: read::<bool>(store, keys::ONBOARDING_COMPLETED)
            .await
            .unwrap_or(false),
        life_direction: read(store, keys::LIFE_DIRECTION).await,
        profile: read(store, keys::USER_PROFILE).await,
        ai_signup_completed: read::<bool>(store, keys::AI_SIGNUP_COMPLETED)
            .await
            .unwrap_or(false),
        tokens: read(store, keys::AI_ASSISTANT_TOKENS).await,
    }
}
