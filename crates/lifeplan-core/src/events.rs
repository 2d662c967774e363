use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::onboarding::{Focus, HierarchyKind, Modal, OnboardingStep, RejectReason};

/// Every state change in the system produces an Event.
/// The UI drains them after each action; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StepAdvanced {
        from: OnboardingStep,
        to: OnboardingStep,
        at: DateTime<Utc>,
    },
    StepRetreated {
        from: OnboardingStep,
        to: OnboardingStep,
        at: DateTime<Utc>,
    },
    /// Continue was pressed but the step is not ready.
    ContinueRejected {
        step: OnboardingStep,
        reason: RejectReason,
        at: DateTime<Utc>,
    },
    FocusSelected {
        focus: Focus,
        at: DateTime<Utc>,
    },
    HierarchySaved {
        committed: Vec<HierarchyKind>,
        at: DateTime<Utc>,
    },
    OnboardingCompleted {
        life_direction: String,
        at: DateTime<Utc>,
    },
    ModalShown {
        modal: Modal,
        at: DateTime<Utc>,
    },
    ModalClosed {
        modal: Modal,
        at: DateTime<Utc>,
    },
    ConfettiStarted {
        at: DateTime<Utc>,
    },
    TokensClaimed {
        amount: u32,
        at: DateTime<Utc>,
    },
    AiSignupFinished {
        signed_up: bool,
        at: DateTime<Utc>,
    },
    OnboardingSkipped {
        from: OnboardingStep,
        life_direction: String,
        at: DateTime<Utc>,
    },
    /// Control handed to the main app. Emitted once per flow.
    NavigationHandoff {
        at: DateTime<Utc>,
    },
    StreakCheckedIn {
        date: NaiveDate,
        current_streak: u32,
        longest_streak: u32,
        at: DateTime<Utc>,
    },
    MilestoneReached {
        milestone: u32,
        at: DateTime<Utc>,
    },
}
