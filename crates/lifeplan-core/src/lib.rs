//! # Lifeplan Core Library
//!
//! This library provides the client-side logic of the Lifeplan life-planning
//! app. Every operation is also reachable from the standalone `lifeplan` CLI,
//! which drives the same state machines headlessly.
//!
//! ## Architecture
//!
//! - **Onboarding**: a five-step wizard, then a badge, an AI signup offer and a
//!   tutorial, handed off to the main app exactly once
//! - **Storage**: an async key-value store (SQLite or in-memory) holding JSON
//!   values, plus TOML configuration
//! - **Animation**: transitions are awaited through an injected driver so state
//!   is committed only after the animation finishes
//! - **Timers**: confetti, carousel, toasts and the typewriter are wall-clock
//!   driven; the caller ticks them
//!
//! ## Key Components
//!
//! - [`OnboardingCoordinator`]: onboarding state machine
//! - [`SystemHierarchy`]: direction/goal/project/tasks editor with save-all
//! - [`StreakTracker`]: daily check-ins and the habit checklist
//! - [`NotificationRegistry`]: ephemeral toasts
//! - [`KeyValueStore`]: persistence seam

pub mod animation;
pub mod error;
pub mod events;
pub mod links;
pub mod notifications;
pub mod onboarding;
pub mod referral;
pub mod storage;
pub mod streak;
pub mod todo_input;
pub mod typing;

pub use animation::{Animation, AnimationDriver, MotionProfile, RecordingDriver, TimedDriver};
pub use error::{ConfigError, CoreError, Result, StoreError, ValidationError};
pub use events::Event;
pub use links::{open_link, LinkOpener, LinkOutcome, SystemLinkOpener};
pub use notifications::{
    Notification, NotificationKind, NotificationOptions, NotificationRegistry, TodoToastView,
};
pub use onboarding::{
    BackDisposition, FlowPhase, Focus, HierarchyKind, OnboardingCoordinator, OnboardingStep,
    Outcome, SystemHierarchy,
};
pub use referral::{ReferralError, ReferralProgram};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
pub use streak::{StreakRecord, StreakTracker};
pub use todo_input::{TodoDraft, TodoInput};
pub use typing::{Typewriter, TypingState};
