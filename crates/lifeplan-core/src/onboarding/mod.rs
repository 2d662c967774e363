//! First-run onboarding: a five-step wizard followed by a chain of modals.
//!
//! [`OnboardingCoordinator`] owns the flow. Step content (focus templates,
//! the System Hierarchy, the signup form, the welcome carousel) lives in the
//! submodules and is mounted by the coordinator as the user moves through.

mod coordinator;
mod focus;
mod hierarchy;
mod signup;
mod state;
mod steps;

pub use coordinator::{BackDisposition, Handoff, OnboardingCoordinator, Outcome, RejectReason};
pub use focus::{default_direction, Focus, FALLBACK_DIRECTION};
pub use hierarchy::{HierarchyKind, ItemEditState, SystemHierarchy, TitledEntry};
pub use signup::{is_valid_email, SignupField, SignupForm, MIN_PASSWORD_LEN};
pub use state::{
    load_status, FlowPhase, LifeDirection, Modal, ModalFlags, OnboardingState, OnboardingStatus,
    TokenGrant, UserProfile, WELCOME_TOKEN_GRANT,
};
pub use steps::{
    framework_layers, why_it_works, FrameworkLayer, OnboardingStep, Slide, WelcomeCarousel,
};
