//! Onboarding step coordinator.
//!
//! Owns the wizard position, the overlay flags and the mounted step content,
//! and sequences every transition through the animation driver.
//!
//! ## State Transitions
//!
//! ```text
//! Step0 -> Step1 -> Step2 -> Step3 -> Step4 -> Badge -> AiSignup -> Tutorial -> Done
//!            \________\________\____________________________________________/ (skip)
//! ```
//!
//! Transitions that animate commit their new state only after the animation
//! future resolves. The coordinator is driven through `&mut self`, so two
//! actions can never interleave; the guard flags make a repeated action (a
//! double tap) a no-op instead of a second write.
//!
//! ## Usage
//!
//! ```ignore
//! let (mut flow, handoff) = OnboardingCoordinator::new(store, driver, motion);
//! flow.continue_step().await;
//! // In the UI loop:
//! flow.tick();
//! for event in flow.drain_events() { /* render */ }
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::focus::{default_direction, Focus};
use super::hierarchy::{HierarchyKind, SystemHierarchy};
use super::signup::SignupForm;
use super::state::{
    FlowPhase, Modal, OnboardingState, TokenGrant, UserProfile, WELCOME_TOKEN_GRANT,
};
use super::steps::{OnboardingStep, WelcomeCarousel};
use crate::animation::{play_staggered, Animation, AnimationDriver, MotionProfile};
use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Resolves once, when the flow hands control to the main app.
pub type Handoff = oneshot::Receiver<()>;

/// Why Continue did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No focus picked on the focus selection step.
    FocusRequired,
    /// System Hierarchy has unsaved or edited items.
    HierarchyUnsaved,
    /// Signup form has inline errors.
    InvalidSignup,
}

/// Result of a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The flow moved to a new phase.
    Moved(FlowPhase),
    /// State changed without moving.
    Updated,
    /// Refused; the UI should show feedback.
    Rejected(RejectReason),
    /// Not applicable in the current phase, or a repeat of a finished action.
    Ignored,
}

/// Answer to the platform back button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackDisposition {
    /// Consumed by the flow.
    Handled,
    /// Let the platform handle it.
    NotHandled,
}

pub struct OnboardingCoordinator {
    store: Arc<dyn KeyValueStore>,
    driver: Arc<dyn AnimationDriver>,
    motion: MotionProfile,
    state: OnboardingState,
    hierarchy: Option<SystemHierarchy>,
    carousel: Option<WelcomeCarousel>,
    signup: SignupForm,
    confetti_due: Option<Instant>,
    handoff: Option<oneshot::Sender<()>>,
    events: Vec<Event>,
}

impl OnboardingCoordinator {
    /// Mount a new flow on the welcome step.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        driver: Arc<dyn AnimationDriver>,
        motion: MotionProfile,
    ) -> (Self, Handoff) {
        let (tx, rx) = oneshot::channel();
        let carousel = WelcomeCarousel::new(motion.carousel_interval, Instant::now().into_std());
        let flow = Self {
            store,
            driver,
            motion,
            state: OnboardingState::new(),
            hierarchy: None,
            carousel: Some(carousel),
            signup: SignupForm::new(),
            confetti_due: None,
            handoff: Some(tx),
            events: Vec::new(),
        };
        (flow, rx)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn phase(&self) -> FlowPhase {
        self.state.phase()
    }

    pub fn step(&self) -> OnboardingStep {
        self.state.step
    }

    pub fn life_direction(&self) -> &str {
        self.state.life_direction.text()
    }

    /// Mounted only while the System Hierarchy step is shown.
    pub fn hierarchy(&self) -> Option<&SystemHierarchy> {
        self.hierarchy.as_ref()
    }

    pub fn hierarchy_mut(&mut self) -> Option<&mut SystemHierarchy> {
        self.hierarchy.as_mut()
    }

    /// Mounted only while the welcome step is shown.
    pub fn carousel(&self) -> Option<&WelcomeCarousel> {
        self.carousel.as_ref()
    }

    pub fn signup(&self) -> &SignupForm {
        &self.signup
    }

    pub fn signup_mut(&mut self) -> &mut SignupForm {
        &mut self.signup
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Step content ─────────────────────────────────────────────────

    /// Pick a focus. Only meaningful on the focus selection step.
    pub fn select_focus(&mut self, focus: Focus) -> Outcome {
        if self.phase() != FlowPhase::Step(OnboardingStep::FocusSelection) {
            return Outcome::Ignored;
        }
        self.state.focus = Some(focus);
        self.state.life_direction.follow_focus(Some(focus));
        self.events.push(Event::FocusSelected {
            focus,
            at: Utc::now(),
        });
        Outcome::Updated
    }

    pub fn edit_life_direction(&mut self, text: impl Into<String>) -> Outcome {
        if self.state.done {
            return Outcome::Ignored;
        }
        self.state.life_direction.edit(text);
        Outcome::Updated
    }

    pub fn reset_life_direction(&mut self) -> Outcome {
        if self.state.done {
            return Outcome::Ignored;
        }
        self.state.life_direction.reset(self.state.focus);
        Outcome::Updated
    }

    /// Save one hierarchy item. `Ok(false)` when nothing needed saving or the
    /// step is not mounted.
    pub fn save_hierarchy_item(&mut self, kind: HierarchyKind) -> Result<bool, ValidationError> {
        match self.hierarchy.as_mut() {
            Some(hierarchy) => hierarchy.save(kind),
            None => Ok(false),
        }
    }

    /// Run the save-all reconciler on the mounted hierarchy.
    pub async fn save_all(&mut self) -> Vec<HierarchyKind> {
        let Some(hierarchy) = self.hierarchy.as_mut() else {
            return Vec::new();
        };
        let committed = hierarchy.save_all(self.driver.as_ref(), &self.motion).await;
        self.events.push(Event::HierarchySaved {
            committed: committed.clone(),
            at: Utc::now(),
        });
        committed
    }

    // ── Wizard navigation ────────────────────────────────────────────

    /// Continue from the current step; from the last step this completes the
    /// wizard.
    pub async fn continue_step(&mut self) -> Outcome {
        let FlowPhase::Step(step) = self.phase() else {
            return Outcome::Ignored;
        };
        let Some(next) = step.next() else {
            return self.complete_onboarding().await;
        };

        if let Some(reason) = self.continue_blocker(step) {
            debug!(?step, ?reason, "continue rejected");
            if reason == RejectReason::HierarchyUnsaved {
                self.motion.play(self.driver.as_ref(), Animation::Shake).await;
            }
            self.events.push(Event::ContinueRejected {
                step,
                reason,
                at: Utc::now(),
            });
            return Outcome::Rejected(reason);
        }

        self.motion
            .play(
                self.driver.as_ref(),
                Animation::StepTransition { from: step, to: next },
            )
            .await;

        if step == OnboardingStep::SystemHierarchy {
            self.write_back_direction();
        }
        self.unmount(step);
        self.state.step = next;
        self.mount(next).await;

        debug!(from = ?step, to = ?next, "step advanced");
        self.events.push(Event::StepAdvanced {
            from: step,
            to: next,
            at: Utc::now(),
        });
        Outcome::Moved(self.phase())
    }

    /// Go back one step. On the first step this does nothing; the platform
    /// decides what back means there.
    pub async fn back(&mut self) -> Outcome {
        let FlowPhase::Step(step) = self.phase() else {
            return Outcome::Ignored;
        };
        let Some(previous) = step.previous() else {
            return Outcome::Ignored;
        };

        self.motion
            .play(
                self.driver.as_ref(),
                Animation::StepTransition {
                    from: step,
                    to: previous,
                },
            )
            .await;

        self.unmount(step);
        self.state.step = previous;
        self.mount(previous).await;

        debug!(from = ?step, to = ?previous, "step retreated");
        self.events.push(Event::StepRetreated {
            from: step,
            to: previous,
            at: Utc::now(),
        });
        Outcome::Moved(self.phase())
    }

    /// Hardware/system back button.
    pub async fn handle_system_back(&mut self) -> BackDisposition {
        let phase = self.phase();
        if let Some(modal) = phase.modal() {
            debug!(?modal, "system back swallowed by modal");
            return BackDisposition::Handled;
        }
        match phase {
            FlowPhase::Step(OnboardingStep::Welcome) | FlowPhase::Done => {
                BackDisposition::NotHandled
            }
            _ => {
                self.back().await;
                BackDisposition::Handled
            }
        }
    }

    /// Leave the wizard from a middle step with a generated direction.
    pub async fn skip(&mut self) -> Outcome {
        let FlowPhase::Step(step) = self.phase() else {
            return Outcome::Ignored;
        };
        if !step.is_skippable() || self.state.is_navigating {
            return Outcome::Ignored;
        }
        self.state.is_navigating = true;

        let direction = default_direction(self.state.focus);
        self.persist(keys::LIFE_DIRECTION, &direction).await;
        self.persist(keys::ONBOARDING_COMPLETED, &true).await;

        self.unmount(step);
        info!(?step, "onboarding skipped");
        self.events.push(Event::OnboardingSkipped {
            from: step,
            life_direction: direction,
            at: Utc::now(),
        });
        self.hand_off();
        Outcome::Moved(self.phase())
    }

    /// Persist the results and open the achievement badge.
    ///
    /// Idempotent: once the badge, its confetti or navigation is underway,
    /// further calls do nothing.
    pub async fn complete_onboarding(&mut self) -> Outcome {
        if self.phase() != FlowPhase::Step(OnboardingStep::WhyItWorks) {
            return Outcome::Ignored;
        }
        let modals = self.state.modals;
        if modals.show_badge || modals.show_confetti || self.state.is_navigating {
            debug!("duplicate completion ignored");
            return Outcome::Ignored;
        }

        let direction = self.state.life_direction.text().to_string();
        let profile = UserProfile {
            focus: self.state.focus,
            life_direction: direction.clone(),
            onboarding_completed: true,
            created_at: Utc::now(),
        };
        self.persist(keys::USER_PROFILE, &profile).await;
        self.persist(keys::LIFE_DIRECTION, &direction).await;
        self.persist(keys::ONBOARDING_COMPLETED, &true).await;

        self.state.modals.show_badge = true;
        self.confetti_due = Some(Instant::now() + self.motion.confetti_delay);
        info!("onboarding completed");
        self.events.push(Event::OnboardingCompleted {
            life_direction: direction,
            at: Utc::now(),
        });
        self.events.push(Event::ModalShown {
            modal: Modal::Badge,
            at: Utc::now(),
        });
        self.motion
            .play(self.driver.as_ref(), Animation::ModalFadeIn { modal: Modal::Badge })
            .await;
        Outcome::Moved(self.phase())
    }

    // ── Modal chain ──────────────────────────────────────────────────

    /// Advance wall-clock driven state: the confetti timer and the welcome
    /// carousel.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if let Some(due) = self.confetti_due {
            if now >= due {
                self.confetti_due = None;
                if self.state.modals.show_badge {
                    self.state.modals.show_confetti = true;
                    self.events.push(Event::ConfettiStarted { at: Utc::now() });
                }
            }
        }
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.tick(now.into_std());
        }
    }

    pub async fn close_badge(&mut self) -> Outcome {
        if self.phase() != FlowPhase::Badge {
            return Outcome::Ignored;
        }
        self.motion
            .play(self.driver.as_ref(), Animation::ModalFadeOut { modal: Modal::Badge })
            .await;
        self.state.modals.show_badge = false;
        self.state.modals.show_confetti = false;
        self.confetti_due = None;
        self.events.push(Event::ModalClosed {
            modal: Modal::Badge,
            at: Utc::now(),
        });
        self.open_modal(Modal::AiSignup).await;
        Outcome::Moved(self.phase())
    }

    /// Claim the welcome token grant. One-way; available on the badge and
    /// signup screens.
    pub async fn claim_tokens(&mut self) -> Outcome {
        if !matches!(self.phase(), FlowPhase::Badge | FlowPhase::AiSignup)
            || self.state.tokens_claimed
        {
            return Outcome::Ignored;
        }
        self.state.tokens_claimed = true;

        let existing = match load_json::<TokenGrant>(self.store.as_ref(), keys::AI_ASSISTANT_TOKENS).await {
            Ok(grant) => grant.map(|g| g.balance).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "could not read token balance; starting from zero");
                0
            }
        };
        let grant = TokenGrant {
            balance: existing + WELCOME_TOKEN_GRANT,
            claimed_at: Utc::now(),
        };
        self.persist(keys::AI_ASSISTANT_TOKENS, &grant).await;
        self.events.push(Event::TokensClaimed {
            amount: WELCOME_TOKEN_GRANT,
            at: Utc::now(),
        });
        Outcome::Updated
    }

    /// Submit the signup form. Invalid input stays on the form with inline
    /// errors; valid input ends up exactly where [`Self::skip_ai_signup`] does.
    pub async fn complete_ai_signup(&mut self) -> Outcome {
        if self.phase() != FlowPhase::AiSignup {
            return Outcome::Ignored;
        }
        if !self.signup.validate() {
            return Outcome::Rejected(RejectReason::InvalidSignup);
        }
        self.finish_ai_signup(true).await
    }

    pub async fn skip_ai_signup(&mut self) -> Outcome {
        if self.phase() != FlowPhase::AiSignup {
            return Outcome::Ignored;
        }
        self.finish_ai_signup(false).await
    }

    pub async fn complete_tutorial(&mut self) -> Outcome {
        if self.phase() != FlowPhase::Tutorial || self.state.is_navigating {
            return Outcome::Ignored;
        }
        self.state.is_navigating = true;
        self.motion
            .play(self.driver.as_ref(), Animation::ModalFadeOut { modal: Modal::Tutorial })
            .await;
        self.state.modals.show_tutorial = false;
        self.events.push(Event::ModalClosed {
            modal: Modal::Tutorial,
            at: Utc::now(),
        });
        self.hand_off();
        Outcome::Moved(self.phase())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn continue_blocker(&self, step: OnboardingStep) -> Option<RejectReason> {
        match step {
            OnboardingStep::FocusSelection if self.state.focus.is_none() => {
                Some(RejectReason::FocusRequired)
            }
            OnboardingStep::SystemHierarchy
                if !self.hierarchy.as_ref().is_some_and(SystemHierarchy::all_saved) =>
            {
                Some(RejectReason::HierarchyUnsaved)
            }
            _ => None,
        }
    }

    /// Carry the saved hierarchy direction back into the flow's direction.
    fn write_back_direction(&mut self) {
        if let Some(hierarchy) = self.hierarchy.as_ref() {
            let saved = hierarchy.direction.original();
            if saved != self.state.life_direction.text() {
                self.state.life_direction.edit(saved.clone());
            }
        }
    }

    async fn mount(&mut self, step: OnboardingStep) {
        match step {
            OnboardingStep::Welcome => {
                self.carousel = Some(WelcomeCarousel::new(
                    self.motion.carousel_interval,
                    Instant::now().into_std(),
                ));
            }
            OnboardingStep::SystemHierarchy => {
                self.hierarchy = Some(SystemHierarchy::new(
                    self.state.focus,
                    self.state.life_direction.text(),
                ));
                let reveals: Vec<Animation> = HierarchyKind::ORDER
                    .iter()
                    .map(|item| Animation::HierarchyReveal { item: *item })
                    .collect();
                play_staggered(self.driver.as_ref(), &self.motion, &reveals).await;
            }
            _ => {}
        }
    }

    fn unmount(&mut self, step: OnboardingStep) {
        match step {
            OnboardingStep::Welcome => self.carousel = None,
            OnboardingStep::SystemHierarchy => self.hierarchy = None,
            _ => {}
        }
    }

    async fn open_modal(&mut self, modal: Modal) {
        match modal {
            Modal::Badge => self.state.modals.show_badge = true,
            Modal::AiSignup => self.state.modals.show_ai_signup = true,
            Modal::Tutorial => self.state.modals.show_tutorial = true,
        }
        self.events.push(Event::ModalShown {
            modal,
            at: Utc::now(),
        });
        self.motion
            .play(self.driver.as_ref(), Animation::ModalFadeIn { modal })
            .await;
    }

    async fn finish_ai_signup(&mut self, signed_up: bool) -> Outcome {
        self.persist(keys::AI_SIGNUP_COMPLETED, &true).await;
        self.motion
            .play(self.driver.as_ref(), Animation::ModalFadeOut { modal: Modal::AiSignup })
            .await;
        self.state.modals.show_ai_signup = false;
        self.events.push(Event::ModalClosed {
            modal: Modal::AiSignup,
            at: Utc::now(),
        });
        self.events.push(Event::AiSignupFinished {
            signed_up,
            at: Utc::now(),
        });
        self.open_modal(Modal::Tutorial).await;
        Outcome::Moved(self.phase())
    }

    fn hand_off(&mut self) {
        self.state.done = true;
        if let Some(tx) = self.handoff.take() {
            // The receiver may already be gone; the app simply isn't listening.
            let _ = tx.send(());
            self.events.push(Event::NavigationHandoff { at: Utc::now() });
        }
    }

    async fn persist<T: Serialize + Sync + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = save_json(self.store.as_ref(), key, value).await {
            warn!(key, error = %e, "failed to persist onboarding value; continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::RecordingDriver;
    use crate::onboarding::ModalFlags;
    use crate::storage::MemoryStore;

    fn flow() -> (OnboardingCoordinator, Handoff, Arc<MemoryStore>, Arc<RecordingDriver>) {
        let store = Arc::new(MemoryStore::new());
        let driver = Arc::new(RecordingDriver::new());
        let (flow, handoff) =
            OnboardingCoordinator::new(store.clone(), driver.clone(), MotionProfile::instant());
        (flow, handoff, store, driver)
    }

    async fn advance_to(flow: &mut OnboardingCoordinator, target: OnboardingStep) {
        while flow.step() < target {
            match flow.step() {
                OnboardingStep::FocusSelection if flow.state().focus.is_none() => {
                    flow.select_focus(Focus::Growth);
                }
                OnboardingStep::SystemHierarchy => {
                    flow.save_all().await;
                }
                _ => {}
            }
            assert!(matches!(flow.continue_step().await, Outcome::Moved(_)));
        }
    }

    #[tokio::test]
    async fn continue_requires_focus() {
        let (mut flow, _handoff, _, _) = flow();
        advance_to(&mut flow, OnboardingStep::FocusSelection).await;

        assert_eq!(
            flow.continue_step().await,
            Outcome::Rejected(RejectReason::FocusRequired)
        );
        assert_eq!(flow.step(), OnboardingStep::FocusSelection);

        flow.select_focus(Focus::Wealth);
        assert_eq!(flow.life_direction(), Focus::Wealth.direction_template());
        assert_eq!(
            flow.continue_step().await,
            Outcome::Moved(FlowPhase::Step(OnboardingStep::SystemHierarchy))
        );
    }

    #[tokio::test]
    async fn select_focus_outside_its_step_is_ignored() {
        let (mut flow, _handoff, _, _) = flow();
        assert_eq!(flow.select_focus(Focus::Impact), Outcome::Ignored);
        assert!(flow.state().focus.is_none());
    }

    #[tokio::test]
    async fn hierarchy_is_revealed_in_order_on_mount() {
        let (mut flow, _handoff, _, driver) = flow();
        advance_to(&mut flow, OnboardingStep::FocusSelection).await;
        flow.select_focus(Focus::Mastery);
        driver.clear();

        flow.continue_step().await;

        let played = driver.played();
        assert!(matches!(played[0], Animation::StepTransition { .. }));
        let reveals: Vec<_> = played[1..].to_vec();
        assert_eq!(
            reveals,
            HierarchyKind::ORDER
                .iter()
                .map(|item| Animation::HierarchyReveal { item: *item })
                .collect::<Vec<_>>()
        );
        assert!(flow.hierarchy().is_some());
    }

    #[tokio::test]
    async fn unsaved_hierarchy_blocks_continue_with_shake() {
        let (mut flow, _handoff, _, driver) = flow();
        advance_to(&mut flow, OnboardingStep::SystemHierarchy).await;
        driver.clear();

        assert_eq!(
            flow.continue_step().await,
            Outcome::Rejected(RejectReason::HierarchyUnsaved)
        );
        assert_eq!(driver.played(), vec![Animation::Shake]);

        flow.save_all().await;
        flow.hierarchy_mut().unwrap().set_goal_title("Edited after save");
        assert_eq!(
            flow.continue_step().await,
            Outcome::Rejected(RejectReason::HierarchyUnsaved)
        );
    }

    #[tokio::test]
    async fn saved_direction_flows_back_into_life_direction() {
        let (mut flow, _handoff, _, _) = flow();
        advance_to(&mut flow, OnboardingStep::SystemHierarchy).await;
        flow.hierarchy_mut()
            .unwrap()
            .set_direction("Raise a happy family");
        flow.save_all().await;

        flow.continue_step().await;

        assert_eq!(flow.life_direction(), "Raise a happy family");
        assert!(flow.state().life_direction.is_edited());
        assert!(flow.hierarchy().is_none());
    }

    #[tokio::test]
    async fn back_from_first_step_is_left_to_the_platform() {
        let (mut flow, _handoff, _, _) = flow();
        assert_eq!(flow.back().await, Outcome::Ignored);
        assert_eq!(flow.handle_system_back().await, BackDisposition::NotHandled);

        flow.continue_step().await;
        assert_eq!(flow.handle_system_back().await, BackDisposition::Handled);
        assert_eq!(flow.step(), OnboardingStep::Welcome);
        assert!(flow.carousel().is_some());
    }

    #[tokio::test]
    async fn system_back_is_swallowed_by_modals() {
        let (mut flow, _handoff, _, _) = flow();
        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;
        flow.continue_step().await;
        assert_eq!(flow.phase(), FlowPhase::Badge);

        assert_eq!(flow.handle_system_back().await, BackDisposition::Handled);
        assert_eq!(flow.phase(), FlowPhase::Badge);
    }

    #[tokio::test]
    async fn modal_chain_shows_one_modal_at_a_time() {
        let (mut flow, mut handoff, _, _) = flow();
        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;
        flow.continue_step().await;

        assert_eq!(flow.close_badge().await, Outcome::Moved(FlowPhase::AiSignup));
        assert_eq!(
            flow.state().modals,
            ModalFlags {
                show_ai_signup: true,
                ..ModalFlags::default()
            }
        );
        assert_eq!(flow.handle_system_back().await, BackDisposition::Handled);
        assert_eq!(flow.phase(), FlowPhase::AiSignup);

        assert_eq!(flow.skip_ai_signup().await, Outcome::Moved(FlowPhase::Tutorial));
        assert_eq!(
            flow.state().modals,
            ModalFlags {
                show_tutorial: true,
                ..ModalFlags::default()
            }
        );
        assert_eq!(flow.handle_system_back().await, BackDisposition::Handled);
        assert_eq!(flow.phase(), FlowPhase::Tutorial);
        assert!(handoff.try_recv().is_err());

        assert_eq!(flow.complete_tutorial().await, Outcome::Moved(FlowPhase::Done));
        assert_eq!(flow.state().modals, ModalFlags::default());
        assert!(handoff.try_recv().is_ok());
        assert_eq!(flow.handle_system_back().await, BackDisposition::NotHandled);
    }

    #[tokio::test(start_paused = true)]
    async fn confetti_follows_the_badge_after_a_delay() {
        let store = Arc::new(MemoryStore::new());
        let driver = Arc::new(RecordingDriver::new());
        let motion = MotionProfile {
            confetti_delay: std::time::Duration::from_millis(500),
            ..MotionProfile::instant()
        };
        let (mut flow, _handoff) = OnboardingCoordinator::new(store, driver, motion);
        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;
        flow.continue_step().await;

        flow.tick();
        assert!(!flow.state().modals.show_confetti);

        tokio::time::advance(std::time::Duration::from_millis(499)).await;
        flow.tick();
        assert!(!flow.state().modals.show_confetti);

        tokio::time::advance(std::time::Duration::from_millis(1)).await;
        flow.tick();
        assert!(flow.state().modals.show_confetti);
        assert!(flow
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::ConfettiStarted { .. })));

        // Duplicate completion while the badge is up writes nothing new.
        assert_eq!(flow.complete_onboarding().await, Outcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_badge_cancels_pending_confetti() {
        let store = Arc::new(MemoryStore::new());
        let driver = Arc::new(RecordingDriver::new());
        let motion = MotionProfile {
            confetti_delay: std::time::Duration::from_millis(500),
            ..MotionProfile::instant()
        };
        let (mut flow, _handoff) = OnboardingCoordinator::new(store, driver, motion);
        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;
        flow.continue_step().await;
        flow.close_badge().await;

        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        flow.tick();
        assert!(!flow.state().modals.show_confetti);
        assert_eq!(flow.phase(), FlowPhase::AiSignup);
    }

    #[tokio::test]
    async fn tokens_are_claimed_once() {
        let (mut flow, _handoff, store, _) = flow();
        assert_eq!(flow.claim_tokens().await, Outcome::Ignored);

        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;
        flow.continue_step().await;
        assert_eq!(flow.claim_tokens().await, Outcome::Updated);
        flow.close_badge().await;
        assert_eq!(flow.claim_tokens().await, Outcome::Ignored);

        assert_eq!(store.write_count(keys::AI_ASSISTANT_TOKENS).await, 1);
        let grant: TokenGrant = load_json(store.as_ref(), keys::AI_ASSISTANT_TOKENS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grant.balance, WELCOME_TOKEN_GRANT);
        assert!(flow.state().tokens_claimed);
    }

    #[tokio::test]
    async fn invalid_signup_stays_on_the_form() {
        let (mut flow, _handoff, store, _) = flow();
        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;
        flow.continue_step().await;
        flow.close_badge().await;

        flow.signup_mut().email = "nope".into();
        assert_eq!(
            flow.complete_ai_signup().await,
            Outcome::Rejected(RejectReason::InvalidSignup)
        );
        assert_eq!(flow.phase(), FlowPhase::AiSignup);
        assert!(!flow.signup().errors().is_empty());
        assert!(!store.contains(keys::AI_SIGNUP_COMPLETED).await);
    }

    #[tokio::test]
    async fn persistence_failures_do_not_block_the_flow() {
        let (mut flow, mut handoff, store, _) = flow();
        store.set_fail_writes(true);
        advance_to(&mut flow, OnboardingStep::WhyItWorks).await;

        assert_eq!(flow.continue_step().await, Outcome::Moved(FlowPhase::Badge));
        flow.close_badge().await;
        flow.skip_ai_signup().await;
        assert_eq!(flow.complete_tutorial().await, Outcome::Moved(FlowPhase::Done));
        assert!(handoff.try_recv().is_ok());
        assert!(!store.contains(keys::ONBOARDING_COMPLETED).await);
    }
}
