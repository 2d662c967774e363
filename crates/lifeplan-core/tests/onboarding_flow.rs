//! End-to-end tests for the onboarding flow.
//!
//! Every test drives a real coordinator over an in-memory store with a
//! recording animation driver, so animations complete instantly and can be
//! inspected afterwards.

use std::sync::Arc;

use lifeplan_core::animation::{Animation, MotionProfile, RecordingDriver};
use lifeplan_core::events::Event;
use lifeplan_core::onboarding::{
    load_status, FlowPhase, Focus, Handoff, HierarchyKind, Modal, OnboardingCoordinator,
    OnboardingStep, Outcome, RejectReason, TokenGrant, UserProfile, WELCOME_TOKEN_GRANT,
};
use lifeplan_core::storage::{keys, load_json, KeyValueStore, MemoryStore};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    flow: OnboardingCoordinator,
    handoff: Handoff,
    store: Arc<MemoryStore>,
    driver: Arc<RecordingDriver>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let driver = Arc::new(RecordingDriver::new());
    let (flow, handoff) =
        OnboardingCoordinator::new(store.clone(), driver.clone(), MotionProfile::instant());
    Harness {
        flow,
        handoff,
        store,
        driver,
    }
}

/// Satisfy whatever the current step needs before Continue.
async fn prepare(flow: &mut OnboardingCoordinator) {
    match flow.step() {
        OnboardingStep::FocusSelection if flow.state().focus.is_none() => {
            flow.select_focus(Focus::Growth);
        }
        OnboardingStep::SystemHierarchy => {
            flow.save_all().await;
        }
        _ => {}
    }
}

async fn walk_to(flow: &mut OnboardingCoordinator, target: OnboardingStep) {
    while flow.step() < target {
        prepare(flow).await;
        assert!(matches!(flow.continue_step().await, Outcome::Moved(_)));
    }
}

fn count_events(events: &[Event], pred: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_full_flow_hands_off_once() {
    let mut h = harness();

    walk_to(&mut h.flow, OnboardingStep::FocusSelection).await;
    h.flow.select_focus(Focus::Impact);
    h.flow.continue_step().await;
    {
        let hierarchy = h.flow.hierarchy_mut().unwrap();
        hierarchy.set_goal_title("Launch the community garden");
        hierarchy.add_task("Email the city council").unwrap();
    }
    h.flow.save_all().await;
    h.flow.continue_step().await;
    assert_eq!(h.flow.step(), OnboardingStep::WhyItWorks);

    assert_eq!(h.flow.continue_step().await, Outcome::Moved(FlowPhase::Badge));
    assert_eq!(h.flow.claim_tokens().await, Outcome::Updated);
    assert_eq!(h.flow.close_badge().await, Outcome::Moved(FlowPhase::AiSignup));

    let form = h.flow.signup_mut();
    form.name = "Sam".into();
    form.email = "sam@example.com".into();
    form.password = "long enough".into();
    form.confirm_password = "long enough".into();
    assert_eq!(
        h.flow.complete_ai_signup().await,
        Outcome::Moved(FlowPhase::Tutorial)
    );
    assert_eq!(h.flow.complete_tutorial().await, Outcome::Moved(FlowPhase::Done));
    assert_eq!(h.flow.complete_tutorial().await, Outcome::Ignored);

    assert!(h.handoff.try_recv().is_ok());
    let events = h.flow.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::NavigationHandoff { .. })),
        1
    );

    let status = load_status(h.store.as_ref()).await;
    assert!(status.completed);
    assert!(status.ai_signup_completed);
    assert_eq!(
        status.life_direction.as_deref(),
        Some(Focus::Impact.direction_template().as_str())
    );
    assert_eq!(status.profile.unwrap().focus, Some(Focus::Impact));
    assert_eq!(status.tokens.unwrap().balance, WELCOME_TOKEN_GRANT);
}

#[tokio::test]
async fn test_skipping_signup_converges_with_completing_it() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::WhyItWorks).await;
    h.flow.continue_step().await;
    h.flow.close_badge().await;
    h.driver.clear();

    assert_eq!(h.flow.skip_ai_signup().await, Outcome::Moved(FlowPhase::Tutorial));
    assert_eq!(
        h.driver.played(),
        vec![
            Animation::ModalFadeOut {
                modal: Modal::AiSignup
            },
            Animation::ModalFadeIn {
                modal: Modal::Tutorial
            },
        ]
    );
    let done: bool = load_json(h.store.as_ref(), keys::AI_SIGNUP_COMPLETED)
        .await
        .unwrap()
        .unwrap();
    assert!(done);
}

#[tokio::test]
async fn test_edited_direction_survives_focus_change() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::FocusSelection).await;
    h.flow.select_focus(Focus::Wealth);
    h.flow.edit_life_direction("Build a calm, independent life");
    h.flow.select_focus(Focus::Freedom);
    assert_eq!(h.flow.life_direction(), "Build a calm, independent life");

    h.flow.continue_step().await;
    assert_eq!(
        h.flow.hierarchy().unwrap().direction.current(),
        "Build a calm, independent life"
    );

    h.flow.reset_life_direction();
    assert_eq!(h.flow.life_direction(), Focus::Freedom.direction_template());
}

// ============================================================================
// Idempotent completion
// ============================================================================

#[tokio::test]
async fn test_double_completion_writes_once() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::WhyItWorks).await;

    let first = h.flow.complete_onboarding().await;
    let second = h.flow.complete_onboarding().await;
    let third = h.flow.continue_step().await;

    assert_eq!(first, Outcome::Moved(FlowPhase::Badge));
    assert_eq!(second, Outcome::Ignored);
    assert_eq!(third, Outcome::Ignored);
    for key in [
        keys::USER_PROFILE,
        keys::LIFE_DIRECTION,
        keys::ONBOARDING_COMPLETED,
    ] {
        assert_eq!(h.store.write_count(key).await, 1, "{key}");
    }
    let events = h.flow.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(
            e,
            Event::ModalShown {
                modal: Modal::Badge,
                ..
            }
        )),
        1
    );
    let profile: UserProfile = load_json(h.store.as_ref(), keys::USER_PROFILE)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.onboarding_completed);
}

#[tokio::test]
async fn test_tokens_stack_on_an_existing_balance() {
    let mut h = harness();
    h.store
        .set(
            keys::AI_ASSISTANT_TOKENS,
            r#"{"balance":25,"claimedAt":"2026-01-01T00:00:00Z"}"#,
        )
        .await
        .unwrap();
    walk_to(&mut h.flow, OnboardingStep::WhyItWorks).await;
    h.flow.continue_step().await;
    h.flow.claim_tokens().await;

    let grant: TokenGrant = load_json(h.store.as_ref(), keys::AI_ASSISTANT_TOKENS)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grant.balance, 25 + WELCOME_TOKEN_GRANT);
}

// ============================================================================
// Skip
// ============================================================================

#[tokio::test]
async fn test_skip_bypasses_every_modal() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::FocusSelection).await;
    h.flow.select_focus(Focus::Growth);
    h.driver.clear();
    h.flow.drain_events();

    assert_eq!(h.flow.skip().await, Outcome::Moved(FlowPhase::Done));
    assert_eq!(h.flow.skip().await, Outcome::Ignored);

    let direction: String = load_json(h.store.as_ref(), keys::LIFE_DIRECTION)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(direction, Focus::Growth.direction_template());
    let completed: bool = load_json(h.store.as_ref(), keys::ONBOARDING_COMPLETED)
        .await
        .unwrap()
        .unwrap();
    assert!(completed);
    assert!(!h.store.contains(keys::USER_PROFILE).await);
    assert!(!h.store.contains(keys::AI_SIGNUP_COMPLETED).await);

    let modals = h.flow.state().modals;
    assert!(!modals.any());
    assert!(h.driver.played().is_empty());
    assert!(h.handoff.try_recv().is_ok());

    let events = h.flow.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::ModalShown { .. })),
        0
    );
}

#[tokio::test]
async fn test_skip_is_unavailable_on_first_and_last_steps() {
    let mut h = harness();
    assert_eq!(h.flow.skip().await, Outcome::Ignored);
    walk_to(&mut h.flow, OnboardingStep::WhyItWorks).await;
    assert_eq!(h.flow.skip().await, Outcome::Ignored);
    assert!(!h.store.contains(keys::ONBOARDING_COMPLETED).await);
}

#[tokio::test]
async fn test_skip_without_focus_uses_fallback_direction() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::Framework).await;
    h.flow.skip().await;
    let direction: String = load_json(h.store.as_ref(), keys::LIFE_DIRECTION)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(direction, lifeplan_core::onboarding::FALLBACK_DIRECTION);
}

// ============================================================================
// System Hierarchy
// ============================================================================

#[tokio::test]
async fn test_save_all_converges() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::SystemHierarchy).await;
    h.flow.hierarchy_mut().unwrap().set_project_title("Morning pages");
    h.driver.clear();

    let committed = h.flow.save_all().await;
    assert_eq!(committed, HierarchyKind::ORDER.to_vec());
    assert!(h.flow.hierarchy().unwrap().all_saved());

    let pulses: Vec<_> = HierarchyKind::ORDER
        .iter()
        .map(|item| Animation::SavePulse { item: *item })
        .collect();
    assert_eq!(h.driver.played(), pulses);

    h.driver.clear();
    assert!(h.flow.save_all().await.is_empty());
    assert_eq!(h.driver.played(), pulses);
}

#[tokio::test]
async fn test_reverted_edit_stays_dirty() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::SystemHierarchy).await;
    h.flow.save_all().await;

    let original = h.flow.hierarchy().unwrap().goal.current().title.clone();
    let hierarchy = h.flow.hierarchy_mut().unwrap();
    hierarchy.set_goal_title("Something else");
    hierarchy.set_goal_title(original);

    let hierarchy = h.flow.hierarchy().unwrap();
    assert!(!hierarchy.has_changed(HierarchyKind::Goal));
    assert!(!hierarchy.is_saved(HierarchyKind::Goal));
    assert!(!hierarchy.all_saved());
    assert_eq!(
        h.flow.continue_step().await,
        Outcome::Rejected(RejectReason::HierarchyUnsaved)
    );

    assert_eq!(h.flow.save_all().await, vec![HierarchyKind::Goal]);
    assert!(matches!(h.flow.continue_step().await, Outcome::Moved(_)));
}

#[tokio::test]
async fn test_blank_goal_title_is_an_inline_error() {
    let mut h = harness();
    walk_to(&mut h.flow, OnboardingStep::SystemHierarchy).await;
    h.flow.hierarchy_mut().unwrap().set_goal_title("  ");

    let err = h.flow.save_hierarchy_item(HierarchyKind::Goal).unwrap_err();
    assert_eq!(err.to_string(), "Goal title cannot be empty");
    assert!(!h.flow.hierarchy().unwrap().is_saved(HierarchyKind::Goal));
}

// ============================================================================
// Monotonic step index
// ============================================================================

proptest! {
    #[test]
    fn step_index_moves_by_at_most_one(
        actions in prop::collection::vec((any::<bool>(), any::<bool>()), 1..40)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let mut h = harness();
            for (forward, ready) in actions {
                let FlowPhase::Step(before) = h.flow.phase() else {
                    break;
                };
                let outcome = if forward {
                    if ready {
                        prepare(&mut h.flow).await;
                    }
                    h.flow.continue_step().await
                } else {
                    h.flow.back().await
                };

                match h.flow.phase() {
                    FlowPhase::Step(after) => {
                        let delta = after.index() as i64 - before.index() as i64;
                        let expected = match (outcome, forward) {
                            (Outcome::Moved(_), true) => 1,
                            (Outcome::Moved(_), false) => -1,
                            _ => 0,
                        };
                        assert_eq!(delta, expected);
                        assert!(after.index() < OnboardingStep::COUNT);
                    }
                    phase => {
                        assert_eq!(before, OnboardingStep::WhyItWorks);
                        assert_eq!(phase, FlowPhase::Badge);
                    }
                }
            }
        });
    }
}
