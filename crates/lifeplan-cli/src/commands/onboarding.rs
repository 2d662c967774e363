use std::sync::Arc;

use clap::Subcommand;
use lifeplan_core::animation::{MotionProfile, TimedDriver};
use lifeplan_core::onboarding::{load_status, Focus, OnboardingCoordinator, OnboardingStep, Outcome};
use lifeplan_core::storage::keys;
use lifeplan_core::{Config, Event, KeyValueStore};
use serde_json::json;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum OnboardingAction {
    /// Print the stored onboarding outcome as JSON
    Status,
    /// Walk through the whole flow headlessly and print the events
    Run {
        /// Focus to pick (wealth, mastery, impact, freedom, growth)
        #[arg(long, default_value = "growth")]
        focus: Focus,
        /// Custom life direction instead of the focus template
        #[arg(long)]
        direction: Option<String>,
        /// Skip out of the wizard at this step (1-3)
        #[arg(long)]
        skip_at: Option<usize>,
        /// Claim the welcome tokens on the badge screen
        #[arg(long)]
        claim_tokens: bool,
        /// Play animations with real timings from the config
        #[arg(long)]
        animate: bool,
    },
    /// Forget that onboarding happened
    Reset,
}

pub async fn run(action: OnboardingAction) -> CommandResult {
    let store = open_store()?;

    match action {
        OnboardingAction::Status => {
            print_json(&load_status(store.as_ref()).await)?;
        }
        OnboardingAction::Run {
            focus,
            direction,
            skip_at,
            claim_tokens,
            animate,
        } => {
            let skip_at = match skip_at {
                Some(index) => match OnboardingStep::from_index(index) {
                    Some(step) if step.is_skippable() => Some(step),
                    _ => return Err(format!("cannot skip at step {index}; use 1-3").into()),
                },
                None => None,
            };
            let motion = if animate {
                MotionProfile::from_config(&Config::load_or_default())
            } else {
                MotionProfile::instant()
            };

            let confetti_delay = motion.confetti_delay;
            let (mut flow, handoff) =
                OnboardingCoordinator::new(store.clone(), Arc::new(TimedDriver), motion);
            let mut events: Vec<Event> = Vec::new();

            loop {
                let step = flow.step();
                if skip_at == Some(step) {
                    flow.skip().await;
                    break;
                }
                match step {
                    OnboardingStep::FocusSelection => {
                        flow.select_focus(focus);
                        if let Some(text) = direction.as_deref() {
                            flow.edit_life_direction(text);
                        }
                    }
                    OnboardingStep::SystemHierarchy => {
                        flow.save_all().await;
                    }
                    _ => {}
                }
                let is_last = step.is_last();
                if let Outcome::Rejected(reason) = flow.continue_step().await {
                    return Err(format!("continue rejected at {step:?}: {reason:?}").into());
                }
                events.extend(flow.drain_events());
                if is_last {
                    break;
                }
            }

            if !flow.state().done {
                tokio::time::sleep(confetti_delay).await;
                flow.tick();
                if claim_tokens {
                    flow.claim_tokens().await;
                }
                flow.close_badge().await;
                flow.skip_ai_signup().await;
                flow.complete_tutorial().await;
            }
            events.extend(flow.drain_events());

            let handed_off = handoff.await.is_ok();
            print_json(&json!({
                "phase": flow.phase(),
                "handedOff": handed_off,
                "lifeDirection": flow.life_direction(),
                "events": events,
            }))?;
        }
        OnboardingAction::Reset => {
            for key in [
                keys::USER_PROFILE,
                keys::LIFE_DIRECTION,
                keys::ONBOARDING_COMPLETED,
                keys::AI_SIGNUP_COMPLETED,
                keys::AI_ASSISTANT_TOKENS,
            ] {
                store.remove(key).await?;
            }
            println!("onboarding reset");
        }
    }
    Ok(())
}
