//! Animation seam.
//!
//! The core never interpolates anything itself. It hands an [`Animation`] and a
//! duration to an [`AnimationDriver`] and commits the next state once the
//! returned future resolves, the same way a completion callback would.
//!
//! How long each animation runs, and whether decorative ones run at all, is
//! decided once by [`MotionProfile`] from the device capability in config.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::onboarding::{HierarchyKind, Modal, OnboardingStep};
use crate::storage::Config;

/// Something the rendering layer knows how to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Animation {
    StepTransition {
        from: OnboardingStep,
        to: OnboardingStep,
    },
    ModalFadeIn {
        modal: Modal,
    },
    ModalFadeOut {
        modal: Modal,
    },
    HierarchyReveal {
        item: HierarchyKind,
    },
    SavePulse {
        item: HierarchyKind,
    },
    Shake,
}

impl Animation {
    /// Purely cosmetic animations that low-end devices skip.
    pub fn is_decorative(&self) -> bool {
        matches!(
            self,
            Animation::HierarchyReveal { .. } | Animation::SavePulse { .. } | Animation::Shake
        )
    }
}

/// Runs animations. `run` resolves when the animation has finished.
#[async_trait]
pub trait AnimationDriver: Send + Sync {
    async fn run(&self, animation: Animation, duration: Duration);
}

/// Driver backed by the tokio timer: an animation "finishes" after its duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimedDriver;

#[async_trait]
impl AnimationDriver for TimedDriver {
    async fn run(&self, _animation: Animation, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Driver that completes immediately and remembers what it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    played: Mutex<Vec<Animation>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animations in the order they started.
    pub fn played(&self) -> Vec<Animation> {
        self.played
            .lock()
            .map(|played| played.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut played) = self.played.lock() {
            played.clear();
        }
    }
}

#[async_trait]
impl AnimationDriver for RecordingDriver {
    async fn run(&self, animation: Animation, _duration: Duration) {
        if let Ok(mut played) = self.played.lock() {
            played.push(animation);
        }
    }
}

/// Animation timings resolved for this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionProfile {
    pub low_end: bool,
    pub step_transition: Duration,
    pub modal_fade: Duration,
    pub confetti_delay: Duration,
    pub hierarchy_stagger: Duration,
    pub hierarchy_reveal: Duration,
    pub save_pulse: Duration,
    pub shake: Duration,
    pub typing_interval: Duration,
    pub carousel_interval: Duration,
}

impl MotionProfile {
    pub fn from_config(config: &Config) -> Self {
        let a = &config.animation;
        Self {
            low_end: config.device.low_end,
            step_transition: Duration::from_millis(a.step_transition_ms),
            modal_fade: Duration::from_millis(a.modal_fade_ms),
            confetti_delay: Duration::from_millis(a.confetti_delay_ms),
            hierarchy_stagger: Duration::from_millis(a.hierarchy_stagger_ms),
            hierarchy_reveal: Duration::from_millis(a.hierarchy_reveal_ms),
            save_pulse: Duration::from_millis(a.save_pulse_ms),
            shake: Duration::from_millis(a.shake_ms),
            typing_interval: Duration::from_millis(a.typing_interval_ms),
            carousel_interval: Duration::from_millis(a.carousel_interval_ms),
        }
    }

    /// Every duration zero. Handy for headless runs.
    pub fn instant() -> Self {
        Self {
            low_end: false,
            step_transition: Duration::ZERO,
            modal_fade: Duration::ZERO,
            confetti_delay: Duration::ZERO,
            hierarchy_stagger: Duration::ZERO,
            hierarchy_reveal: Duration::ZERO,
            save_pulse: Duration::ZERO,
            shake: Duration::ZERO,
            typing_interval: Duration::ZERO,
            carousel_interval: Duration::ZERO,
        }
    }

    /// How long `animation` should run on this device.
    ///
    /// Low-end devices drop decorative animations and halve the rest.
    pub fn duration(&self, animation: &Animation) -> Duration {
        let base = match animation {
            Animation::StepTransition { .. } => self.step_transition,
            Animation::ModalFadeIn { .. } | Animation::ModalFadeOut { .. } => self.modal_fade,
            Animation::HierarchyReveal { .. } => self.hierarchy_reveal,
            Animation::SavePulse { .. } => self.save_pulse,
            Animation::Shake => self.shake,
        };
        if !self.low_end {
            base
        } else if animation.is_decorative() {
            Duration::ZERO
        } else {
            base / 2
        }
    }

    /// Delay between consecutive staggered reveals.
    pub fn stagger(&self) -> Duration {
        if self.low_end {
            Duration::ZERO
        } else {
            self.hierarchy_stagger
        }
    }

    /// Play `animation` to completion.
    pub async fn play(&self, driver: &dyn AnimationDriver, animation: Animation) {
        driver.run(animation, self.duration(&animation)).await;
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Start each animation `stagger` after the previous one started, then wait
/// for all of them to finish.
///
/// Start order is the slice order: item N never starts before item N-1.
pub async fn play_staggered(
    driver: &dyn AnimationDriver,
    profile: &MotionProfile,
    animations: &[Animation],
) {
    let stagger = profile.stagger();
    let runs = animations.iter().enumerate().map(|(i, animation)| {
        let offset = stagger * i as u32;
        async move {
            if !offset.is_zero() {
                tokio::time::sleep(offset).await;
            }
            profile.play(driver, *animation).await;
        }
    });
    futures::future::join_all(runs).await;
}
