//! Content for the five wizard steps.
//!
//! Most steps are static copy. The welcome step owns an auto-advancing
//! carousel whose timer lives exactly as long as the step is mounted.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::focus::Focus;

/// The five wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    Framework,
    FocusSelection,
    SystemHierarchy,
    WhyItWorks,
}

impl OnboardingStep {
    pub const COUNT: usize = 5;

    pub fn index(&self) -> usize {
        match self {
            OnboardingStep::Welcome => 0,
            OnboardingStep::Framework => 1,
            OnboardingStep::FocusSelection => 2,
            OnboardingStep::SystemHierarchy => 3,
            OnboardingStep::WhyItWorks => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(OnboardingStep::Welcome),
            1 => Some(OnboardingStep::Framework),
            2 => Some(OnboardingStep::FocusSelection),
            3 => Some(OnboardingStep::SystemHierarchy),
            4 => Some(OnboardingStep::WhyItWorks),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Steps that offer "skip for now".
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            OnboardingStep::Framework
                | OnboardingStep::FocusSelection
                | OnboardingStep::SystemHierarchy
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::Welcome => "Welcome",
            OnboardingStep::Framework => "The Framework",
            OnboardingStep::FocusSelection => "Choose Your Focus",
            OnboardingStep::SystemHierarchy => "Your System",
            OnboardingStep::WhyItWorks => "Why It Works",
        }
    }
}

/// A slide in the welcome carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub headline: String,
    pub body: String,
}

/// Auto-advancing welcome carousel.
///
/// Wall-clock driven: call [`WelcomeCarousel::tick`] periodically. Manual
/// navigation restarts the countdown.
#[derive(Debug, Clone)]
pub struct WelcomeCarousel {
    slides: Vec<Slide>,
    index: usize,
    interval: Duration,
    last_advance: Instant,
}

impl WelcomeCarousel {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            slides: welcome_slides(),
            index: 0,
            interval,
            last_advance: now,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Slide {
        &self.slides[self.index]
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Advance (wrapping) once per elapsed interval. Returns whether the
    /// visible slide changed. A zero interval disables auto-advance.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.interval.is_zero() {
            return false;
        }
        let elapsed = now.saturating_duration_since(self.last_advance);
        let steps = elapsed.as_nanos() / self.interval.as_nanos();
        if steps == 0 {
            return false;
        }
        let len = self.slides.len();
        let offset = usize::try_from(steps % len as u128).unwrap_or(0);
        self.index = (self.index + offset) % len;
        self.last_advance = u32::try_from(steps)
            .ok()
            .and_then(|n| self.interval.checked_mul(n))
            .and_then(|d| self.last_advance.checked_add(d))
            .unwrap_or(now);
        true
    }

    pub fn go_to(&mut self, index: usize, now: Instant) {
        self.index = index.min(self.slides.len() - 1);
        self.last_advance = now;
    }
}

fn welcome_slides() -> Vec<Slide> {
    [
        ("Design your life", "Turn a vague sense of direction into a plan you act on daily."),
        ("One system, four layers", "Direction, goals, projects and tasks, all connected."),
        ("Small steps, every day", "Check in daily and watch your streak grow."),
    ]
    .into_iter()
    .map(|(headline, body)| Slide {
        headline: headline.to_string(),
        body: body.to_string(),
    })
    .collect()
}

/// A layer explained on the framework step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameworkLayer {
    pub name: &'static str,
    pub horizon: &'static str,
    pub summary: &'static str,
}

pub fn framework_layers() -> [FrameworkLayer; 4] {
    [
        FrameworkLayer {
            name: "Life Direction",
            horizon: "10+ years",
            summary: "The north star every other layer points toward",
        },
        FrameworkLayer {
            name: "Goal",
            horizon: "1 year",
            summary: "A concrete outcome that moves you along your direction",
        },
        FrameworkLayer {
            name: "Project",
            horizon: "1-3 months",
            summary: "A focused push that gets the goal done",
        },
        FrameworkLayer {
            name: "Tasks",
            horizon: "Today",
            summary: "The next actions you can take right now",
        },
    ]
}

/// Points shown on the final step, tailored to the chosen focus.
pub fn why_it_works(focus: Option<Focus>) -> Vec<String> {
    let mut points = vec![
        "Every task traces back to something you care about.".to_string(),
        "Daily check-ins turn intentions into habits.".to_string(),
        "Reviewing each layer keeps the plan honest.".to_string(),
    ];
    if let Some(focus) = focus {
        points.insert(
            0,
            format!("Your plan is built around {}: {}.", focus, focus.description().to_lowercase()),
        );
    }
    points
}
