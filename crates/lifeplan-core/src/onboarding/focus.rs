//! Strategic focus areas and the default text generated from them.

use serde::{Deserialize, Serialize};

use super::hierarchy::TitledEntry;

/// Direction used when the user never picked a focus.
pub const FALLBACK_DIRECTION: &str =
    "Live with intention, make steady progress, and become the person I want to be.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Wealth,
    Mastery,
    Impact,
    Freedom,
    Growth,
}

impl Focus {
    pub const ALL: [Focus; 5] = [
        Focus::Wealth,
        Focus::Mastery,
        Focus::Impact,
        Focus::Freedom,
        Focus::Growth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Focus::Wealth => "Wealth",
            Focus::Mastery => "Mastery",
            Focus::Impact => "Impact",
            Focus::Freedom => "Freedom",
            Focus::Growth => "Growth",
        }
    }

    /// One-line pitch shown on the selection card.
    pub fn description(&self) -> &'static str {
        match self {
            Focus::Wealth => "Build financial security and long-term abundance",
            Focus::Mastery => "Become exceptional at the craft that matters to you",
            Focus::Impact => "Create change that outlasts you",
            Focus::Freedom => "Own your time, location and choices",
            Focus::Growth => "Keep evolving in mind, body and character",
        }
    }

    /// Default life direction statement for this focus.
    pub fn direction_template(&self) -> String {
        match self {
            Focus::Wealth => {
                "Build lasting wealth that gives my family security and the freedom to choose."
            }
            Focus::Mastery => "Become a true master of my craft and keep raising my standard.",
            Focus::Impact => "Make a meaningful difference in the lives of the people around me.",
            Focus::Freedom => "Design a life where my time and my choices are my own.",
            Focus::Growth => "Grow every day into the strongest, wisest version of myself.",
        }
        .to_string()
    }

    pub fn goal_template(&self) -> TitledEntry {
        let (title, description) = match self {
            Focus::Wealth => ("Save six months of expenses", "A safety net before any bigger bets"),
            Focus::Mastery => ("Ship one portfolio-grade project", "Proof of skill that others can see"),
            Focus::Impact => ("Mentor three people this year", "Pass on what I have learned"),
            Focus::Freedom => ("Work remotely two days a week", "Take back control of my schedule"),
            Focus::Growth => ("Build a daily learning habit", "Read, reflect and practice every day"),
        };
        TitledEntry::new(title, description)
    }

    pub fn project_template(&self) -> TitledEntry {
        let (title, description) = match self {
            Focus::Wealth => ("Monthly budget system", "Track every expense for 90 days"),
            Focus::Mastery => ("Deliberate practice plan", "Weekly drills on my weakest skill"),
            Focus::Impact => ("Community mentoring circle", "Monthly sessions with mentees"),
            Focus::Freedom => ("Remote work proposal", "Make the case to my manager"),
            Focus::Growth => ("30-day reading sprint", "One book per week, notes for each"),
        };
        TitledEntry::new(title, description)
    }

    pub fn tasks_template(&self) -> Vec<String> {
        let tasks: [&str; 3] = match self {
            Focus::Wealth => [
                "List all monthly expenses",
                "Open a dedicated savings account",
                "Automate a weekly transfer",
            ],
            Focus::Mastery => [
                "Pick the skill to improve first",
                "Block 45 minutes of practice",
                "Record today's progress",
            ],
            Focus::Impact => [
                "Write down who I could help",
                "Reach out to one person",
                "Schedule the first session",
            ],
            Focus::Freedom => [
                "Track where my hours go",
                "Draft the remote proposal",
                "Cancel one obligation I don't need",
            ],
            Focus::Growth => [
                "Choose this week's book",
                "Read 20 pages",
                "Write three takeaways",
            ],
        };
        tasks.iter().map(|t| t.to_string()).collect()
    }
}

impl std::fmt::Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Focus::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown focus '{s}' (expected one of wealth, mastery, impact, freedom, growth)"))
    }
}

/// Direction generated when the flow is skipped.
pub fn default_direction(focus: Option<Focus>) -> String {
    focus
        .map(|f| f.direction_template())
        .unwrap_or_else(|| FALLBACK_DIRECTION.to_string())
}
