//! Daily check-in streak record.
//!
//! Pure state: no storage, no notifications. [`super::StreakTracker`] wraps a
//! record and persists it after every mutation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Checklist items allowed per streak.
pub const MAX_CHECKLIST_ITEMS: usize = 10;

/// Fixed milestones; past the last one every hundred days counts.
pub const MILESTONES: [u32; 5] = [7, 30, 90, 180, 365];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    #[error("You've already checked in today")]
    AlreadyCheckedIn { date: NaiveDate },

    /// An earlier day that is already in the history.
    #[error("You've already checked in on {date}")]
    AlreadyCheckedInOn { date: NaiveDate },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("You can only have up to {max} checklist items")]
    Full { max: usize },

    #[error("Checklist item cannot be empty")]
    EmptyText,

    #[error("Checklist item not found: {id}")]
    NotFound { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub date: NaiveDate,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Set when this check-in landed exactly on a milestone.
    pub milestone: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub name: String,
    pub icon: String,
    pub color_token: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_check_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub check_in_dates: BTreeSet<NaiveDate>,
    pub next_milestone: u32,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl Default for StreakRecord {
    fn default() -> Self {
        Self {
            name: "Daily Check-in".to_string(),
            icon: "flame".to_string(),
            color_token: "orange".to_string(),
            current_streak: 0,
            longest_streak: 0,
            last_check_in_date: None,
            check_in_dates: BTreeSet::new(),
            next_milestone: next_milestone(0),
            checklist: Vec::new(),
        }
    }
}

/// Smallest milestone strictly above `streak`.
pub fn next_milestone(streak: u32) -> u32 {
    MILESTONES
        .iter()
        .copied()
        .find(|m| *m > streak)
        .unwrap_or_else(|| (streak / 100 + 1) * 100)
}

pub fn is_milestone(streak: u32) -> bool {
    MILESTONES.contains(&streak) || (streak > 365 && streak % 100 == 0)
}

impl StreakRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_checked_in_on(&self, date: NaiveDate) -> bool {
        self.last_check_in_date == Some(date) || self.check_in_dates.contains(&date)
    }

    /// Record today's check-in.
    ///
    /// Consecutive days extend the streak; any gap (or a first check-in)
    /// starts over at one.
    pub fn check_in(&mut self, today: NaiveDate) -> Result<CheckIn, CheckInError> {
        if self.last_check_in_date == Some(today) {
            return Err(CheckInError::AlreadyCheckedIn { date: today });
        }
        if self.check_in_dates.contains(&today) {
            return Err(CheckInError::AlreadyCheckedInOn { date: today });
        }

        let consecutive = match (self.last_check_in_date, today.pred_opt()) {
            (Some(last), Some(yesterday)) => last == yesterday,
            _ => false,
        };
        self.current_streak = if consecutive {
            self.current_streak.saturating_add(1)
        } else {
            1
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_check_in_date = Some(today);
        self.check_in_dates.insert(today);
        self.next_milestone = next_milestone(self.current_streak);

        Ok(CheckIn {
            date: today,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            milestone: is_milestone(self.current_streak).then_some(self.current_streak),
        })
    }

    /// Clear streak progress. The personal best and the checklist survive.
    pub fn reset(&mut self) {
        self.current_streak = 0;
        self.last_check_in_date = None;
        self.check_in_dates.clear();
        self.next_milestone = next_milestone(0);
    }

    // ── Checklist ────────────────────────────────────────────────────

    pub fn add_item(&mut self, text: &str) -> Result<&ChecklistItem, ChecklistError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChecklistError::EmptyText);
        }
        if self.checklist.len() >= MAX_CHECKLIST_ITEMS {
            return Err(ChecklistError::Full {
                max: MAX_CHECKLIST_ITEMS,
            });
        }
        self.checklist.push(ChecklistItem {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        });
        // Just pushed.
        Ok(&self.checklist[self.checklist.len() - 1])
    }

    /// Flip completion; returns the new value.
    pub fn toggle_item(&mut self, id: &str) -> Result<bool, ChecklistError> {
        let item = self.item_mut(id)?;
        item.completed = !item.completed;
        Ok(item.completed)
    }

    pub fn rename_item(&mut self, id: &str, text: &str) -> Result<(), ChecklistError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChecklistError::EmptyText);
        }
        self.item_mut(id)?.text = text.to_string();
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<ChecklistItem, ChecklistError> {
        let index = self
            .checklist
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ChecklistError::NotFound { id: id.to_string() })?;
        Ok(self.checklist.remove(index))
    }

    pub fn completed_items(&self) -> usize {
        self.checklist.iter().filter(|item| item.completed).count()
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut ChecklistItem, ChecklistError> {
        self.checklist
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ChecklistError::NotFound { id: id.to_string() })
    }
}
