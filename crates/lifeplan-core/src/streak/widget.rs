//! Home-screen widget snapshot.
//!
//! Each widget instance reads its own `widget_data_<id>` key, so several
//! widgets can show different streaks side by side.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::StreakRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    pub widget_id: String,
    pub name: String,
    pub icon: String,
    pub color_token: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub next_milestone: u32,
    pub last_check_in_date: Option<NaiveDate>,
    pub checklist_done: usize,
    pub checklist_total: usize,
    pub updated_at: DateTime<Utc>,
}

impl WidgetSnapshot {
    pub fn from_record(widget_id: &str, record: &StreakRecord, now: DateTime<Utc>) -> Self {
        Self {
            widget_id: widget_id.to_string(),
            name: record.name.clone(),
            icon: record.icon.clone(),
            color_token: record.color_token.clone(),
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            next_milestone: record.next_milestone,
            last_check_in_date: record.last_check_in_date,
            checklist_done: record.completed_items(),
            checklist_total: record.checklist.len(),
            updated_at: now,
        }
    }

    /// Days left until the next milestone.
    pub fn days_to_milestone(&self) -> u32 {
        self.next_milestone.saturating_sub(self.current_streak)
    }
}
