//! Daily check-in streaks with a small habit checklist.

mod record;
mod tracker;
mod widget;

pub use record::{
    is_milestone, next_milestone, CheckIn, CheckInError, ChecklistError, ChecklistItem,
    StreakRecord, MAX_CHECKLIST_ITEMS, MILESTONES,
};
pub use tracker::{StreakTracker, SAVE_FAILED_MESSAGE};
pub use widget::WidgetSnapshot;
