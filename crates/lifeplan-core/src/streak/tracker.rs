//! Streak screen state: a record plus its persistence and toasts.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::record::{CheckIn, CheckInError, ChecklistError, ChecklistItem, StreakRecord};
use super::widget::WidgetSnapshot;
use crate::events::Event;
use crate::notifications::NotificationRegistry;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Shown when a check-in could not be written. The in-memory streak is kept.
pub const SAVE_FAILED_MESSAGE: &str = "Couldn't save your check-in. Please try again.";

pub struct StreakTracker {
    store: Arc<dyn KeyValueStore>,
    record: StreakRecord,
    widget_id: Option<String>,
    notifications: NotificationRegistry,
    events: Vec<Event>,
}

impl StreakTracker {
    /// Load the stored record, or start a fresh one if it is missing or
    /// unreadable.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let record = match load_json::<StreakRecord>(store.as_ref(), keys::STREAK_DATA).await {
            Ok(Some(record)) => record,
            Ok(None) => StreakRecord::new(),
            Err(e) => {
                warn!(error = %e, "failed to load streak data; starting fresh");
                StreakRecord::new()
            }
        };
        Self {
            store,
            record,
            widget_id: None,
            notifications: NotificationRegistry::new(),
            events: Vec::new(),
        }
    }

    /// Mirror every change into the given widget's snapshot key.
    pub fn with_widget(mut self, widget_id: impl Into<String>) -> Self {
        self.widget_id = Some(widget_id.into());
        self
    }

    /// Use a registry with a configured default duration.
    pub fn with_notifications(mut self, notifications: NotificationRegistry) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn record(&self) -> &StreakRecord {
        &self.record
    }

    pub fn notifications(&self) -> &NotificationRegistry {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationRegistry {
        &mut self.notifications
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Check-in ─────────────────────────────────────────────────────

    pub async fn check_in(&mut self, today: NaiveDate) -> Result<CheckIn, CheckInError> {
        let check_in = match self.record.check_in(today) {
            Ok(check_in) => check_in,
            Err(e) => {
                self.notifications.show_error(e.to_string(), None);
                return Err(e);
            }
        };
        info!(
            current = check_in.current_streak,
            longest = check_in.longest_streak,
            "streak checked in"
        );
        self.events.push(Event::StreakCheckedIn {
            date: today,
            current_streak: check_in.current_streak,
            longest_streak: check_in.longest_streak,
            at: Utc::now(),
        });

        if !self.persist().await {
            self.notifications.show_error(SAVE_FAILED_MESSAGE, None);
            return Ok(check_in);
        }

        match check_in.milestone {
            Some(milestone) => {
                self.notifications
                    .show_success(format!("{milestone} day milestone reached!"), None);
                self.events.push(Event::MilestoneReached {
                    milestone,
                    at: Utc::now(),
                });
            }
            None => {
                self.notifications.show_success(
                    format!("Day {} complete. Keep it going!", check_in.current_streak),
                    None,
                );
            }
        }
        Ok(check_in)
    }

    pub async fn reset(&mut self) {
        self.record.reset();
        self.persist().await;
    }

    // ── Checklist ────────────────────────────────────────────────────

    pub async fn add_item(&mut self, text: &str) -> Result<ChecklistItem, ChecklistError> {
        let item = self
            .record
            .add_item(text)
            .cloned()
            .map_err(|e| self.reject(e))?;
        self.persist().await;
        Ok(item)
    }

    pub async fn toggle_item(&mut self, id: &str) -> Result<bool, ChecklistError> {
        let completed = self.record.toggle_item(id).map_err(|e| self.reject(e))?;
        self.persist().await;
        Ok(completed)
    }

    pub async fn rename_item(&mut self, id: &str, text: &str) -> Result<(), ChecklistError> {
        self.record
            .rename_item(id, text)
            .map_err(|e| self.reject(e))?;
        self.persist().await;
        Ok(())
    }

    pub async fn remove_item(&mut self, id: &str) -> Result<ChecklistItem, ChecklistError> {
        let item = self.record.remove_item(id).map_err(|e| self.reject(e))?;
        self.persist().await;
        Ok(item)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reject(&mut self, e: ChecklistError) -> ChecklistError {
        self.notifications.show_error(e.to_string(), None);
        e
    }

    /// Write the whole record, then the widget snapshot. No rollback: on
    /// failure memory stays ahead of storage.
    async fn persist(&mut self) -> bool {
        if let Err(e) = save_json(self.store.as_ref(), keys::STREAK_DATA, &self.record).await {
            warn!(error = %e, "failed to persist streak data");
            return false;
        }
        if let Some(widget_id) = self.widget_id.as_deref() {
            let snapshot = WidgetSnapshot::from_record(widget_id, &self.record, Utc::now());
            let key = keys::widget_data(widget_id);
            if let Err(e) = save_json(self.store.as_ref(), &key, &snapshot).await {
                warn!(key, error = %e, "failed to update widget snapshot");
            } else {
                debug!(key, "widget snapshot updated");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationKind;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    async fn tracker() -> (StreakTracker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (StreakTracker::load(store.clone()).await, store)
    }

    #[tokio::test]
    async fn check_in_persists_the_whole_record() {
        let (mut tracker, store) = tracker().await;
        tracker.check_in(day(1)).await.unwrap();
        tracker.check_in(day(2)).await.unwrap();

        let stored: StreakRecord = load_json(store.as_ref(), keys::STREAK_DATA)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_streak, 2);
        assert_eq!(store.write_count(keys::STREAK_DATA).await, 2);

        let reloaded = StreakTracker::load(store.clone()).await;
        assert_eq!(reloaded.record(), tracker.record());
    }

    #[tokio::test]
    async fn repeat_check_in_shows_error_and_writes_nothing() {
        let (mut tracker, store) = tracker().await;
        tracker.check_in(day(1)).await.unwrap();
        tracker.notifications_mut().clear();

        assert!(tracker.check_in(day(1)).await.is_err());
        assert_eq!(store.write_count(keys::STREAK_DATA).await, 1);
        let toast = &tracker.notifications().active()[0];
        assert_eq!(toast.kind, NotificationKind::Error);
        assert_eq!(toast.message, "You've already checked in today");
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_ahead_and_shows_error() {
        let (mut tracker, store) = tracker().await;
        store.set_fail_writes(true);

        let check_in = tracker.check_in(day(1)).await.unwrap();
        assert_eq!(check_in.current_streak, 1);
        assert_eq!(tracker.record().current_streak, 1);
        assert!(!store.contains(keys::STREAK_DATA).await);
        assert!(tracker
            .notifications()
            .active()
            .iter()
            .any(|n| n.kind == NotificationKind::Error && n.message == SAVE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn milestone_shows_success_and_emits_event() {
        let store = Arc::new(MemoryStore::new());
        let seeded = StreakRecord {
            current_streak: 29,
            longest_streak: 29,
            last_check_in_date: Some(day(9)),
            ..Default::default()
        };
        save_json(store.as_ref(), keys::STREAK_DATA, &seeded)
            .await
            .unwrap();
        let mut tracker = StreakTracker::load(store).await;

        tracker.check_in(day(10)).await.unwrap();
        assert_eq!(
            tracker.notifications().active()[0].message,
            "30 day milestone reached!"
        );
        assert!(tracker
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::MilestoneReached { milestone: 30, .. })));
    }

    #[tokio::test]
    async fn eleventh_checklist_item_is_rejected_visibly() {
        let (mut tracker, store) = tracker().await;
        for i in 0..10 {
            tracker.add_item(&format!("Habit {i}")).await.unwrap();
        }
        let writes = store.write_count(keys::STREAK_DATA).await;

        let err = tracker.add_item("Habit 10").await.unwrap_err();
        assert_eq!(err, ChecklistError::Full { max: 10 });
        assert_eq!(tracker.record().checklist.len(), 10);
        assert_eq!(store.write_count(keys::STREAK_DATA).await, writes);
        let toast = tracker.notifications().active().last().unwrap();
        assert_eq!(toast.kind, NotificationKind::Error);
        assert_eq!(toast.message, "You can only have up to 10 checklist items");
    }

    #[tokio::test]
    async fn widget_snapshot_follows_every_mutation() {
        let store = Arc::new(MemoryStore::new());
        let mut tracker = StreakTracker::load(store.clone()).await.with_widget("small-1");

        let item = tracker.add_item("Read").await.unwrap();
        tracker.toggle_item(&item.id).await.unwrap();
        tracker.check_in(day(3)).await.unwrap();

        let key = keys::widget_data("small-1");
        assert_eq!(store.write_count(&key).await, 3);
        let snapshot: WidgetSnapshot = load_json(store.as_ref(), &key).await.unwrap().unwrap();
        assert_eq!(snapshot.current_streak, 1);
        assert_eq!(snapshot.checklist_done, 1);
    }

    #[tokio::test]
    async fn unreadable_record_starts_fresh() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::STREAK_DATA, "{not json").await.unwrap();
        let tracker = StreakTracker::load(store).await;
        assert_eq!(tracker.record(), &StreakRecord::new());
    }
}
