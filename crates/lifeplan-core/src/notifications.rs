//! Ephemeral notification registry (toasts).
//!
//! An ordered list of transient messages. Each entry carries its own
//! auto-dismiss deadline; the owner calls [`NotificationRegistry::expire`] from
//! its tick loop to drop the ones whose time is up. A duration of zero or less,
//! or one too large to represent as a timestamp, means the entry stays until
//! dismissed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default auto-dismiss time in milliseconds.
pub const DEFAULT_DURATION_MS: i64 = 3000;

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Optional extras for a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    /// Overrides the registry default.
    pub duration_ms: Option<i64>,
    pub title: Option<String>,
    pub action_label: Option<String>,
}

/// Input to [`NotificationRegistry::add_notification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(flatten)]
    pub options: NotificationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub duration_ms: i64,
    pub title: Option<String>,
    pub action_label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// When this entry dismisses itself, if ever.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.duration_ms <= 0 {
            return None;
        }
        Duration::try_milliseconds(self.duration_ms)
            .and_then(|d| self.created_at.checked_add_signed(d))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationRegistry {
    entries: Vec<Notification>,
    next_id: NotificationId,
    default_duration_ms: i64,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::with_default_duration(DEFAULT_DURATION_MS)
    }

    pub fn with_default_duration(default_duration_ms: i64) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            default_duration_ms,
        }
    }

    /// Append a notification created now.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: Option<i64>,
        options: NotificationOptions,
    ) -> NotificationId {
        self.show_at(message, kind, duration_ms, options, Utc::now())
    }

    /// Append a notification created at `now`.
    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: Option<i64>,
        options: NotificationOptions,
        now: DateTime<Utc>,
    ) -> NotificationId {
        let id = self.next_id;
        self.next_id += 1;
        let duration_ms = duration_ms
            .or(options.duration_ms)
            .unwrap_or(self.default_duration_ms);
        self.entries.push(Notification {
            id,
            message: message.into(),
            kind,
            duration_ms,
            title: options.title,
            action_label: options.action_label,
            created_at: now,
        });
        tracing::debug!(id, ?kind, duration_ms, "notification shown");
        id
    }

    pub fn add_notification(&mut self, request: NotificationRequest) -> NotificationId {
        self.show(request.message, request.kind, None, request.options)
    }

    pub fn show_success(
        &mut self,
        message: impl Into<String>,
        opts: Option<NotificationOptions>,
    ) -> NotificationId {
        self.add_notification(NotificationRequest {
            message: message.into(),
            kind: NotificationKind::Success,
            options: opts.unwrap_or_default(),
        })
    }

    pub fn show_error(
        &mut self,
        message: impl Into<String>,
        opts: Option<NotificationOptions>,
    ) -> NotificationId {
        self.add_notification(NotificationRequest {
            message: message.into(),
            kind: NotificationKind::Error,
            options: opts.unwrap_or_default(),
        })
    }

    pub fn show_warning(
        &mut self,
        message: impl Into<String>,
        opts: Option<NotificationOptions>,
    ) -> NotificationId {
        self.add_notification(NotificationRequest {
            message: message.into(),
            kind: NotificationKind::Warning,
            options: opts.unwrap_or_default(),
        })
    }

    pub fn show_info(
        &mut self,
        message: impl Into<String>,
        opts: Option<NotificationOptions>,
    ) -> NotificationId {
        self.add_notification(NotificationRequest {
            message: message.into(),
            kind: NotificationKind::Info,
            options: opts.unwrap_or_default(),
        })
    }

    /// Remove an entry early. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Drop every entry whose deadline has passed; returns their ids.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<NotificationId> {
        let mut expired = Vec::new();
        self.entries.retain(|n| {
            if n.is_expired(now) {
                expired.push(n.id);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current entries, oldest first.
    pub fn active(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Toast strip on the todo input screen.
///
/// Renders exactly two message/kind combinations and ignores every other
/// entry in the registry.
pub struct TodoToastView;

impl TodoToastView {
    pub const ADDED: (&'static str, NotificationKind) =
        ("Todo added", NotificationKind::Success);
    pub const EMPTY: (&'static str, NotificationKind) =
        ("Please enter a todo", NotificationKind::Error);

    pub fn renders(notification: &Notification) -> bool {
        let entry = (notification.message.as_str(), notification.kind);
        entry == Self::ADDED || entry == Self::EMPTY
    }

    pub fn visible(registry: &NotificationRegistry) -> Vec<&Notification> {
        registry
            .active()
            .iter()
            .filter(|n| Self::renders(n))
            .collect()
    }
}
