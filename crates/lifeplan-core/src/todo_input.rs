//! Quick-add todo input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notifications::{NotificationRegistry, TodoToastView};

/// A todo ready to be handed to whatever list owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Text field plus submit button.
#[derive(Debug, Clone, Default)]
pub struct TodoInput {
    text: String,
}

impl TodoInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Submit the field. Blank input leaves the field as is; anything else
    /// clears it and yields a draft. Either way a toast says what happened.
    pub fn submit(&mut self, notifications: &mut NotificationRegistry) -> Option<TodoDraft> {
        let text = self.text.trim();
        if text.is_empty() {
            let (message, kind) = TodoToastView::EMPTY;
            notifications.show(message, kind, None, Default::default());
            return None;
        }

        let draft = TodoDraft {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.text.clear();
        let (message, kind) = TodoToastView::ADDED;
        notifications.show(message, kind, None, Default::default());
        Some(draft)
    }
}
