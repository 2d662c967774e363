//! System Hierarchy step: the four editable layers (direction, goal, project,
//! tasks) and the save-all reconciler.
//!
//! ## Save state
//!
//! Each item keeps the value being edited (`current`), the last saved snapshot
//! (`original`) and a `saved` flag. The flag is sticky-dirty: an edit that makes
//! `current` differ from `original` clears it, and reverting the edit does not
//! set it again. Only a save does. [`SystemHierarchy::all_saved`] therefore
//! checks both the flags and the values.

use serde::{Deserialize, Serialize};

use super::focus::Focus;
use crate::animation::{Animation, AnimationDriver, MotionProfile};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyKind {
    Direction,
    Goal,
    Project,
    Tasks,
}

impl HierarchyKind {
    /// Reveal and save order.
    pub const ORDER: [HierarchyKind; 4] = [
        HierarchyKind::Direction,
        HierarchyKind::Goal,
        HierarchyKind::Project,
        HierarchyKind::Tasks,
    ];
}

/// A `{title, description}` pair used by goal and project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TitledEntry {
    pub title: String,
    pub description: String,
}

impl TitledEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Edit state for one hierarchy item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEditState<T> {
    current: T,
    original: T,
    saved: bool,
}

impl<T: Clone + PartialEq> ItemEditState<T> {
    /// Start unsaved with `current == original`.
    pub fn new(value: T) -> Self {
        Self {
            current: value.clone(),
            original: value,
            saved: false,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn original(&self) -> &T {
        &self.original
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn has_changed(&self) -> bool {
        self.current != self.original
    }

    /// Apply an edit. Clears `saved` whenever the result differs from the
    /// last saved snapshot.
    pub fn edit(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.current);
        if self.has_changed() {
            self.saved = false;
        }
    }

    /// Replace the value being edited.
    pub fn set(&mut self, value: T) {
        self.edit(|current| *current = value);
    }

    /// Snapshot `current` as the saved value. Returns whether anything had to
    /// be committed.
    pub fn commit(&mut self) -> bool {
        if self.saved && !self.has_changed() {
            return false;
        }
        self.original = self.current.clone();
        self.saved = true;
        true
    }
}

/// The four hierarchy items, mounted while the System Hierarchy step is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemHierarchy {
    pub direction: ItemEditState<String>,
    pub goal: ItemEditState<TitledEntry>,
    pub project: ItemEditState<TitledEntry>,
    pub tasks: ItemEditState<Vec<String>>,
}

impl SystemHierarchy {
    /// Build the default hierarchy for `focus`, seeded with the life direction
    /// carried over from earlier steps.
    pub fn new(focus: Option<Focus>, life_direction: &str) -> Self {
        let focus = focus.unwrap_or(Focus::Growth);
        Self {
            direction: ItemEditState::new(life_direction.to_string()),
            goal: ItemEditState::new(focus.goal_template()),
            project: ItemEditState::new(focus.project_template()),
            tasks: ItemEditState::new(focus.tasks_template()),
        }
    }

    pub fn is_saved(&self, kind: HierarchyKind) -> bool {
        match kind {
            HierarchyKind::Direction => self.direction.is_saved(),
            HierarchyKind::Goal => self.goal.is_saved(),
            HierarchyKind::Project => self.project.is_saved(),
            HierarchyKind::Tasks => self.tasks.is_saved(),
        }
    }

    pub fn has_changed(&self, kind: HierarchyKind) -> bool {
        match kind {
            HierarchyKind::Direction => self.direction.has_changed(),
            HierarchyKind::Goal => self.goal.has_changed(),
            HierarchyKind::Project => self.project.has_changed(),
            HierarchyKind::Tasks => self.tasks.has_changed(),
        }
    }

    /// Every item saved and none edited since.
    pub fn all_saved(&self) -> bool {
        HierarchyKind::ORDER
            .iter()
            .all(|kind| self.is_saved(*kind) && !self.has_changed(*kind))
    }

    /// Items still needing a save, in order.
    pub fn pending(&self) -> Vec<HierarchyKind> {
        HierarchyKind::ORDER
            .into_iter()
            .filter(|kind| !self.is_saved(*kind) || self.has_changed(*kind))
            .collect()
    }

    // ── Edits ────────────────────────────────────────────────────────

    pub fn set_direction(&mut self, text: impl Into<String>) {
        self.direction.set(text.into());
    }

    pub fn set_goal_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.goal.edit(|goal| goal.title = title);
    }

    pub fn set_goal_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.goal.edit(|goal| goal.description = description);
    }

    pub fn set_project_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.project.edit(|project| project.title = title);
    }

    pub fn set_project_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.project.edit(|project| project.description = description);
    }

    pub fn add_task(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty("Task"));
        }
        self.tasks.edit(|tasks| tasks.push(text.trim().to_string()));
        Ok(())
    }

    pub fn update_task(&mut self, index: usize, text: impl Into<String>) -> Result<(), ValidationError> {
        let len = self.tasks.current().len();
        if index >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "tasks".into(),
                index,
                len,
            });
        }
        let text = text.into();
        self.tasks.edit(|tasks| tasks[index] = text);
        Ok(())
    }

    pub fn remove_task(&mut self, index: usize) -> Result<String, ValidationError> {
        let len = self.tasks.current().len();
        if index >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "tasks".into(),
                index,
                len,
            });
        }
        let mut removed = String::new();
        self.tasks.edit(|tasks| removed = tasks.remove(index));
        Ok(removed)
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Save one item after validating it.
    ///
    /// Blank direction or goal/project titles are rejected and the item stays
    /// unsaved.
    pub fn save(&mut self, kind: HierarchyKind) -> Result<bool, ValidationError> {
        match kind {
            HierarchyKind::Direction => {
                if self.direction.current().trim().is_empty() {
                    return Err(ValidationError::empty("Life direction"));
                }
                Ok(self.direction.commit())
            }
            HierarchyKind::Goal => {
                if self.goal.current().title.trim().is_empty() {
                    return Err(ValidationError::empty("Goal title"));
                }
                Ok(self.goal.commit())
            }
            HierarchyKind::Project => {
                if self.project.current().title.trim().is_empty() {
                    return Err(ValidationError::empty("Project title"));
                }
                Ok(self.project.commit())
            }
            HierarchyKind::Tasks => Ok(self.tasks.commit()),
        }
    }

    fn commit(&mut self, kind: HierarchyKind) -> bool {
        match kind {
            HierarchyKind::Direction => self.direction.commit(),
            HierarchyKind::Goal => self.goal.commit(),
            HierarchyKind::Project => self.project.commit(),
            HierarchyKind::Tasks => self.tasks.commit(),
        }
    }

    /// Commit every pending item in fixed order.
    ///
    /// Each item gets its save pulse whether or not it needed saving, and the
    /// next item is only processed once that pulse has finished. Returns the
    /// items that were actually committed.
    ///
    /// Unlike [`save`](Self::save), no title checks run here: save-all always
    /// leaves the hierarchy fully saved, blank fields included.
    pub async fn save_all(
        &mut self,
        driver: &dyn AnimationDriver,
        motion: &MotionProfile,
    ) -> Vec<HierarchyKind> {
        let pending = self.pending();
        let mut committed = Vec::new();
        for kind in HierarchyKind::ORDER {
            if pending.contains(&kind) && self.commit(kind) {
                committed.push(kind);
            }
            motion.play(driver, Animation::SavePulse { item: kind }).await;
        }
        tracing::debug!(?committed, "hierarchy save-all finished");
        committed
    }
}
