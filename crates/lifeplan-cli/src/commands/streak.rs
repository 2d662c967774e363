use chrono::{Local, NaiveDate};
use clap::Subcommand;
use lifeplan_core::notifications::NotificationRegistry;
use lifeplan_core::storage::{keys, load_json};
use lifeplan_core::streak::WidgetSnapshot;
use lifeplan_core::{Config, SqliteStore, StoreError, StreakTracker};
use serde_json::json;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Print the streak record as JSON
    Show,
    /// Check in for today (or the given date)
    CheckIn {
        /// Date to check in for (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also refresh this home-screen widget's snapshot
        #[arg(long)]
        widget: Option<String>,
    },
    /// Edit the habit checklist
    Checklist {
        #[command(subcommand)]
        action: ChecklistAction,
    },
    /// List the snapshots mirrored for home-screen widgets
    Widgets,
    /// Clear the current streak
    Reset,
}

#[derive(Subcommand)]
pub enum ChecklistAction {
    /// Add an item
    Add { text: String },
    /// Toggle an item's completion
    Toggle { id: String },
    /// Rename an item
    Rename { id: String, text: String },
    /// Remove an item
    Remove { id: String },
}

pub async fn run(action: StreakAction) -> CommandResult {
    let config = Config::load_or_default();
    let registry = NotificationRegistry::with_default_duration(config.notifications.default_duration_ms);
    let store = open_store()?;
    let mut tracker = StreakTracker::load(store.clone())
        .await
        .with_notifications(registry);

    match action {
        StreakAction::Show => {
            print_json(tracker.record())?;
        }
        StreakAction::CheckIn { date, widget } => {
            if let Some(widget) = widget {
                tracker = tracker.with_widget(widget);
            }
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let check_in = tracker.check_in(today).await?;
            print_json(&json!({
                "checkIn": check_in,
                "record": tracker.record(),
                "notifications": tracker.notifications().active(),
            }))?;
        }
        StreakAction::Checklist { action } => {
            match action {
                ChecklistAction::Add { text } => {
                    let item = tracker.add_item(&text).await?;
                    print_json(&item)?;
                }
                ChecklistAction::Toggle { id } => {
                    let completed = tracker.toggle_item(&id).await?;
                    print_json(&json!({ "id": id, "completed": completed }))?;
                }
                ChecklistAction::Rename { id, text } => {
                    tracker.rename_item(&id, &text).await?;
                    println!("ok");
                }
                ChecklistAction::Remove { id } => {
                    let item = tracker.remove_item(&id).await?;
                    print_json(&item)?;
                }
            }
        }
        StreakAction::Reset => {
            tracker.reset().await;
            println!("streak reset");
        }
        StreakAction::Widgets => {
            print_json(&widget_snapshots(&store).await?)?;
        }
    }
    Ok(())
}

async fn widget_snapshots(store: &SqliteStore) -> Result<Vec<WidgetSnapshot>, StoreError> {
    let mut snapshots = Vec::new();
    for key in store.keys_with_prefix(keys::WIDGET_DATA_PREFIX)? {
        match load_json::<WidgetSnapshot>(store, &key).await {
            Ok(Some(snapshot)) => snapshots.push(snapshot),
            Ok(None) => {}
            Err(e) => tracing::warn!(%key, error = %e, "skipping unreadable widget snapshot"),
        }
    }
    Ok(snapshots)
}
