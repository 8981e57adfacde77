// 📣 Feedback channels
//
// Two outbound collaborators:
// - Announcer: short accessibility messages describing state changes
// - Notifier: leveled, transient user notifications
//
// The core decides WHAT to say; delivery belongs to the front end.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Vehicle;
use crate::comparison::{ComparisonAction, ComparisonChange, MAX_COMPARED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

pub trait Announcer {
    fn announce(&mut self, message: String);
}

pub trait Notifier {
    fn notify(&mut self, level: NotificationLevel, message: String);
}

// ============================================================================
// MESSAGE WORDING
// ============================================================================

pub fn comparison_message(change: &ComparisonChange<'_>) -> String {
    let verb = match change.action {
        ComparisonAction::Added => "added to",
        ComparisonAction::Removed => "removed from",
    };
    format!("{} {} comparison", change.vehicle.title(), verb)
}

pub fn capacity_message() -> String {
    format!("You can compare up to {} vehicles at a time", MAX_COMPARED)
}

pub fn search_results_message(count: usize) -> String {
    format!("Found {} vehicles matching your criteria", count)
}

pub fn details_message(vehicle: &Vehicle) -> String {
    format!("Opening details for {}", vehicle.title())
}

pub fn contact_message(vehicle: &Vehicle) -> String {
    format!("Connecting you with {}", vehicle.dealer)
}

pub const FILTERS_CLEARED: &str = "Filters cleared, showing all vehicles";
pub const COMPARISON_CLEARED: &str = "Comparison cleared";

// ============================================================================
// IN-MEMORY SINK
// ============================================================================

/// Collects everything said, for front ends that render it themselves
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    announcements: Vec<String>,
    notifications: Vec<Notification>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_announcement(&self) -> Option<&str> {
        self.announcements.last().map(String::as_str)
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Take everything collected so far
    pub fn drain(&mut self) -> (Vec<String>, Vec<Notification>) {
        (
            std::mem::take(&mut self.announcements),
            std::mem::take(&mut self.notifications),
        )
    }
}

impl Announcer for FeedbackLog {
    fn announce(&mut self, message: String) {
        tracing::debug!(%message, "announce");
        self.announcements.push(message);
    }
}

impl Notifier for FeedbackLog {
    fn notify(&mut self, level: NotificationLevel, message: String) {
        tracing::debug!(level = level.as_str(), %message, "notify");
        self.notifications.push(Notification {
            level,
            message,
            at: Utc::now(),
        });
    }
}
