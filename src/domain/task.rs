use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Username, ValidationError, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Ids are minted from the wall clock in epoch milliseconds.
    pub fn generate() -> Self {
        TaskId(Utc::now().timestamp_millis())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case-insensitive reading of a priority label, used for markers and
/// ordering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
    Other,
}

/// A priority label as the user typed it or the server sent it, with any
/// emoji prefix and ` Priority` suffix stripped. The case is kept exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Priority(String);

impl Default for Priority {
    fn default() -> Self {
        Priority("Medium".to_string())
    }
}

impl Priority {
    /// Normalizes a form label such as `🚨 High Priority` into `High`.
    /// A blank label falls back to the default.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label
            .trim()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim();
        let trimmed = trimmed
            .strip_suffix(" Priority")
            .or_else(|| trimmed.strip_suffix(" priority"))
            .unwrap_or(trimmed)
            .trim();

        if trimmed.is_empty() {
            Priority::default()
        } else {
            Priority(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn level(&self) -> PriorityLevel {
        match self.0.to_ascii_lowercase().as_str() {
            "high" => PriorityLevel::High,
            "medium" => PriorityLevel::Medium,
            "low" => PriorityLevel::Low,
            _ => PriorityLevel::Other,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Priority::from_label(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub category: String,
    pub priority: Priority,
    /// `None` when the server sent a missing or malformed date; such tasks
    /// never show up in date-based views.
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    pub username: Username,
}

impl Task {
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.deadline == Some(date)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline.map(|d| d < today).unwrap_or(false)
    }

    pub fn status_display(&self) -> &'static str {
        if self.completed {
            "Completed"
        } else {
            "Pending"
        }
    }

    pub fn category_display(&self) -> &str {
        if self.category.trim().is_empty() {
            "No category"
        } else {
            &self.category
        }
    }
}

/// Unvalidated input for a new task, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub category: String,
    pub priority: String,
    pub deadline: Option<String>,
}

impl TaskDraft {
    /// Checks the draft and turns it into a fully-populated task owned by
    /// `owner`. Nothing is sent anywhere on failure.
    pub fn validate(&self, id: TaskId, owner: &Username) -> ValidationResult<Task> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        let raw_deadline = self
            .deadline
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(ValidationError::MissingField("deadline"))?;
        let deadline = NaiveDate::parse_from_str(raw_deadline, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw_deadline.to_string()))?;

        Ok(Task {
            id,
            name: name.to_string(),
            category: self.category.trim().to_string(),
            priority: Priority::from_label(&self.priority),
            deadline: Some(deadline),
            completed: false,
            username: owner.clone(),
        })
    }
}
