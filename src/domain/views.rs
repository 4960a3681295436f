//! Derived views over the current task list.
//!
//! Everything here is pure: callers pass the tasks and the date they
//! consider "today", and get plain data back for a renderer to consume.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::Task;

/// How far back the streak scan looks.
pub const STREAK_WINDOW_DAYS: u64 = 30;

/// Maximum number of entries in the upcoming list.
pub const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompletionMetrics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage in `0..=100`.
    pub completion_rate: u8,
}

impl CompletionMetrics {
    pub fn compute(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            (100.0 * completed as f64 / total as f64).round() as u8
        };

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }
}

/// Counts consecutive days with at least one completed task due that day,
/// walking back from `today`. A past day with nothing completed ends the
/// scan; `today` itself never does.
pub fn streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let mut streak = 0;

    for offset in 0..STREAK_WINDOW_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };

        let has_completed = tasks.iter().any(|t| t.completed && t.is_due_on(day));
        if has_completed {
            streak += 1;
        } else if day < today {
            break;
        }
    }

    streak
}

fn pending_from(tasks: &[Task], today: NaiveDate) -> impl Iterator<Item = &Task> {
    tasks
        .iter()
        .filter(move |t| !t.completed && t.deadline.is_some_and(|d| d >= today))
}

/// Pending tasks due today or later, soonest first, at most five.
pub fn upcoming(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut upcoming: Vec<Task> = pending_from(tasks, today).cloned().collect();
    upcoming.sort_by_key(|t| t.deadline);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

/// Size of the untruncated upcoming set, shown on the tracker.
pub fn upcoming_count(tasks: &[Task], today: NaiveDate) -> usize {
    pending_from(tasks, today).count()
}

pub fn tasks_for_date(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_due_on(date)).cloned().collect()
}

/// `Today`, `Tomorrow`, or a short `Jun 1` style date.
pub fn display_date(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

/// `Saturday, June 1, 2024`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// The three tracker widgets plus the counts behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub metrics: CompletionMetrics,
    pub streak: u32,
    pub upcoming_count: usize,
    pub upcoming: Vec<Task>,
}

impl Dashboard {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        Self {
            today,
            metrics: CompletionMetrics::compute(tasks),
            streak: streak(tasks, today),
            upcoming_count: upcoming_count(tasks, today),
            upcoming: upcoming(tasks, today),
        }
    }
}
