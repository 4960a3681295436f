use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{views::tasks_for_date, Task, ValidationError, ValidationResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub task_count: usize,
}

impl CalendarDay {
    pub fn has_tasks(&self) -> bool {
        self.task_count > 0
    }
}

/// One month of the calendar widget with per-day task counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Blank cells before the 1st in a Sunday-first grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn build(tasks: &[Task], year: i32, month: u32) -> ValidationResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ValidationError::InvalidMonth(format!("{year}-{month:02}")))?;

        let days = first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|date| CalendarDay {
                date,
                task_count: tasks_for_date(tasks, date).len(),
            })
            .collect();

        Ok(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    /// Accepts `2024-06` or a header label like `June 2024`.
    pub fn parse_month(input: &str) -> ValidationResult<(i32, u32)> {
        let input = input.trim();
        let invalid = || ValidationError::InvalidMonth(input.to_string());

        if let Ok(date) = NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d") {
            return Ok((date.year(), date.month()));
        }

        NaiveDate::parse_from_str(&format!("1 {input}"), "%d %B %Y")
            .map(|date| (date.year(), date.month()))
            .map_err(|_| invalid())
    }

    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    pub fn busy_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.iter().filter(|d| d.has_tasks())
    }
}
