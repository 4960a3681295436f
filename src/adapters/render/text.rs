//! Plain-text rendering of the derived views for the terminal.

use chrono::NaiveDate;
use std::fmt::Write;

use crate::domain::*;

fn priority_marker(priority: &Priority) -> &'static str {
    match priority.level() {
        PriorityLevel::High => "!!!",
        PriorityLevel::Medium => "!! ",
        PriorityLevel::Low => "!  ",
        PriorityLevel::Other => "   ",
    }
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let m = &dashboard.metrics;

    let _ = writeln!(out, "{:>4}  Upcoming", dashboard.upcoming_count);
    let _ = writeln!(out, "{:>4}  Day Streak", dashboard.streak);
    let _ = writeln!(out, "{:>3}%  Done", m.completion_rate);
    let _ = writeln!(
        out,
        "      {} total, {} completed, {} pending",
        m.total, m.completed, m.pending
    );
    out.push('\n');
    out.push_str(&render_upcoming(&dashboard.upcoming, dashboard.today));
    out
}

pub fn render_upcoming(tasks: &[Task], today: NaiveDate) -> String {
    if tasks.is_empty() {
        return "No upcoming tasks\nAdd a task to see it here\n".to_string();
    }

    let mut out = String::from("Upcoming\n");
    for task in tasks {
        let when = task
            .deadline
            .map(|d| display_date(d, today))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} {:<10} {}  ({} • {} Priority)",
            priority_marker(&task.priority),
            when,
            task.name,
            task.category_display(),
            task.priority
        );
    }
    out
}

pub fn render_task_list(tasks: &[Task], today: NaiveDate) -> String {
    if tasks.is_empty() {
        return "No tasks\n".to_string();
    }

    let mut out = String::new();
    for task in tasks {
        let check = if task.completed { "[x]" } else { "[ ]" };
        let due = match task.deadline {
            Some(d) if task.is_overdue(today) => format!("{d} (overdue)"),
            Some(d) => d.to_string(),
            None => "no deadline".to_string(),
        };
        let _ = writeln!(
            out,
            "{check} {:<15} {} {:<30} {}  {}",
            task.id,
            priority_marker(&task.priority),
            task.name,
            task.category_display(),
            due
        );
    }
    out
}

pub fn render_day(date: NaiveDate, tasks: &[Task]) -> String {
    let mut out = format!("Tasks for {}\n", long_date(date));
    if tasks.is_empty() {
        out.push_str("  No tasks scheduled for this date.\n");
        return out;
    }

    for task in tasks {
        let _ = writeln!(out, "\n  {} [{}]", task.name, task.priority);
        let _ = writeln!(out, "    Category: {}", task.category_display());
        let _ = writeln!(out, "    Priority: {} Priority", task.priority);
        if let Some(deadline) = task.deadline {
            let _ = writeln!(out, "    Deadline: {deadline}");
        }
        let _ = writeln!(out, "    Status:   {}", task.status_display());
        let _ = writeln!(out, "    Id:       {}", task.id);
    }
    out
}

/// Sunday-first month grid. Days with tasks show their count, and today is
/// bracketed.
pub fn render_calendar(month: &CalendarMonth, today: NaiveDate) -> String {
    const CELL: usize = 6;

    let mut out = format!("{:^width$}\n", month.title(), width = CELL * 7);
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        let _ = write!(out, "{name:^width$}", width = CELL);
    }
    out.push('\n');

    let mut column = 0;
    for _ in 0..month.leading_blanks {
        out.push_str(&" ".repeat(CELL));
        column += 1;
    }

    for day in &month.days {
        let number = day.date.format("%-d").to_string();
        let label = if day.has_tasks() {
            format!("{number}*{}", day.task_count)
        } else {
            number
        };
        let label = if day.date == today {
            format!("[{label}]")
        } else {
            label
        };
        let _ = write!(out, "{label:^width$}", width = CELL);

        column += 1;
        if column == 7 {
            out.push('\n');
            column = 0;
        }
    }
    if column != 0 {
        out.push('\n');
    }
    out
}

pub fn render_resources(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "No resources yet\nUpload files or add YouTube links\n".to_string();
    }

    let mut out = String::new();
    for resource in resources {
        let icon = match resource.kind {
            ResourceKind::File { .. } if resource.is_image() => "🖼",
            ResourceKind::File { .. } => "📄",
            ResourceKind::Youtube { .. } => "▶",
        };
        let _ = writeln!(
            out,
            "{icon} {:<15} {:<40} {}",
            resource.id,
            resource.title,
            resource.meta_display()
        );
    }
    out
}

pub fn render_resource(resource: &Resource) -> String {
    let mut out = format!("{}\n", resource.title);
    let _ = writeln!(out, "  Type:    {}", resource.kind.type_name());
    let _ = writeln!(out, "  Added:   {}", resource.created_at.format("%Y-%m-%d %H:%M"));
    match &resource.kind {
        ResourceKind::Youtube { .. } => {
            let _ = writeln!(out, "  Link:    {}", resource.content);
            if let Some(embed) = resource.embed_url() {
                let _ = writeln!(out, "  Embed:   {embed}");
            }
        }
        ResourceKind::File {
            file_type,
            file_size,
        } => {
            let _ = writeln!(out, "  Format:  {file_type}");
            let _ = writeln!(out, "  Size:    {file_size}");
        }
    }
    out
}
