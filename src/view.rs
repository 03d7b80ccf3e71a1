use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::{parse_timestamp, Task, TaskCounts, TaskFilter, Timestamp};

pub const NO_DUE_DATE: &str = "No due date";
pub const INVALID_DATE: &str = "Invalid date";

pub fn filter_by_status(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match filter {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        })
        .cloned()
        .collect()
}

/// Display order: open tasks first; then dated tasks by due date (earliest first);
/// then undated tasks, newest first.
pub fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| match (&a.due_date, &b.due_date) {
            (Some(a_due), Some(b_due)) => a_due.cmp(b_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        })
}

/// Stable: tasks that compare equal keep their relative order.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(compare_for_display);
    sorted
}

pub fn count_by_status(tasks: &[Task]) -> TaskCounts {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskCounts {
        all: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

pub fn format_due_date(due: Option<Timestamp>) -> String {
    format_due_date_at(due, &Local::now())
}

pub fn format_due_date_at<Tz: TimeZone>(due: Option<Timestamp>, now: &DateTime<Tz>) -> String {
    format_due_date_or(due, NO_DUE_DATE, now)
}

/// Like [`format_due_date_at`], with a caller-supplied label for a missing date.
pub fn format_due_date_or<Tz: TimeZone>(
    due: Option<Timestamp>,
    placeholder: &str,
    now: &DateTime<Tz>,
) -> String {
    match due {
        Some(due) => {
            let date = due.with_timezone(&now.timezone()).date_naive();
            date_label(date, now.date_naive())
        }
        None => placeholder.to_string(),
    }
}

/// Formats a raw stored value. Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates;
/// anything else yields "Invalid date".
pub fn format_due_date_str<Tz: TimeZone>(raw: Option<&str>, now: &DateTime<Tz>) -> String {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return NO_DUE_DATE.to_string(),
    };
    if let Ok(due) = parse_timestamp(raw) {
        return format_due_date_at(Some(due), now);
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date_label(date, now.date_naive()),
        Err(_) => INVALID_DATE.to_string(),
    }
}

fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(date) {
        return "Tomorrow".to_string();
    }
    if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub message: &'static str,
}

pub fn empty_state(filter: TaskFilter) -> EmptyState {
    match filter {
        TaskFilter::Completed => EmptyState {
            title: "No completed tasks",
            message: "Tasks you complete will appear here.",
        },
        TaskFilter::Active => EmptyState {
            title: "No active tasks",
            message: "You've completed all your tasks! Add more to stay productive.",
        },
        TaskFilter::All => EmptyState {
            title: "No tasks yet",
            message: "Add a task to get started.",
        },
    }
}
