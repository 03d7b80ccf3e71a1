use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, with = "iso8601::option")]
    pub due_date: Option<Timestamp>,
    pub priority: Priority,
    pub completed: bool,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
}

impl Task {
    pub fn from_draft(draft: TaskDraft, created_at: Timestamp) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            due_date: draft.due_date,
            priority: draft.priority,
            completed: draft.completed,
            created_at,
        }
    }
}

/// A task that has not been stored yet: everything except `id` and `createdAt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, with = "iso8601::option")]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: None,
            priority: Priority::default(),
            completed: false,
        }
    }

    pub fn due(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme: {}", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for ThemePreference {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// The appearance actually rendered, after `system` has been resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    Light,
    Dark,
}

/// Timestamps are stored as RFC 3339 strings in UTC with a `Z` suffix, without losing sub-second precision.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.with_timezone(&Utc))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

pub(crate) use iso8601::parse as parse_timestamp;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Buy milk".to_string(),
            due_date: Some(Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap()),
            priority: Priority::High,
            completed: false,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn task_serialization_uses_camel_case_and_rfc3339_timestamps() {
        let value = serde_json::to_value(sample_task()).expect("serialize task");
        assert_eq!(
            value,
            serde_json::json!({
              "id": "t1",
              "title": "Buy milk",
              "dueDate": "2025-03-04T09:30:00Z",
              "priority": "high",
              "completed": false,
              "createdAt": "2025-03-01T08:00:00Z"
            })
        );
    }

    #[test]
    fn task_deserializes_previously_persisted_payload() {
        let json = r#"
        {
          "id": "1718000000000",
          "title": "Water plants",
          "dueDate": null,
          "priority": "low",
          "completed": true,
          "createdAt": "2024-06-10T06:13:20.000Z"
        }
        "#;

        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(task.id, "1718000000000");
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Priority::Low);
        assert!(task.completed);
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2024, 6, 10, 6, 13, 20).unwrap()
        );
    }

    #[test]
    fn task_accepts_offset_timestamps_and_normalizes_to_utc() {
        let json = r#"
        {
          "id": "a",
          "title": "x",
          "dueDate": "2025-03-04T10:30:00+01:00",
          "priority": "medium",
          "completed": false,
          "createdAt": "2025-03-01T08:00:00Z"
        }
        "#;

        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(
            task.due_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn sub_second_precision_survives_a_round_trip() {
        let mut task = sample_task();
        task.created_at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"createdAt\":\"2023-11-14T22:13:20.123456789Z\""));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn task_without_due_date_field_has_none() {
        let json = r#"{"id":"a","title":"x","priority":"high","completed":false,"createdAt":"2025-03-01T08:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn task_rejects_garbage_timestamps() {
        let json = r#"{"id":"a","title":"x","dueDate":"soon","priority":"low","completed":false,"createdAt":"2025-03-01T08:00:00Z"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn draft_defaults_and_builder() {
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"Call mom"}"#).unwrap();
        assert_eq!(draft, TaskDraft::new("Call mom"));
        assert_eq!(draft.priority, Priority::Medium);
        assert!(!draft.completed);

        let due = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let draft = TaskDraft::new("x").due(due).priority(Priority::Low);
        assert_eq!(draft.due_date, Some(due));
        assert_eq!(draft.priority, Priority::Low);
    }

    #[test]
    fn from_draft_assigns_fresh_ids() {
        let now = Utc::now();
        let a = Task::from_draft(TaskDraft::new("a"), now);
        let b = Task::from_draft(TaskDraft::new("a"), now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, now);
        assert!(!a.completed);
    }

    #[test]
    fn theme_preference_parses_and_prints_plain_strings() {
        for theme in [
            ThemePreference::Light,
            ThemePreference::Dark,
            ThemePreference::System,
        ] {
            assert_eq!(theme.to_string().parse::<ThemePreference>(), Ok(theme));
        }
        assert_eq!(ThemePreference::default(), ThemePreference::System);
        assert_eq!(
            "sepia".parse::<ThemePreference>(),
            Err(UnknownTheme("sepia".to_string()))
        );
    }

    #[test]
    fn filter_and_counts_defaults() {
        assert_eq!(TaskFilter::default(), TaskFilter::All);
        assert_eq!(
            serde_json::to_value(TaskFilter::Completed).unwrap(),
            serde_json::json!("completed")
        );
        assert_eq!(TaskCounts::default().all, 0);
        assert_eq!(
            serde_json::to_value(TaskCounts { all: 3, active: 2, completed: 1 }).unwrap(),
            serde_json::json!({ "all": 3, "active": 2, "completed": 1 })
        );
    }
}
