use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::{Task, TaskCounts, TaskFilter, ThemePreference};
use crate::view::{count_by_status, filter_by_status, sort_for_display};

/// What the presentation layer renders after every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    pub tasks: Vec<Task>,
    pub counts: TaskCounts,
    pub filter: TaskFilter,
    pub theme: ThemePreference,
}

/// Shared in-memory application state, injected into the presentation layer at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(tasks: Vec<Task>, theme: ThemePreference) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData {
                tasks,
                filter: TaskFilter::default(),
                theme,
            })),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn replace_tasks(&self, tasks: Vec<Task>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
    }

    pub fn filter(&self) -> TaskFilter {
        let guard = self.inner.lock().expect("state poisoned");
        guard.filter
    }

    pub fn set_filter(&self, filter: TaskFilter) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.filter = filter;
    }

    pub fn theme(&self) -> ThemePreference {
        let guard = self.inner.lock().expect("state poisoned");
        guard.theme
    }

    pub fn set_theme(&self, theme: ThemePreference) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.theme = theme;
    }

    /// The active filter applied, then sorted for display.
    pub fn visible_tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        sort_for_display(&filter_by_status(&guard.tasks, guard.filter))
    }

    pub fn counts(&self) -> TaskCounts {
        let guard = self.inner.lock().expect("state poisoned");
        count_by_status(&guard.tasks)
    }

    pub fn snapshot(&self) -> StatePayload {
        let guard = self.inner.lock().expect("state poisoned");
        StatePayload {
            tasks: sort_for_display(&filter_by_status(&guard.tasks, guard.filter)),
            counts: count_by_status(&guard.tasks),
            filter: guard.filter,
            theme: guard.theme,
        }
    }
}

#[derive(Debug)]
struct AppData {
    tasks: Vec<Task>,
    filter: TaskFilter,
    theme: ThemePreference,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{TimeZone, Utc};

    fn make_task(id: &str, completed: bool, created_at: i64) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task-{id}"),
            due_date: None,
            priority: Priority::Medium,
            completed,
            created_at: Utc.timestamp_opt(created_at, 0).unwrap(),
        }
    }

    #[test]
    fn new_starts_with_all_filter() {
        let state = AppState::new(vec![make_task("a", false, 1)], ThemePreference::Dark);
        assert_eq!(state.filter(), TaskFilter::All);
        assert_eq!(state.theme(), ThemePreference::Dark);
        assert_eq!(state.tasks().len(), 1);
    }

    #[test]
    fn visible_tasks_apply_filter_then_sort() {
        let state = AppState::new(
            vec![
                make_task("old", false, 1),
                make_task("done", true, 5),
                make_task("new", false, 9),
            ],
            ThemePreference::System,
        );

        let ids = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(state.visible_tasks()), vec!["new", "old", "done"]);

        state.set_filter(TaskFilter::Active);
        assert_eq!(ids(state.visible_tasks()), vec!["new", "old"]);

        state.set_filter(TaskFilter::Completed);
        assert_eq!(ids(state.visible_tasks()), vec!["done"]);

        // Counts ignore the filter.
        let counts = state.counts();
        assert_eq!((counts.all, counts.active, counts.completed), (3, 2, 1));
    }

    #[test]
    fn replace_tasks_and_theme_are_shared_between_clones() {
        let state = AppState::new(Vec::new(), ThemePreference::System);
        let other = state.clone();
        other.replace_tasks(vec![make_task("a", false, 1)]);
        other.set_theme(ThemePreference::Light);

        assert_eq!(state.tasks().len(), 1);
        assert_eq!(state.theme(), ThemePreference::Light);
    }

    #[test]
    fn snapshot_serializes_for_the_presentation_layer() {
        let state = AppState::new(vec![make_task("a", true, 0)], ThemePreference::Dark);
        state.set_filter(TaskFilter::Completed);
        let payload = state.snapshot();
        assert_eq!(payload.tasks.len(), 1);
        assert_eq!(payload.counts.completed, 1);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["filter"], "completed");
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["counts"]["all"], 1);
        assert_eq!(value["tasks"][0]["createdAt"], "1970-01-01T00:00:00Z");
    }
}
