use std::sync::Arc;

use crate::appearance::AppearanceStore;
use crate::config::Config;
use crate::models::{Task, TaskDraft, TaskFilter, ThemePreference};
use crate::repository::TaskRepository;
use crate::state::{AppState, StatePayload};
use crate::storage::KeyValueStore;

pub const BLANK_TITLE_ERROR: &str = "Please enter a task title";

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// The persistence services the commands run against. Both share one store.
pub struct AppContext<S> {
    pub tasks: TaskRepository<S>,
    pub appearance: AppearanceStore<S>,
}

impl<S: KeyValueStore> AppContext<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            tasks: TaskRepository::new(store.clone(), config.tasks_key.clone()),
            appearance: AppearanceStore::new(store, config.theme_key.clone()),
        }
    }
}

fn normalize_title(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(title.to_string())
}

/// Reloads tasks and theme from the store. Unlike startup this does not fail open,
/// so a corrupted store is reported instead of shown as an empty list.
pub async fn load_state<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
) -> CommandResult<StatePayload> {
    let tasks = match ctx.tasks.load_all().await {
        Ok(tasks) => tasks,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    let theme = match ctx.appearance.load().await {
        Ok(theme) => theme,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    state.replace_tasks(tasks);
    state.set_theme(theme);
    ok(state.snapshot())
}

/// Returns the created task.
pub async fn create_task<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
    mut draft: TaskDraft,
) -> CommandResult<Task> {
    draft.title = match normalize_title(&draft.title) {
        Some(title) => title,
        None => return err(BLANK_TITLE_ERROR),
    };
    let tasks = match ctx.tasks.add(draft).await {
        Ok(tasks) => tasks,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    let created = tasks.last().cloned();
    state.replace_tasks(tasks);
    match created {
        Some(task) => ok(task),
        None => err("task not created"),
    }
}

pub async fn update_task<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
    mut task: Task,
) -> CommandResult<StatePayload> {
    task.title = match normalize_title(&task.title) {
        Some(title) => title,
        None => return err(BLANK_TITLE_ERROR),
    };
    match ctx.tasks.update(task).await {
        Ok(tasks) => {
            state.replace_tasks(tasks);
            ok(state.snapshot())
        }
        Err(error) => err(&format!("storage error: {error}")),
    }
}

pub async fn toggle_task<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
    task_id: String,
) -> CommandResult<StatePayload> {
    match ctx.tasks.toggle_completion(&task_id).await {
        Ok(tasks) => {
            state.replace_tasks(tasks);
            ok(state.snapshot())
        }
        Err(error) => err(&format!("storage error: {error}")),
    }
}

pub async fn delete_task<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
    task_id: String,
) -> CommandResult<StatePayload> {
    match ctx.tasks.delete(&task_id).await {
        Ok(tasks) => {
            state.replace_tasks(tasks);
            ok(state.snapshot())
        }
        Err(error) => err(&format!("storage error: {error}")),
    }
}

/// Backs the "Clear All Tasks" action; the host confirms with the user before calling it.
pub async fn clear_tasks<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
) -> CommandResult<StatePayload> {
    if let Err(error) = ctx.tasks.clear().await {
        return err(&format!("storage error: {error}"));
    }
    state.replace_tasks(Vec::new());
    ok(state.snapshot())
}

/// Filters are view state only and are never persisted.
pub fn set_filter(state: &AppState, filter: TaskFilter) -> CommandResult<StatePayload> {
    state.set_filter(filter);
    ok(state.snapshot())
}

/// Applies the theme in memory right away, then persists it. A failed save keeps the
/// new theme for this session and reports the error.
pub async fn set_theme<S: KeyValueStore>(
    ctx: &AppContext<S>,
    state: &AppState,
    theme: ThemePreference,
) -> CommandResult<StatePayload> {
    state.set_theme(theme);
    if let Err(error) = ctx.appearance.save(theme).await {
        return err(&format!("storage error: {error}"));
    }
    ok(state.snapshot())
}
