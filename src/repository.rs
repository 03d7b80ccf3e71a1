use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::{Task, TaskDraft};
use crate::storage::{KeyValueStore, StoreError};

#[derive(Debug)]
pub enum RepositoryError {
    StoreReadFailed(StoreError),
    StoreWriteFailed(StoreError),
    DeserializationFailed(serde_json::Error),
    SerializationFailed(serde_json::Error),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::StoreReadFailed(err) => write!(f, "store read failed: {err}"),
            RepositoryError::StoreWriteFailed(err) => write!(f, "store write failed: {err}"),
            RepositoryError::DeserializationFailed(err) => {
                write!(f, "stored tasks are corrupted: {err}")
            }
            RepositoryError::SerializationFailed(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::StoreReadFailed(err) | RepositoryError::StoreWriteFailed(err) => {
                Some(err)
            }
            RepositoryError::DeserializationFailed(err)
            | RepositoryError::SerializationFailed(err) => Some(err),
        }
    }
}

/// Persists the whole task list as one JSON array under a single key.
///
/// Every mutation reads the full list, applies the change and writes the full
/// list back. Mutations issued through the same repository are serialized;
/// separate repositories (or processes) writing the same key still race.
pub struct TaskRepository<S> {
    store: Arc<S>,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// An absent key is an empty list; a payload that cannot be read or parsed is an error.
    pub async fn load_all(&self) -> Result<Vec<Task>, RepositoryError> {
        let raw = self
            .store
            .get(&self.key)
            .await
            .map_err(RepositoryError::StoreReadFailed)?;
        match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(RepositoryError::DeserializationFailed),
            None => Ok(Vec::new()),
        }
    }

    /// Fail-open load: errors are logged and degrade to an empty list.
    pub async fn load_all_or_empty(&self) -> Vec<Task> {
        match self.load_all().await {
            Ok(tasks) => tasks,
            Err(error) => {
                log::warn!("loading tasks failed, starting empty key={} error={error}", self.key);
                Vec::new()
            }
        }
    }

    pub async fn add(&self, draft: TaskDraft) -> Result<Vec<Task>, RepositoryError> {
        self.mutate("add", |tasks| {
            tasks.push(Task::from_draft(draft, Utc::now()));
        })
        .await
    }

    /// Replaces the stored task with the same id. Unknown ids leave the list unchanged.
    /// The stored `created_at` is kept.
    pub async fn update(&self, task: Task) -> Result<Vec<Task>, RepositoryError> {
        self.mutate("update", |tasks| {
            if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
                *existing = Task {
                    created_at: existing.created_at,
                    ..task
                };
            }
        })
        .await
    }

    pub async fn delete(&self, task_id: &str) -> Result<Vec<Task>, RepositoryError> {
        self.mutate("delete", |tasks| {
            tasks.retain(|task| task.id != task_id);
        })
        .await
    }

    pub async fn toggle_completion(&self, task_id: &str) -> Result<Vec<Task>, RepositoryError> {
        self.mutate("toggle", |tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
                task.completed = !task.completed;
            }
        })
        .await
    }

    /// Drops every task by removing the key from the store.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        self.store
            .remove(&self.key)
            .await
            .map_err(RepositoryError::StoreWriteFailed)?;
        log::info!("tasks cleared key={}", self.key);
        Ok(())
    }

    async fn mutate<F>(&self, op: &str, apply: F) -> Result<Vec<Task>, RepositoryError>
    where
        F: FnOnce(&mut Vec<Task>),
    {
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.load_all().await?;
        apply(&mut tasks);
        self.save_all(&tasks).await?;
        log::debug!("tasks {op} persisted key={} count={}", self.key, tasks.len());
        Ok(tasks)
    }

    async fn save_all(&self, tasks: &[Task]) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(tasks).map_err(RepositoryError::SerializationFailed)?;
        self.store
            .set(&self.key, json)
            .await
            .map_err(RepositoryError::StoreWriteFailed)
    }
}
