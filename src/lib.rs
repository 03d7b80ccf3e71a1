pub mod appearance;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod repository;
pub mod state;
pub mod storage;
pub mod view;

use std::sync::Arc;

use crate::commands::AppContext;
use crate::config::Config;
use crate::state::AppState;
use crate::storage::{FileStore, StoreError};

pub use crate::models::{ColorScheme, Priority, Task, TaskCounts, TaskDraft, TaskFilter, ThemePreference};
pub use crate::repository::{RepositoryError, TaskRepository};
pub use crate::storage::{KeyValueStore, MemoryStore};

/// Opens the file-backed store and loads the initial state. Unreadable data starts
/// the app empty rather than blocking it; the error is logged.
pub async fn start(config: &Config) -> Result<(AppContext<FileStore>, AppState), StoreError> {
    start_file_log(&config.data_dir);

    let store = FileStore::new(config.data_dir.clone());
    store.ensure_dirs().await?;

    let ctx = AppContext::new(Arc::new(store), config);
    let tasks = ctx.tasks.load_all_or_empty().await;
    let theme = ctx.appearance.load_or_default().await;
    log::info!(
        "state loaded dir={} tasks={} theme={theme}",
        config.data_dir.display(),
        tasks.len()
    );

    Ok((ctx, AppState::new(tasks, theme)))
}

#[cfg(all(feature = "app", not(test)))]
fn start_file_log(data_dir: &std::path::Path) {
    if let Err(err) = logging::init_logging(data_dir) {
        // Keep going without a file log.
        eprintln!("taskpad: file logging disabled: {err}");
    }
}

#[cfg(not(all(feature = "app", not(test))))]
fn start_file_log(_data_dir: &std::path::Path) {}
