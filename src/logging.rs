use std::any::Any;
use std::path::{Path, PathBuf};

pub const LOG_FILE_BASENAME: &str = "taskpad";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;
pub const LOG_ENV: &str = "TASKPAD_LOG";

/// Everything the file logger needs, resolved before any global state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Log files sit next to the persisted data.
    pub directory: PathBuf,
    pub spec: String,
    pub rotate_size_bytes: u64,
    pub keep_files: usize,
    pub echo_to_stdout: bool,
}

impl LogSettings {
    pub fn for_data_dir(data_dir: &Path, app_var: Option<String>, rust_var: Option<String>) -> Self {
        Self {
            directory: data_dir.to_path_buf(),
            spec: resolve_log_spec(app_var, rust_var),
            rotate_size_bytes: LOG_ROTATE_SIZE_BYTES,
            keep_files: LOG_ROTATE_KEEP_FILES,
            echo_to_stdout: cfg!(debug_assertions),
        }
    }

    pub fn from_env(data_dir: &Path) -> Self {
        Self::for_data_dir(
            data_dir,
            std::env::var(LOG_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }
}

/// Picks the logger spec: `TASKPAD_LOG`, then `RUST_LOG`, then the build default.
/// Blank values count as unset.
pub fn resolve_log_spec(app_var: Option<String>, rust_var: Option<String>) -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,taskpad=debug"
    } else {
        "warn,taskpad=info"
    };
    app_var
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_var.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

/// Panics carry either `&str` or `String`; anything else gets a placeholder.
pub fn panic_payload_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(feature = "app")]
static LOGGER: std::sync::Mutex<Option<flexi_logger::LoggerHandle>> = std::sync::Mutex::new(None);

/// Starts the rotating file logger under `data_dir`. A second call is a no-op,
/// so a host that restarts the core does not trip over the global logger.
#[cfg(feature = "app")]
pub fn init_logging(data_dir: &Path) -> Result<(), flexi_logger::FlexiLoggerError> {
    let mut slot = LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot.is_some() {
        return Ok(());
    }

    let settings = LogSettings::from_env(data_dir);
    *slot = Some(start_file_logger(&settings)?);
    install_panic_hook();

    log::info!(
        "logger initialized dir={} spec={} rotate_size_bytes={} keep_files={}",
        settings.directory.display(),
        settings.spec,
        settings.rotate_size_bytes,
        settings.keep_files
    );
    Ok(())
}

#[cfg(feature = "app")]
fn start_file_logger(
    settings: &LogSettings,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    std::fs::create_dir_all(&settings.directory)?;

    let echo = if settings.echo_to_stdout {
        Duplicate::Info
    } else {
        Duplicate::None
    };
    Logger::try_with_str(&settings.spec)?
        .log_to_file(
            FileSpec::default()
                .directory(&settings.directory)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(settings.rotate_size_bytes),
            Naming::Numbers,
            Cleanup::KeepLogFiles(settings.keep_files),
        )
        .duplicate_to_stdout(echo)
        .start()
}

#[cfg(feature = "app")]
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<unknown>".to_string());
        log::error!(
            "panic: payload={} location={location}\nbacktrace:\n{}",
            panic_payload_text(info.payload()),
            std::backtrace::Backtrace::force_capture()
        );
        previous(info);
    }));
}
