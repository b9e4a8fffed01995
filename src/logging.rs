use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "dog-adopt.log";

/// Default log location under the user cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "dogadopt", "dog-adopt")
        .map(|dirs| dirs.cache_dir().join(LOG_FILE_NAME))
}

/// Install the global subscriber, appending to `path`.
///
/// The terminal belongs to the TUI, so nothing is ever written to stdout or
/// stderr. If the file cannot be opened logging stays off and startup goes
/// on. Only the first call takes effect.
pub fn init(level: &str, path: &Path) {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
