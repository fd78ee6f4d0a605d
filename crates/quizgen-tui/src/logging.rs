use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

const LOG_FILE: &str = "quizgen.log";

pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("quizgen").join(LOG_FILE))
}

/// Send log records to a file; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` filter. Logging is skipped
/// when the file cannot be opened.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
}
