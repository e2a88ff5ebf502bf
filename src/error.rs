//! Launcher error type and the fail-fast exit path.

use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("preferences store error: {0}")]
    Prefs(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tauri(#[from] tauri::Error),

    #[error("update check failed: {0}")]
    UpdateCheck(#[from] reqwest::Error),
}

/// Blocking error dialog followed by process termination.
///
/// Startup failures (no data directory, unreadable preferences store, missing
/// main window) are not recoverable; the user gets a dialog and the process
/// exits.
pub fn fatal(app: &AppHandle, message: &str) -> ! {
    log::error!("{message}");
    app.dialog()
        .message(message)
        .kind(MessageDialogKind::Error)
        .title("blobsaver")
        .blocking_show();
    std::process::exit(1);
}
