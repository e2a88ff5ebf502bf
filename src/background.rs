//! Background mode.
//!
//! Keeps the app alive with the window hidden and periodically triggers a
//! blob-save pass. The pass itself is driven by the frontend; this service
//! owns the timer, the tray icon lifetime, history, and notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Local;
use tauri::menu::MenuItem;
use tauri::{AppHandle, Emitter, Manager, Wry};
use tauri_plugin_notification::NotificationExt;
use tokio::sync::mpsc;

use crate::prefs::{self, Prefs};
use crate::tray;

pub const DEFAULT_INTERVAL_MINUTES: u64 = 30;

/// Background-service state, managed as Tauri state and handed to lifecycle
/// handlers instead of living in process-wide statics.
pub struct BackgroundController {
    in_background: AtomicBool,
    cancel: Mutex<Option<mpsc::Sender<()>>>,
    status_item: Mutex<Option<MenuItem<Wry>>>,
}

impl BackgroundController {
    pub fn new() -> Self {
        Self {
            in_background: AtomicBool::new(false),
            cancel: Mutex::new(None),
            status_item: Mutex::new(None),
        }
    }

    pub fn in_background(&self) -> bool {
        self.in_background.load(Ordering::SeqCst)
    }

    /// The tray keeps its status line here so `run_cycle` can update it.
    pub fn set_status_item(&self, item: MenuItem<Wry>) {
        *self.status_item.lock().unwrap() = Some(item);
    }

    pub fn update_status(&self, text: &str) {
        if let Some(item) = self.status_item.lock().unwrap().as_ref() {
            let _ = item.set_text(text);
        }
    }

    /// Enters background mode: tray icon up, timer loop running. Idempotent.
    pub fn start(&self, app: &AppHandle, notify: bool) {
        if self.in_background.swap(true, Ordering::SeqCst) {
            return;
        }

        // Tray icons have to be created on the main thread; commands run
        // elsewhere.
        let tray_app = app.clone();
        let _ = app.run_on_main_thread(move || {
            if let Err(e) = tray::create_tray(&tray_app) {
                log::error!("failed to create tray icon: {e}");
            }
        });

        let (tx, mut rx) = mpsc::channel::<()>(1);
        *self.cancel.lock().unwrap() = Some(tx);

        let app_handle = app.clone();
        tauri::async_runtime::spawn(async move {
            loop {
                // Re-read the interval every cycle so pref changes apply
                // without leaving and re-entering background mode.
                let minutes = interval_minutes(&app_handle.state::<Prefs>());
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = tokio::time::sleep(Duration::from_secs(minutes * 60)) => {
                        run_cycle(&app_handle, "interval").await;
                    }
                }
            }
        });

        let prefs = app.state::<Prefs>();
        if let Err(e) = prefs.log_event("background_started", None) {
            log::warn!("failed to record history event: {e}");
        }
        if notify && prefs.get_bool(prefs::NOTIFICATIONS, true) {
            let _ = app
                .notification()
                .builder()
                .title("blobsaver")
                .body("blobsaver is now running in the background")
                .show();
        }
        log::info!("background mode started");
    }

    /// Leaves background mode: timer cancelled, tray icon removed. Idempotent.
    pub fn stop(&self, app: &AppHandle, notify: bool) {
        if !self.in_background.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(tx) = self.cancel.lock().unwrap().take() {
            let _ = tx.try_send(());
        }
        *self.status_item.lock().unwrap() = None;
        let tray_app = app.clone();
        let _ = app.run_on_main_thread(move || {
            let _ = tray_app.remove_tray_by_id(tray::TRAY_ID);
        });

        let prefs = app.state::<Prefs>();
        if let Err(e) = prefs.log_event("background_stopped", None) {
            log::warn!("failed to record history event: {e}");
        }
        if notify && prefs.get_bool(prefs::NOTIFICATIONS, true) {
            let _ = app
                .notification()
                .builder()
                .title("blobsaver")
                .body("blobsaver has left background mode")
                .show();
        }
        log::info!("background mode stopped");
    }
}

impl Default for BackgroundController {
    fn default() -> Self {
        Self::new()
    }
}

/// One blob-save pass: tells the frontend to kick off a save for all saved
/// devices, records history, and updates the tray status line.
pub async fn run_cycle(app: &AppHandle, trigger: &str) {
    log::info!("background blob-save pass ({trigger})");
    let _ = app.emit("blob-save-requested", serde_json::json!({ "trigger": trigger }));

    let prefs = app.state::<Prefs>();
    if let Err(e) = prefs.log_event("background_run", Some(trigger)) {
        log::warn!("failed to record history event: {e}");
    }
    if prefs.get_bool(prefs::NOTIFICATIONS, true) {
        let _ = app
            .notification()
            .builder()
            .title("blobsaver")
            .body("Saving blobs in the background")
            .show();
    }

    let time = Local::now().format("%H:%M").to_string();
    app.state::<BackgroundController>()
        .update_status(&tray::status_line(Some(&time)));
}

/// Timer interval from the preferences store. Zero and garbage both fall
/// back to the default so the loop can never spin.
pub(crate) fn interval_minutes(prefs: &Prefs) -> u64 {
    let minutes = prefs.get_u64(prefs::BACKGROUND_INTERVAL, DEFAULT_INTERVAL_MINUTES);
    if minutes == 0 {
        DEFAULT_INTERVAL_MINUTES
    } else {
        minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, Prefs) {
        let dir = tempdir().expect("tempdir");
        let prefs = Prefs::open(dir.path().join("prefs.db")).expect("open prefs");
        (dir, prefs)
    }

    #[test]
    fn test_interval_uses_stored_value() {
        let (_dir, prefs) = open_temp();
        prefs.set(prefs::BACKGROUND_INTERVAL, "5").unwrap();
        assert_eq!(interval_minutes(&prefs), 5);
    }

    #[test]
    fn test_interval_zero_falls_back() {
        let (_dir, prefs) = open_temp();
        prefs.set(prefs::BACKGROUND_INTERVAL, "0").unwrap();
        assert_eq!(interval_minutes(&prefs), DEFAULT_INTERVAL_MINUTES);
    }

    #[test]
    fn test_interval_garbage_falls_back() {
        let (_dir, prefs) = open_temp();
        prefs.set(prefs::BACKGROUND_INTERVAL, "soon").unwrap();
        assert_eq!(interval_minutes(&prefs), DEFAULT_INTERVAL_MINUTES);
    }

    #[test]
    fn test_controller_flag_starts_clear() {
        let controller = BackgroundController::new();
        assert!(!controller.in_background());
    }
}
