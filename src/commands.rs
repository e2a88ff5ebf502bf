//! Tauri commands: the IPC surface the webview drives the launcher with.

use std::collections::HashMap;

use tauri::{AppHandle, State};

use crate::background::{self, BackgroundController};
use crate::prefs::{HistoryEvent, Prefs};
use crate::updates::{self, UpdateStatus};
use crate::window;

/// All preferences as key-value pairs, for the settings UI.
#[tauri::command]
pub fn get_prefs(prefs: State<Prefs>) -> Result<HashMap<String, String>, String> {
    prefs.all().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_pref(prefs: State<Prefs>, key: String, value: String) -> Result<(), String> {
    prefs.set(&key, &value).map_err(|e| e.to_string())
}

/// Enters background mode without hiding the window; pair with
/// [`hide_window`] for the full minimize-to-tray flow.
#[tauri::command]
pub fn enter_background(app: AppHandle, controller: State<BackgroundController>) {
    controller.start(&app, true);
}

/// Stops the background service and brings the window back.
#[tauri::command]
pub fn exit_background(app: AppHandle, controller: State<BackgroundController>) {
    controller.stop(&app, true);
    window::show_main_window(&app);
}

#[tauri::command]
pub fn background_status(controller: State<BackgroundController>) -> bool {
    controller.in_background()
}

/// Triggers an immediate blob-save pass.
#[tauri::command]
pub async fn save_blobs_now(app: AppHandle) {
    background::run_cycle(&app, "manual").await;
}

#[tauri::command]
pub fn hide_window(app: AppHandle) {
    window::hide_main_window(&app);
}

/// Forced update check; unlike the startup check, the outcome always goes
/// back to the caller.
#[tauri::command]
pub async fn check_for_updates(app: AppHandle) -> Result<UpdateStatus, String> {
    updates::check(&app, true).await.map_err(|e| e.to_string())
}

/// Recent background-service events, newest first.
#[tauri::command]
pub fn recent_history(
    prefs: State<Prefs>,
    limit: Option<u32>,
) -> Result<Vec<HistoryEvent>, String> {
    prefs
        .recent_events(limit.unwrap_or(50))
        .map_err(|e| e.to_string())
}
