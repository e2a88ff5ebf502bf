//! Main window lifecycle: show/hide with macOS dock handling, and the
//! close-to-background behavior.

use tauri::{AppHandle, Manager, Window, WindowEvent};

use crate::background::BackgroundController;

pub const MAIN_WINDOW: &str = "main";

/// Shows, centers, and focuses the main window. On macOS the dock icon is
/// restored first so the app behaves like a regular foreground application
/// again.
pub fn show_main_window(app: &AppHandle) {
    #[cfg(target_os = "macos")]
    {
        let _ = app.set_activation_policy(tauri::ActivationPolicy::Regular);
    }

    let Some(window) = app.get_webview_window(MAIN_WINDOW) else {
        log::error!("main window is gone, cannot show it");
        return;
    };

    // A failed show is logged but centering and focus still run.
    if let Err(e) = window.show() {
        log::error!("failed to show main window: {e}");
    }
    let _ = window.center();
    let _ = window.set_focus();
}

/// Hides the main window; on macOS the dock icon goes with it.
pub fn hide_main_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        let _ = window.hide();
    }

    #[cfg(target_os = "macos")]
    {
        let _ = app.set_activation_policy(tauri::ActivationPolicy::Accessory);
    }
}

/// Close-request handling: the window never closes directly. In background
/// mode the app keeps running with the window hidden; otherwise closing the
/// window quits.
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    if window.label() != MAIN_WINDOW {
        return;
    }

    if let WindowEvent::CloseRequested { api, .. } = event {
        api.prevent_close();
        let app = window.app_handle();
        if app.state::<BackgroundController>().in_background() {
            hide_main_window(app);
        } else {
            app.exit(0);
        }
    }
}
