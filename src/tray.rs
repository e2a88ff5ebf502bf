//! System tray integration.
//!
//! The tray icon only exists while background mode is active; it is how the
//! user reaches the app once the window is hidden.

use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::background::{self, BackgroundController};
use crate::window;

pub const TRAY_ID: &str = "background";

/// Builds the tray icon, context menu, and event handlers.
///
/// The menu carries:
/// - A status line showing the last background save.
/// - "Save Blobs Now": triggers an immediate pass.
/// - "Open blobsaver": restores and focuses the main window.
/// - "Quit": exits the application completely.
///
/// Left click on the icon restores the window.
pub fn create_tray(app: &AppHandle) -> tauri::Result<()> {
    let status_i = MenuItem::with_id(app, "status", status_line(None), false, None::<&str>)?;
    let sep1 = PredefinedMenuItem::separator(app)?;
    let save_now_i = MenuItem::with_id(app, "save_now", "Save Blobs Now", true, None::<&str>)?;
    let open_i = MenuItem::with_id(app, "open", "Open blobsaver", true, None::<&str>)?;
    let sep2 = PredefinedMenuItem::separator(app)?;
    let quit_i = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;

    let menu = Menu::with_items(app, &[&status_i, &sep1, &save_now_i, &open_i, &sep2, &quit_i])?;

    // The background loop updates the status line after every pass.
    app.state::<BackgroundController>()
        .set_status_item(status_i.clone());

    let _ = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip("blobsaver")
        .icon(app.default_window_icon().unwrap().clone())
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(move |app, event| {
            let app_handle = app.clone();
            match event.id.as_ref() {
                "quit" => app.exit(0),
                "open" => window::show_main_window(app),
                "save_now" => {
                    tauri::async_runtime::spawn(async move {
                        background::run_cycle(&app_handle, "manual").await;
                    });
                }
                _ => {}
            }
        })
        .on_tray_icon_event(|tray, event| {
            // Restore the window on a simple left click
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                ..
            } = event
            {
                window::show_main_window(tray.app_handle());
            }
        })
        .build(app)?;

    Ok(())
}

/// Status-line text for the tray menu.
pub fn status_line(last_save: Option<&str>) -> String {
    match last_save {
        Some(time) => format!("Last save: {time}"),
        None => "Background active".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_without_save() {
        assert_eq!(status_line(None), "Background active");
    }

    #[test]
    fn test_status_line_with_save() {
        assert_eq!(status_line(Some("14:05")), "Last save: 14:05");
    }
}
