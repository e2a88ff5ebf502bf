//! blobsaver - Library Root
//!
//! Bootstraps the desktop application:
//! - Single-instance guard (a second launch focuses the running instance)
//! - Native library path configuration for bundled device helpers
//! - Preferences store (settings + background-service history)
//! - Window lifecycle including close-to-background and the tray icon
//! - Startup update check

pub mod background;
pub mod commands;
pub mod error;
pub mod native;
pub mod prefs;
pub mod tray;
pub mod updates;
pub mod window;

use tauri::Manager;

use background::BackgroundController;
use prefs::Prefs;

/// Initialize and run the Tauri application
pub fn run() {
    tauri::Builder::default()
        // Registered first so a duplicate process dies as early as possible;
        // the callback runs in the already-running instance.
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            log::info!("duplicate launch detected, focusing the existing window");
            window::show_main_window(app);
        }))
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            // Helpers inherit the loader environment, so this runs before
            // anything can spawn one.
            native::configure_library_path();

            let handle = app.handle().clone();

            let db_path = match handle.path().app_data_dir() {
                Ok(dir) => dir.join("blobsaver.db"),
                Err(e) => error::fatal(
                    &handle,
                    &format!("Could not locate the application data directory: {e}"),
                ),
            };
            let prefs = match Prefs::open(&db_path) {
                Ok(p) => p,
                Err(e) => error::fatal(
                    &handle,
                    &format!("Could not open the preferences store: {e}"),
                ),
            };

            if let Err(e) = prefs.set(prefs::APP_VERSION, env!("CARGO_PKG_VERSION")) {
                log::warn!("failed to record the app version: {e}");
            }
            let start_background = prefs.get_bool(prefs::START_BACKGROUND, false);
            let check_updates = prefs.get_bool(prefs::CHECK_FOR_UPDATES, true);

            app.manage(prefs);
            app.manage(BackgroundController::new());

            let Some(window) = app.get_webview_window(window::MAIN_WINDOW) else {
                error::fatal(&handle, "Could not load the main window layout.");
            };
            window.set_title("blobsaver")?;
            window.set_resizable(false)?;

            #[cfg(target_os = "windows")]
            {
                use window_vibrancy::apply_mica;
                let _ = apply_mica(&window, Some(true));
            }

            window::show_main_window(&handle);
            if start_background {
                // Show, then hide from a deferred main-thread callback.
                // Hiding inline runs before the platform init the first show
                // kicks off; the macOS menu bar never comes up otherwise.
                let deferred = handle.clone();
                handle.run_on_main_thread(move || {
                    window::hide_main_window(&deferred);
                    deferred
                        .state::<BackgroundController>()
                        .start(&deferred, false);
                })?;
            }

            if check_updates {
                let checker = handle.clone();
                tauri::async_runtime::spawn(async move {
                    if let Err(e) = updates::check(&checker, false).await {
                        log::warn!("startup update check failed: {e}");
                    }
                });
            }

            Ok(())
        })
        .on_window_event(window::handle_window_event)
        .invoke_handler(tauri::generate_handler![
            commands::get_prefs,
            commands::set_pref,
            commands::enter_background,
            commands::exit_background,
            commands::background_status,
            commands::save_blobs_now,
            commands::hide_window,
            commands::check_for_updates,
            commands::recent_history,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            // Exiting while the background service is up: stop it first.
            if let tauri::RunEvent::Exit = event {
                let controller = app.state::<BackgroundController>();
                if controller.in_background() {
                    controller.stop(app, false);
                }
            }
        });
}
