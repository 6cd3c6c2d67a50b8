//! Quick Recorder: records system audio from the tray and saves it through a
//! native dialog.
//!
//! The recording session lives on a capture task reached only through the
//! command transport in [`ipc`]; the tray and the lifecycle coordinator see
//! its state through a one-way projection.

pub mod capture;
pub mod error;
pub mod events;
pub mod ipc;
pub mod recorder;
pub mod services;
pub mod state;
#[cfg(feature = "desktop")]
pub mod tray;

#[cfg(test)]
mod testing;

#[cfg(feature = "desktop")]
pub fn run() {
    use std::sync::Arc;
    use tauri::Manager;

    use capture::audio::{CpalBackend, CpalContentProvider};
    use capture::config::RecorderConfig;
    use capture::host::CaptureServices;
    use capture::stream::CaptureBackend;
    use services::alerts::{Alerts, DialogAlerts};
    use services::permissions::gate::CachedPermissionGate;
    use services::permissions::store::PermissionStore;
    use services::permissions::system::SystemPermissionProbe;
    use services::storage::sink::DialogPicker;
    use services::storage::FileSaveSink;
    use state::app_state::AppState;

    let config = RecorderConfig::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();
    log::info!("Starting Quick Recorder v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_notification::init())
        .setup(move |app| {
            // Menu bar app, no dock icon
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let handle = app.handle().clone();
            let alerts: Arc<dyn Alerts> = Arc::new(DialogAlerts::new(handle.clone()));
            let backend = Arc::new(CpalBackend);
            let permissions = CachedPermissionGate::new(
                Arc::new(SystemPermissionProbe),
                PermissionStore::open_default(&config.app_dir_name),
            );
            let sink = FileSaveSink::new(
                Arc::new(DialogPicker::new(handle.clone())),
                alerts.clone(),
                backend.file_extension(),
            );
            let services = CaptureServices {
                provider: Arc::new(CpalContentProvider),
                backend,
                permissions: Arc::new(permissions),
                sink: Arc::new(sink),
                chunk_interval: config.chunk_interval,
            };

            let (state, dispatch) = AppState::launch(services, alerts);
            tauri::async_runtime::spawn(dispatch);
            app.manage(state);

            // Set up system tray icon with menu
            tray::menu::setup_tray(app.handle())?;

            if config.debug {
                open_diagnostics_window(app.handle())?;
            }

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            capture::commands::get_sources,
            capture::commands::get_recording_state,
            capture::commands::start_recording,
            capture::commands::pause_recording,
            capture::commands::stop_recording,
            services::permissions::commands::check_screen_recording_permission,
            services::permissions::commands::check_microphone_permission,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|_app, event| {
            // Tray app: closing the diagnostics window must not quit
            if let tauri::RunEvent::ExitRequested { api, code: None, .. } = event {
                api.prevent_exit();
            }
        });
}

/// Visible capture diagnostics with devtools, only in debug mode
#[cfg(feature = "desktop")]
fn open_diagnostics_window(app: &tauri::AppHandle) -> tauri::Result<()> {
    let url = tauri::WebviewUrl::App("index.html".into());
    let window = tauri::WebviewWindowBuilder::new(app, "capture", url)
        .title("Quick Recorder Diagnostics")
        .inner_size(800.0, 600.0)
        .resizable(true)
        .center()
        .build()?;
    window.open_devtools();
    Ok(())
}
