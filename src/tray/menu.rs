use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::TrayIconBuilder;
use tauri::{AppHandle, Emitter, Manager};

use crate::events;
use crate::ipc::LifecycleCommand;
use crate::recorder::RecordingState;
use crate::state::app_state::{AppState, TrayAffordances};

/// Build and configure the system tray icon with menu.
/// Expects [`AppState`] to be managed already.
pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let start = MenuItem::with_id(app, "start_recording", "Start Recording", true, None::<&str>)?;
    let pause = MenuItem::with_id(app, "pause_recording", "Pause Recording", false, None::<&str>)?;
    let stop = MenuItem::with_id(app, "stop_recording", "Stop Recording", false, None::<&str>)?;

    let sep = PredefinedMenuItem::separator(app)?;

    let quit = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;

    let menu = Menu::with_items(app, &[&start, &pause, &stop, &sep, &quit])?;

    // Load tray icon from embedded PNG bytes
    let icon_bytes = include_bytes!("../../icons/tray-icon.png");
    let icon = tauri::image::Image::from_bytes(icon_bytes)?;

    let _tray = TrayIconBuilder::new()
        .icon(icon)
        .icon_as_template(true)
        .menu(&menu)
        .show_menu_on_left_click(true)
        .tooltip("Quick Recorder")
        .on_menu_event(move |app, event| {
            let command = match event.id().as_ref() {
                "quit" => {
                    log::info!("Quit requested from tray");
                    app.exit(0);
                    return;
                }
                "start_recording" => LifecycleCommand::Start,
                "pause_recording" => LifecycleCommand::Pause,
                "stop_recording" => LifecycleCommand::Stop,
                _ => return,
            };
            let app_handle = app.clone();
            tauri::async_runtime::spawn(async move {
                let state = app_handle.state::<AppState>();
                if let Err(e) = state.send(command).await {
                    log::error!("Failed to send {}: {}", command.channel(), e);
                }
            });
        })
        .build(app)?;

    follow_recording_state(app, start, pause, stop);

    Ok(())
}

/// Redraw the menu from the capture side's published state. The tray never
/// writes session state, it only mirrors it.
fn follow_recording_state(app: &AppHandle, start: MenuItem<tauri::Wry>, pause: MenuItem<tauri::Wry>, stop: MenuItem<tauri::Wry>) {
    let mut updates = app.state::<AppState>().subscribe();
    let app_handle = app.clone();
    tauri::async_runtime::spawn(async move {
        loop {
            let state = *updates.borrow_and_update();
            if let Err(e) = redraw(&start, &pause, &stop, state) {
                log::warn!("Failed to update tray menu: {}", e);
            }
            let _ = app_handle.emit(events::RECORDING_STATE_CHANGED, state);
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
}

fn redraw(
    start: &MenuItem<tauri::Wry>,
    pause: &MenuItem<tauri::Wry>,
    stop: &MenuItem<tauri::Wry>,
    state: RecordingState,
) -> tauri::Result<()> {
    let affordances = TrayAffordances::from(state);
    start.set_text(affordances.start_label)?;
    start.set_enabled(affordances.can_start)?;
    pause.set_enabled(affordances.can_pause)?;
    stop.set_enabled(affordances.can_stop)?;
    Ok(())
}
