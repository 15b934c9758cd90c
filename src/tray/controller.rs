// tray/controller.rs - Tray State and Command Execution
//
// Process-wide singleton owning the hidden window, the live menu pair, the
// icon registration and the current settings snapshot. Only the message
// pump thread touches native handles; other threads hand off rebuild
// requests through a posted message. `init` may be called once per process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use log::{debug, error, info, warn};
use windows::Win32::Foundation::{HWND, LPARAM, POINT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyWindow, GetCursorPos, PostMessageW, SetForegroundWindow, TrackPopupMenu, HMENU,
    TPM_BOTTOMALIGN, TPM_LEFTALIGN,
};

use crate::settings::{default_time_shortcuts, AwakeMode, TraySettings};

use super::backend::{replace_menu, RenderedMenu, Win32Backend};
use super::command::{route, TrayAction};
use super::icon::TrayIcon;
use super::menu::build_menu;
use super::window::{create_hidden_window, WM_REBUILD_MENU};

/// Invoked on the pump thread after every user-driven settings change.
pub type ChangeCallback = Box<dyn Fn(&TraySettings) + Send>;

struct TrayState {
    // Raw handle values; HWND/HMENU are not Send and are only ever
    // dereferenced on the pump thread
    hwnd: isize,
    menu_root: isize,
    menu_sub: isize,
    icon: TrayIcon,
    settings: TraySettings,
    /// Shortcut list actually rendered (defaults substituted when the
    /// configured list is empty); command routing indexes into this.
    effective_shortcuts: Vec<(String, u64)>,
    started_embedded: bool,
    /// Snapshot handed off by `request_rebuild` from another thread.
    pending: Option<TraySettings>,
    exit_signal: Arc<AtomicBool>,
    on_change: ChangeCallback,
}

static TRAY: Mutex<Option<TrayState>> = Mutex::new(None);

fn effective_shortcuts(settings: &TraySettings) -> Vec<(String, u64)> {
    if settings.time_shortcuts.is_empty() {
        default_time_shortcuts()
    } else {
        settings.time_shortcuts.clone()
    }
}

fn current_menu(state: &TrayState) -> Option<RenderedMenu<HMENU>> {
    if state.menu_root == 0 {
        return None;
    }
    Some(RenderedMenu {
        root: HMENU(state.menu_root as *mut std::ffi::c_void),
        submenu: (state.menu_sub != 0)
            .then(|| HMENU(state.menu_sub as *mut std::ffi::c_void)),
    })
}

/// Rebuild the menu and tooltip from the state's settings snapshot.
/// A failed render is degraded: the old menu is gone, the icon stays.
fn rebuild(state: &mut TrayState) {
    let spec = build_menu(&state.settings, state.started_embedded);
    state.effective_shortcuts = effective_shortcuts(&state.settings);

    let mut backend = Win32Backend;
    match replace_menu(&mut backend, current_menu(state), &spec) {
        Ok(rendered) => {
            state.menu_root = rendered.root.0 as isize;
            state.menu_sub = rendered.submenu.map_or(0, |sub| sub.0 as isize);
        }
        Err(e) => {
            error!("Failed to rebuild the tray menu: {e:#}");
            state.menu_root = 0;
            state.menu_sub = 0;
        }
    }

    state.icon.update_tooltip(&spec.tooltip);
}

/// Create the hidden window, register the icon and build the first menu.
///
/// Single-instantiation contract: there is one tray icon, one hidden window
/// and one menu per process, so a second call fails.
pub fn init(
    settings: TraySettings,
    started_embedded: bool,
    exit_signal: Arc<AtomicBool>,
    on_change: ChangeCallback,
) -> Result<()> {
    let mut guard = TRAY.lock().unwrap();
    if guard.is_some() {
        bail!("tray controller is already initialized");
    }

    let hwnd = create_hidden_window()?;

    let mut state = TrayState {
        hwnd: hwnd.0 as isize,
        menu_root: 0,
        menu_sub: 0,
        icon: TrayIcon::new(hwnd, &super::menu::tooltip_text(settings.mode)),
        effective_shortcuts: effective_shortcuts(&settings),
        settings,
        started_embedded,
        pending: None,
        exit_signal,
        on_change,
    };

    state.icon.register();
    rebuild(&mut state);

    *guard = Some(state);
    info!("Tray controller initialized");
    Ok(())
}

/// Pop up the context menu at the cursor. Called from the wndproc on the
/// notification-icon callback.
pub fn show_menu(hwnd: HWND) {
    // Copy the handle out and release the lock: TrackPopupMenu runs a modal
    // message loop and re-entering the wndproc must not find the lock held
    let menu_root = {
        let guard = TRAY.lock().unwrap();
        match guard.as_ref() {
            Some(state) if state.menu_root != 0 => state.menu_root,
            _ => return,
        }
    };

    let menu = HMENU(menu_root as *mut std::ffi::c_void);
    let mut pt = POINT::default();
    unsafe {
        if let Err(e) = GetCursorPos(&mut pt) {
            warn!("GetCursorPos failed: {e}");
            return;
        }
        // Without this the menu stays open when the user clicks elsewhere
        let _ = SetForegroundWindow(hwnd);
        let _ = TrackPopupMenu(
            menu,
            TPM_LEFTALIGN | TPM_BOTTOMALIGN,
            pt.x,
            pt.y,
            0,
            hwnd,
            None,
        );
    }
}

/// Execute the action behind a WM_COMMAND identifier.
pub fn handle_command(hwnd: HWND, command: u32) {
    let action = {
        let guard = TRAY.lock().unwrap();
        let Some(state) = guard.as_ref() else { return };
        route(command, state.effective_shortcuts.len())
    };

    match action {
        TrayAction::Exit => {
            info!("Exit selected from the tray menu");
            {
                let guard = TRAY.lock().unwrap();
                if let Some(state) = guard.as_ref() {
                    state.exit_signal.store(true, Ordering::SeqCst);
                }
            }
            // Sends WM_DESTROY synchronously, which runs teardown; the lock
            // must already be released here
            unsafe {
                if let Err(e) = DestroyWindow(hwnd) {
                    error!("DestroyWindow failed: {e}");
                }
            }
        }
        TrayAction::ToggleDisplay => {
            apply_change(|settings| settings.keep_display_on = !settings.keep_display_on);
        }
        TrayAction::SetMode(mode) => {
            apply_change(move |settings| settings.mode = mode);
        }
        TrayAction::TimedShortcut(index) => {
            let mut guard = TRAY.lock().unwrap();
            let Some(state) = guard.as_mut() else { return };
            let (label, minutes) = state.effective_shortcuts[index].clone();
            info!("Timed mode selected: {label} ({minutes} minutes)");
            state.settings.mode = AwakeMode::Timed;
            (state.on_change)(&state.settings);
            rebuild(state);
        }
        TrayAction::None => {
            debug!("Ignoring unknown tray command {command}");
        }
    }
}

fn apply_change(change: impl FnOnce(&mut TraySettings)) {
    let mut guard = TRAY.lock().unwrap();
    let Some(state) = guard.as_mut() else { return };
    change(&mut state.settings);
    (state.on_change)(&state.settings);
    rebuild(state);
}

/// Thread-safe rebuild request: store the snapshot, then nudge the pump
/// thread. Native handles are never touched from the caller's thread.
pub fn request_rebuild(settings: TraySettings) {
    let hwnd = {
        let mut guard = TRAY.lock().unwrap();
        let Some(state) = guard.as_mut() else {
            warn!("Rebuild requested before the tray controller was initialized");
            return;
        };
        state.pending = Some(settings);
        state.hwnd
    };

    unsafe {
        if let Err(e) = PostMessageW(
            Some(HWND(hwnd as *mut std::ffi::c_void)),
            WM_REBUILD_MENU,
            WPARAM(0),
            LPARAM(0),
        ) {
            warn!("Failed to post the rebuild message: {e}");
        }
    }
}

/// Apply a pending snapshot and rebuild. Runs on the pump thread only.
pub fn rebuild_on_pump_thread() {
    let mut guard = TRAY.lock().unwrap();
    let Some(state) = guard.as_mut() else { return };
    if let Some(settings) = state.pending.take() {
        state.settings = settings;
    }
    rebuild(state);
}

/// Release the icon and the menu pair. Runs from WM_DESTROY; afterwards the
/// controller can be initialized again (used by tests of the native layer).
pub fn teardown() {
    let mut guard = TRAY.lock().unwrap();
    let Some(mut state) = guard.take() else { return };

    state.icon.unregister();
    if let Some(menu) = current_menu(&state) {
        let mut backend = Win32Backend;
        use super::backend::MenuBackend;
        if let Err(e) = backend.destroy(menu.root) {
            warn!("Failed to destroy the tray menu during teardown: {e:#}");
        }
    }
    info!("Tray controller torn down");
}

/// Destroy the hidden window if it is still alive. For shutdown paths that
/// bypass the Exit menu item.
pub fn shutdown() {
    let hwnd = {
        let guard = TRAY.lock().unwrap();
        match guard.as_ref() {
            Some(state) => state.hwnd,
            None => return,
        }
    };
    unsafe {
        let _ = DestroyWindow(HWND(hwnd as *mut std::ffi::c_void));
    }
}
