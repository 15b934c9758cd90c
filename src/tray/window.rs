// tray/window.rs - Hidden Message Window
//
// Registers the window class and creates the invisible window whose only job
// is to receive messages: the notification-icon callback, menu commands and
// destruction. The window procedure is the single entry point the OS calls
// into this process for those messages; it must never unwind across the
// message pump.

use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::{bail, Context, Result};
use log::{debug, error, info};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, MessageBoxW, PostQuitMessage,
    RegisterClassExW, TranslateMessage, MB_ICONINFORMATION, MB_OK, MSG, WINDOW_EX_STYLE,
    WINDOW_STYLE, WM_APP, WM_COMMAND, WM_DESTROY, WM_LBUTTONDBLCLK, WM_PAINT, WM_RBUTTONUP,
    WNDCLASSEXW,
};

use super::controller;

/// Posted by the shell for notification-icon interaction; the actual mouse
/// message arrives in the low word of lparam.
pub const WM_TRAY_CALLBACK: u32 = WM_APP + 100;

/// Posted by other threads to request a menu rebuild on the pump thread.
/// This is the only cross-thread path into the native handles.
pub const WM_REBUILD_MENU: u32 = WM_APP + 101;

const WINDOW_CLASS: PCWSTR = w!("StaywakeTrayWindow");

/// Register the window class and create the hidden message window.
///
/// Both failure paths are fatal: without a message sink the whole tray
/// feature cannot function.
pub fn create_hidden_window() -> Result<HWND> {
    let hinstance = unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW failed")?;

    let class = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(tray_wndproc),
        hInstance: hinstance.into(),
        lpszClassName: WINDOW_CLASS,
        ..Default::default()
    };

    if unsafe { RegisterClassExW(&class) } == 0 {
        bail!("RegisterClassExW rejected the tray window class");
    }

    // Zero size, zero style, never shown
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            WINDOW_CLASS,
            w!("staywake"),
            WINDOW_STYLE(0),
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
    }
    .context("CreateWindowExW failed for the hidden tray window")?;

    info!("Hidden tray window created");
    Ok(hwnd)
}

/// Run the message pump until WM_QUIT. Blocks the calling thread; every
/// dispatch lands in `tray_wndproc` below.
pub fn run_message_loop() {
    let mut msg = MSG::default();
    unsafe {
        // GetMessageW returns -1 on error; treat that like quit
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

/// The single window procedure. Any panic in a handler is caught, logged
/// and mapped to the platform default result so the host pump stays intact.
unsafe extern "system" fn tray_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match catch_unwind(AssertUnwindSafe(|| dispatch(hwnd, msg, wparam, lparam))) {
        Ok(Some(result)) => result,
        Ok(None) => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        Err(_) => {
            error!("Panic in tray window procedure (message 0x{msg:04x})");
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
    }
}

/// Message-to-action table. `None` delegates to DefWindowProcW, which is
/// mandatory for everything not handled here.
fn dispatch(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<LRESULT> {
    match msg {
        // Nothing to paint on a window that is never shown
        WM_PAINT => Some(LRESULT(0)),

        WM_LBUTTONDBLCLK => {
            show_running_notice(hwnd);
            Some(LRESULT(0))
        }

        WM_RBUTTONUP => {
            // The popup is driven by the tray callback below, not by raw
            // button messages on the hidden window
            debug!("Right button up on the hidden window");
            Some(LRESULT(0))
        }

        WM_TRAY_CALLBACK => {
            match (lparam.0 & 0xFFFF) as u32 {
                WM_RBUTTONUP => controller::show_menu(hwnd),
                WM_LBUTTONDBLCLK => show_running_notice(hwnd),
                _ => {}
            }
            Some(LRESULT(0))
        }

        WM_COMMAND => {
            let command = (wparam.0 & 0xFFFF) as u32;
            controller::handle_command(hwnd, command);
            Some(LRESULT(0))
        }

        WM_REBUILD_MENU => {
            controller::rebuild_on_pump_thread();
            Some(LRESULT(0))
        }

        WM_DESTROY => {
            info!("Tray window destroyed, tearing down");
            controller::teardown();
            unsafe { PostQuitMessage(0) };
            Some(LRESULT(0))
        }

        _ => None,
    }
}

fn show_running_notice(hwnd: HWND) {
    unsafe {
        let _ = MessageBoxW(
            Some(hwnd),
            w!("staywake is running in the notification area."),
            w!("staywake"),
            MB_OK | MB_ICONINFORMATION,
        );
    }
}
