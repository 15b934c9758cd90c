// tray/mod.rs - Notification Area Subsystem
//
// Split into a platform-independent model and a native shell:
// - menu: settings snapshot -> ordered menu description (pure)
// - command: menu command id -> application action (pure)
// - backend: menu description -> native menu handles, behind a trait
// - icon, window, controller: the Win32 side (hidden message window,
//   Shell_NotifyIconW icon, process-wide state)

pub mod backend;
pub mod command;
pub mod icon;
pub mod menu;

#[cfg(windows)]
pub mod controller;
#[cfg(windows)]
pub mod window;
