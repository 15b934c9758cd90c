//! staywake - Keep a Windows machine awake from the notification area.
//!
//! The library half is platform independent: menu descriptions, command
//! routing and settings. The Win32 shell (hidden message window, icon,
//! process-wide tray controller) only exists on Windows targets.

pub mod settings;
pub mod tray;
pub mod utils;

// Re-export commonly used types
pub use settings::{AwakeMode, TraySettings};
pub use tray::command::TrayAction;
pub use tray::menu::{build_menu, MenuEntry, MenuSpec};
