// tray/icon.rs - Notification Area Icon
//
// Owns the single Shell_NotifyIconW registration. Registration always issues
// a delete before the add so a stale icon left by a previous instance never
// turns into a duplicate. A failed registration is degraded, not fatal: the
// app keeps running without a visible icon.

/// UTF-16 units a tooltip can carry; NOTIFYICONDATAW.szTip holds 128
/// including the terminator.
pub const TOOLTIP_MAX_UTF16: usize = 127;

/// Bound tooltip text to what fits the fixed szTip buffer, truncating on a
/// character boundary so a surrogate pair is never split.
pub fn bounded_tooltip(text: &str) -> String {
    let mut units = 0usize;
    let mut out = String::new();
    for ch in text.chars() {
        let len = ch.len_utf16();
        if units + len > TOOLTIP_MAX_UTF16 {
            break;
        }
        units += len;
        out.push(ch);
    }
    out
}

#[cfg(windows)]
pub use native::TrayIcon;

#[cfg(windows)]
mod native {
    use log::{info, warn};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Shell::{
        Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_SHOWTIP, NIF_STATE, NIF_TIP, NIM_ADD,
        NIM_DELETE, NIM_MODIFY, NIS_SHAREDICON, NOTIFYICONDATAW, NOTIFYICONDATAW_0,
    };
    use windows::Win32::UI::WindowsAndMessaging::{LoadIconW, HICON, IDI_APPLICATION};

    use super::bounded_tooltip;
    use crate::tray::window::WM_TRAY_CALLBACK;
    use crate::utils::wide_array;

    /// The one icon this process ever registers.
    const TRAY_ICON_ID: u32 = 1;

    /// State of the single notification-area icon.
    ///
    /// Handles are stored as raw integers so the state can live behind the
    /// process-wide mutex; they are only dereferenced on the pump thread.
    pub struct TrayIcon {
        hwnd: isize,
        hicon: isize,
        tooltip: String,
        registered: bool,
    }

    impl TrayIcon {
        pub fn new(hwnd: HWND, tooltip: &str) -> Self {
            // Stock application icon as fallback; a real icon resource is
            // the installer's concern
            let hicon = unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default();
            Self {
                hwnd: hwnd.0 as isize,
                hicon: hicon.0 as isize,
                tooltip: bounded_tooltip(tooltip),
                registered: false,
            }
        }

        fn data(&self) -> NOTIFYICONDATAW {
            NOTIFYICONDATAW {
                cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
                hWnd: HWND(self.hwnd as *mut std::ffi::c_void),
                uID: TRAY_ICON_ID,
                uFlags: NIF_MESSAGE | NIF_ICON | NIF_TIP | NIF_STATE | NIF_SHOWTIP,
                uCallbackMessage: WM_TRAY_CALLBACK,
                hIcon: HICON(self.hicon as *mut std::ffi::c_void),
                szTip: wide_array::<128>(&self.tooltip),
                dwStateMask: NIS_SHAREDICON,
                Anonymous: NOTIFYICONDATAW_0 { uVersion: 4 },
                ..Default::default()
            }
        }

        /// Register the icon, clearing any stale registration first so the
        /// call is idempotent.
        pub fn register(&mut self) {
            let data = self.data();
            unsafe {
                let _ = Shell_NotifyIconW(NIM_DELETE, &data);
                if Shell_NotifyIconW(NIM_ADD, &data).as_bool() {
                    self.registered = true;
                    info!("Notification icon registered");
                } else {
                    warn!("Failed to register the notification icon; continuing without one");
                }
            }
        }

        /// Update only the tooltip of a registered icon.
        pub fn update_tooltip(&mut self, text: &str) {
            self.tooltip = bounded_tooltip(text);
            if !self.registered {
                return;
            }
            let mut data = self.data();
            data.uFlags = NIF_TIP;
            unsafe {
                if !Shell_NotifyIconW(NIM_MODIFY, &data).as_bool() {
                    warn!("Failed to update the notification icon tooltip");
                }
            }
        }

        /// Remove the icon; safe to call when registration failed.
        pub fn unregister(&mut self) {
            if !self.registered {
                return;
            }
            let data = self.data();
            unsafe {
                let _ = Shell_NotifyIconW(NIM_DELETE, &data);
            }
            self.registered = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tooltip_passes_through() {
        assert_eq!(bounded_tooltip("staywake - off"), "staywake - off");
    }

    #[test]
    fn long_tooltip_is_truncated_to_the_buffer_bound() {
        let long = "x".repeat(500);
        let bounded = bounded_tooltip(&long);
        assert_eq!(bounded.encode_utf16().count(), TOOLTIP_MAX_UTF16);
    }

    #[test]
    fn truncation_never_splits_a_surrogate_pair() {
        // 63 BMP chars then supplementary-plane chars (2 units each):
        // unit 127 would land mid-pair, so the pair must be dropped
        let mut text = "a".repeat(126);
        text.push('\u{1F600}');
        let bounded = bounded_tooltip(&text);
        assert_eq!(bounded, "a".repeat(126));
        assert!(bounded.encode_utf16().count() <= TOOLTIP_MAX_UTF16);
    }

    #[test]
    fn exact_fit_is_kept() {
        let text = "y".repeat(TOOLTIP_MAX_UTF16);
        assert_eq!(bounded_tooltip(&text), text);
    }
}
