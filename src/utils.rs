// utils.rs - Common Utility Functions
//
// Shared utilities used across multiple modules to avoid code duplication.

/// Convert a Rust string to a null-terminated wide string (UTF-16) for Windows API
#[cfg(windows)]
pub fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

/// Convert a Rust string into a fixed-size null-terminated UTF-16 buffer,
/// truncating to fit. Used for the bounded string fields of Win32 structs.
#[cfg(windows)]
pub fn wide_array<const N: usize>(s: &str) -> [u16; N] {
    let mut buf = [0u16; N];
    for (i, unit) in s.encode_utf16().take(N - 1).enumerate() {
        buf[i] = unit;
    }
    buf
}
