// tray/backend.rs - Native Menu Rendering
//
// Translates a MenuSpec into live menu handles behind a small trait. The
// trait exists for one reason: the handle discipline (destroy the previous
// pair before building the next, never leak a submenu) must be provable
// with a counting mock, while the Win32 calls stay in one place.

use anyhow::Result;
use log::warn;

use super::menu::{MenuEntry, MenuSpec};

/// Minimal native menu surface.
///
/// Destroying a root menu also destroys any submenu attached to it, matching
/// Win32 `DestroyMenu` semantics; implementations must honor that so callers
/// only ever destroy roots.
pub trait MenuBackend {
    type Handle: Copy;

    fn create_popup(&mut self) -> Result<Self::Handle>;
    fn add_separator(&mut self, menu: Self::Handle, position: u32) -> Result<()>;
    fn add_item(
        &mut self,
        menu: Self::Handle,
        position: u32,
        command: u32,
        text: &str,
        checked: bool,
        enabled: bool,
    ) -> Result<()>;
    fn add_submenu(
        &mut self,
        menu: Self::Handle,
        position: u32,
        submenu: Self::Handle,
        text: &str,
        checked: bool,
    ) -> Result<()>;
    /// Destroy a root menu and everything attached to it.
    fn destroy(&mut self, menu: Self::Handle) -> Result<()>;
}

/// Handles of one rendered menu generation.
#[derive(Debug, Clone, Copy)]
pub struct RenderedMenu<H> {
    pub root: H,
    pub submenu: Option<H>,
}

/// Render a menu description into native handles, inserting entries at
/// sequential ascending positions so the rendered order is exactly the
/// declared order.
pub fn render_menu<B: MenuBackend>(
    backend: &mut B,
    spec: &MenuSpec,
) -> Result<RenderedMenu<B::Handle>> {
    let root = backend.create_popup()?;
    let mut submenu = None;

    for (position, entry) in spec.entries.iter().enumerate() {
        let position = position as u32;
        match entry {
            MenuEntry::Separator => backend.add_separator(root, position)?,
            MenuEntry::Item {
                command,
                text,
                checked,
                enabled,
            } => backend.add_item(root, position, *command, text, *checked, *enabled)?,
            MenuEntry::Submenu {
                text,
                checked,
                items,
            } => {
                let sub = backend.create_popup()?;
                for (sub_position, item) in items.iter().enumerate() {
                    if let MenuEntry::Item {
                        command,
                        text,
                        checked,
                        enabled,
                    } = item
                    {
                        backend.add_item(
                            sub,
                            sub_position as u32,
                            *command,
                            text,
                            *checked,
                            *enabled,
                        )?;
                    }
                }
                backend.add_submenu(root, position, sub, text, *checked)?;
                submenu = Some(sub);
            }
        }
    }

    Ok(RenderedMenu { root, submenu })
}

/// Destroy-then-create menu replacement.
///
/// A failed destroy is a degraded condition: it is logged and never blocks
/// the following create, so repeated rebuilds cannot wedge the menu.
pub fn replace_menu<B: MenuBackend>(
    backend: &mut B,
    previous: Option<RenderedMenu<B::Handle>>,
    spec: &MenuSpec,
) -> Result<RenderedMenu<B::Handle>> {
    if let Some(old) = previous {
        if let Err(e) = backend.destroy(old.root) {
            warn!("Failed to destroy previous tray menu: {e:#}");
        }
    }
    render_menu(backend, spec)
}

#[cfg(windows)]
pub use win32::Win32Backend;

#[cfg(windows)]
mod win32 {
    use anyhow::{Context, Result};
    use windows::core::PCWSTR;
    use windows::Win32::UI::WindowsAndMessaging::{
        CreatePopupMenu, DestroyMenu, InsertMenuW, HMENU, MF_BYPOSITION, MF_CHECKED, MF_DISABLED,
        MF_GRAYED, MF_POPUP, MF_SEPARATOR, MF_STRING, MF_UNCHECKED,
    };

    use super::MenuBackend;
    use crate::utils::wide_string;

    /// Renders menu descriptions through the Win32 menu API.
    pub struct Win32Backend;

    impl MenuBackend for Win32Backend {
        type Handle = HMENU;

        fn create_popup(&mut self) -> Result<HMENU> {
            unsafe { CreatePopupMenu() }.context("CreatePopupMenu failed")
        }

        fn add_separator(&mut self, menu: HMENU, position: u32) -> Result<()> {
            unsafe { InsertMenuW(menu, position, MF_BYPOSITION | MF_SEPARATOR, 0, PCWSTR::null()) }
                .context("InsertMenuW failed for separator")
        }

        fn add_item(
            &mut self,
            menu: HMENU,
            position: u32,
            command: u32,
            text: &str,
            checked: bool,
            enabled: bool,
        ) -> Result<()> {
            let mut flags =
                MF_BYPOSITION | MF_STRING | if checked { MF_CHECKED } else { MF_UNCHECKED };
            if !enabled {
                flags |= MF_DISABLED | MF_GRAYED;
            }
            let text = wide_string(text);
            unsafe { InsertMenuW(menu, position, flags, command as usize, PCWSTR(text.as_ptr())) }
                .context("InsertMenuW failed for item")
        }

        fn add_submenu(
            &mut self,
            menu: HMENU,
            position: u32,
            submenu: HMENU,
            text: &str,
            checked: bool,
        ) -> Result<()> {
            let flags =
                MF_BYPOSITION | MF_POPUP | if checked { MF_CHECKED } else { MF_UNCHECKED };
            let text = wide_string(text);
            unsafe {
                InsertMenuW(
                    menu,
                    position,
                    flags,
                    submenu.0 as usize,
                    PCWSTR(text.as_ptr()),
                )
            }
            .context("InsertMenuW failed for submenu")
        }

        fn destroy(&mut self, menu: HMENU) -> Result<()> {
            unsafe { DestroyMenu(menu) }.context("DestroyMenu failed")
        }
    }
}
