// tray/menu.rs - Context Menu Model
//
// Pure half of the menu builder: turns an immutable settings snapshot into
// an ordered, top-to-bottom description of the tray menu. Translating the
// description into native menu handles happens in backend.rs, which keeps
// everything here unit-testable without a window system.

use crate::settings::{default_time_shortcuts, AwakeMode, TraySettings};

// Command identifiers carried in WM_COMMAND. The interval shortcuts live in
// their own reserved range starting at CMD_TIME_BASE so dynamically numbered
// items can never collide with the fixed commands.
pub const CMD_DISPLAY_SETTING: u32 = 1000;
pub const CMD_MODE_PASSIVE: u32 = 1001;
pub const CMD_MODE_INDEFINITE: u32 = 1002;
pub const CMD_MODE_EXPIRABLE: u32 = 1003;
pub const CMD_EXIT: u32 = 1004;
pub const CMD_TIME_BASE: u32 = 2000;

/// One entry of a menu description, in final render order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Separator,
    Item {
        command: u32,
        text: String,
        checked: bool,
        enabled: bool,
    },
    /// A nested popup. Only `Item` children are ever produced.
    Submenu {
        text: String,
        checked: bool,
        items: Vec<MenuEntry>,
    },
}

/// Complete description of the tray menu plus the icon tooltip that goes
/// with it. Structural equality doubles as the rebuild-idempotence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSpec {
    pub entries: Vec<MenuEntry>,
    pub tooltip: String,
}

/// Build the tray menu description for a settings snapshot.
///
/// The order is declared top-to-bottom exactly as rendered: the four mode
/// items, a separator, the display toggle, and (when running standalone) a
/// separator above Exit at the bottom. Exactly one mode item is checked.
/// When the configured shortcut set is empty a default set is substituted
/// without mutating the caller's settings.
pub fn build_menu(settings: &TraySettings, started_embedded: bool) -> MenuSpec {
    let mode = settings.mode;

    let shortcuts = if settings.time_shortcuts.is_empty() {
        default_time_shortcuts()
    } else {
        settings.time_shortcuts.clone()
    };

    let interval_items = shortcuts
        .iter()
        .enumerate()
        .map(|(index, (label, _))| MenuEntry::Item {
            command: CMD_TIME_BASE + index as u32,
            text: label.clone(),
            checked: false,
            enabled: true,
        })
        .collect();

    let mut entries = vec![
        MenuEntry::Item {
            command: CMD_MODE_PASSIVE,
            text: "Off (keep using the selected power plan)".to_string(),
            checked: mode == AwakeMode::Passive,
            enabled: true,
        },
        MenuEntry::Item {
            command: CMD_MODE_INDEFINITE,
            text: "Keep awake indefinitely".to_string(),
            checked: mode == AwakeMode::Indefinite,
            enabled: true,
        },
        MenuEntry::Submenu {
            text: "Keep awake on interval".to_string(),
            checked: mode == AwakeMode::Timed,
            items: interval_items,
        },
        // Rendered but not selectable; there is no expiration picker yet
        MenuEntry::Item {
            command: CMD_MODE_EXPIRABLE,
            text: "Keep awake until expiration date and time".to_string(),
            checked: mode == AwakeMode::Expirable,
            enabled: false,
        },
        MenuEntry::Separator,
        MenuEntry::Item {
            command: CMD_DISPLAY_SETTING,
            text: "Keep screen on".to_string(),
            checked: settings.keep_display_on,
            // Meaningless while the power plan is in charge
            enabled: mode != AwakeMode::Passive,
        },
    ];

    // When hosted by a parent application, exiting is the host's job
    if !started_embedded {
        entries.push(MenuEntry::Separator);
        entries.push(MenuEntry::Item {
            command: CMD_EXIT,
            text: "Exit".to_string(),
            checked: false,
            enabled: true,
        });
    }

    MenuSpec {
        entries,
        tooltip: tooltip_text(mode),
    }
}

/// Tooltip shown on the notification icon for a given mode.
pub fn tooltip_text(mode: AwakeMode) -> String {
    let state = match mode {
        AwakeMode::Passive => "off",
        AwakeMode::Indefinite => "keeping awake indefinitely",
        AwakeMode::Timed => "keeping awake on interval",
        AwakeMode::Expirable => "keeping awake until expiration",
    };
    format!("staywake - {state}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [AwakeMode; 4] = [
        AwakeMode::Passive,
        AwakeMode::Indefinite,
        AwakeMode::Timed,
        AwakeMode::Expirable,
    ];

    fn settings(mode: AwakeMode) -> TraySettings {
        TraySettings {
            mode,
            keep_display_on: false,
            time_shortcuts: vec![("30 min".to_string(), 30), ("1 hr".to_string(), 60)],
        }
    }

    /// Checked state of the four mode entries, in render order.
    fn mode_checks(spec: &MenuSpec) -> Vec<bool> {
        spec.entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Item {
                    command, checked, ..
                } if matches!(
                    *command,
                    CMD_MODE_PASSIVE | CMD_MODE_INDEFINITE | CMD_MODE_EXPIRABLE
                ) =>
                {
                    Some(*checked)
                }
                MenuEntry::Submenu { checked, .. } => Some(*checked),
                _ => None,
            })
            .collect()
    }

    fn find_item(spec: &MenuSpec, command: u32) -> Option<(&str, bool, bool)> {
        spec.entries.iter().find_map(|entry| match entry {
            MenuEntry::Item {
                command: c,
                text,
                checked,
                enabled,
            } if *c == command => Some((text.as_str(), *checked, *enabled)),
            _ => None,
        })
    }

    #[test]
    fn exactly_one_mode_checked_for_every_mode() {
        for mode in ALL_MODES {
            let spec = build_menu(&settings(mode), false);
            let checks = mode_checks(&spec);
            assert_eq!(checks.len(), 4, "expected four mode entries");
            assert_eq!(
                checks.iter().filter(|c| **c).count(),
                1,
                "exactly one mode item must be checked for {mode:?}"
            );
        }
    }

    #[test]
    fn rebuild_is_idempotent() {
        let input = settings(AwakeMode::Timed);
        let first = build_menu(&input, false);
        let second = build_menu(&input, false);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_shortcuts_get_default_set_without_mutation() {
        let input = TraySettings::default();
        assert!(input.time_shortcuts.is_empty());

        let spec = build_menu(&input, false);
        let submenu_len = spec
            .entries
            .iter()
            .find_map(|entry| match entry {
                MenuEntry::Submenu { items, .. } => Some(items.len()),
                _ => None,
            })
            .expect("interval submenu must be present");
        assert!(submenu_len > 0, "default shortcut set must be substituted");
        assert!(
            input.time_shortcuts.is_empty(),
            "caller's settings must not be mutated"
        );
    }

    #[test]
    fn embedded_menu_has_no_exit() {
        let embedded = build_menu(&settings(AwakeMode::Passive), true);
        assert!(find_item(&embedded, CMD_EXIT).is_none());

        let standalone = build_menu(&settings(AwakeMode::Passive), false);
        assert!(find_item(&standalone, CMD_EXIT).is_some());
    }

    #[test]
    fn display_toggle_disabled_iff_passive() {
        for mode in ALL_MODES {
            for keep_display_on in [false, true] {
                let mut input = settings(mode);
                input.keep_display_on = keep_display_on;
                let spec = build_menu(&input, false);
                let (_, checked, enabled) =
                    find_item(&spec, CMD_DISPLAY_SETTING).expect("display toggle present");
                assert_eq!(checked, keep_display_on);
                assert_eq!(
                    enabled,
                    mode != AwakeMode::Passive,
                    "display toggle enablement wrong for {mode:?}"
                );
            }
        }
    }

    #[test]
    fn submenu_preserves_declared_shortcut_order() {
        let input = settings(AwakeMode::Timed);
        let spec = build_menu(&input, false);
        let items: Vec<(u32, String)> = spec
            .entries
            .iter()
            .find_map(|entry| match entry {
                MenuEntry::Submenu { items, .. } => Some(items),
                _ => None,
            })
            .unwrap()
            .iter()
            .map(|item| match item {
                MenuEntry::Item { command, text, .. } => (*command, text.clone()),
                other => panic!("unexpected submenu entry {other:?}"),
            })
            .collect();

        assert_eq!(
            items,
            vec![
                (CMD_TIME_BASE, "30 min".to_string()),
                (CMD_TIME_BASE + 1, "1 hr".to_string()),
            ]
        );
    }

    #[test]
    fn render_order_is_modes_then_toggle_then_exit() {
        let spec = build_menu(&settings(AwakeMode::Indefinite), false);

        let commands: Vec<Option<u32>> = spec
            .entries
            .iter()
            .map(|entry| match entry {
                MenuEntry::Item { command, .. } => Some(*command),
                _ => None,
            })
            .collect();

        assert_eq!(
            commands,
            vec![
                Some(CMD_MODE_PASSIVE),
                Some(CMD_MODE_INDEFINITE),
                None, // interval submenu
                Some(CMD_MODE_EXPIRABLE),
                None, // separator
                Some(CMD_DISPLAY_SETTING),
                None, // separator
                Some(CMD_EXIT),
            ]
        );
        // The separator renders directly above Exit
        assert_eq!(spec.entries[6], MenuEntry::Separator);
    }

    #[test]
    fn time_command_range_clears_fixed_commands() {
        assert!(CMD_TIME_BASE > CMD_EXIT);
        // Room for far more shortcuts than anyone would configure
        assert!(CMD_TIME_BASE - CMD_EXIT > 500);
    }

    #[test]
    fn passive_standalone_scenario_end_to_end() {
        let input = TraySettings {
            mode: AwakeMode::Passive,
            keep_display_on: false,
            time_shortcuts: vec![("30 min".to_string(), 30), ("1 hr".to_string(), 60)],
        };
        let spec = build_menu(&input, false);

        let (_, exit_checked, exit_enabled) = find_item(&spec, CMD_EXIT).expect("Exit present");
        assert!(!exit_checked);
        assert!(exit_enabled);

        let (_, display_checked, display_enabled) =
            find_item(&spec, CMD_DISPLAY_SETTING).expect("display toggle present");
        assert!(!display_checked);
        assert!(!display_enabled, "display toggle disabled while passive");

        let (_, passive_checked, _) = find_item(&spec, CMD_MODE_PASSIVE).unwrap();
        assert!(passive_checked);
        let (_, indefinite_checked, _) = find_item(&spec, CMD_MODE_INDEFINITE).unwrap();
        assert!(!indefinite_checked);

        let (submenu_checked, submenu_items) = spec
            .entries
            .iter()
            .find_map(|entry| match entry {
                MenuEntry::Submenu { checked, items, .. } => Some((*checked, items.clone())),
                _ => None,
            })
            .expect("interval submenu present");
        assert!(!submenu_checked);
        assert_eq!(submenu_items.len(), 2);

        let (_, expirable_checked, expirable_enabled) =
            find_item(&spec, CMD_MODE_EXPIRABLE).unwrap();
        assert!(!expirable_checked);
        assert!(!expirable_enabled);

        assert!(spec.entries.iter().any(|e| *e == MenuEntry::Separator));
    }
}
