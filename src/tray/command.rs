// tray/command.rs - Command Routing
//
// Maps a chosen menu item's command identifier back to an application
// action. Pure and total: unknown identifiers become a no-op so menu items
// this router does not yet understand never turn into errors.

use crate::settings::AwakeMode;

use super::menu::{
    CMD_DISPLAY_SETTING, CMD_EXIT, CMD_MODE_EXPIRABLE, CMD_MODE_INDEFINITE, CMD_MODE_PASSIVE,
    CMD_TIME_BASE,
};

/// Application-level action a menu command resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    /// Signal the exit event; the subsystem never terminates the process.
    Exit,
    /// Flip the keep-display-on setting.
    ToggleDisplay,
    /// Switch to the given mode.
    SetMode(AwakeMode),
    /// Start timed mode using the shortcut at this index of the effective
    /// (post-substitution) shortcut list.
    TimedShortcut(usize),
    /// Deliberate no-op for unknown identifiers.
    None,
}

/// Resolve a WM_COMMAND identifier against the current shortcut count.
pub fn route(command: u32, shortcut_count: usize) -> TrayAction {
    match command {
        CMD_EXIT => TrayAction::Exit,
        CMD_DISPLAY_SETTING => TrayAction::ToggleDisplay,
        CMD_MODE_PASSIVE => TrayAction::SetMode(AwakeMode::Passive),
        CMD_MODE_INDEFINITE => TrayAction::SetMode(AwakeMode::Indefinite),
        CMD_MODE_EXPIRABLE => TrayAction::SetMode(AwakeMode::Expirable),
        id if id >= CMD_TIME_BASE => {
            let index = (id - CMD_TIME_BASE) as usize;
            if index < shortcut_count {
                TrayAction::TimedShortcut(index)
            } else {
                TrayAction::None
            }
        }
        _ => TrayAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_routes_to_exit() {
        assert_eq!(route(CMD_EXIT, 0), TrayAction::Exit);
    }

    #[test]
    fn display_setting_routes_to_toggle() {
        assert_eq!(route(CMD_DISPLAY_SETTING, 3), TrayAction::ToggleDisplay);
    }

    #[test]
    fn mode_commands_route_to_their_modes() {
        assert_eq!(
            route(CMD_MODE_PASSIVE, 0),
            TrayAction::SetMode(AwakeMode::Passive)
        );
        assert_eq!(
            route(CMD_MODE_INDEFINITE, 0),
            TrayAction::SetMode(AwakeMode::Indefinite)
        );
        assert_eq!(
            route(CMD_MODE_EXPIRABLE, 0),
            TrayAction::SetMode(AwakeMode::Expirable)
        );
    }

    #[test]
    fn time_offset_routes_to_shortcut_index() {
        assert_eq!(route(CMD_TIME_BASE + 2, 5), TrayAction::TimedShortcut(2));
        assert_eq!(route(CMD_TIME_BASE, 1), TrayAction::TimedShortcut(0));
    }

    #[test]
    fn time_offset_past_the_list_is_a_no_op() {
        assert_eq!(route(CMD_TIME_BASE + 5, 5), TrayAction::None);
        assert_eq!(route(CMD_TIME_BASE + 2, 0), TrayAction::None);
    }

    #[test]
    fn unknown_command_is_a_no_op() {
        assert_eq!(route(9999, 5), TrayAction::None);
        assert_eq!(route(0, 5), TrayAction::None);
        assert_eq!(route(1999, 5), TrayAction::None);
    }
}
