// src/tray/menu.rs
use std::fmt;
use std::str::FromStr;

/// Severity of a notification popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Warning,
    Info,
    None,
}

impl MessageKind {
    pub fn sample_message(self) -> &'static str {
        match self {
            MessageKind::Error => "This is an error message",
            MessageKind::Warning => "This is a warning message",
            MessageKind::Info => "This is an info message",
            MessageKind::None => "This is an ordinary message",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageKind::Error => "error",
            MessageKind::Warning => "warning",
            MessageKind::Info => "info",
            MessageKind::None => "none",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    About,
    Display(MessageKind),
    Exit,
    /// Activation of the icon itself rather than a menu item.
    Main,
}

impl MenuCommand {
    pub fn id(self) -> &'static str {
        match self {
            MenuCommand::About => "about",
            MenuCommand::Display(MessageKind::Error) => "error",
            MenuCommand::Display(MessageKind::Warning) => "warning",
            MenuCommand::Display(MessageKind::Info) => "info",
            MenuCommand::Display(MessageKind::None) => "none",
            MenuCommand::Exit => "exit",
            MenuCommand::Main => "main",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown menu command: {0:?}")]
    Unknown(String),
}

impl FromStr for MenuCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_ascii_lowercase().as_str() {
            "about" => MenuCommand::About,
            "error" => MenuCommand::Display(MessageKind::Error),
            "warning" => MenuCommand::Display(MessageKind::Warning),
            "info" => MenuCommand::Display(MessageKind::Info),
            "none" => MenuCommand::Display(MessageKind::None),
            "exit" => MenuCommand::Exit,
            "main" => MenuCommand::Main,
            _ => return Err(CommandError::Unknown(s.trim().to_string())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        label: &'static str,
        command: MenuCommand,
    },
    Separator,
    Submenu {
        label: &'static str,
        items: Vec<MenuEntry>,
    },
}

/// About, separator, Display submenu, Exit.
pub fn popup_menu() -> Vec<MenuEntry> {
    let display = [
        ("Error", MessageKind::Error),
        ("Warning", MessageKind::Warning),
        ("Info", MessageKind::Info),
        ("None", MessageKind::None),
    ]
    .into_iter()
    .map(|(label, kind)| MenuEntry::Item {
        label,
        command: MenuCommand::Display(kind),
    })
    .collect();

    vec![
        MenuEntry::Item {
            label: "About",
            command: MenuCommand::About,
        },
        MenuEntry::Separator,
        MenuEntry::Submenu {
            label: "Display",
            items: display,
        },
        MenuEntry::Item {
            label: "Exit",
            command: MenuCommand::Exit,
        },
    ]
}

/// Flat list of every command reachable from `entries`, in menu order.
pub fn commands(entries: &[MenuEntry]) -> Vec<MenuCommand> {
    let mut out = Vec::new();
    for entry in entries {
        match entry {
            MenuEntry::Item { command, .. } => out.push(*command),
            MenuEntry::Separator => {}
            MenuEntry::Submenu { items, .. } => out.extend(commands(items)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_ids() {
        assert_eq!("about".parse::<MenuCommand>(), Ok(MenuCommand::About));
        assert_eq!(" Error \n".parse::<MenuCommand>(), Ok(MenuCommand::Display(MessageKind::Error)));
        assert_eq!("WARNING".parse::<MenuCommand>(), Ok(MenuCommand::Display(MessageKind::Warning)));
        assert_eq!("info".parse::<MenuCommand>(), Ok(MenuCommand::Display(MessageKind::Info)));
        assert_eq!("none".parse::<MenuCommand>(), Ok(MenuCommand::Display(MessageKind::None)));
        assert_eq!("exit".parse::<MenuCommand>(), Ok(MenuCommand::Exit));
        assert_eq!("main".parse::<MenuCommand>(), Ok(MenuCommand::Main));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            "reboot".parse::<MenuCommand>(),
            Err(CommandError::Unknown("reboot".to_string()))
        );
        assert!("".parse::<MenuCommand>().is_err());
    }

    #[test]
    fn test_id_parses_back() {
        for command in commands(&popup_menu()).into_iter().chain([MenuCommand::Main]) {
            assert_eq!(command.id().parse::<MenuCommand>(), Ok(command));
        }
    }

    #[test]
    fn test_menu_layout() {
        let menu = popup_menu();
        assert_eq!(menu.len(), 4);
        assert!(matches!(menu[0], MenuEntry::Item { label: "About", .. }));
        assert_eq!(menu[1], MenuEntry::Separator);
        assert!(matches!(&menu[2], MenuEntry::Submenu { label: "Display", items } if items.len() == 4));
        assert!(matches!(menu[3], MenuEntry::Item { command: MenuCommand::Exit, .. }));

        assert_eq!(
            commands(&menu),
            vec![
                MenuCommand::About,
                MenuCommand::Display(MessageKind::Error),
                MenuCommand::Display(MessageKind::Warning),
                MenuCommand::Display(MessageKind::Info),
                MenuCommand::Display(MessageKind::None),
                MenuCommand::Exit,
            ]
        );
    }
}
