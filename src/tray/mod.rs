// src/tray/mod.rs
mod menu;
mod tray;

pub use menu::{commands, popup_menu, CommandError, MenuCommand, MenuEntry, MessageKind};
pub use tray::{stdin_commands, ConsoleRenderer, IconState, Renderer, Tray, TrayAction, TrayExit};
