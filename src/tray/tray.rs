// src/tray/tray.rs
//! Backend-independent tray: icon state, menu dispatch and the UI loop.
//!
//! The tray only consumes published outcomes; it never probes anything
//! itself. Drawing is delegated to a [`Renderer`].

use super::menu::{MenuCommand, MenuEntry, MessageKind};
use crate::config::TrayConfig;
use crate::health::ProbeOutcome;
use std::io::{self, BufRead, Write};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    On,
    Off,
}

impl From<ProbeOutcome> for IconState {
    fn from(outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Up => IconState::On,
            ProbeOutcome::Down => IconState::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    ShowDialog(String),
    Notify {
        title: String,
        message: String,
        kind: MessageKind,
    },
    Exit,
}

/// Why [`Tray::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayExit {
    ExitRequested,
    InputClosed,
}

pub trait Renderer {
    fn set_icon(&mut self, icon: IconState, tooltip: &str) -> io::Result<()>;
    fn show_dialog(&mut self, message: &str) -> io::Result<()>;
    fn show_notification(&mut self, title: &str, message: &str, kind: MessageKind) -> io::Result<()>;
}

/// Renders the tray as plain text lines.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn show_menu(&mut self, entries: &[MenuEntry]) -> io::Result<()> {
        debug!(entries = entries.len(), "drawing tray menu");
        writeln!(self.out, "[menu]")?;
        self.write_entries(entries, 1)?;
        self.out.flush()
    }

    fn write_entries(&mut self, entries: &[MenuEntry], depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        for entry in entries {
            match entry {
                MenuEntry::Item { label, command } => {
                    writeln!(self.out, "{}{} ({})", indent, label, command.id())?
                }
                MenuEntry::Separator => writeln!(self.out, "{}----", indent)?,
                MenuEntry::Submenu { label, items } => {
                    writeln!(self.out, "{}{}", indent, label)?;
                    self.write_entries(items, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn set_icon(&mut self, icon: IconState, tooltip: &str) -> io::Result<()> {
        let label = match icon {
            IconState::On => "on",
            IconState::Off => "off",
        };
        trace!(icon = label, "drawing icon");
        writeln!(self.out, "[icon] {} ({})", label, tooltip)?;
        self.out.flush()
    }

    fn show_dialog(&mut self, message: &str) -> io::Result<()> {
        trace!(text = message, "showing dialog");
        writeln!(self.out, "[dialog] {}", message)?;
        self.out.flush()
    }

    fn show_notification(&mut self, title: &str, message: &str, kind: MessageKind) -> io::Result<()> {
        trace!(%kind, title, "showing notification");
        writeln!(self.out, "[{}] {}: {}", kind, title, message)?;
        self.out.flush()
    }
}

/// Read command lines from stdin on a dedicated thread.
///
/// The thread is detached so a pending read never holds up shutdown.
pub fn stdin_commands(buffer: usize) -> io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(buffer);

    std::thread::Builder::new()
        .name("tray-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read command input: {}", e);
                        break;
                    }
                }
            }
        })?;

    Ok(rx)
}

pub struct Tray<R> {
    config: TrayConfig,
    renderer: R,
    icon: IconState,
}

impl<R: Renderer> Tray<R> {
    /// The icon starts off until the first outcome arrives.
    pub fn new(config: TrayConfig, renderer: R) -> Self {
        Self {
            config,
            renderer,
            icon: IconState::Off,
        }
    }

    pub fn icon(&self) -> IconState {
        self.icon
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn action_for(&self, command: MenuCommand) -> TrayAction {
        match command {
            MenuCommand::About => {
                TrayAction::ShowDialog("This dialog box is run from the About menu item".to_string())
            }
            MenuCommand::Main => {
                TrayAction::ShowDialog("This dialog box is run from System Tray".to_string())
            }
            MenuCommand::Display(kind) => TrayAction::Notify {
                title: self.config.title.clone(),
                message: kind.sample_message().to_string(),
                kind,
            },
            MenuCommand::Exit => TrayAction::Exit,
        }
    }

    /// Draw the current icon.
    pub fn show(&mut self) -> io::Result<()> {
        self.renderer.set_icon(self.icon, &self.config.tooltip)
    }

    /// Redraws only when the icon actually changes.
    pub fn apply_status(&mut self, outcome: ProbeOutcome) -> io::Result<()> {
        let icon = IconState::from(outcome);
        if icon == self.icon {
            trace!(%outcome, "status unchanged");
            return Ok(());
        }

        info!("Endpoint is now {}", outcome);
        self.icon = icon;
        self.renderer.set_icon(icon, &self.config.tooltip)
    }

    pub fn dispatch(&mut self, command: MenuCommand) -> io::Result<Option<TrayExit>> {
        debug!(command = command.id(), "menu command");

        match self.action_for(command) {
            TrayAction::ShowDialog(message) => self.renderer.show_dialog(&message)?,
            TrayAction::Notify {
                title,
                message,
                kind,
            } => self.renderer.show_notification(&title, &message, kind)?,
            TrayAction::Exit => {
                info!("Exit requested from tray menu");
                return Ok(Some(TrayExit::ExitRequested));
            }
        }

        Ok(None)
    }

    /// Parse and dispatch one input line. Blank lines and unknown commands
    /// are skipped.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Option<TrayExit>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        match line.parse::<MenuCommand>() {
            Ok(command) => self.dispatch(command),
            Err(e) => {
                warn!("{}", e);
                Ok(None)
            }
        }
    }

    /// UI loop: follow status updates and serve commands until exit.
    ///
    /// Once the command input closes the loop keeps following status
    /// updates; it returns `InputClosed` only when both sides are gone.
    pub async fn run(
        &mut self,
        mut status_rx: watch::Receiver<ProbeOutcome>,
        mut commands: mpsc::Receiver<String>,
    ) -> io::Result<TrayExit> {
        self.show()?;
        let mut status_open = true;
        let mut input_open = true;

        while status_open || input_open {
            tokio::select! {
                changed = status_rx.changed(), if status_open => {
                    match changed {
                        Ok(()) => {
                            let outcome = *status_rx.borrow_and_update();
                            self.apply_status(outcome)?;
                        }
                        Err(_) => {
                            debug!("Status channel closed");
                            status_open = false;
                        }
                    }
                }
                line = commands.recv(), if input_open => {
                    match line {
                        Some(line) => {
                            if let Some(exit) = self.handle_line(&line)? {
                                return Ok(exit);
                            }
                        }
                        None => {
                            debug!("Command input closed");
                            input_open = false;
                        }
                    }
                }
            }
        }

        Ok(TrayExit::InputClosed)
    }
}
