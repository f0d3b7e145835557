//! Tray state management.
//!
//! This module contains the state owned by the loop thread and the logic that
//! applies a [`Command`] to it.

use crate::error::Result;
use crate::menu::{Menu, MenuId, Upserted};
use crate::tray::command::Command;
use tracing::debug;

/// What part of the native UI has to be refreshed after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Push the new icon bytes.
    Icon,
    /// Push the new title.
    Title,
    /// Push the new tooltip.
    Tooltip,
    /// Re-render the whole menu.
    Menu,
    /// Stop the loop; nothing to refresh.
    Quit,
}

/// State of the tray icon.
///
/// Owned by the loop thread from the moment the loop starts; other threads
/// only ever reach it through commands.
#[derive(Debug, Default)]
pub struct TrayState {
    /// Opaque icon image bytes.
    pub icon: Vec<u8>,
    /// The title text of the tray icon.
    pub title: String,
    /// Tooltip of the tray icon.
    pub tooltip: String,
    /// Menu structure containing all entries.
    pub menu: Menu,
    /// Cleared once `Quit` has been applied.
    pub running: bool,
}

impl TrayState {
    /// Creates the state of a freshly started loop.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    /// Applies one command. Menu errors leave the state untouched.
    pub fn apply(&mut self, command: Command) -> Result<Effect> {
        match command {
            Command::SetIcon(bytes) => {
                self.icon = bytes;
                Ok(Effect::Icon)
            }
            Command::SetTitle(title) => {
                self.title = title;
                Ok(Effect::Title)
            }
            Command::SetTooltip(tooltip) => {
                self.tooltip = tooltip;
                Ok(Effect::Tooltip)
            }
            Command::UpsertItem {
                id,
                title,
                tooltip,
                disabled,
                checked,
            } => {
                let outcome = self
                    .menu
                    .upsert_item(id, &title, &tooltip, disabled, checked)?;
                log_upsert(id, outcome);
                Ok(Effect::Menu)
            }
            Command::UpsertSubmenu { id, title, tooltip } => {
                let outcome = self.menu.upsert_submenu(id, &title, &tooltip)?;
                log_upsert(id, outcome);
                Ok(Effect::Menu)
            }
            Command::UpsertSubmenuItem {
                id,
                parent,
                title,
                tooltip,
                disabled,
                checked,
            } => {
                let outcome = self
                    .menu
                    .upsert_submenu_item(id, parent, &title, &tooltip, disabled, checked)?;
                log_upsert(id, outcome);
                Ok(Effect::Menu)
            }
            Command::AddSeparator { id } => {
                let outcome = self.menu.add_separator(id)?;
                log_upsert(id, outcome);
                Ok(Effect::Menu)
            }
            Command::Quit => {
                self.running = false;
                Ok(Effect::Quit)
            }
        }
    }
}

fn log_upsert(id: MenuId, outcome: Upserted) {
    debug!(id, ?outcome, "menu entry upserted");
}
