//! Per-item handles with locally remembered fields.
//!
//! A [`MenuItemHandle`] keeps the last values it submitted, so toggling one
//! field re-submits the whole entry without the caller repeating the rest.

use crate::error::{Result, TrayError};
use crate::menu::{EntryKind, MenuId};
use crate::tray::command::Command;
use crate::tray::handle::TrayHandle;
use std::sync::mpsc::Receiver;

/// Handle to a single menu item or submenu created through [`TrayHandle`].
#[derive(Debug, Clone)]
pub struct MenuItemHandle {
    tray: TrayHandle,
    id: MenuId,
    kind: EntryKind,
    parent: Option<MenuId>,
    title: String,
    tooltip: String,
    disabled: bool,
    checked: bool,
}

impl MenuItemHandle {
    pub(crate) fn item(
        tray: TrayHandle,
        id: MenuId,
        parent: Option<MenuId>,
        title: &str,
        tooltip: &str,
    ) -> Result<Self> {
        let handle = Self {
            tray,
            id,
            kind: EntryKind::Item,
            parent,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            disabled: false,
            checked: false,
        };
        handle.update()?;
        Ok(handle)
    }

    pub(crate) fn submenu(tray: TrayHandle, id: MenuId, title: &str, tooltip: &str) -> Result<Self> {
        let handle = Self {
            tray,
            id,
            kind: EntryKind::Submenu,
            parent: None,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            disabled: false,
            checked: false,
        };
        handle.update()?;
        Ok(handle)
    }

    /// The id reported by `MenuItemSelected` when this item is clicked.
    pub fn id(&self) -> MenuId {
        self.id
    }

    /// The last title submitted for this entry.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the item was last submitted as disabled. Always `false` for
    /// a submenu.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the item was last submitted with a checkmark. Always `false`
    /// for a submenu.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Subscribes to clicks on this item.
    ///
    /// Each click delivers one `()`; while one is unread, further clicks are
    /// dropped for this receiver. A submenu is never clicked, so its receiver
    /// stays empty.
    pub fn clicked(&self) -> Result<Receiver<()>> {
        self.tray.clicked(self.id)
    }

    /// Adds an item to this submenu. Only meaningful on submenu handles;
    /// on an item the loop rejects it as `NoSuchParent`.
    pub fn add_submenu_item(&self, title: &str, tooltip: &str) -> Result<MenuItemHandle> {
        self.tray.add_submenu_item(self.id, title, tooltip)
    }

    /// Changes the displayed title and re-submits the entry.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = title.to_string();
        self.update()
    }

    /// Changes the tooltip and re-submits the entry.
    pub fn set_tooltip(&mut self, tooltip: &str) -> Result<()> {
        self.tooltip = tooltip.to_string();
        self.update()
    }

    /// Makes the item clickable again.
    ///
    /// Fails with [`TrayError::KindConflict`] on a submenu handle, which has
    /// no enabled state to set.
    pub fn enable(&mut self) -> Result<()> {
        self.ensure_item()?;
        self.disabled = false;
        self.update()
    }

    /// Greys the item out. Fails on a submenu handle like [`enable`](Self::enable).
    pub fn disable(&mut self) -> Result<()> {
        self.ensure_item()?;
        self.disabled = true;
        self.update()
    }

    /// Shows a checkmark next to the item. Fails on a submenu handle.
    pub fn check(&mut self) -> Result<()> {
        self.ensure_item()?;
        self.checked = true;
        self.update()
    }

    /// Removes the checkmark. Fails on a submenu handle.
    pub fn uncheck(&mut self) -> Result<()> {
        self.ensure_item()?;
        self.checked = false;
        self.update()
    }

    fn ensure_item(&self) -> Result<()> {
        match self.kind {
            EntryKind::Item => Ok(()),
            existing => Err(TrayError::KindConflict {
                id: self.id,
                existing,
                requested: EntryKind::Item,
            }),
        }
    }

    /// Re-submits the full entry.
    fn update(&self) -> Result<()> {
        let command = match (self.kind, self.parent) {
            (EntryKind::Submenu, _) => Command::UpsertSubmenu {
                id: self.id,
                title: self.title.clone(),
                tooltip: self.tooltip.clone(),
            },
            (_, Some(parent)) => Command::UpsertSubmenuItem {
                id: self.id,
                parent,
                title: self.title.clone(),
                tooltip: self.tooltip.clone(),
                disabled: self.disabled,
                checked: self.checked,
            },
            (_, None) => Command::UpsertItem {
                id: self.id,
                title: self.title.clone(),
                tooltip: self.tooltip.clone(),
                disabled: self.disabled,
                checked: self.checked,
            },
        };
        self.tray.submit(command)
    }
}
