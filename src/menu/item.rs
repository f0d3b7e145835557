//! Menu entry data structures.
//!
//! This module defines the nodes of the tray menu tree: clickable items,
//! separators and submenus, all keyed by a caller-assigned integer id.

use std::fmt;

/// Identifier of a menu entry. Ids share one namespace across the whole tree.
pub type MenuId = i32;

/// The kind of a menu entry.
///
/// The kind of an id is fixed by its first upsert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A standard clickable menu item.
    Item,
    /// A visual separator line in the menu.
    Separator,
    /// A container for other menu entries.
    Submenu,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Item => "item",
            EntryKind::Separator => "separator",
            EntryKind::Submenu => "submenu",
        };
        f.write_str(name)
    }
}

/// A single node of the menu tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Unique identifier for the entry.
    pub id: MenuId,
    /// What sort of entry this is.
    pub kind: EntryKind,
    /// Display text for the entry.
    pub title: String,
    /// Text shown when pointing at the entry, where the platform supports it.
    pub tooltip: String,
    /// Disabled entries are grayed out and cannot be clicked.
    pub disabled: bool,
    /// Checked entries show a tick before the title.
    pub checked: bool,
    /// Child entries. Always empty unless `kind` is [`EntryKind::Submenu`].
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    /// Creates a clickable item.
    pub fn item(id: MenuId, title: &str, tooltip: &str, disabled: bool, checked: bool) -> Self {
        Self {
            id,
            kind: EntryKind::Item,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            disabled,
            checked,
            children: Vec::new(),
        }
    }

    /// Creates a separator.
    pub fn separator(id: MenuId) -> Self {
        Self {
            id,
            kind: EntryKind::Separator,
            title: String::new(),
            tooltip: String::new(),
            disabled: false,
            checked: false,
            children: Vec::new(),
        }
    }

    /// Creates an empty submenu.
    pub fn submenu(id: MenuId, title: &str, tooltip: &str) -> Self {
        Self {
            id,
            kind: EntryKind::Submenu,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            disabled: false,
            checked: false,
            children: Vec::new(),
        }
    }

    /// Whether a native click on this entry is reported to the host.
    pub fn is_clickable(&self) -> bool {
        self.kind == EntryKind::Item
    }
}
