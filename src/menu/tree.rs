//! The menu tree.
//!
//! Holds the ordered top-level entries and implements insert-or-update keyed by
//! id. Ids are unique across the whole tree, so any id can be resolved without
//! knowing which submenu it lives in.

use crate::error::{Result, TrayError};
use crate::menu::item::{EntryKind, MenuEntry, MenuId};

/// Outcome of a successful upsert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upserted {
    /// The id was new and the entry was appended.
    Inserted,
    /// The id existed and its fields were replaced in place.
    Updated,
}

/// Ordered hierarchy of menu entries shown by the tray icon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    /// Creates an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// The top-level entries, in display order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Whether the menu has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in the whole tree, submenu children included.
    pub fn entry_count(&self) -> usize {
        fn count(items: &[MenuEntry]) -> usize {
            items.iter().map(|entry| 1 + count(&entry.children)).sum()
        }
        count(&self.entries)
    }

    /// Looks up an entry anywhere in the tree.
    pub fn find(&self, id: MenuId) -> Result<&MenuEntry> {
        Self::find_recursive(&self.entries, id).ok_or(TrayError::NotFound(id))
    }

    /// Inserts a top-level item, or updates the item with this id in place.
    pub fn upsert_item(
        &mut self,
        id: MenuId,
        title: &str,
        tooltip: &str,
        disabled: bool,
        checked: bool,
    ) -> Result<Upserted> {
        match Self::find_mut_recursive(&mut self.entries, id) {
            Some(entry) => {
                ensure_kind(entry, EntryKind::Item)?;
                update_fields(entry, title, tooltip, disabled, checked);
                Ok(Upserted::Updated)
            }
            None => {
                self.entries
                    .push(MenuEntry::item(id, title, tooltip, disabled, checked));
                Ok(Upserted::Inserted)
            }
        }
    }

    /// Inserts an empty top-level submenu, or renames the submenu with this id.
    pub fn upsert_submenu(&mut self, id: MenuId, title: &str, tooltip: &str) -> Result<Upserted> {
        match Self::find_mut_recursive(&mut self.entries, id) {
            Some(entry) => {
                ensure_kind(entry, EntryKind::Submenu)?;
                entry.title = title.to_string();
                entry.tooltip = tooltip.to_string();
                Ok(Upserted::Updated)
            }
            None => {
                self.entries.push(MenuEntry::submenu(id, title, tooltip));
                Ok(Upserted::Inserted)
            }
        }
    }

    /// Inserts an item at the end of a submenu, or updates it in place.
    ///
    /// Fails with [`TrayError::NoSuchParent`] when `parent` is not a submenu and
    /// with [`TrayError::ParentMismatch`] when `id` already lives elsewhere. The
    /// tree is left untouched on error.
    pub fn upsert_submenu_item(
        &mut self,
        id: MenuId,
        parent: MenuId,
        title: &str,
        tooltip: &str,
        disabled: bool,
        checked: bool,
    ) -> Result<Upserted> {
        match Self::find_recursive(&self.entries, parent) {
            Some(entry) if entry.kind == EntryKind::Submenu => {}
            _ => return Err(TrayError::NoSuchParent(parent)),
        }

        if let Some(current) = Self::locate_recursive(&self.entries, None, id) {
            if current != Some(parent) {
                return Err(TrayError::ParentMismatch {
                    id,
                    current,
                    requested: parent,
                });
            }
            let entry =
                Self::find_mut_recursive(&mut self.entries, id).ok_or(TrayError::NotFound(id))?;
            ensure_kind(entry, EntryKind::Item)?;
            update_fields(entry, title, tooltip, disabled, checked);
            return Ok(Upserted::Updated);
        }

        let submenu = Self::find_mut_recursive(&mut self.entries, parent)
            .ok_or(TrayError::NoSuchParent(parent))?;
        submenu
            .children
            .push(MenuEntry::item(id, title, tooltip, disabled, checked));
        Ok(Upserted::Inserted)
    }

    /// Appends a top-level separator. Repeating it for the same id is a no-op.
    pub fn add_separator(&mut self, id: MenuId) -> Result<Upserted> {
        match Self::find_recursive(&self.entries, id) {
            Some(entry) => {
                ensure_kind(entry, EntryKind::Separator)?;
                Ok(Upserted::Updated)
            }
            None => {
                self.entries.push(MenuEntry::separator(id));
                Ok(Upserted::Inserted)
            }
        }
    }

    /// Recursively searches through menu entries for an id.
    fn find_recursive(items: &[MenuEntry], id: MenuId) -> Option<&MenuEntry> {
        for entry in items {
            if entry.id == id {
                return Some(entry);
            }
            if let Some(found) = Self::find_recursive(&entry.children, id) {
                return Some(found);
            }
        }
        None
    }

    fn find_mut_recursive(items: &mut [MenuEntry], id: MenuId) -> Option<&mut MenuEntry> {
        for entry in items.iter_mut() {
            if entry.id == id {
                return Some(entry);
            }
            if let Some(found) = Self::find_mut_recursive(&mut entry.children, id) {
                return Some(found);
            }
        }
        None
    }

    /// Returns the parent of `id` (`None` for top level) if the id exists.
    fn locate_recursive(
        items: &[MenuEntry],
        parent: Option<MenuId>,
        id: MenuId,
    ) -> Option<Option<MenuId>> {
        for entry in items {
            if entry.id == id {
                return Some(parent);
            }
            if let Some(found) = Self::locate_recursive(&entry.children, Some(entry.id), id) {
                return Some(found);
            }
        }
        None
    }
}

fn ensure_kind(entry: &MenuEntry, requested: EntryKind) -> Result<()> {
    if entry.kind == requested {
        Ok(())
    } else {
        Err(TrayError::KindConflict {
            id: entry.id,
            existing: entry.kind,
            requested,
        })
    }
}

fn update_fields(entry: &mut MenuEntry, title: &str, tooltip: &str, disabled: bool, checked: bool) {
    entry.title = title.to_string();
    entry.tooltip = tooltip.to_string();
    entry.disabled = disabled;
    entry.checked = checked;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn upsert_item_appends_then_updates_in_place() {
        let mut menu = Menu::new();
        assert_eq!(menu.upsert_item(1, "One", "", false, false).unwrap(), Upserted::Inserted);
        menu.upsert_item(2, "Two", "", false, false).unwrap();
        assert_eq!(
            menu.upsert_item(1, "Uno", "first", true, true).unwrap(),
            Upserted::Updated
        );

        let ids: Vec<MenuId> = menu.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let entry = menu.find(1).unwrap();
        assert_eq!(entry.title, "Uno");
        assert_eq!(entry.tooltip, "first");
        assert!(entry.disabled);
        assert!(entry.checked);
    }

    #[test]
    fn empty_titles_are_accepted() {
        let mut menu = Menu::new();
        menu.upsert_item(3, "", "", false, false).unwrap();
        assert_eq!(menu.find(3).unwrap().title, "");
    }

    #[test]
    fn submenu_item_reupsert_keeps_single_child() {
        let mut menu = Menu::new();
        menu.upsert_submenu(1, "File", "").unwrap();
        menu.upsert_submenu_item(10, 1, "Open", "", false, false).unwrap();
        menu.upsert_submenu_item(10, 1, "Open File", "", false, false)
            .unwrap();

        let file = menu.find(1).unwrap();
        assert_eq!(file.kind, EntryKind::Submenu);
        assert_eq!(file.children.len(), 1);
        assert_eq!(file.children[0].id, 10);
        assert_eq!(file.children[0].title, "Open File");
    }

    #[test]
    fn submenu_item_without_parent_leaves_tree_unchanged() {
        let mut menu = Menu::new();
        menu.upsert_item(1, "Plain", "", false, false).unwrap();
        let before = menu.clone();

        let err = menu
            .upsert_submenu_item(10, 7, "Orphan", "", false, false)
            .unwrap_err();
        assert!(matches!(err, TrayError::NoSuchParent(7)));

        // an item is not a valid parent either
        let err = menu
            .upsert_submenu_item(10, 1, "Orphan", "", false, false)
            .unwrap_err();
        assert!(matches!(err, TrayError::NoSuchParent(1)));
        assert_eq!(menu, before);
    }

    #[test]
    fn submenu_item_under_another_parent_is_rejected() {
        let mut menu = Menu::new();
        menu.upsert_submenu(1, "File", "").unwrap();
        menu.upsert_submenu(2, "Edit", "").unwrap();
        menu.upsert_submenu_item(10, 1, "Open", "", false, false).unwrap();
        menu.upsert_item(11, "Top", "", false, false).unwrap();
        let before = menu.clone();

        let err = menu
            .upsert_submenu_item(10, 2, "Open", "", false, false)
            .unwrap_err();
        assert!(matches!(
            err,
            TrayError::ParentMismatch {
                id: 10,
                current: Some(1),
                requested: 2
            }
        ));

        let err = menu
            .upsert_submenu_item(11, 2, "Top", "", false, false)
            .unwrap_err();
        assert!(matches!(err, TrayError::ParentMismatch { current: None, .. }));
        assert_eq!(menu, before);
    }

    #[test]
    fn upsert_item_updates_nested_item_without_moving_it() {
        let mut menu = Menu::new();
        menu.upsert_submenu(1, "File", "").unwrap();
        menu.upsert_submenu_item(10, 1, "Open", "", false, false).unwrap();

        menu.upsert_item(10, "Open...", "", true, false).unwrap();

        assert_eq!(menu.entries().len(), 1);
        let child = &menu.find(1).unwrap().children[0];
        assert_eq!(child.title, "Open...");
        assert!(child.disabled);
    }

    #[test]
    fn separator_kind_is_fixed() {
        let mut menu = Menu::new();
        menu.add_separator(5).unwrap();
        assert_eq!(menu.find(5).unwrap().kind, EntryKind::Separator);
        assert_eq!(menu.add_separator(5).unwrap(), Upserted::Updated);

        let err = menu.upsert_item(5, "X", "", false, false).unwrap_err();
        assert!(matches!(
            err,
            TrayError::KindConflict {
                id: 5,
                existing: EntryKind::Separator,
                requested: EntryKind::Item
            }
        ));
        assert_eq!(menu.find(5).unwrap().kind, EntryKind::Separator);
        assert_eq!(menu.entry_count(), 1);
    }

    #[test]
    fn submenu_rename_keeps_children() {
        let mut menu = Menu::new();
        menu.upsert_submenu(1, "File", "").unwrap();
        menu.upsert_submenu_item(10, 1, "Open", "", false, false).unwrap();
        menu.upsert_submenu(1, "Files", "tip").unwrap();

        let file = menu.find(1).unwrap();
        assert_eq!(file.title, "Files");
        assert_eq!(file.tooltip, "tip");
        assert_eq!(file.children.len(), 1);
    }

    #[test]
    fn find_unknown_id_is_not_found() {
        let menu = Menu::new();
        assert!(matches!(menu.find(42), Err(TrayError::NotFound(42))));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Item(MenuId, String),
        Submenu(MenuId, String),
        SubmenuItem(MenuId, String),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..8i32, "[a-z]{0,6}").prop_map(|(id, t)| Op::Item(id, t)),
            (8..12i32, "[a-z]{0,6}").prop_map(|(id, t)| Op::Submenu(id, t)),
            (12..20i32, "[a-z]{0,6}").prop_map(|(id, t)| Op::SubmenuItem(id, t)),
        ]
    }

    fn parent_of(id: MenuId) -> MenuId {
        8 + id % 4
    }

    proptest! {
        #[test]
        fn replay_converges_to_last_upsert(ops in prop::collection::vec(op(), 0..64)) {
            let mut menu = Menu::new();
            let mut expected: HashMap<MenuId, String> = HashMap::new();

            for op in &ops {
                match op {
                    Op::Item(id, title) => {
                        menu.upsert_item(*id, title, "", false, false).unwrap();
                        expected.insert(*id, title.clone());
                    }
                    Op::Submenu(id, title) => {
                        menu.upsert_submenu(*id, title, "").unwrap();
                        expected.insert(*id, title.clone());
                    }
                    Op::SubmenuItem(id, title) => {
                        let parent = parent_of(*id);
                        let result = menu.upsert_submenu_item(*id, parent, title, "", false, false);
                        if expected.contains_key(&parent) {
                            prop_assert!(result.is_ok());
                            expected.insert(*id, title.clone());
                        } else {
                            let rejected = matches!(result, Err(TrayError::NoSuchParent(p)) if p == parent);
                            prop_assert!(rejected);
                        }
                    }
                }
            }

            prop_assert_eq!(menu.entry_count(), expected.len());
            for (id, title) in &expected {
                prop_assert_eq!(&menu.find(*id).unwrap().title, title);
            }
        }
    }
}
