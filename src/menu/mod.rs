//! Menu model.
//!
//! This module defines the menu entries shown by the tray icon and the tree that
//! holds them, with idempotent insert-or-update keyed by id.

pub mod item;
pub mod tree;

pub use item::{EntryKind, MenuEntry, MenuId};
pub use tree::{Menu, Upserted};
