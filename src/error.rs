//! Error types for the tray core.

use crate::menu::{EntryKind, MenuId};

/// Errors produced by the tray core.
///
/// Only [`TrayError::FatalInit`] and [`TrayError::AlreadyRunning`] ever reach the
/// caller that starts the loop. Menu errors raised while applying a command are
/// logged on the loop thread and the command is dropped.
#[derive(Debug, thiserror::Error)]
pub enum TrayError {
    /// The native backend could not be brought up.
    #[error("native backend failed to initialize: {0}")]
    FatalInit(String),

    /// Another driver instance is alive in this process.
    #[error("a tray driver is already running in this process")]
    AlreadyRunning,

    /// A submenu item referenced a parent that is not a submenu.
    #[error("no submenu with id {0}")]
    NoSuchParent(MenuId),

    /// No menu entry carries the given id.
    #[error("no menu entry with id {0}")]
    NotFound(MenuId),

    /// An id was re-upserted with a different entry kind.
    #[error("menu entry {id} is a {existing}, cannot upsert it as a {requested}")]
    KindConflict {
        id: MenuId,
        existing: EntryKind,
        requested: EntryKind,
    },

    /// A submenu item upsert targeted an id that lives under another parent.
    #[error("menu entry {id} lives under {current:?}, not submenu {requested}")]
    ParentMismatch {
        id: MenuId,
        current: Option<MenuId>,
        requested: MenuId,
    },

    /// A command was submitted after the loop stopped.
    #[error("tray loop has stopped")]
    LoopStopped,

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The settings store rejected a read or write.
    #[error("settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = TrayError> = std::result::Result<T, E>;
