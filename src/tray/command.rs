//! Commands and the channel that carries them to the loop thread.
//!
//! Client threads never touch the tray state. They submit [`Command`] values,
//! which the loop thread applies in submission order.

use crate::error::{Result, TrayError};
use crate::menu::MenuId;
use crate::tray::event::{NativeEvent, Registration};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::trace;

/// A mutation of the tray, carrying its parameters by value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replace the tray icon with opaque image bytes.
    SetIcon(Vec<u8>),
    /// Replace the text shown next to the tray icon.
    SetTitle(String),
    /// Replace the tooltip shown when hovering the tray icon.
    SetTooltip(String),
    /// Insert or update a top-level item.
    UpsertItem {
        id: MenuId,
        title: String,
        tooltip: String,
        disabled: bool,
        checked: bool,
    },
    /// Insert or update a top-level submenu.
    UpsertSubmenu {
        id: MenuId,
        title: String,
        tooltip: String,
    },
    /// Insert or update an item inside a submenu.
    UpsertSubmenuItem {
        id: MenuId,
        parent: MenuId,
        title: String,
        tooltip: String,
        disabled: bool,
        checked: bool,
    },
    /// Append a separator.
    AddSeparator { id: MenuId },
    /// Stop the loop.
    Quit,
}

impl Command {
    /// Whether `next` makes this command redundant when it directly follows it.
    fn superseded_by(&self, next: &Command) -> bool {
        matches!(
            (self, next),
            (Command::SetIcon(_), Command::SetIcon(_))
                | (Command::SetTitle(_), Command::SetTitle(_))
                | (Command::SetTooltip(_), Command::SetTooltip(_))
        )
    }
}

/// Everything the loop thread consumes, in arrival order.
#[derive(Debug)]
pub(crate) enum LoopMessage {
    Command(Command),
    Native(NativeEvent),
    Register(Registration),
}

/// Drops a `SetIcon`, `SetTitle` or `SetTooltip` that is immediately followed
/// by another command of the same variant. The final state is unchanged.
pub(crate) fn coalesce(batch: Vec<LoopMessage>) -> Vec<LoopMessage> {
    let mut out: Vec<LoopMessage> = Vec::with_capacity(batch.len());
    for message in batch {
        let redundant = match (out.last(), &message) {
            (Some(LoopMessage::Command(prev)), LoopMessage::Command(next)) => {
                prev.superseded_by(next)
            }
            _ => false,
        };
        if redundant {
            trace!("coalesced consecutive command");
            out.pop();
        }
        out.push(message);
    }
    out
}

/// Sending half of the loop's queue.
///
/// Cloneable and safe to use from any thread. The queue is unbounded and
/// buffers commands until the loop starts draining it.
#[derive(Clone, Debug)]
pub struct CommandChannel {
    sender: Sender<LoopMessage>,
    stopped: Arc<AtomicBool>,
}

impl CommandChannel {
    /// Creates a channel and the receiving half owned by the loop.
    pub(crate) fn new() -> (Self, Receiver<LoopMessage>, Arc<AtomicBool>) {
        let (sender, receiver) = channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let channel = Self {
            sender,
            stopped: stopped.clone(),
        };
        (channel, receiver, stopped)
    }

    /// Queues a command for the loop thread.
    ///
    /// Never blocks. Fails with [`TrayError::LoopStopped`] once the loop has
    /// processed `Quit` or exited.
    pub fn submit(&self, command: Command) -> Result<()> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(TrayError::LoopStopped);
        }
        self.sender
            .send(LoopMessage::Command(command))
            .map_err(|_| TrayError::LoopStopped)
    }

    /// Queues a handler or click subscription, installed by the loop thread
    /// after everything submitted before it.
    pub(crate) fn register(&self, registration: Registration) -> Result<()> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(TrayError::LoopStopped);
        }
        self.sender
            .send(LoopMessage::Register(registration))
            .map_err(|_| TrayError::LoopStopped)
    }

    /// Whether the loop has stopped accepting commands.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub(crate) fn sender(&self) -> Sender<LoopMessage> {
        self.sender.clone()
    }
}
