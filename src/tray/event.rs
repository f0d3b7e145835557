//! Events emitted by the tray icon.
//!
//! A backend reports [`NativeEvent`]s through an [`EventSink`]. The loop thread
//! resolves them against the menu and hands [`TrayEvent`]s to the
//! [`Dispatcher`], which calls the handlers registered by the host.

use crate::menu::MenuId;
use crate::tray::command::LoopMessage;
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{Sender, SyncSender, TrySendError};

/// Notifications delivered to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrayEvent {
    /// The tray icon is up and the loop is about to start waiting.
    Ready,
    /// A menu item was clicked.
    MenuItemSelected(MenuId),
    /// The tray menu was opened.
    MenuOpened,
}

/// Raw events reported by a native backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeEvent {
    /// The native menu entry with this id was activated.
    ItemSelected(MenuId),
    /// The native menu was opened.
    MenuOpened,
    /// The native side is going away; the loop should stop.
    Exit,
}

/// Handle a backend uses to push native events into the loop.
///
/// Events land in the same queue as commands, so they are processed in the
/// order they occur relative to submitted commands.
#[derive(Clone)]
pub struct EventSink {
    sender: Sender<LoopMessage>,
}

impl EventSink {
    pub(crate) fn new(sender: Sender<LoopMessage>) -> Self {
        Self { sender }
    }

    /// Reports a native event. Returns `false` if the loop is gone.
    pub fn send(&self, event: NativeEvent) -> bool {
        self.sender.send(LoopMessage::Native(event)).is_ok()
    }

    /// Reports a click on the native entry with this id.
    pub fn item_selected(&self, id: MenuId) -> bool {
        self.send(NativeEvent::ItemSelected(id))
    }

    /// Reports that the native menu was opened.
    pub fn menu_opened(&self) -> bool {
        self.send(NativeEvent::MenuOpened)
    }

    /// Asks the loop to stop.
    pub fn exit(&self) -> bool {
        self.send(NativeEvent::Exit)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

type Handler = Box<dyn FnMut() + Send>;
type ItemHandler = Box<dyn FnMut(MenuId) + Send>;

/// A handler or click subscription sent from a client thread, installed by
/// the loop thread in queue order.
pub(crate) enum Registration {
    Ready(Handler),
    MenuItemSelected(ItemHandler),
    MenuOpened(Handler),
    Clicked(MenuId, SyncSender<()>),
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Ready(_) => f.write_str("Ready"),
            Registration::MenuItemSelected(_) => f.write_str("MenuItemSelected"),
            Registration::MenuOpened(_) => f.write_str("MenuOpened"),
            Registration::Clicked(id, _) => f.debug_tuple("Clicked").field(id).finish(),
        }
    }
}

/// Host-registered handlers, at most one per event kind, plus per-item click
/// subscriptions.
///
/// Handlers run synchronously on the loop thread. A slow handler stalls the
/// processing of further native events. Subscriptions never block: a click
/// is dropped for a subscriber that still has an unread one.
#[derive(Default)]
pub struct Dispatcher {
    ready: Option<Handler>,
    menu_item_selected: Option<ItemHandler>,
    menu_opened: Option<Handler>,
    clicked: HashMap<MenuId, Vec<SyncSender<()>>>,
}

impl Dispatcher {
    /// Sets the `Ready` handler, replacing any previous one.
    pub fn on_ready(&mut self, handler: impl FnMut() + Send + 'static) {
        self.ready = Some(Box::new(handler));
    }

    /// Sets the `MenuItemSelected` handler, replacing any previous one.
    pub fn on_menu_item_selected(&mut self, handler: impl FnMut(MenuId) + Send + 'static) {
        self.menu_item_selected = Some(Box::new(handler));
    }

    /// Sets the `MenuOpened` handler, replacing any previous one.
    pub fn on_menu_opened(&mut self, handler: impl FnMut() + Send + 'static) {
        self.menu_opened = Some(Box::new(handler));
    }

    /// Adds a subscriber notified on every click of the item `id`.
    pub fn subscribe_clicks(&mut self, id: MenuId, subscriber: SyncSender<()>) {
        self.clicked.entry(id).or_default().push(subscriber);
    }

    pub(crate) fn install(&mut self, registration: Registration) {
        match registration {
            Registration::Ready(handler) => self.ready = Some(handler),
            Registration::MenuItemSelected(handler) => self.menu_item_selected = Some(handler),
            Registration::MenuOpened(handler) => self.menu_opened = Some(handler),
            Registration::Clicked(id, subscriber) => self.subscribe_clicks(id, subscriber),
        }
    }

    /// Invokes the handler for `event`, if one is registered.
    pub fn dispatch(&mut self, event: TrayEvent) {
        match event {
            TrayEvent::Ready => {
                if let Some(handler) = self.ready.as_mut() {
                    handler();
                }
            }
            TrayEvent::MenuItemSelected(id) => {
                if let Some(handler) = self.menu_item_selected.as_mut() {
                    handler(id);
                }
                self.notify_clicked(id);
            }
            TrayEvent::MenuOpened => {
                if let Some(handler) = self.menu_opened.as_mut() {
                    handler();
                }
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ready", &self.ready.is_some())
            .field("menu_item_selected", &self.menu_item_selected.is_some())
            .field("menu_opened", &self.menu_opened.is_some())
            .field("clicked", &self.clicked.len())
            .finish()
    }
}

impl Dispatcher {
    fn notify_clicked(&mut self, id: MenuId) {
        let Some(subscribers) = self.clicked.get_mut(&id) else {
            return;
        };
        subscribers.retain(|subscriber| match subscriber.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        });
        if subscribers.is_empty() {
            self.clicked.remove(&id);
        }
    }
}
