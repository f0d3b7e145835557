//! Client-side handle to a running (or not yet started) tray loop.

use crate::error::Result;
use crate::menu::MenuId;
use crate::settings::SettingsStore;
use crate::tray::command::{Command, CommandChannel};
use crate::tray::event::Registration;
use crate::tray::item_handle::MenuItemHandle;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::mpsc::{Receiver, sync_channel};

/// First id handed out by the `add_*` helpers. Caller-chosen ids below this
/// value never collide with allocated ones.
pub const AUTO_ID_BASE: MenuId = 1 << 24;

/// Cloneable handle used by client threads to mutate the tray.
///
/// Every mutation is queued and applied later on the loop thread, in
/// submission order. Mutations never report menu errors back to the caller;
/// those are logged by the loop. The only error is
/// [`TrayError::LoopStopped`](crate::TrayError::LoopStopped).
#[derive(Clone)]
pub struct TrayHandle {
    channel: CommandChannel,
    settings: Arc<dyn SettingsStore>,
    next_id: Arc<AtomicI32>,
}

impl TrayHandle {
    pub(crate) fn new(channel: CommandChannel, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            channel,
            settings,
            next_id: Arc::new(AtomicI32::new(AUTO_ID_BASE)),
        }
    }

    /// Queues a raw command.
    pub fn submit(&self, command: Command) -> Result<()> {
        self.channel.submit(command)
    }

    /// Whether the loop has stopped accepting commands.
    pub fn is_stopped(&self) -> bool {
        self.channel.is_stopped()
    }

    /// Sets the tray icon from opaque image bytes (.png, .svg or .ico content).
    pub fn set_icon(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.submit(Command::SetIcon(bytes.into()))
    }

    /// Sets the text displayed next to the tray icon.
    pub fn set_title(&self, title: &str) -> Result<()> {
        self.submit(Command::SetTitle(title.to_string()))
    }

    /// Sets the tooltip displayed when hovering the tray icon.
    pub fn set_tooltip(&self, tooltip: &str) -> Result<()> {
        self.submit(Command::SetTooltip(tooltip.to_string()))
    }

    /// Inserts or updates a menu item.
    pub fn upsert_item(
        &self,
        id: MenuId,
        title: &str,
        tooltip: &str,
        disabled: bool,
        checked: bool,
    ) -> Result<()> {
        self.submit(Command::UpsertItem {
            id,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            disabled,
            checked,
        })
    }

    /// Appends a separator.
    pub fn add_separator(&self, id: MenuId) -> Result<()> {
        self.submit(Command::AddSeparator { id })
    }

    /// Inserts or updates a submenu.
    pub fn upsert_submenu(&self, id: MenuId, title: &str, tooltip: &str) -> Result<()> {
        self.submit(Command::UpsertSubmenu {
            id,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
        })
    }

    /// Inserts or updates an item inside the submenu `parent`.
    pub fn upsert_submenu_item(
        &self,
        id: MenuId,
        parent: MenuId,
        title: &str,
        tooltip: &str,
        disabled: bool,
        checked: bool,
    ) -> Result<()> {
        self.submit(Command::UpsertSubmenuItem {
            id,
            parent,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            disabled,
            checked,
        })
    }

    /// Asks the loop to stop once it reaches this command.
    pub fn quit(&self) -> Result<()> {
        self.submit(Command::Quit)
    }

    /// Appends a separator under a freshly allocated id and returns the id.
    pub fn add_separator_auto(&self) -> Result<MenuId> {
        let id = self.allocate_id();
        self.add_separator(id)?;
        Ok(id)
    }

    /// Sets the `Ready` handler from any thread.
    ///
    /// Handlers queued before the driver starts are installed ahead of
    /// `Ready`. `Ready` is dispatched once, so a handler queued after the
    /// backend is up never fires.
    pub fn on_ready(&self, handler: impl FnMut() + Send + 'static) -> Result<()> {
        self.channel.register(Registration::Ready(Box::new(handler)))
    }

    /// Sets the handler invoked with the id of a clicked item, replacing any
    /// previous one. Clicks processed before the loop reaches this
    /// registration go to the previous handler.
    pub fn on_menu_item_selected(
        &self,
        handler: impl FnMut(MenuId) + Send + 'static,
    ) -> Result<()> {
        self.channel
            .register(Registration::MenuItemSelected(Box::new(handler)))
    }

    /// Sets the handler invoked when the menu is opened, replacing any
    /// previous one.
    pub fn on_menu_opened(&self, handler: impl FnMut() + Send + 'static) -> Result<()> {
        self.channel.register(Registration::MenuOpened(Box::new(handler)))
    }

    /// Subscribes to clicks on the item `id`.
    ///
    /// The receiver holds at most one pending click; further clicks are
    /// dropped until it is read. Dropping the receiver unsubscribes.
    pub fn clicked(&self, id: MenuId) -> Result<Receiver<()>> {
        let (tx, rx) = sync_channel(1);
        self.channel.register(Registration::Clicked(id, tx))?;
        Ok(rx)
    }

    /// Adds a menu item under a freshly allocated id.
    pub fn add_menu_item(&self, title: &str, tooltip: &str) -> Result<MenuItemHandle> {
        MenuItemHandle::item(self.clone(), self.allocate_id(), None, title, tooltip)
    }

    /// Adds a submenu under a freshly allocated id.
    ///
    /// Clicks on a submenu are never reported.
    pub fn add_submenu(&self, title: &str, tooltip: &str) -> Result<MenuItemHandle> {
        MenuItemHandle::submenu(self.clone(), self.allocate_id(), title, tooltip)
    }

    /// Adds an item to an existing submenu under a freshly allocated id.
    pub fn add_submenu_item(
        &self,
        parent: MenuId,
        title: &str,
        tooltip: &str,
    ) -> Result<MenuItemHandle> {
        MenuItemHandle::item(self.clone(), self.allocate_id(), Some(parent), title, tooltip)
    }

    /// Reads a setting from the settings store.
    pub fn get_setting(&self, name: &str) -> Result<Option<String>> {
        self.settings.get(name)
    }

    /// Writes a setting to the settings store.
    pub fn set_setting(&self, name: &str, value: &str) -> Result<()> {
        self.settings.set(name, value)
    }

    fn allocate_id(&self) -> MenuId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl fmt::Debug for TrayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrayHandle")
            .field("stopped", &self.channel.is_stopped())
            .finish_non_exhaustive()
    }
}
