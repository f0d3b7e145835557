//! Godot TrayIcon node implementation.
//!
//! This module contains the `TrayIcon` Godot node that drives the tray core from
//! GDScript. The native loop runs on its own thread; notifications are queued
//! and re-emitted as Godot signals from `process`.

use crate::build_info;
use crate::config::TrayConfig;
use crate::error::TrayError;
use crate::logging;
use crate::menu::MenuId;
use crate::tray::driver::TrayDriver;
use crate::tray::event::TrayEvent;
use crate::tray::handle::TrayHandle;
use godot::prelude::*;
use std::sync::mpsc::{Receiver, channel, sync_channel};
use std::thread::JoinHandle;

#[derive(GodotClass)]
#[class(base=Node)]
/// A Godot node that provides system tray icon functionality.
///
/// `TrayIcon` owns the tray loop for the process. Menu entries are addressed by
/// integer ids chosen by the script; calling an upsert again with the same id
/// updates the entry in place.
///
/// # Signals
///
/// - `tray_ready()` - Emitted once the tray icon is visible
/// - `menu_item_selected(id: int)` - Emitted when a menu item is clicked
/// - `menu_opened()` - Emitted when the tray menu is opened
///
/// # Example
///
/// ```gdscript
/// var tray = TrayIcon.new()
/// add_child(tray)
/// tray.set_tray_id("my_app")
/// tray.set_icon_from_bytes(FileAccess.get_file_as_bytes("res://icon.png"))
/// tray.upsert_item(1, "Quit", "", false, false)
/// tray.menu_item_selected.connect(func(id): if id == 1: get_tree().quit())
/// tray.spawn_tray()
/// ```
pub struct TrayIcon {
    base: Base<Node>,
    config: TrayConfig,
    driver: Option<TrayDriver>,
    handle: Option<TrayHandle>,
    loop_thread: Option<JoinHandle<Result<(), TrayError>>>,
    event_receiver: Option<Receiver<TrayEvent>>,
}

#[godot_api]
impl INode for TrayIcon {
    fn init(base: Base<Node>) -> Self {
        Self {
            base,
            config: TrayConfig::new("godot_tray_icon"),
            driver: None,
            handle: None,
            loop_thread: None,
            event_receiver: None,
        }
    }

    fn ready(&mut self) {
        self.base_mut().set_process(true);
    }

    fn process(&mut self, _delta: f64) {
        let mut events = Vec::new();
        if let Some(ref rx) = self.event_receiver {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }

        for event in events {
            match event {
                TrayEvent::Ready => {
                    self.base_mut().emit_signal("tray_ready", &[]);
                }
                TrayEvent::MenuItemSelected(id) => {
                    self.base_mut()
                        .emit_signal("menu_item_selected", &[Variant::from(id as i64)]);
                }
                TrayEvent::MenuOpened => {
                    self.base_mut().emit_signal("menu_opened", &[]);
                }
            }
        }

        if self
            .loop_thread
            .as_ref()
            .is_some_and(|thread| thread.is_finished())
        {
            self.join_loop();
        }
    }

    fn exit_tree(&mut self) {
        if let Some(handle) = &self.handle {
            let _ = handle.quit();
        }
        self.join_loop();
    }
}

#[godot_api]
impl TrayIcon {
    /// Signal emitted once the tray icon is visible.
    #[signal]
    fn tray_ready();

    /// Signal emitted when a menu item is clicked.
    ///
    /// # Parameters
    ///
    /// - `id` - The id the item was upserted with
    #[signal]
    fn menu_item_selected(id: i64);

    /// Signal emitted when the tray menu is opened.
    #[signal]
    fn menu_opened();

    /// Starts the tray loop on a background thread.
    ///
    /// Entries upserted before this call are applied as soon as the loop starts.
    /// Only one tray can run per process.
    ///
    /// # Returns
    ///
    /// Returns `true` once the tray icon is up, `false` if it was already
    /// running or the native tray could not be created. Blocks until the
    /// loop thread has tried to bring the icon up.
    #[func]
    fn spawn_tray(&mut self) -> bool {
        if self.loop_thread.is_some() {
            godot_warn!("Tray already spawned");
            return false;
        }

        logging::init();
        if self.tray_handle().is_none() {
            return false;
        }
        let Some(mut driver) = self.driver.take() else {
            godot_warn!("Tray already ran; create a new TrayIcon to start another");
            return false;
        };

        let (tx, rx) = channel();
        let ready_tx = tx.clone();
        driver.on_ready(move || {
            let _ = ready_tx.send(TrayEvent::Ready);
        });
        let selected_tx = tx.clone();
        driver.on_menu_item_selected(move |id| {
            let _ = selected_tx.send(TrayEvent::MenuItemSelected(id));
        });
        driver.on_menu_opened(move || {
            let _ = tx.send(TrayEvent::MenuOpened);
        });
        self.event_receiver = Some(rx);

        let (started_tx, started_rx) = sync_channel(1);
        let spawned = std::thread::Builder::new()
            .name("systray-loop".to_string())
            .spawn(move || match driver.start() {
                Ok(running) => {
                    let _ = started_tx.send(Ok(()));
                    running.run()
                }
                Err(e) => {
                    let _ = started_tx.send(Err(e));
                    Ok(())
                }
            });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                godot_error!("Failed to start tray thread: {}", e);
                return false;
            }
        };

        self.loop_thread = Some(thread);
        match started_rx.recv() {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                godot_error!("Failed to spawn tray: {}", e);
                self.join_loop();
                false
            }
            Err(_) => {
                // thread died before reporting; join_loop logs the panic
                self.join_loop();
                false
            }
        }
    }

    /// Stops the tray loop and removes the icon.
    #[func]
    fn quit(&mut self) -> bool {
        match &self.handle {
            Some(handle) => self.report(handle.quit()),
            None => false,
        }
    }

    /// Sets the unique identifier for this tray icon.
    ///
    /// Must be called before any other tray method.
    ///
    /// # Parameters
    ///
    /// - `tray_id` - A unique identifier string (e.g., "com.example.myapp")
    #[func]
    fn set_tray_id(&mut self, tray_id: GString) {
        if self.handle.is_some() {
            godot_warn!("set_tray_id must be called before the tray is used");
            return;
        }
        self.config.tray_id = tray_id.to_string();
    }

    /// Sets the tray icon from the raw bytes of a .png, .svg or .ico file.
    ///
    /// An empty array restores the default themed icon.
    #[func]
    fn set_icon_from_bytes(&mut self, data: PackedByteArray) -> bool {
        let bytes: Vec<u8> = data.to_vec();
        self.with_handle(|handle| handle.set_icon(bytes))
    }

    /// Sets the title text displayed next to the tray icon.
    #[func]
    fn set_title(&mut self, title: GString) -> bool {
        let title = title.to_string();
        self.with_handle(|handle| handle.set_title(&title))
    }

    /// Sets the tooltip displayed when hovering over the tray icon.
    #[func]
    fn set_tooltip(&mut self, tooltip: GString) -> bool {
        let tooltip = tooltip.to_string();
        self.with_handle(|handle| handle.set_tooltip(&tooltip))
    }

    /// Adds a top-level menu item, or updates the item with this id.
    ///
    /// # Parameters
    ///
    /// - `id` - Identifier reported by `menu_item_selected`
    /// - `title` - Text displayed in the menu
    /// - `tooltip` - Hover text, where supported
    /// - `disabled` - Whether the item is grayed out
    /// - `checked` - Whether the item shows a checkmark
    #[func]
    fn upsert_item(
        &mut self,
        id: i64,
        title: GString,
        tooltip: GString,
        disabled: bool,
        checked: bool,
    ) -> bool {
        let Some(id) = to_menu_id(id) else {
            return false;
        };
        let (title, tooltip) = (title.to_string(), tooltip.to_string());
        self.with_handle(|handle| handle.upsert_item(id, &title, &tooltip, disabled, checked))
    }

    /// Adds a visual separator line to the menu.
    #[func]
    fn add_separator(&mut self, id: i64) -> bool {
        let Some(id) = to_menu_id(id) else {
            return false;
        };
        self.with_handle(|handle| handle.add_separator(id))
    }

    /// Adds a submenu, or renames the submenu with this id.
    #[func]
    fn upsert_submenu(&mut self, id: i64, title: GString, tooltip: GString) -> bool {
        let Some(id) = to_menu_id(id) else {
            return false;
        };
        let (title, tooltip) = (title.to_string(), tooltip.to_string());
        self.with_handle(|handle| handle.upsert_submenu(id, &title, &tooltip))
    }

    /// Adds an item to a submenu, or updates the item with this id.
    ///
    /// An unknown `parent_id` is logged by the tray loop and ignored.
    #[func]
    fn upsert_submenu_item(
        &mut self,
        id: i64,
        parent_id: i64,
        title: GString,
        tooltip: GString,
        disabled: bool,
        checked: bool,
    ) -> bool {
        let (Some(id), Some(parent)) = (to_menu_id(id), to_menu_id(parent_id)) else {
            return false;
        };
        let (title, tooltip) = (title.to_string(), tooltip.to_string());
        self.with_handle(|handle| {
            handle.upsert_submenu_item(id, parent, &title, &tooltip, disabled, checked)
        })
    }

    /// Reads a persisted user setting. Returns an empty string if unset.
    #[func]
    fn get_setting(&mut self, name: GString) -> GString {
        let Some(handle) = self.tray_handle() else {
            return GString::new();
        };
        match handle.get_setting(&name.to_string()) {
            Ok(value) => GString::from(value.unwrap_or_default().as_str()),
            Err(e) => {
                godot_error!("Failed to read setting {}: {}", name, e);
                GString::new()
            }
        }
    }

    /// Persists a user setting.
    #[func]
    fn set_setting(&mut self, name: GString, value: GString) -> bool {
        let (name, value) = (name.to_string(), value.to_string());
        self.with_handle(|handle| handle.set_setting(&name, &value))
    }

    /// Returns the library version.
    #[func]
    fn get_version(&self) -> GString {
        GString::from(build_info::version())
    }

    /// Returns the git hash the library was built from.
    #[func]
    fn get_build_hash(&self) -> GString {
        GString::from(build_info::build_hash())
    }
}

impl TrayIcon {
    /// Returns the client handle, creating the driver on first use.
    fn tray_handle(&mut self) -> Option<TrayHandle> {
        if let Some(handle) = &self.handle {
            return Some(handle.clone());
        }

        match TrayDriver::from_config(&self.config) {
            Ok((driver, handle)) => {
                self.driver = Some(driver);
                self.handle = Some(handle.clone());
                Some(handle)
            }
            Err(e) => {
                godot_error!("Failed to create tray: {}", e);
                None
            }
        }
    }

    fn with_handle<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&TrayHandle) -> Result<(), TrayError>,
    {
        match self.tray_handle() {
            Some(handle) => self.report(f(&handle)),
            None => false,
        }
    }

    fn report(&self, result: Result<(), TrayError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                godot_error!("Tray call failed: {}", e);
                false
            }
        }
    }

    fn join_loop(&mut self) {
        let Some(thread) = self.loop_thread.take() else {
            return;
        };
        match thread.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => godot_error!("Tray loop failed: {}", e),
            Err(_) => godot_error!("Tray loop thread panicked"),
        }
    }
}

fn to_menu_id(id: i64) -> Option<MenuId> {
    match MenuId::try_from(id) {
        Ok(id) => Some(id),
        Err(_) => {
            godot_error!("Menu id {} does not fit in 32 bits", id);
            None
        }
    }
}
