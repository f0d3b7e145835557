//! # systray-ksni
//!
//! A system tray core that owns the native tray event loop, keeps a mutable
//! tree of menu entries, and delivers native UI events (icon ready, menu item
//! clicked, menu opened) to host callbacks. The native side is provided by
//! [ksni](https://crates.io/crates/ksni) (StatusNotifierItem/AppIndicator), and
//! a Godot 4 `TrayIcon` node is included as a ready-made host.
//!
//! ## Threading model
//!
//! Exactly one thread runs [`TrayDriver::run`], which blocks until the tray is
//! told to quit. That thread is the only one that ever touches the tray state.
//! Every other thread holds a [`TrayHandle`] and submits commands, which are
//! applied on the loop thread in submission order. Handlers can be registered
//! on the driver before it starts or through any handle at any time; handle
//! registrations are queued like commands. Menu errors (unknown parent
//! submenu, id reused with another kind) are logged by the loop and the
//! offending command is dropped; only a failure to bring up the native tray is
//! reported, by [`TrayDriver::start`] or [`TrayDriver::run`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use systray_ksni::{TrayConfig, TrayDriver};
//!
//! # fn main() -> systray_ksni::Result<()> {
//! systray_ksni::logging::init();
//!
//! let (mut driver, tray) = TrayDriver::from_config(&TrayConfig::new("my_app"))?;
//!
//! tray.set_title("My Application")?;
//! tray.upsert_submenu(1, "File", "")?;
//! tray.upsert_submenu_item(10, 1, "Open", "", false, false)?;
//! tray.add_separator(2)?;
//! tray.upsert_item(3, "Quit", "Exit the application", false, false)?;
//!
//! let quit = tray.clone();
//! driver.on_menu_item_selected(move |id| {
//!     if id == 3 {
//!         let _ = quit.quit();
//!     }
//! });
//!
//! driver.run()
//! # }
//! ```
//!
//! ## Godot
//!
//! Built with the default `gdextension` feature the library is a standalone
//! GDExtension exposing the `TrayIcon` node:
//!
//! ```gdscript
//! extends Node
//!
//! var tray_icon: TrayIcon
//!
//! func _ready():
//!     tray_icon = TrayIcon.new()
//!     add_child(tray_icon)
//!
//!     tray_icon.set_tray_id("my_app")
//!     tray_icon.set_title("My Application")
//!     tray_icon.upsert_item(1, "Quit", "", false, false)
//!
//!     tray_icon.menu_item_selected.connect(_on_menu_item_selected)
//!     tray_icon.spawn_tray()
//!
//! func _on_menu_item_selected(id: int):
//!     if id == 1:
//!         get_tree().quit()
//! ```
//!
//! When embedding in another Rust GDExtension, depend on this crate with
//! `--no-default-features` to avoid a duplicate `gdext_rust_init` symbol.

// Module declarations
pub mod build_info;
pub mod config;
pub mod error;
pub mod godot;
pub mod logging;
pub mod menu;
pub mod settings;
pub mod tray;

// Public re-exports
pub use config::TrayConfig;
pub use error::{Result, TrayError};
pub use godot::TrayIcon;
pub use menu::{EntryKind, Menu, MenuEntry, MenuId};
pub use settings::{MemorySettingsStore, SettingsStore, TomlSettingsStore};
pub use tray::{
    Command, EventSink, KsniBackend, MenuItemHandle, NativeBackend, NativeEvent, RunningTray,
    TrayDriver, TrayEvent, TrayHandle,
};

// Conditional GDExtension entry point
#[cfg(feature = "gdextension")]
mod gdextension {
    use godot::prelude::*;

    struct SystrayKsniExtension;

    #[gdextension]
    unsafe impl ExtensionLibrary for SystrayKsniExtension {}
}
