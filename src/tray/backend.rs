//! The native UI backend seam.

use crate::error::Result;
use crate::menu::MenuEntry;
use crate::tray::event::EventSink;

/// A platform tray implementation driven by the loop thread.
///
/// Every method is called on the loop thread. `start` is called exactly once
/// before anything else; `shutdown` is called once after a successful start.
pub trait NativeBackend: Send {
    /// Brings up the native tray icon. An error here is fatal to the loop.
    fn start(&mut self, events: EventSink) -> Result<()>;

    /// Shows the given opaque image bytes as the icon. Empty bytes clear it.
    fn set_icon(&mut self, bytes: &[u8]) -> Result<()>;

    /// Shows `title` next to the icon, where the host supports it.
    fn set_title(&mut self, title: &str);

    /// Shows `tooltip` when hovering the icon.
    fn set_tooltip(&mut self, tooltip: &str);

    /// Re-renders the native menu from a snapshot of the whole tree.
    fn update_menu(&mut self, menu: &[MenuEntry]);

    /// Tears the native tray icon down.
    fn shutdown(&mut self);
}
