//! Tray core functionality.
//!
//! This module contains the command channel, the native loop driver, event
//! dispatching, and the bridge to the KSNI library.

pub mod backend;
pub mod command;
pub mod driver;
pub mod event;
pub mod handle;
pub mod icon;
pub mod item_handle;
pub mod ksni_impl;
pub mod state;

pub use backend::NativeBackend;
pub use command::{Command, CommandChannel};
pub use driver::{RunningTray, TrayDriver};
pub use event::{Dispatcher, EventSink, NativeEvent, TrayEvent};
pub use handle::{AUTO_ID_BASE, TrayHandle};
pub use item_handle::MenuItemHandle;
pub use ksni_impl::{KsniBackend, KsniTray};
pub use state::TrayState;
