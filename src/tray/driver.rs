//! The native loop driver.
//!
//! [`TrayDriver::start`] brings the backend up and [`RunningTray::run`] drains
//! the queue; [`TrayDriver::run`] does both. The running loop owns the tray
//! state and is the single consumer of the command queue: it applies
//! commands, forwards the resulting changes to the native backend, and turns
//! native events into host notifications.

use crate::config::TrayConfig;
use crate::error::{Result, TrayError};
use crate::menu::MenuId;
use crate::settings::{SettingsStore, TomlSettingsStore};
use crate::tray::backend::NativeBackend;
use crate::tray::command::{CommandChannel, LoopMessage, coalesce};
use crate::tray::event::{Dispatcher, EventSink, NativeEvent, TrayEvent};
use crate::tray::handle::TrayHandle;
use crate::tray::ksni_impl::KsniBackend;
use crate::tray::state::{Effect, TrayState};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use tracing::{debug, error, info, warn};

/// Set while a driver exists. There is one OS-level tray icon per process.
static DRIVER_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Claims the process-wide driver slot until dropped.
#[derive(Debug)]
struct InstanceGuard(());

impl InstanceGuard {
    fn acquire() -> Result<Self> {
        DRIVER_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(()))
            .map_err(|_| TrayError::AlreadyRunning)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        DRIVER_ACTIVE.store(false, Ordering::Release);
    }
}

/// Owner of the native event loop.
///
/// Construct it once, register handlers, hand out [`TrayHandle`] clones, then
/// call [`run`](Self::run) on the thread that should own the native UI.
pub struct TrayDriver {
    backend: Box<dyn NativeBackend>,
    receiver: Receiver<LoopMessage>,
    sink: EventSink,
    stopped: Arc<AtomicBool>,
    dispatcher: Dispatcher,
    _instance: InstanceGuard,
}

impl TrayDriver {
    /// Creates the driver and the first client handle.
    ///
    /// Fails with [`TrayError::AlreadyRunning`] while another driver is alive.
    /// Commands submitted through the handle before [`run`](Self::run) are
    /// buffered and applied once the loop starts.
    pub fn new(
        backend: impl NativeBackend + 'static,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<(Self, TrayHandle)> {
        let instance = InstanceGuard::acquire()?;
        let (channel, receiver, stopped) = CommandChannel::new();
        let sink = EventSink::new(channel.sender());
        let driver = Self {
            backend: Box::new(backend),
            receiver,
            sink,
            stopped,
            dispatcher: Dispatcher::default(),
            _instance: instance,
        };
        Ok((driver, TrayHandle::new(channel, settings)))
    }

    /// Creates a driver backed by ksni and a TOML settings file, as described
    /// by `config`.
    pub fn from_config(config: &TrayConfig) -> Result<(Self, TrayHandle)> {
        let settings = TomlSettingsStore::new(config.settings_path());
        Self::new(KsniBackend::new(config.clone()), Arc::new(settings))
    }

    /// Registers the handler invoked once the tray icon is up.
    pub fn on_ready(&mut self, handler: impl FnMut() + Send + 'static) {
        self.dispatcher.on_ready(handler);
    }

    /// Registers the handler invoked with the id of a clicked item.
    pub fn on_menu_item_selected(&mut self, handler: impl FnMut(MenuId) + Send + 'static) {
        self.dispatcher.on_menu_item_selected(handler);
    }

    /// Registers the handler invoked when the menu is opened.
    pub fn on_menu_opened(&mut self, handler: impl FnMut() + Send + 'static) {
        self.dispatcher.on_menu_opened(handler);
    }

    /// Starts the backend, dispatches `Ready`, then runs the loop until
    /// `Quit`, a native exit, or until every sender is gone.
    ///
    /// Returns [`TrayError::FatalInit`] without entering the loop if the
    /// backend cannot start.
    pub fn run(self) -> Result<()> {
        self.start()?.run()
    }

    /// Brings up the native tray and dispatches `Ready`, without draining the
    /// queue.
    ///
    /// Lets a host learn synchronously whether the tray came up before it
    /// hands the returned [`RunningTray`] to the loop thread. On failure the
    /// channel is stopped and [`TrayError::FatalInit`] is returned.
    pub fn start(self) -> Result<RunningTray> {
        let TrayDriver {
            mut backend,
            receiver,
            sink,
            stopped,
            mut dispatcher,
            _instance,
        } = self;

        // Handlers queued through a handle so far precede Ready. Commands
        // keep their order and are applied by `run`.
        let mut pending = Vec::new();
        for message in receiver.try_iter() {
            match message {
                LoopMessage::Register(registration) => dispatcher.install(registration),
                other => pending.push(other),
            }
        }

        info!("starting tray loop");
        if let Err(err) = backend.start(sink) {
            stopped.store(true, Ordering::Release);
            error!(%err, "native backend failed to start");
            return Err(match err {
                TrayError::FatalInit(reason) => TrayError::FatalInit(reason),
                other => TrayError::FatalInit(other.to_string()),
            });
        }

        let mut context = LoopContext {
            backend,
            dispatcher,
            state: TrayState::new(),
        };
        context.dispatcher.dispatch(TrayEvent::Ready);

        Ok(RunningTray {
            context,
            pending,
            receiver,
            stopped,
            _instance,
        })
    }
}

/// A tray whose backend is up, waiting for [`run`](Self::run) to drain the
/// queue.
///
/// Dropping it without calling `run` leaves the native backend up.
pub struct RunningTray {
    context: LoopContext,
    pending: Vec<LoopMessage>,
    receiver: Receiver<LoopMessage>,
    stopped: Arc<AtomicBool>,
    _instance: InstanceGuard,
}

impl RunningTray {
    /// Drains the queue until `Quit`, a native exit, or until every sender is
    /// gone, then shuts the backend down.
    pub fn run(self) -> Result<()> {
        let RunningTray {
            mut context,
            pending,
            receiver,
            stopped,
            _instance,
        } = self;

        let mut batch = pending;
        'outer: loop {
            let mut messages = coalesce(batch).into_iter();
            while let Some(message) = messages.next() {
                if context.process(message).is_break() {
                    stopped.store(true, Ordering::Release);
                    let dropped = messages.len() + receiver.try_iter().count();
                    if dropped > 0 {
                        debug!(dropped, "discarding messages queued behind quit");
                    }
                    break 'outer;
                }
            }

            match receiver.recv() {
                Ok(first) => {
                    batch = vec![first];
                    batch.extend(receiver.try_iter());
                }
                Err(_) => break,
            }
        }

        stopped.store(true, Ordering::Release);
        context.backend.shutdown();
        info!("tray loop stopped");
        Ok(())
    }
}

impl std::fmt::Debug for RunningTray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningTray")
            .field("dispatcher", &self.context.dispatcher)
            .field("pending", &self.pending.len())
            .field("stopped", &self.stopped.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Everything the loop thread mutates while processing messages.
struct LoopContext {
    backend: Box<dyn NativeBackend>,
    dispatcher: Dispatcher,
    state: TrayState,
}

impl LoopContext {
    fn process(&mut self, message: LoopMessage) -> ControlFlow<()> {
        match message {
            LoopMessage::Command(command) => match self.state.apply(command) {
                Ok(Effect::Icon) => {
                    if let Err(err) = self.backend.set_icon(&self.state.icon) {
                        warn!(%err, "failed to set tray icon");
                    }
                }
                Ok(Effect::Title) => self.backend.set_title(&self.state.title),
                Ok(Effect::Tooltip) => self.backend.set_tooltip(&self.state.tooltip),
                Ok(Effect::Menu) => self.backend.update_menu(self.state.menu.entries()),
                Ok(Effect::Quit) => {
                    info!("quit requested");
                    return ControlFlow::Break(());
                }
                Err(err) => warn!(%err, "ignoring tray command"),
            },
            LoopMessage::Native(NativeEvent::ItemSelected(id)) => {
                match self.state.menu.find(id) {
                    Ok(entry) if entry.is_clickable() => {
                        self.dispatcher.dispatch(TrayEvent::MenuItemSelected(id));
                    }
                    Ok(entry) => debug!(id, kind = %entry.kind, "ignoring click on non-item entry"),
                    Err(err) => debug!(%err, "dropping click"),
                }
            }
            LoopMessage::Native(NativeEvent::MenuOpened) => {
                self.dispatcher.dispatch(TrayEvent::MenuOpened);
            }
            LoopMessage::Native(NativeEvent::Exit) => {
                info!("native side requested exit");
                return ControlFlow::Break(());
            }
            LoopMessage::Register(registration) => {
                debug!(?registration, "installing handler");
                self.dispatcher.install(registration);
            }
        }
        ControlFlow::Continue(())
    }
}
