//! Shared helpers for loop tests: a backend that records what the loop asks
//! of it and can inject native events on start.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use systray_ksni::{EventSink, MenuEntry, NativeBackend, NativeEvent, Result, TrayError};

/// Only one driver may exist per process, so loop tests run one at a time.
pub fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    Start,
    Icon(Vec<u8>),
    Title(String),
    Tooltip(String),
    Menu(Vec<MenuEntry>),
    Shutdown,
}

/// Shared view of everything a [`RecordingBackend`] was asked to do.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    sink: Arc<Mutex<Option<EventSink>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_menu(&self) -> Vec<MenuEntry> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                BackendCall::Menu(menu) => Some(menu),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Title(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    /// The sink handed to the backend on start.
    pub fn sink(&self) -> Option<EventSink> {
        self.sink.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct RecordingBackend {
    recorder: Recorder,
    script: Vec<NativeEvent>,
    fail_start: bool,
}

impl RecordingBackend {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
            script: Vec::new(),
            fail_start: false,
        }
    }

    /// Native events sent into the loop as soon as it starts.
    pub fn with_script(mut self, events: Vec<NativeEvent>) -> Self {
        self.script = events;
        self
    }

    pub fn failing(recorder: &Recorder) -> Self {
        Self {
            fail_start: true,
            ..Self::new(recorder)
        }
    }
}

impl NativeBackend for RecordingBackend {
    fn start(&mut self, events: EventSink) -> Result<()> {
        if self.fail_start {
            return Err(TrayError::FatalInit("no tray host available".to_string()));
        }
        self.recorder.record(BackendCall::Start);
        for event in self.script.drain(..) {
            events.send(event);
        }
        *self.recorder.sink.lock().unwrap() = Some(events);
        Ok(())
    }

    fn set_icon(&mut self, bytes: &[u8]) -> Result<()> {
        self.recorder.record(BackendCall::Icon(bytes.to_vec()));
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.recorder.record(BackendCall::Title(title.to_string()));
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.recorder.record(BackendCall::Tooltip(tooltip.to_string()));
    }

    fn update_menu(&mut self, menu: &[MenuEntry]) {
        self.recorder.record(BackendCall::Menu(menu.to_vec()));
    }

    fn shutdown(&mut self) {
        self.recorder.sink.lock().unwrap().take();
        self.recorder.record(BackendCall::Shutdown);
    }
}
