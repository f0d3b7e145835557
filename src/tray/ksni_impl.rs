//! KSNI tray bridge implementation.
//!
//! This module provides the native backend built on the ksni library. The loop
//! thread pushes value snapshots into a [`KsniTray`] through its handle; ksni
//! renders them over D-Bus and reports activations back through the
//! [`EventSink`].

use crate::config::TrayConfig;
use crate::error::{Result, TrayError};
use crate::menu::{EntryKind, MenuEntry};
use crate::tray::backend::NativeBackend;
use crate::tray::event::EventSink;
use crate::tray::icon::{IconCache, theme_loadable};
use ksni::blocking::{Handle, TrayMethods};
use ksni::menu::{CheckmarkItem, MenuItem, StandardItem, SubMenu};
use tracing::{debug, info, warn};

/// Implementation of the ksni::Tray trait over a snapshot of the tray state.
pub struct KsniTray {
    /// Unique identifier for this tray icon.
    pub tray_id: String,
    /// The title text of the tray icon.
    pub title: String,
    /// Tooltip title shown when hovering the icon.
    pub tooltip: String,
    /// Icon name, either themed or a file stem inside `icon_theme_path`.
    pub icon_name: String,
    /// Path to search for the icon.
    pub icon_theme_path: String,
    /// Snapshot of the menu tree.
    pub menu: Vec<MenuEntry>,
    events: EventSink,
}

impl KsniTray {
    fn new(config: &TrayConfig, events: EventSink) -> Self {
        Self {
            tray_id: config.tray_id.clone(),
            title: String::new(),
            tooltip: String::new(),
            icon_name: config.fallback_icon_name.clone(),
            icon_theme_path: String::new(),
            menu: Vec::new(),
            events,
        }
    }

    /// Converts a single MenuEntry into a ksni MenuItem.
    fn build_menu_item(&self, entry: &MenuEntry) -> MenuItem<KsniTray> {
        match entry.kind {
            EntryKind::Separator => MenuItem::Separator,
            EntryKind::Submenu => SubMenu {
                label: entry.title.clone(),
                enabled: !entry.disabled,
                submenu: entry
                    .children
                    .iter()
                    .map(|child| self.build_menu_item(child))
                    .collect(),
                ..Default::default()
            }
            .into(),
            EntryKind::Item if entry.checked => {
                let id = entry.id;
                let events = self.events.clone();
                CheckmarkItem {
                    label: entry.title.clone(),
                    enabled: !entry.disabled,
                    checked: true,
                    activate: Box::new(move |_this: &mut KsniTray| {
                        events.item_selected(id);
                    }),
                    ..Default::default()
                }
                .into()
            }
            EntryKind::Item => {
                let id = entry.id;
                let events = self.events.clone();
                StandardItem {
                    label: entry.title.clone(),
                    enabled: !entry.disabled,
                    activate: Box::new(move |_this: &mut KsniTray| {
                        events.item_selected(id);
                    }),
                    ..Default::default()
                }
                .into()
            }
        }
    }
}

impl ksni::Tray for KsniTray {
    fn id(&self) -> String {
        self.tray_id.clone()
    }

    fn icon_name(&self) -> String {
        self.icon_name.clone()
    }

    fn icon_theme_path(&self) -> String {
        self.icon_theme_path.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: vec![],
            title: self.tooltip.clone(),
            description: String::new(),
        }
    }

    fn activate(&mut self, _x: i32, _y: i32) {
        self.events.menu_opened();
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        self.menu
            .iter()
            .map(|entry| self.build_menu_item(entry))
            .collect()
    }
}

/// Native backend that publishes the tray as a StatusNotifierItem.
pub struct KsniBackend {
    config: TrayConfig,
    icons: IconCache,
    handle: Option<Handle<KsniTray>>,
}

impl KsniBackend {
    /// Creates an unspawned backend; the icon cache lives in
    /// [`TrayConfig::icon_cache_dir`].
    pub fn new(config: TrayConfig) -> Self {
        let icons = IconCache::new(config.icon_cache_dir());
        Self {
            config,
            icons,
            handle: None,
        }
    }

    /// Resolves icon bytes to the `(icon_theme_path, icon_name)` pair shown
    /// by the host. Empty and ICO bytes use the fallback themed icon.
    fn icon_location(&self, bytes: &[u8]) -> Result<(String, String)> {
        if bytes.is_empty() {
            return Ok((String::new(), self.config.fallback_icon_name.clone()));
        }
        if !theme_loadable(bytes) {
            warn!("ICO icons cannot be loaded by SNI hosts, using fallback icon");
            return Ok((String::new(), self.config.fallback_icon_name.clone()));
        }

        let icon = self.icons.store(bytes)?;
        Ok((icon.theme_path.to_string_lossy().into_owned(), icon.name))
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut KsniTray) + Send + 'static,
    {
        match &self.handle {
            Some(handle) => {
                if handle.update(f).is_none() {
                    warn!("ksni tray service is gone, update dropped");
                }
            }
            None => debug!("ksni tray not spawned, update dropped"),
        }
    }
}

impl NativeBackend for KsniBackend {
    fn start(&mut self, events: EventSink) -> Result<()> {
        if self.handle.is_some() {
            return Err(TrayError::FatalInit("ksni tray already spawned".to_string()));
        }

        let tray = KsniTray::new(&self.config, events);
        let handle = tray
            .spawn()
            .map_err(|e| TrayError::FatalInit(format!("failed to spawn ksni tray: {e}")))?;
        info!(tray_id = %self.config.tray_id, "ksni tray spawned");
        self.handle = Some(handle);
        Ok(())
    }

    fn set_icon(&mut self, bytes: &[u8]) -> Result<()> {
        let (theme_path, name) = self.icon_location(bytes)?;
        self.update(move |tray| {
            tray.icon_theme_path = theme_path;
            tray.icon_name = name;
        });
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        let title = title.to_string();
        self.update(move |tray| tray.title = title);
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        let tooltip = tooltip.to_string();
        self.update(move |tray| tray.tooltip = tooltip);
    }

    fn update_menu(&mut self, menu: &[MenuEntry]) {
        let menu = menu.to_vec();
        self.update(move |tray| tray.menu = menu);
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown().wait();
            info!("ksni tray shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tray::command::LoopMessage;
    use crate::tray::event::NativeEvent;
    use ksni::Tray;
    use std::sync::mpsc::{Receiver, channel};

    fn tray(menu: Vec<MenuEntry>) -> (KsniTray, Receiver<LoopMessage>) {
        let (tx, rx) = channel();
        let mut tray = KsniTray::new(&TrayConfig::new("test_tray"), EventSink::new(tx));
        tray.menu = menu;
        (tray, rx)
    }

    fn next_event(rx: &Receiver<LoopMessage>) -> Option<NativeEvent> {
        match rx.try_recv() {
            Ok(LoopMessage::Native(event)) => Some(event),
            _ => None,
        }
    }

    #[test]
    fn items_render_with_their_state() {
        let (tray, _rx) = tray(vec![
            MenuEntry::item(1, "Greyed", "", true, false),
            MenuEntry::item(2, "Mute", "", false, true),
            MenuEntry::separator(3),
        ]);

        let items = tray.menu();
        assert_eq!(items.len(), 3);
        match &items[0] {
            MenuItem::Standard(item) => {
                assert_eq!(item.label, "Greyed");
                assert!(!item.enabled);
            }
            _ => panic!("disabled entry should render as a standard item"),
        }
        match &items[1] {
            MenuItem::Checkmark(item) => {
                assert_eq!(item.label, "Mute");
                assert!(item.enabled);
                assert!(item.checked);
            }
            _ => panic!("checked entry should render as a checkmark item"),
        }
        assert!(matches!(items[2], MenuItem::Separator));
    }

    #[test]
    fn submenus_render_their_children() {
        let mut file = MenuEntry::submenu(1, "File", "");
        file.children.push(MenuEntry::item(10, "Open", "", false, false));
        file.children.push(MenuEntry::separator(11));
        let (tray, _rx) = tray(vec![file]);

        let items = tray.menu();
        let MenuItem::SubMenu(submenu) = &items[0] else {
            panic!("submenu entry should render as a submenu");
        };
        assert_eq!(submenu.label, "File");
        assert!(submenu.enabled);
        assert_eq!(submenu.submenu.len(), 2);
        assert!(matches!(submenu.submenu[0], MenuItem::Standard(_)));
        assert!(matches!(submenu.submenu[1], MenuItem::Separator));
    }

    #[test]
    fn activation_reports_native_events() {
        let (mut tray, rx) = tray(vec![
            MenuEntry::item(1, "Hello", "", false, false),
            MenuEntry::item(2, "Mute", "", false, true),
        ]);

        let items = tray.menu();
        for item in &items {
            match item {
                MenuItem::Standard(item) => (item.activate)(&mut tray),
                MenuItem::Checkmark(item) => (item.activate)(&mut tray),
                _ => {}
            }
        }
        tray.activate(0, 0);

        assert_eq!(next_event(&rx), Some(NativeEvent::ItemSelected(1)));
        assert_eq!(next_event(&rx), Some(NativeEvent::ItemSelected(2)));
        assert_eq!(next_event(&rx), Some(NativeEvent::MenuOpened));
        assert_eq!(next_event(&rx), None);
    }

    #[test]
    fn icon_bytes_resolve_to_a_theme_location() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrayConfig {
            icon_cache_dir: Some(dir.path().join("icons")),
            ..TrayConfig::new("test_tray")
        };
        let backend = KsniBackend::new(config.clone());

        let fallback = (String::new(), config.fallback_icon_name.clone());
        assert_eq!(backend.icon_location(&[]).unwrap(), fallback);
        assert_eq!(
            backend.icon_location(b"\x00\x00\x01\x00\x01\x00").unwrap(),
            fallback
        );

        let (theme_path, name) = backend
            .icon_location(b"\x89PNG\r\n\x1a\nicon")
            .unwrap();
        assert_eq!(theme_path, dir.path().join("icons").to_string_lossy());
        assert!(dir.path().join("icons").join(format!("{name}.png")).exists());
    }
}
