//! System tray icon management.
//!
//! Manages the tray icon, its tooltip (the current default playback
//! device), and the context menu.

use std::sync::mpsc::{channel, Receiver, Sender};
use thiserror::Error;
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    Icon, TrayIcon, TrayIconBuilder, TrayIconEvent,
};

/// Events from the system tray.
#[derive(Debug, Clone)]
pub enum TrayEvent {
    /// Left-click on the tray icon (opens settings)
    LeftClick,

    /// Menu item selected
    MenuItemClicked { id: MenuItemId },
}

/// Menu item identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    Settings,
    StartWithWindows,
    Exit,
}

/// Tray service error types.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create tray icon: {0}")]
    CreateFailed(String),

    #[error("Failed to load icon resource")]
    IconLoadFailed,

    #[error("Tray icon not initialized")]
    NotInitialized,

    #[error("Failed to create menu: {0}")]
    MenuFailed(String),
}

/// System tray manager.
pub struct TrayManager {
    tray_icon: Option<TrayIcon>,
    event_sender: Sender<TrayEvent>,
    event_receiver: Receiver<TrayEvent>,
    settings_menu_id: Option<tray_icon::menu::MenuId>,
    startup_menu_id: Option<tray_icon::menu::MenuId>,
    exit_menu_id: Option<tray_icon::menu::MenuId>,
    startup_item: Option<CheckMenuItem>,
}

impl TrayManager {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            tray_icon: None,
            event_sender: sender,
            event_receiver: receiver,
            settings_menu_id: None,
            startup_menu_id: None,
            exit_menu_id: None,
            startup_item: None,
        }
    }

    /// Create and show the tray icon.
    pub fn create(&mut self, tooltip: &str, startup_checked: bool) -> Result<(), TrayError> {
        let icon = create_icon()?;

        let menu = Menu::new();

        let settings_item = MenuItem::new("Settings…", true, None);
        self.settings_menu_id = Some(settings_item.id().clone());
        menu.append(&settings_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let startup_item = CheckMenuItem::new("Start with Windows", true, startup_checked, None);
        self.startup_menu_id = Some(startup_item.id().clone());
        self.startup_item = Some(startup_item.clone());
        menu.append(&startup_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let exit_item = MenuItem::new("Exit", true, None);
        self.exit_menu_id = Some(exit_item.id().clone());
        menu.append(&exit_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(tooltip)
            .with_menu(Box::new(menu))
            .build()
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        self.tray_icon = Some(tray_icon);

        Ok(())
    }

    /// Process tray icon events. Call this from the event loop.
    pub fn process_events(&self) {
        if let Ok(event) = TrayIconEvent::receiver().try_recv() {
            if let TrayIconEvent::Click {
                button: tray_icon::MouseButton::Left,
                button_state: tray_icon::MouseButtonState::Up,
                ..
            } = event
            {
                let _ = self.event_sender.send(TrayEvent::LeftClick);
            }
        }

        if let Ok(event) = MenuEvent::receiver().try_recv() {
            let id = if Some(&event.id) == self.settings_menu_id.as_ref() {
                Some(MenuItemId::Settings)
            } else if Some(&event.id) == self.startup_menu_id.as_ref() {
                Some(MenuItemId::StartWithWindows)
            } else if Some(&event.id) == self.exit_menu_id.as_ref() {
                Some(MenuItemId::Exit)
            } else {
                None
            };
            if let Some(id) = id {
                let _ = self.event_sender.send(TrayEvent::MenuItemClicked { id });
            }
        }
    }

    /// Get the event receiver for tray events.
    pub fn events(&self) -> &Receiver<TrayEvent> {
        &self.event_receiver
    }

    /// Update the tooltip text (current default device).
    pub fn set_tooltip(&mut self, text: &str) -> Result<(), TrayError> {
        let tray = self.tray_icon.as_mut().ok_or(TrayError::NotInitialized)?;
        tray.set_tooltip(Some(text))
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;
        Ok(())
    }

    /// Update the "Start with Windows" menu item checkmark.
    pub fn set_startup_checked(&mut self, checked: bool) {
        if let Some(ref item) = self.startup_item {
            item.set_checked(checked);
        }
    }

    /// Destroy the tray icon.
    pub fn destroy(&mut self) {
        self.tray_icon = None;
    }
}

impl Default for TrayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the tray icon: a filled circle with a sound-wave notch.
fn create_icon() -> Result<Icon, TrayError> {
    const SIZE: usize = 32;
    let mut rgba = vec![0u8; SIZE * SIZE * 4];

    let center = SIZE as f32 / 2.0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let idx = (y * SIZE + x) * 4;
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist < center - 2.0 {
                rgba[idx] = 60; // R
                rgba[idx + 1] = 120; // G
                rgba[idx + 2] = 220; // B
                rgba[idx + 3] = 255; // A
            }
        }
    }

    // White speaker wedge pointing right
    for y in 10..22 {
        let half_width = (y as i32 - 16).unsigned_abs() as usize;
        for x in 8..(20 - half_width) {
            let idx = (y * SIZE + x) * 4;
            rgba[idx] = 255;
            rgba[idx + 1] = 255;
            rgba[idx + 2] = 255;
            rgba[idx + 3] = 255;
        }
    }

    Icon::from_rgba(rgba, SIZE as u32, SIZE as u32).map_err(|_| TrayError::IconLoadFailed)
}
