//! Switch notification popup.
//!
//! A small always-on-top viewport in the bottom-right corner showing the
//! device just switched to. Hides itself after five seconds or on click.

use eframe::egui;
use std::time::{Duration, Instant};

const AUTO_HIDE_DELAY: Duration = Duration::from_secs(5);
const POPUP_SIZE: [f32; 2] = [300.0, 80.0];
const SCREEN_MARGIN: [f32; 2] = [120.0, 90.0];

/// Notification popup state.
pub struct NotificationPopup {
    message: Option<(String, Instant)>,
}

impl NotificationPopup {
    pub fn new() -> Self {
        Self { message: None }
    }

    /// Show a message, restarting the auto-hide timer.
    pub fn show_message(&mut self, text: String) {
        self.message = Some((text, Instant::now()));
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    /// Render the popup viewport if a message is active.
    pub fn show(&mut self, ctx: &egui::Context) {
        let Some((text, shown_at)) = self.message.clone() else {
            return;
        };

        if shown_at.elapsed() >= AUTO_HIDE_DELAY {
            self.message = None;
            return;
        }

        let monitor = ctx.input(|i| i.viewport().monitor_size);
        let position = match monitor {
            Some(size) => egui::pos2(
                (size.x - POPUP_SIZE[0] - SCREEN_MARGIN[0]).max(0.0),
                (size.y - POPUP_SIZE[1] - SCREEN_MARGIN[1]).max(0.0),
            ),
            None => egui::pos2(40.0, 40.0),
        };

        let mut dismissed = false;
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("switch-notification"),
            egui::ViewportBuilder::default()
                .with_title("")
                .with_decorations(false)
                .with_always_on_top()
                .with_taskbar(false)
                .with_resizable(false)
                .with_position(position)
                .with_inner_size(POPUP_SIZE),
            |ctx, _class| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical(|ui| {
                        ui.strong("🔊 Audio Toggle");
                        ui.label(&text);
                    });
                    if ui.input(|i| i.pointer.any_click()) {
                        dismissed = true;
                    }
                });
            },
        );

        if dismissed {
            self.message = None;
        } else {
            // Wake up in time to hide the popup.
            let remaining = AUTO_HIDE_DELAY.saturating_sub(shown_at.elapsed());
            ctx.request_repaint_after(remaining);
        }
    }
}

impl Default for NotificationPopup {
    fn default() -> Self {
        Self::new()
    }
}
