//! Application struct — the eframe::App implementation.
//!
//! Thin wrapper: drains service events, renders the mint view.
//! No async, no network, no wallet logic.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{ServiceEvent, UiEvent};
use crate::state::AppState;
use crate::view;

/// The mint application.
pub struct App {
    pub state: AppState,
    pub ui_tx: mpsc::UnboundedSender<UiEvent>,
    svc_rx: mpsc::UnboundedReceiver<ServiceEvent>,
    config: Arc<Config>,
    shutdown_token: CancellationToken,
}

impl App {
    /// Create a new App, spawning the background service task.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Arc<Config>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (svc_tx, svc_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        // Spawn the single background service task
        tokio::spawn(crate::service::run(
            token.clone(),
            ui_rx,
            svc_tx,
            Arc::clone(&config),
        ));

        Self {
            state: AppState::default(),
            ui_tx,
            svc_rx,
            config,
            shutdown_token: token,
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.ui_tx.send(UiEvent::Shutdown);
        self.shutdown_token.cancel();
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Mint events arrive without user input, keep polling
        ctx.request_repaint_after(std::time::Duration::from_secs(1));

        // 1. Drain all pending service events (non-blocking)
        while let Ok(event) = self.svc_rx.try_recv() {
            self.state.apply(event);
            ctx.request_repaint();
        }

        // 2. Blocking alert
        if let Some(message) = self.state.alert.clone() {
            let mut dismissed = false;
            egui::Window::new("Wallet")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.state.dismiss_alert();
            }
        }

        // 3. Mint view
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(self.state.alert.is_none(), |ui| {
                view::mint::show(ui, &self.state, &self.config, &self.ui_tx);
            });
        });
    }
}
