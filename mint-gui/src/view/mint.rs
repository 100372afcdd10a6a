//! Mint screen — connect, mint, and the list of minted assets.

use egui::Ui;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::events::UiEvent;
use crate::state::AppState;

/// The main call-to-action button for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Connect,
    Mint { enabled: bool, label: &'static str },
}

pub fn primary_action(state: &AppState) -> PrimaryAction {
    if !state.is_connected() {
        return PrimaryAction::Connect;
    }
    if state.mint_in_flight {
        PrimaryAction::Mint {
            enabled: false,
            label: "Minting...",
        }
    } else {
        PrimaryAction::Mint {
            enabled: true,
            label: "Mint NFT",
        }
    }
}

/// Render the mint screen.
pub fn show(ui: &mut Ui, state: &AppState, config: &Config, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.vertical_centered(|ui| {
        ui.add_space(30.0);
        ui.heading(egui::RichText::new("My NFT Collection").size(36.0).strong());
        ui.label(
            egui::RichText::new("Each unique. Each beautiful. Discover your NFT today.")
                .size(18.0)
                .color(egui::Color32::GRAY),
        );
        ui.add_space(20.0);

        let button_size = egui::vec2(220.0, 44.0);
        match primary_action(state) {
            PrimaryAction::Connect => {
                let button = egui::Button::new(egui::RichText::new("Connect to Wallet").size(16.0))
                    .min_size(button_size);
                if ui.add(button).clicked() {
                    let _ = ui_tx.send(UiEvent::Connect);
                }
                if !state.provider_available {
                    ui.label(
                        egui::RichText::new("No wallet provider detected")
                            .color(egui::Color32::YELLOW)
                            .italics(),
                    );
                }
            }
            PrimaryAction::Mint { enabled, label } => {
                let button =
                    egui::Button::new(egui::RichText::new(label).size(16.0)).min_size(button_size);
                if ui.add_enabled(enabled, button).clicked() {
                    let _ = ui_tx.send(UiEvent::Mint);
                }
                ui.label(
                    egui::RichText::new(format!("Connected: {}", state.active_account))
                        .monospace()
                        .color(egui::Color32::GRAY),
                );
            }
        }

        ui.add_space(15.0);
        ui.hyperlink_to("🌊 View Collection on OpenSea", &config.collection_url);

        if let Some(ref warning) = state.warning {
            ui.add_space(10.0);
            ui.colored_label(egui::Color32::YELLOW, format!("⚠ {}", warning));
        }
        if let Some(ref status) = state.status {
            ui.add_space(10.0);
            ui.label(status.as_str());
        }
        if let Some(ref tx_url) = state.last_tx_url {
            ui.hyperlink_to("See transaction", tx_url);
        }

        ui.add_space(20.0);
        ui.separator();
        ui.add_space(10.0);

        if state.minted_links.is_empty() {
            ui.label(
                egui::RichText::new("No NFTs minted yet")
                    .color(egui::Color32::GRAY)
                    .italics(),
            );
        } else {
            egui::ScrollArea::vertical()
                .max_height(300.0)
                .show(ui, |ui| {
                    ui.set_max_width(500.0);
                    for link in &state.minted_links {
                        ui.group(|ui| {
                            ui.hyperlink_to(
                                egui::RichText::new(link.as_str())
                                    .color(egui::Color32::from_rgb(3, 169, 244)),
                                link,
                            );
                        });
                    }
                });
        }

        ui.add_space(20.0);
        ui.hyperlink_to(format!("built on @{}", config.social_handle), config.social_url());
    });
}
