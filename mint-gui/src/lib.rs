//! Desktop mint client.
//!
//! Connects to a wallet provider over JSON-RPC, mints from a deployed
//! collection contract and lists marketplace links for every mint event the
//! contract emits. The GUI lives in the binary; everything here runs without
//! a display.

pub mod config;
pub mod connection;
pub mod contract;
pub mod events;
pub mod listener;
pub mod log_stream;
pub mod mint;
pub mod provider;
pub mod service;
pub mod state;

pub use config::{Config, ConfigError};
pub use events::{ServiceEvent, UiEvent};
pub use provider::{ProviderCapability, WalletProvider};
pub use state::AppState;
