//! Event types for communication between UI and service task.
//!
//! These two enums are the *only* interface between the synchronous egui render
//! loop and the asynchronous service task. No shared state, no Arc, no Mutex.

// ============================================================================
// UI → Service
// ============================================================================

/// Commands sent from the UI thread to the background service task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Prompt the wallet provider for account access.
    Connect,

    /// Mint a token from the collection contract.
    Mint,

    /// Clean shutdown.
    Shutdown,
}

// ============================================================================
// Service → UI
// ============================================================================

/// Events sent from the service task back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// Result of wallet provider detection at startup.
    ProviderDetected { available: bool },

    /// An account was authorized, either found at startup or granted on request.
    AccountConnected {
        account: String,
        chain_id: Option<String>,
    },

    /// The wallet is on a different chain than the contract. Non-blocking.
    WrongNetwork { chain_id: String, expected: String },

    /// The mint event subscription changed state.
    ListenerSubscribed,
    ListenerUnsubscribed,

    /// A mint transaction is about to be submitted.
    MintStarted,

    /// The wallet broadcast the mint transaction.
    MintSubmitted { tx_hash: String },

    /// The mint transaction was mined.
    MintConfirmed { tx_url: String },

    /// The mint failed or reverted.
    MintFailed(String),

    /// The mint invocation finished, on every exit path.
    MintSettled,

    /// A mint event arrived; `link` points at the minted asset.
    NftMinted { link: String },

    /// Blocking message the user must acknowledge.
    Alert(String),
}
