//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `portal-core` (pure Rust).
//! Implementations live in `portal-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits,
//! so tests substitute in-memory doubles for the wallet and the chain.

use std::rc::Rc;

use async_trait::async_trait;
use portal_types::{
    Address, Result, TxHash,
    wave::{NewWave, WaveRecord},
};

// ─── Wallet Port ─────────────────────────────────────────────

/// Injected wallet provider (EIP-1193).
///
/// Absence of a provider is modelled by the caller holding `None`
/// rather than by a port method.
#[async_trait(?Send)]
pub trait WalletPort {
    /// Accounts already authorized for this origin (`eth_accounts`).
    /// Never prompts the user.
    async fn authorized_accounts(&self) -> Result<Vec<Address>>;

    /// Prompt the user to authorize an account (`eth_requestAccounts`)
    async fn request_accounts(&self) -> Result<Vec<Address>>;
}

// ─── WavePortal Contract Port ────────────────────────────────

/// Callback invoked once per observed `NewWave` event
pub type NewWaveListener = Rc<dyn Fn(NewWave)>;

/// Handle returned by [`WavePortalPort::on_new_wave`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Terminal state of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `false` when execution reverted
    pub success: bool,
}

/// The WavePortal contract at a fixed address, reached through the wallet.
#[async_trait(?Send)]
pub trait WavePortalPort {
    /// `getTotalWaves()`
    async fn total_waves(&self) -> Result<u64>;

    /// `getWave(index)`, a one-shot read against current chain state
    async fn get_wave(&self, index: u64) -> Result<WaveRecord>;

    /// Send `createWave(message)` from the wallet's signer with a gas ceiling.
    /// Resolves once the transaction is accepted, not mined.
    async fn create_wave(&self, message: &str, gas_limit: u64) -> Result<TxHash>;

    /// Wait until `tx_hash` is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt>;

    /// Register a live `NewWave` listener.
    /// Listeners are invoked in event emission order.
    fn on_new_wave(&self, listener: NewWaveListener) -> Result<ListenerId>;

    /// Release a listener. Unknown ids are ignored.
    fn off_new_wave(&self, id: ListenerId);
}
