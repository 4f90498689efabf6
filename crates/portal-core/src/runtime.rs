//! Portal runtime: drives the page lifecycle.
//!
//! 1. On load, silently check for an authorized account
//! 2. Once an account is known, register the `NewWave` listener
//! 3. Bulk-fetch every wave; notifications received meanwhile are kept
//! 4. From then on the listener appends new waves as they are mined
//!
//! An explicit connect runs steps 2–3 for the newly authorized account.

use std::rc::Rc;

use portal_types::{config::PortalConfig, Address, PortalError, Result, TxHash};

use crate::event_bus::EventBus;
use crate::gateway::WalletGateway;
use crate::ports::{WalletPort, WavePortalPort};
use crate::sync::WaveSynchronizer;

pub struct PortalRuntime {
    pub gateway: WalletGateway,
    pub sync: WaveSynchronizer,
    pub event_bus: EventBus,
}

impl PortalRuntime {
    pub fn new(
        config: PortalConfig,
        wallet: Option<Rc<dyn WalletPort>>,
        contract: Rc<dyn WavePortalPort>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            gateway: WalletGateway::new(wallet, event_bus.clone()),
            sync: WaveSynchronizer::new(contract, config, event_bus.clone()),
            event_bus,
        }
    }

    /// Silent start-up. Returns the authorized account, if any.
    pub async fn start(&self) -> Option<Address> {
        let account = self.gateway.check_connection().await?;
        self.activate().await;
        Some(account)
    }

    /// Explicit, user-initiated connect.
    pub async fn connect(&self) -> Result<Address> {
        let account = self.gateway.connect().await?;
        self.activate().await;
        Ok(account)
    }

    /// Submit a wave from the connected account.
    pub async fn submit(&self, message: &str) -> Result<TxHash> {
        if self.gateway.account().is_none() {
            log::warn!("Submit requested before a wallet was connected");
            return Err(PortalError::NotConnected);
        }
        self.sync.submit(message).await
    }

    /// Release the live listener. Idempotent.
    pub fn shutdown(&self) {
        self.sync.unsubscribe();
    }

    async fn activate(&self) {
        if !self.sync.is_subscribed() {
            if let Err(e) = self.sync.subscribe_new() {
                log::warn!("Live updates unavailable: {}", e);
            }
        }
        // Failure is already logged and reported by the synchronizer;
        // the list simply stays as it was.
        let _ = self.sync.load().await;
    }
}
