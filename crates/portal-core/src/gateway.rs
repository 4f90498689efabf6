//! Wallet gateway: obtains an authorized account from the injected provider.

use std::cell::Cell;
use std::rc::Rc;

use portal_types::{event::PortalEvent, Address, PortalError, Result};

use crate::event_bus::EventBus;
use crate::ports::WalletPort;

pub struct WalletGateway {
    wallet: Option<Rc<dyn WalletPort>>,
    account: Cell<Option<Address>>,
    event_bus: EventBus,
}

impl WalletGateway {
    /// `wallet` is `None` when the browser has no injected provider.
    pub fn new(wallet: Option<Rc<dyn WalletPort>>, event_bus: EventBus) -> Self {
        Self {
            wallet,
            account: Cell::new(None),
            event_bus,
        }
    }

    /// The active account, if any
    pub fn account(&self) -> Option<Address> {
        self.account.get()
    }

    /// Read already-authorized accounts without prompting.
    /// Failures are logged and reported as "not connected".
    pub async fn check_connection(&self) -> Option<Address> {
        let Some(wallet) = &self.wallet else {
            log::warn!("No injected wallet provider; waiting for an explicit connect");
            return None;
        };

        match wallet.authorized_accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(&address) => {
                    log::info!("Found authorized account {}", address);
                    self.set_account(address);
                    Some(address)
                }
                None => {
                    log::info!("No authorized account found");
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read authorized accounts: {}", e);
                None
            }
        }
    }

    /// Prompt the user to authorize an account.
    pub async fn connect(&self) -> Result<Address> {
        let Some(wallet) = &self.wallet else {
            log::error!("Cannot connect: no injected wallet provider");
            self.event_bus.emit(PortalEvent::ProviderMissing);
            return Err(PortalError::ProviderMissing);
        };

        let accounts = wallet.request_accounts().await.map_err(|e| {
            log::warn!("Wallet connection declined: {}", e);
            e
        })?;

        let address = accounts.first().copied().ok_or_else(|| {
            log::warn!("Wallet returned no accounts");
            PortalError::UserRejected("no accounts returned".to_string())
        })?;

        log::info!("Connected {}", address);
        self.set_account(address);
        Ok(address)
    }

    fn set_account(&self, address: Address) {
        if self.account.replace(Some(address)) != Some(address) {
            self.event_bus.emit(PortalEvent::AccountChanged { address });
        }
    }
}
