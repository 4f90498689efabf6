//! Wallet adapter over the injected provider.

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::json;

use portal_core::ports::WalletPort;
use portal_types::{Address, Result};

use crate::eip1193::InjectedProvider;

pub struct BrowserWallet {
    provider: Rc<InjectedProvider>,
}

impl BrowserWallet {
    pub fn new(provider: Rc<InjectedProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait(?Send)]
impl WalletPort for BrowserWallet {
    async fn authorized_accounts(&self) -> Result<Vec<Address>> {
        self.provider.request_as("eth_accounts", json!([])).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.provider.request_as("eth_requestAccounts", json!([])).await
    }
}
