use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::{PortalError, Result};

/// Deployed WavePortal contract
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("e09363f95ad795978aee58738e6892a382cd9a3b");

/// Gas ceiling attached to every createWave transaction
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

/// Text sent when the caller submits an empty message
pub const DEFAULT_WAVE_MESSAGE: &str = "Wassup!!!";

/// Top-level portal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub contract: ContractConfig,
    pub sync: SyncConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            contract: ContractConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.contract.gas_limit == 0 {
            return Err(PortalError::Config("gas_limit must be non-zero".to_string()));
        }
        if self.contract.poll_interval_ms == 0 {
            return Err(PortalError::Config("poll_interval_ms must be non-zero".to_string()));
        }
        if self.contract.address == Address::ZERO {
            return Err(PortalError::Config("contract address is unset".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub address: Address,
    pub gas_limit: u64,
    /// Used by `createWave` when the caller passes no text
    pub default_message: String,
    /// Interval for receipt and log polling
    pub poll_interval_ms: u32,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS,
            gas_limit: DEFAULT_GAS_LIMIT,
            default_message: DEFAULT_WAVE_MESSAGE.to_string(),
            poll_interval_ms: 4_000,
        }
    }
}

impl ContractConfig {
    /// The text actually sent for a submission. Blank input falls back to
    /// `default_message`; anything else is sent as typed.
    pub fn message_or_default<'a>(&'a self, message: &'a str) -> &'a str {
        if message.trim().is_empty() {
            &self.default_message
        } else {
            message
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on outstanding `getWave` reads during a bulk fetch
    pub fetch_concurrency: usize,
    /// Skip live notifications already present in the list
    pub dedupe_notifications: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 8,
            dedupe_notifications: false,
        }
    }
}

impl SyncConfig {
    pub fn effective_concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }
}
