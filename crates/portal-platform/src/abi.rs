//! WavePortal ABI and the JSON-RPC shapes exchanged with the provider.
//!
//! Everything here is pure so it can be exercised off-browser.

use alloy_primitives::{Address, Bytes, TxHash, B256, U256, U64};
use alloy_sol_types::{sol, SolCall, SolEvent, SolValue};
use serde::Deserialize;

use portal_core::ports::TxReceipt;
use portal_types::{
    wave::{NewWave, WaveRecord},
    PortalError, Result,
};

sol! {
    interface IWavePortal {
        function getTotalWaves() external view returns (uint256);
        function getWave(uint256 index) external view returns (address, string, uint256);
        function createWave(string message) external;

        event NewWave(address indexed from, uint256 timestamp, string message);
    }
}

pub use IWavePortal::NewWave as NewWaveEvent;

// ─── Calldata ────────────────────────────────────────────────

pub fn encode_total_waves() -> Vec<u8> {
    IWavePortal::getTotalWavesCall {}.abi_encode()
}

pub fn encode_get_wave(index: u64) -> Vec<u8> {
    IWavePortal::getWaveCall { index: U256::from(index) }.abi_encode()
}

pub fn encode_create_wave(message: &str) -> Vec<u8> {
    IWavePortal::createWaveCall { message: message.to_string() }.abi_encode()
}

/// Topic filter selecting `NewWave` logs
pub fn new_wave_topic() -> B256 {
    NewWaveEvent::SIGNATURE_HASH
}

// ─── Return data ─────────────────────────────────────────────

pub fn decode_total_waves(data: &[u8]) -> Result<u64> {
    let total = U256::abi_decode(data).map_err(abi_err)?;
    u256_to_u64(total, "getTotalWaves")
}

pub fn decode_wave(index: u64, data: &[u8]) -> Result<WaveRecord> {
    let (owner, message, timestamp) =
        <(Address, String, U256)>::abi_decode_params(data).map_err(abi_err)?;
    let timestamp = u256_to_u64(timestamp, "getWave timestamp")?;
    Ok(WaveRecord::from_chain(index, owner, message, timestamp))
}

/// Decode one raw log into a notification. Logs of other events are `None`.
pub fn decode_new_wave(log: &RpcLog) -> Result<Option<NewWave>> {
    if log.topics.first() != Some(&NewWaveEvent::SIGNATURE_HASH) {
        return Ok(None);
    }
    let event = NewWaveEvent::decode_raw_log(log.topics.iter().copied(), &log.data).map_err(abi_err)?;
    let timestamp = u256_to_u64(event.timestamp, "NewWave timestamp")?;
    Ok(Some(NewWave::new(event.from, timestamp, event.message)))
}

fn u256_to_u64(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| PortalError::Abi(format!("{} out of range: {}", what, value)))
}

fn abi_err(e: alloy_sol_types::Error) -> PortalError {
    PortalError::Abi(e.to_string())
}

// ─── JSON-RPC shapes ─────────────────────────────────────────

/// Entry of an `eth_getLogs` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<U64>,
    pub log_index: Option<U64>,
    #[serde(default)]
    pub removed: bool,
}

impl RpcLog {
    /// Position used to order logs within a polling window
    pub fn position(&self) -> (u64, u64) {
        (
            self.block_number.map(|n| n.to::<u64>()).unwrap_or(u64::MAX),
            self.log_index.map(|n| n.to::<u64>()).unwrap_or(u64::MAX),
        )
    }
}

/// `eth_getTransactionReceipt` result, `null` while pending
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<U64>,
    /// Absent on pre-Byzantium chains
    pub status: Option<U64>,
}

impl From<RpcReceipt> for TxReceipt {
    fn from(receipt: RpcReceipt) -> Self {
        TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.to::<u64>()).unwrap_or_default(),
            success: receipt.status.map_or(true, |s| s != U64::ZERO),
        }
    }
}

/// Decode all `NewWave` logs of a polling window in emission order.
/// Removed (reorged) logs and undecodable entries are skipped with a warning.
pub fn collect_new_waves(mut logs: Vec<RpcLog>) -> Vec<NewWave> {
    logs.sort_by_key(RpcLog::position);
    logs.iter()
        .filter(|entry| !entry.removed)
        .filter_map(|entry| match decode_new_wave(entry) {
            Ok(wave) => wave,
            Err(e) => {
                log::warn!("Skipping undecodable NewWave log: {}", e);
                None
            }
        })
        .collect()
}
