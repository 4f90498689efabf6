//! WavePortal contract adapter.
//!
//! Reads go through `eth_call`, writes through `eth_sendTransaction` signed
//! by the wallet's current account. Mining is detected by polling
//! `eth_getTransactionReceipt`, and `NewWave` notifications by polling
//! `eth_getLogs` over new blocks while at least one listener is registered.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use alloy_primitives::{Bytes, U64};
use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use serde_json::json;

use portal_core::ports::{ListenerId, NewWaveListener, TxReceipt, WavePortalPort};
use portal_types::{
    config::ContractConfig,
    wave::{NewWave, WaveRecord},
    Address, PortalError, Result, TxHash,
};

use crate::abi::{self, RpcLog, RpcReceipt};
use crate::eip1193::InjectedProvider;

pub struct WavePortalContract {
    provider: Rc<InjectedProvider>,
    config: ContractConfig,
    registry: Rc<ListenerRegistry>,
}

impl WavePortalContract {
    pub fn new(provider: Rc<InjectedProvider>, config: ContractConfig) -> Self {
        Self {
            provider,
            config,
            registry: Rc::new(ListenerRegistry::default()),
        }
    }

    async fn call(&self, data: Vec<u8>) -> Result<Bytes> {
        let params = json!([
            { "to": self.config.address, "data": Bytes::from(data) },
            "latest"
        ]);
        self.provider.request_as("eth_call", params).await
    }

    /// The account `eth_sendTransaction` is sent from
    async fn signer(&self) -> Result<Address> {
        let accounts: Vec<Address> = self.provider.request_as("eth_accounts", json!([])).await?;
        accounts.first().copied().ok_or(PortalError::NotConnected)
    }

    fn spawn_poller(&self) {
        let poller = LogPoller {
            provider: self.provider.clone(),
            address: self.config.address,
            interval_ms: self.config.poll_interval_ms,
            registry: self.registry.clone(),
        };
        wasm_bindgen_futures::spawn_local(poller.run());
    }
}

#[async_trait(?Send)]
impl WavePortalPort for WavePortalContract {
    async fn total_waves(&self) -> Result<u64> {
        let data = self.call(abi::encode_total_waves()).await?;
        abi::decode_total_waves(&data)
    }

    async fn get_wave(&self, index: u64) -> Result<WaveRecord> {
        let data = self.call(abi::encode_get_wave(index)).await?;
        abi::decode_wave(index, &data)
    }

    async fn create_wave(&self, message: &str, gas_limit: u64) -> Result<TxHash> {
        let from = self.signer().await?;
        let tx = json!({
            "from": from,
            "to": self.config.address,
            "data": Bytes::from(abi::encode_create_wave(message)),
            "gas": U64::from(gas_limit),
        });
        self.provider
            .request_as("eth_sendTransaction", json!([tx]))
            .await
            .map_err(|e| match e {
                PortalError::Serialization(detail) => PortalError::Write(detail),
                other => other,
            })
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt> {
        loop {
            let receipt: Option<RpcReceipt> = self
                .provider
                .request_as("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if let Some(receipt) = receipt {
                return Ok(receipt.into());
            }
            TimeoutFuture::new(self.config.poll_interval_ms).await;
        }
    }

    fn on_new_wave(&self, listener: NewWaveListener) -> Result<ListenerId> {
        let (id, start_poller) = self.registry.register(listener);
        if start_poller {
            self.spawn_poller();
        }
        Ok(id)
    }

    fn off_new_wave(&self, id: ListenerId) {
        self.registry.remove(id);
    }
}

// ─── Listener bookkeeping ────────────────────────────────────

/// Listener table shared by the adapter and its log poller.
/// At most one poller runs at a time; `polling` is true while it does.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RefCell<BTreeMap<ListenerId, NewWaveListener>>,
    next_id: Cell<u64>,
    polling: Cell<bool>,
}

impl ListenerRegistry {
    /// Add a listener. The flag is `true` when no poller is running and
    /// the caller must start one.
    pub fn register(&self, listener: NewWaveListener) -> (ListenerId, bool) {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, listener);
        let start_poller = !self.polling.replace(true);
        (id, start_poller)
    }

    pub fn remove(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Called by the poller on every tick. With nobody listening the
    /// poller is marked stopped and must exit.
    pub fn finish_if_idle(&self) -> bool {
        if self.is_empty() {
            self.polling.set(false);
            return true;
        }
        false
    }

    /// Deliver `wave` to every listener registered right now.
    /// Works on a snapshot so a listener may unsubscribe from its callback.
    pub fn dispatch(&self, wave: &NewWave) {
        let listeners: Vec<NewWaveListener> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(wave.clone());
        }
    }
}

// ─── Log polling ─────────────────────────────────────────────

/// First block not yet scanned for `NewWave` logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCursor {
    next: Option<u64>,
}

impl BlockCursor {
    /// Cursor whose first window begins at `block`, inclusive
    pub fn starting_at(block: u64) -> Self {
        Self { next: Some(block) }
    }

    /// Inclusive block range to query once the chain head is `latest`.
    /// An unseeded cursor starts at `latest`. `None` means nothing new.
    pub fn window(&self, latest: u64) -> Option<(u64, u64)> {
        let from = self.next.unwrap_or(latest);
        (from <= latest).then_some((from, latest))
    }

    /// The window was scanned; continue after it.
    pub fn advance(&mut self, window: (u64, u64)) {
        self.next = Some(window.1 + 1);
    }

    /// The window could not be scanned; query it again next tick.
    pub fn retry(&mut self, window: (u64, u64)) {
        self.next = Some(window.0);
    }

    pub fn next_block(&self) -> Option<u64> {
        self.next
    }
}

/// Background task that turns new `NewWave` logs into listener calls.
/// Exits on the first tick that finds no listener registered.
struct LogPoller {
    provider: Rc<InjectedProvider>,
    address: Address,
    interval_ms: u32,
    registry: Rc<ListenerRegistry>,
}

impl LogPoller {
    async fn run(self) {
        // Anchor at the subscription block so waves mined before the first
        // tick are still delivered
        let mut cursor = match self.block_number().await {
            Ok(block) => BlockCursor::starting_at(block),
            Err(e) => {
                log::warn!("eth_blockNumber failed at subscription: {}", e);
                BlockCursor::default()
            }
        };
        log::debug!("NewWave log poller started at {:?}", cursor.next_block());

        loop {
            TimeoutFuture::new(self.interval_ms).await;
            if self.registry.finish_if_idle() {
                break;
            }

            let latest = match self.block_number().await {
                Ok(n) => n,
                Err(e) => {
                    log::warn!("eth_blockNumber failed: {}", e);
                    continue;
                }
            };
            let Some(window) = cursor.window(latest) else {
                continue;
            };

            match self.logs(window).await {
                Ok(logs) => {
                    cursor.advance(window);
                    for wave in abi::collect_new_waves(logs) {
                        self.registry.dispatch(&wave);
                    }
                }
                Err(e) => {
                    log::warn!("eth_getLogs failed for blocks {}..={}: {}", window.0, window.1, e);
                    cursor.retry(window);
                }
            }
        }

        log::debug!("NewWave log poller stopped");
    }

    async fn block_number(&self) -> Result<u64> {
        let n: U64 = self.provider.request_as("eth_blockNumber", json!([])).await?;
        Ok(n.to::<u64>())
    }

    async fn logs(&self, (from, to): (u64, u64)) -> Result<Vec<RpcLog>> {
        let filter = json!({
            "address": self.address,
            "topics": [abi::new_wave_topic()],
            "fromBlock": U64::from(from),
            "toBlock": U64::from(to),
        });
        self.provider.request_as("eth_getLogs", json!([filter])).await
    }
}
