//! Wave synchronizer: owns the in-memory wave list.
//!
//! The list has two writers: the bulk fetch, which runs once an account is
//! known, and the live `NewWave` listener, which only ever appends. Both run
//! on the single browser thread, so the list lives in an `Rc<RefCell<_>>`
//! shared with the listener closure.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::stream::{self, StreamExt, TryStreamExt};
use portal_types::{
    config::PortalConfig,
    event::PortalEvent,
    wave::{NewWave, WaveList, WaveRecord},
    PortalError, Result, TxHash,
};

use crate::event_bus::EventBus;
use crate::ports::{ListenerId, NewWaveListener, WavePortalPort};

pub struct WaveSynchronizer {
    contract: Rc<dyn WavePortalPort>,
    config: PortalConfig,
    event_bus: EventBus,
    waves: Rc<RefCell<WaveList>>,
    loading: Cell<bool>,
    submitting: Cell<bool>,
    subscription: RefCell<Option<Subscription>>,
}

struct Subscription {
    id: ListenerId,
    /// Cleared on teardown so late deliveries are dropped
    active: Rc<Cell<bool>>,
}

/// Lowers a busy flag when dropped, on success and failure alike.
struct BusyGuard<'a> {
    sync: &'a WaveSynchronizer,
    flag: &'a Cell<bool>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.sync.set_flag(self.flag, false);
    }
}

impl WaveSynchronizer {
    pub fn new(contract: Rc<dyn WavePortalPort>, config: PortalConfig, event_bus: EventBus) -> Self {
        Self {
            contract,
            config,
            event_bus,
            waves: Rc::new(RefCell::new(WaveList::new())),
            loading: Cell::new(false),
            submitting: Cell::new(false),
            subscription: RefCell::new(None),
        }
    }

    /// Snapshot of the current list, in display order
    pub fn waves(&self) -> Vec<WaveRecord> {
        self.waves.borrow().as_slice().to_vec()
    }

    pub fn len(&self) -> usize {
        self.waves.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.borrow().is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.loading.get() || self.submitting.get()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    // ─── Bulk fetch ──────────────────────────────────────────

    /// Read every wave the contract holds.
    ///
    /// Issues `getTotalWaves` and then one `getWave(i)` per index, with at
    /// most `sync.fetch_concurrency` reads outstanding. Results come back in
    /// index order whatever order the reads complete in. The first failed
    /// read fails the whole fetch; no partial list is returned.
    pub async fn fetch_all(&self) -> Result<Vec<WaveRecord>> {
        let total = self.contract.total_waves().await?;
        log::debug!("Total waves: {}", total);

        stream::iter(0..total)
            .map(|index| self.contract.get_wave(index))
            .buffered(self.config.sync.effective_concurrency())
            .try_collect()
            .await
    }

    /// Fetch everything and install it as the list.
    ///
    /// On failure the list is left as it was and the cause is logged.
    /// Notifications that arrive while the fetch is running are kept.
    pub async fn load(&self) -> Result<usize> {
        let _busy = self.raise(&self.loading);
        let live_since = self.len();

        match self.fetch_all().await {
            Ok(fetched) => {
                let records = {
                    let mut list = self.waves.borrow_mut();
                    let kept = list.merge_fetched(
                        fetched,
                        live_since,
                        self.config.sync.dedupe_notifications,
                    );
                    if kept > 0 {
                        log::debug!("Kept {} waves received during the fetch", kept);
                    }
                    list.as_slice().to_vec()
                };
                let count = records.len();
                log::info!("Loaded {} waves", count);
                self.event_bus.emit(PortalEvent::WavesLoaded { records });
                Ok(count)
            }
            Err(e) => {
                log::error!("Failed to load waves: {}", e);
                self.event_bus.emit(PortalEvent::Error {
                    message: format!("Failed to load waves: {}", e),
                });
                Err(e)
            }
        }
    }

    // ─── Submission ──────────────────────────────────────────

    /// Send `createWave` and wait for it to be mined.
    ///
    /// Only one submission may be outstanding; a second call while one is in
    /// flight is rejected. The list is never touched here; the new wave
    /// arrives through the `NewWave` listener.
    pub async fn submit(&self, message: &str) -> Result<TxHash> {
        if self.submitting.get() {
            log::warn!("Ignoring submit: a submission is already in flight");
            return Err(PortalError::SubmissionInFlight);
        }
        let _busy = self.raise(&self.submitting);

        let text = self.config.contract.message_or_default(message).to_string();
        match self.send_and_confirm(&text).await {
            Ok(tx_hash) => {
                log::info!("Transaction {} mined", tx_hash);
                self.event_bus.emit(PortalEvent::SubmissionConfirmed { tx_hash });
                Ok(tx_hash)
            }
            Err(e) => {
                log::error!("Wave submission failed: {}", e);
                self.event_bus.emit(PortalEvent::Error {
                    message: format!("Wave submission failed: {}", e),
                });
                Err(e)
            }
        }
    }

    async fn send_and_confirm(&self, text: &str) -> Result<TxHash> {
        let tx_hash = self
            .contract
            .create_wave(text, self.config.contract.gas_limit)
            .await?;
        log::info!("Transaction hash {}", tx_hash);
        self.event_bus.emit(PortalEvent::SubmissionSent { tx_hash });

        let receipt = self.contract.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(PortalError::Reverted { tx_hash });
        }
        Ok(tx_hash)
    }

    // ─── Live notifications ──────────────────────────────────

    /// Register the single `NewWave` listener.
    ///
    /// Fails with [`PortalError::AlreadySubscribed`] when a listener is
    /// already registered; use [`Self::resubscribe`] to reconnect.
    pub fn subscribe_new(&self) -> Result<()> {
        if self.is_subscribed() {
            log::warn!("NewWave listener already registered");
            return Err(PortalError::AlreadySubscribed);
        }

        let active = Rc::new(Cell::new(true));
        let listener = self.listener(active.clone());
        let id = self.contract.on_new_wave(listener)?;
        log::debug!("Subscribed to NewWave ({:?})", id);

        *self.subscription.borrow_mut() = Some(Subscription { id, active });
        Ok(())
    }

    /// Release the listener. Safe to call when not subscribed.
    pub fn unsubscribe(&self) {
        let subscription = self.subscription.borrow_mut().take();
        if let Some(sub) = subscription {
            sub.active.set(false);
            self.contract.off_new_wave(sub.id);
            log::debug!("Unsubscribed from NewWave ({:?})", sub.id);
        }
    }

    /// Tear down any existing listener and register a fresh one.
    pub fn resubscribe(&self) -> Result<()> {
        self.unsubscribe();
        self.subscribe_new()
    }

    fn listener(&self, active: Rc<Cell<bool>>) -> NewWaveListener {
        let waves = self.waves.clone();
        let event_bus = self.event_bus.clone();
        let dedupe = self.config.sync.dedupe_notifications;

        Rc::new(move |wave: NewWave| {
            if !active.get() {
                log::debug!("Dropping NewWave delivered after unsubscribe");
                return;
            }
            log::info!("New wave from {}: {}", wave.owner, wave.message);

            let record = {
                let mut list = waves.borrow_mut();
                if dedupe && list.contains(&wave) {
                    log::debug!("Skipping duplicate wave from {}", wave.owner);
                    return;
                }
                list.append(wave).clone()
            };
            event_bus.emit(PortalEvent::WaveAppended { record });
        })
    }

    // ─── Busy state ──────────────────────────────────────────

    fn raise<'a>(&'a self, flag: &'a Cell<bool>) -> BusyGuard<'a> {
        self.set_flag(flag, true);
        BusyGuard { sync: self, flag }
    }

    fn set_flag(&self, flag: &Cell<bool>, value: bool) {
        let before = self.is_busy();
        flag.set(value);
        let after = self.is_busy();
        if before != after {
            self.event_bus.emit(PortalEvent::BusyChanged { busy: after });
        }
    }
}
