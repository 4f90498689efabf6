//! Display-level state.
//! A read-only projection of the runtime, updated by draining the EventBus.

use portal_types::event::PortalEvent;
use portal_types::wave::WaveRecord;
use portal_types::{Address, TxHash};

/// Shown once when connect finds no wallet extension
pub const PROVIDER_MISSING_ALERT: &str = "Please connect to MetaMask";

/// State the renderer reads
#[derive(Debug, Clone, PartialEq)]
pub struct PortalView {
    pub account: Option<Address>,
    pub waves: Vec<WaveRecord>,
    pub busy: bool,
    /// Transaction sent but not yet mined
    pub pending_tx: Option<TxHash>,
    pub last_error: Option<String>,
    pub status_text: String,
    /// Messages waiting to be shown with `window.alert`
    pub alerts: Vec<String>,
}

impl PortalView {
    pub fn new() -> Self {
        Self {
            account: None,
            waves: Vec::new(),
            busy: false,
            pending_tx: None,
            last_error: None,
            status_text: "Not connected".to_string(),
            alerts: Vec::new(),
        }
    }

    /// Apply drained events in order. Returns whether anything was applied.
    pub fn process_events(&mut self, events: Vec<PortalEvent>) -> bool {
        let changed = !events.is_empty();
        for event in events {
            match event {
                PortalEvent::AccountChanged { address } => {
                    self.account = Some(address);
                    self.status_text = format!("Connected: {}", address);
                }
                PortalEvent::ProviderMissing => {
                    self.status_text = "No wallet found".to_string();
                    self.alerts.push(PROVIDER_MISSING_ALERT.to_string());
                }
                PortalEvent::WavesLoaded { records } => {
                    self.status_text = format!("{} waves", records.len());
                    self.waves = records;
                    self.last_error = None;
                }
                PortalEvent::WaveAppended { record } => {
                    self.waves.push(record);
                    self.status_text = format!("{} waves", self.waves.len());
                }
                PortalEvent::BusyChanged { busy } => {
                    self.busy = busy;
                }
                PortalEvent::SubmissionSent { tx_hash } => {
                    self.pending_tx = Some(tx_hash);
                    self.status_text = format!("Mining {}...", tx_hash);
                }
                PortalEvent::SubmissionConfirmed { tx_hash } => {
                    if self.pending_tx == Some(tx_hash) {
                        self.pending_tx = None;
                    }
                    self.status_text = format!("Mined {}", tx_hash);
                }
                PortalEvent::Error { message } => {
                    self.pending_tx = None;
                    self.status_text = format!("Error: {}", message);
                    self.last_error = Some(message);
                }
            }
        }
        changed
    }

    /// Take pending alert messages
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}

impl Default for PortalView {
    fn default() -> Self {
        Self::new()
    }
}
