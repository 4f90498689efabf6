use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single wave stored by the portal contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRecord {
    /// Ordinal assigned by the contract at submission time
    pub index: u64,
    pub owner: Address,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl WaveRecord {
    /// Build a record from the raw on-chain tuple.
    /// Timestamps outside chrono's range collapse to the Unix epoch.
    pub fn from_chain(index: u64, owner: Address, message: impl Into<String>, timestamp_secs: u64) -> Self {
        Self {
            index,
            owner,
            message: message.into(),
            timestamp: timestamp_from_secs(timestamp_secs),
        }
    }

    /// Seconds since the Unix epoch, as reported on chain
    pub fn timestamp_secs(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Payload of a `NewWave` contract event: `(from, timestamp, message)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWave {
    pub owner: Address,
    pub timestamp_secs: u64,
    pub message: String,
}

impl NewWave {
    pub fn new(owner: Address, timestamp_secs: u64, message: impl Into<String>) -> Self {
        Self {
            owner,
            timestamp_secs,
            message: message.into(),
        }
    }

    /// Recover the notification a record was derived from
    pub fn from_record(record: &WaveRecord) -> Self {
        Self {
            owner: record.owner,
            timestamp_secs: record.timestamp_secs().max(0) as u64,
            message: record.message.clone(),
        }
    }

    /// Whether `record` carries the same owner, time and text
    pub fn matches(&self, record: &WaveRecord) -> bool {
        record.owner == self.owner
            && record.message == self.message
            && record.timestamp_secs() == self.timestamp_secs as i64
    }
}

fn timestamp_from_secs(secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or_default()
}

/// Ordered, append-only list of waves. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveList {
    records: Vec<WaveRecord>,
}

impl WaveList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a bulk fetch result while keeping live records appended
    /// since position `live_since`. Those are re-appended after the fetched
    /// records; with `dedupe` set, ones already present in the fetch are
    /// dropped. Returns the number of live records kept.
    pub fn merge_fetched(&mut self, fetched: Vec<WaveRecord>, live_since: usize, dedupe: bool) -> usize {
        let start = live_since.min(self.records.len());
        let live: Vec<NewWave> = self.records.drain(start..).map(|r| NewWave::from_record(&r)).collect();
        self.records = fetched;

        let mut kept = 0;
        for wave in live {
            if dedupe && self.contains(&wave) {
                continue;
            }
            self.append(wave);
            kept += 1;
        }
        kept
    }

    /// Append a live notification. The new record takes the next ordinal.
    pub fn append(&mut self, wave: NewWave) -> &WaveRecord {
        let index = self.records.len() as u64;
        self.records.push(WaveRecord::from_chain(
            index,
            wave.owner,
            wave.message,
            wave.timestamp_secs,
        ));
        &self.records[self.records.len() - 1]
    }

    /// Whether a record equivalent to `wave` is already present
    pub fn contains(&self, wave: &NewWave) -> bool {
        self.records.iter().any(|r| wave.matches(r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[WaveRecord] {
        &self.records
    }
}
