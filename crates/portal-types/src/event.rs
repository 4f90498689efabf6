use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::wave::WaveRecord;

/// Events emitted by the portal runtime.
/// The display projection subscribes to these for reactive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PortalEvent {
    /// A wallet account became active
    AccountChanged { address: Address },

    /// No injected wallet provider was found on an explicit connect
    ProviderMissing,

    /// Bulk fetch finished and replaced the list
    WavesLoaded { records: Vec<WaveRecord> },

    /// A live notification was appended to the list
    WaveAppended { record: WaveRecord },

    /// Busy indicator toggled (loading or submitting)
    BusyChanged { busy: bool },

    /// A createWave transaction was sent and is waiting to be mined
    SubmissionSent { tx_hash: TxHash },

    /// A createWave transaction was mined
    SubmissionConfirmed { tx_hash: TxHash },

    /// An operation failed and was degraded
    Error { message: String },
}
