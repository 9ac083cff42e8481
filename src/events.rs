//! Transaction stage events
//!
//! Every transaction the client submits moves through the same stages. Callers that
//! want progress (a dashboard, a CLI spinner) subscribe to a channel of [`TxEvent`]s
//! instead of passing a callback into each operation.

use alloy::primitives::TxHash;
use tokio::sync::mpsc;

/// Lifecycle stage of one submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStage {
    /// Simulating the call / estimating gas
    EstimatingGas,
    /// Handing the transaction to the signer
    Signing,
    /// Broadcast, hash known
    Submitted { tx_hash: TxHash },
    /// Waiting for the requested confirmation depth
    Confirming { tx_hash: TxHash, confirmations: u64 },
    /// Mined successfully at the requested depth
    Completed { tx_hash: TxHash, block_number: u64 },
    /// Rejected before or after submission
    Failed { message: String },
}

/// A stage transition tagged with the operation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxEvent {
    /// Operation name, e.g. `"approve"`, `"deposit"`, `"diamondCut"`
    pub operation: &'static str,
    pub stage: TxStage,
}

/// Fan-out point for stage events; a no-op until someone subscribes
#[derive(Debug, Default)]
pub struct StageEmitter {
    tx: Option<mpsc::UnboundedSender<TxEvent>>,
}

impl StageEmitter {
    /// Replace the current subscriber and return its receiving end
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TxEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tx = Some(tx);
        rx
    }

    pub fn emit(&self, operation: &'static str, stage: TxStage) {
        tracing::debug!(operation, ?stage, "tx stage");
        if let Some(tx) = &self.tx {
            // Receiver dropped: the caller stopped listening, nothing to do
            let _ = tx.send(TxEvent { operation, stage });
        }
    }
}
