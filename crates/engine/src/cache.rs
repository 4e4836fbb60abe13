//! Owners of outputs seen during a run.

use std::{collections::HashMap, sync::Arc};

use stake_mirror_primitives::{tx::TxOutput, types::SourceTxId};
use tokio::sync::RwLock;

/// Maps `(tx_id, output_index)` to the output's owner address.
///
/// Shared by the workers of a run so that an output reconstructed once is not fetched again.
#[derive(Debug, Clone, Default)]
pub(crate) struct OutputCache {
    owners: Arc<RwLock<HashMap<(SourceTxId, u32), String>>>,
}

impl OutputCache {
    pub(crate) async fn get(&self, tx_id: SourceTxId, index: u32) -> Option<String> {
        self.owners.read().await.get(&(tx_id, index)).cloned()
    }

    pub(crate) async fn insert_all(&self, outputs: &[TxOutput]) {
        let mut owners = self.owners.write().await;

        for output in outputs {
            owners.insert((output.tx_id, output.index), output.address.clone());
        }
    }
}
