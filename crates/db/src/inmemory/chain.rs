//! In-memory Chain Data Source.

use std::sync::Arc;

use async_trait::async_trait;
use stake_mirror_primitives::{
    tx::SourceTransaction,
    types::{SourceTxId, UnixTimestamp},
};
use tokio::sync::RwLock;

use crate::{chain::ChainDataDb, errors::DbResult};

/// In-memory implementation of the chain data source.
///
/// Records are kept in insertion order, which is the tie-break for transactions that share a
/// start time.
#[derive(Debug, Clone, Default)]
pub struct ChainDataInMemory {
    records: Arc<RwLock<Vec<(String, SourceTransaction)>>>,
}

#[async_trait]
impl ChainDataDb for ChainDataInMemory {
    async fn get_transactions_in_window(
        &self,
        start: UnixTimestamp,
        end: UnixTimestamp,
    ) -> DbResult<Vec<SourceTransaction>> {
        let records = self.records.read().await;

        let mut window: Vec<SourceTransaction> = Vec::new();
        for (_, tx) in records.iter() {
            if (start..end).contains(&tx.start_time) && !window.iter().any(|t| t.id == tx.id) {
                window.push(tx.clone());
            }
        }
        window.sort_by_key(|tx| tx.start_time);

        Ok(window)
    }

    async fn get_transaction(
        &self,
        tx_id: SourceTxId,
        input_address: Option<&str>,
    ) -> DbResult<Option<SourceTransaction>> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .find(|(address, tx)| {
                tx.id == tx_id && input_address.map_or(true, |wanted| wanted == address.as_str())
            })
            .map(|(_, tx)| tx.clone()))
    }

    async fn add_transaction(
        &self,
        tx: &SourceTransaction,
        input_address: Option<&str>,
    ) -> DbResult<()> {
        let address = input_address.unwrap_or_default();
        let mut records = self.records.write().await;

        match records
            .iter_mut()
            .find(|(a, t)| t.id == tx.id && a.as_str() == address)
        {
            Some((_, existing)) => *existing = tx.clone(),
            None => records.push((address.to_string(), tx.clone())),
        }

        Ok(())
    }
}
