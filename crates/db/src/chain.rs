//! The Chain Data Source: a read view over the indexed source-chain history.

use async_trait::async_trait;
use stake_mirror_primitives::{
    tx::SourceTransaction,
    types::{SourceTxId, UnixTimestamp},
};

use crate::errors::DbResult;

/// Indexed source-chain transactions.
///
/// The indexer may store the same transaction once per input address, hence the optional
/// `input_address` in the point lookup.
#[async_trait]
pub trait ChainDataDb {
    /// Returns the transactions whose start time lies in `[start, end)`.
    ///
    /// Each transaction is returned once, ordered by start time and then by the order in which
    /// it was indexed.
    async fn get_transactions_in_window(
        &self,
        start: UnixTimestamp,
        end: UnixTimestamp,
    ) -> DbResult<Vec<SourceTransaction>>;

    /// Looks up a single transaction.
    ///
    /// With `input_address` set only the record indexed under that address matches, otherwise
    /// any record of the transaction does.
    async fn get_transaction(
        &self,
        tx_id: SourceTxId,
        input_address: Option<&str>,
    ) -> DbResult<Option<SourceTransaction>>;

    /// Indexes a transaction, replacing a previous record for the same id and address.
    async fn add_transaction(
        &self,
        tx: &SourceTransaction,
        input_address: Option<&str>,
    ) -> DbResult<()>;
}
