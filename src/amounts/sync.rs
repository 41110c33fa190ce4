//! Derived transaction synchronizer

use tracing::{debug, info};

use crate::amounts::is_cash_or_bank_ledger;
use crate::traits::MastersStorage;
use crate::types::*;

/// Ledgers examined per backfill batch
const BACKFILL_BATCH_SIZE: usize = 100;

/// Keeps the derived amount-transactions table consistent with the ledger
/// table
pub struct TransactionSync<S: MastersStorage> {
    pub(crate) storage: S,
}

impl<S: MastersStorage> TransactionSync<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// React to a freshly created ledger.
    ///
    /// If the ledger qualifies as cash/bank and has no opening-balance row
    /// yet, one is created from its opening balance answer. Returns the row
    /// when one was inserted, `Ok(None)` when the ledger does not qualify or
    /// the row already exists. Losing the race against a concurrent
    /// [`TransactionSync::backfill`] is a no-op, not an error.
    pub async fn on_ledger_created(
        &mut self,
        ledger: &Ledger,
    ) -> MastersResult<Option<AmountTransaction>> {
        if !is_cash_or_bank_ledger(ledger) {
            return Ok(None);
        }

        let existing = self
            .storage
            .list_amount_transactions(&ledger.tenant_id, &ledger.id)
            .await?;
        if existing
            .iter()
            .any(|row| row.transaction_type == TransactionType::OpeningBalance)
        {
            return Ok(None);
        }

        self.insert_opening_row(ledger).await
    }

    /// Create missing opening-balance rows for every qualifying ledger in the
    /// tenant.
    ///
    /// Idempotent: ledgers that already have any derived row are left alone,
    /// even if that row's snapshot fields are stale, so a second run returns
    /// 0. Safe to run concurrently with live ledger creation; the storage
    /// uniqueness constraint on the opening row breaks any tie.
    pub async fn backfill(&mut self, tenant_id: &str) -> MastersResult<u64> {
        let mut created = 0u64;
        let mut offset = 0usize;

        loop {
            let batch = self
                .storage
                .list_ledgers_page(tenant_id, offset, BACKFILL_BATCH_SIZE)
                .await?;
            if batch.is_empty() {
                break;
            }

            for ledger in &batch {
                if !is_cash_or_bank_ledger(ledger) {
                    continue;
                }
                let existing = self
                    .storage
                    .list_amount_transactions(tenant_id, &ledger.id)
                    .await?;
                if !existing.is_empty() {
                    continue;
                }
                if self.insert_opening_row(ledger).await?.is_some() {
                    created += 1;
                }
            }
            debug!(tenant_id, batch = batch.len(), created, "backfill batch done");

            offset += batch.len();
            if batch.len() < BACKFILL_BATCH_SIZE {
                break;
            }
        }

        info!(tenant_id, created, "backfill finished");
        Ok(created)
    }

    async fn insert_opening_row(
        &mut self,
        ledger: &Ledger,
    ) -> MastersResult<Option<AmountTransaction>> {
        let row = AmountTransaction::opening_balance(ledger);
        match self.storage.insert_amount_transaction(&row).await {
            Ok(()) => Ok(Some(row)),
            // Someone else created the opening row between our check and the
            // insert; the invariant holds either way.
            Err(MastersError::DuplicateOpeningBalance(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }
}
