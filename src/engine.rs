//! Main engine that coordinates code assignment, numbering, and derived
//! balance tracking

use std::sync::Arc;

use chrono::NaiveDate;

use crate::amounts::TransactionSync;
use crate::coding::{CodeAssigner, HierarchyPath, NewLedger};
use crate::hierarchy::HierarchyTable;
use crate::numbering::SequenceAllocator;
use crate::traits::{LedgerValidator, MastersStorage};
use crate::types::*;

/// Masters engine tying the three sub-engines together.
///
/// Ledger creation flows through code assignment, persistence, and derived
/// row synchronization in order; document creation flows through sequence
/// allocation. Each sub-engine holds a clone of the storage backend, so a
/// `Clone` storage handle must point at shared state.
pub struct MastersEngine<S: MastersStorage> {
    coder: CodeAssigner<S>,
    allocator: SequenceAllocator<S>,
    sync: TransactionSync<S>,
}

impl<S: MastersStorage + Clone> MastersEngine<S> {
    /// Create a new engine over the shared reference hierarchy and a storage
    /// backend
    pub fn new(hierarchy: HierarchyTable, storage: S) -> Self {
        let hierarchy = Arc::new(hierarchy);
        Self {
            coder: CodeAssigner::new(hierarchy, storage.clone()),
            allocator: SequenceAllocator::new(storage.clone()),
            sync: TransactionSync::new(storage),
        }
    }

    /// Create a new engine with a custom ledger validator
    pub fn with_validator(
        hierarchy: HierarchyTable,
        storage: S,
        validator: Box<dyn LedgerValidator>,
    ) -> Self {
        let hierarchy = Arc::new(hierarchy);
        Self {
            coder: CodeAssigner::with_validator(hierarchy, storage.clone(), validator),
            allocator: SequenceAllocator::new(storage.clone()),
            sync: TransactionSync::new(storage),
        }
    }

    // Ledger operations
    /// Assign a code, persist the ledger, and synchronize the derived
    /// amount-transactions table in one flow
    pub async fn create_ledger(&mut self, new: NewLedger) -> MastersResult<Ledger> {
        let ledger = self.coder.create_ledger(new).await?;
        self.sync.on_ledger_created(&ledger).await?;
        Ok(ledger)
    }

    /// Resolve a hierarchy path to a tenant-unique code without persisting
    pub async fn assign_ledger_code(
        &self,
        tenant_id: &str,
        path: &HierarchyPath,
    ) -> MastersResult<String> {
        self.coder.assign(tenant_id, path).await
    }

    /// Get a ledger by tenant and id
    pub async fn get_ledger(
        &self,
        tenant_id: &str,
        ledger_id: &str,
    ) -> MastersResult<Option<Ledger>> {
        self.coder.storage.get_ledger(tenant_id, ledger_id).await
    }

    /// List all ledgers belonging to a tenant
    pub async fn list_ledgers(&self, tenant_id: &str) -> MastersResult<Vec<Ledger>> {
        self.coder.storage.list_ledgers(tenant_id).await
    }

    // Numbering operations
    /// Reserve and render the next document number for a series
    pub async fn allocate_number(
        &mut self,
        tenant_id: &str,
        series_type: SeriesType,
        series_name: &str,
        on_date: NaiveDate,
    ) -> MastersResult<String> {
        self.allocator
            .allocate(tenant_id, series_type, series_name, on_date)
            .await
    }

    /// Persist one numbering configuration
    pub async fn seed_series(&mut self, config: NumberingConfig) -> MastersResult<NumberingConfig> {
        self.allocator.seed_series(config).await
    }

    /// Seed the standard document series for a tenant's fiscal year
    pub async fn seed_standard_series(
        &mut self,
        tenant_id: &str,
        fiscal_year_start: NaiveDate,
    ) -> MastersResult<Vec<NumberingConfig>> {
        self.allocator
            .seed_standard_series(tenant_id, fiscal_year_start)
            .await
    }

    /// List a tenant's numbering configurations
    pub async fn list_numbering_configs(
        &self,
        tenant_id: &str,
    ) -> MastersResult<Vec<NumberingConfig>> {
        self.allocator.storage.list_numbering_configs(tenant_id).await
    }

    // Derived table operations
    /// Create missing opening-balance rows for every qualifying ledger in the
    /// tenant; returns how many were created
    pub async fn backfill(&mut self, tenant_id: &str) -> MastersResult<u64> {
        self.sync.backfill(tenant_id).await
    }

    /// List the derived rows for one ledger
    pub async fn ledger_transactions(
        &self,
        tenant_id: &str,
        ledger_id: &str,
    ) -> MastersResult<Vec<AmountTransaction>> {
        self.sync
            .storage
            .list_amount_transactions(tenant_id, ledger_id)
            .await
    }
}
