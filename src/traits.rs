//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for the masters engine
///
/// This trait allows the engine to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these
/// methods. Three invariants must be enforced by the implementation itself,
/// not by callers:
///
/// - `(tenant_id, code)` is unique across ledgers; a clashing insert fails
///   with [`MastersError::DuplicateCode`] (SQL backends: a unique index).
/// - At most one [`TransactionType::OpeningBalance`] row exists per ledger;
///   a second insert fails with [`MastersError::DuplicateOpeningBalance`].
/// - An amount-transaction row may only reference a ledger that passes
///   [`crate::amounts::is_cash_or_bank_ledger`]; anything else fails with
///   [`MastersError::InvariantViolation`].
#[async_trait]
pub trait MastersStorage: Send + Sync {
    /// Insert a new ledger, enforcing `(tenant_id, code)` uniqueness
    async fn insert_ledger(&mut self, ledger: &Ledger) -> MastersResult<()>;

    /// Get a ledger by tenant and id
    async fn get_ledger(&self, tenant_id: &str, ledger_id: &str) -> MastersResult<Option<Ledger>>;

    /// List all ledgers belonging to a tenant
    async fn list_ledgers(&self, tenant_id: &str) -> MastersResult<Vec<Ledger>>;

    /// List one page of a tenant's ledgers, ordered by id.
    ///
    /// Used by the backfill job to walk large tenants in batches instead of
    /// loading the whole chart at once.
    async fn list_ledgers_page(
        &self,
        tenant_id: &str,
        offset: usize,
        limit: usize,
    ) -> MastersResult<Vec<Ledger>>;

    /// Delete a ledger and, cascading, its amount-transaction rows
    async fn delete_ledger(&mut self, tenant_id: &str, ledger_id: &str) -> MastersResult<()>;

    /// All assigned codes for a tenant that start with `base`
    ///
    /// Used by code disambiguation to find the base code and any existing
    /// `.NNN` suffixed variants in one query.
    async fn ledger_codes_with_prefix(
        &self,
        tenant_id: &str,
        base: &str,
    ) -> MastersResult<Vec<String>>;

    /// Insert a numbering configuration, enforcing uniqueness of
    /// `(tenant_id, series_type, series_name, effective_from)`
    async fn insert_numbering_config(&mut self, config: &NumberingConfig) -> MastersResult<()>;

    /// List a tenant's numbering configurations
    async fn list_numbering_configs(&self, tenant_id: &str) -> MastersResult<Vec<NumberingConfig>>;

    /// Atomically reserve the next number from the series active on `on_date`.
    ///
    /// The read-increment-write on `current_number` must be serialized per
    /// configuration row (SQL backends: `SELECT ... FOR UPDATE` or
    /// `UPDATE ... RETURNING`). Returns `None` when no active configuration
    /// covers `on_date`; if several do, the one with the latest
    /// `effective_from` wins.
    async fn allocate_sequence(
        &mut self,
        tenant_id: &str,
        series_type: SeriesType,
        series_name: &str,
        on_date: NaiveDate,
    ) -> MastersResult<Option<AllocatedNumber>>;

    /// Insert a derived amount-transaction row, enforcing the classification
    /// invariant and opening-balance uniqueness
    async fn insert_amount_transaction(&mut self, txn: &AmountTransaction) -> MastersResult<()>;

    /// List the derived rows for one ledger
    async fn list_amount_transactions(
        &self,
        tenant_id: &str,
        ledger_id: &str,
    ) -> MastersResult<Vec<AmountTransaction>>;
}

/// Trait for implementing custom ledger validation rules
pub trait LedgerValidator: Send + Sync {
    /// Validate a ledger before it is persisted
    fn validate_ledger(&self, ledger: &Ledger) -> MastersResult<()>;
}

/// Default ledger validator with basic rules
pub struct DefaultLedgerValidator;

impl LedgerValidator for DefaultLedgerValidator {
    fn validate_ledger(&self, ledger: &Ledger) -> MastersResult<()> {
        if ledger.tenant_id.trim().is_empty() {
            return Err(MastersError::Validation(
                "Tenant ID cannot be empty".to_string(),
            ));
        }

        if ledger.name.trim().is_empty() {
            return Err(MastersError::Validation(
                "Ledger name cannot be empty".to_string(),
            ));
        }

        if ledger.category.trim().is_empty() || ledger.group.trim().is_empty() {
            return Err(MastersError::Validation(
                "Ledger must have a category and a group".to_string(),
            ));
        }

        Ok(())
    }
}
