//! Core types and data structures for the masters engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// One row of the shared reference hierarchy.
///
/// Every `(category, group, sub-groups, ledger type)` path that carries a
/// pre-assigned code is represented by one entry. An empty string in a level
/// field means the entry sits above that level (e.g. a group-level entry has
/// all sub-group fields empty). Entries are tenant-independent and never
/// mutated by this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub category: String,
    pub group: String,
    pub sub_group_1: String,
    pub sub_group_2: String,
    pub sub_group_3: String,
    pub ledger_type: String,
    /// Pre-assigned hierarchical code, e.g. `"0101030406"`.
    pub code: String,
}

impl HierarchyEntry {
    /// The six path levels in order, shallowest first.
    pub fn levels(&self) -> [&str; 6] {
        [
            &self.category,
            &self.group,
            &self.sub_group_1,
            &self.sub_group_2,
            &self.sub_group_3,
            &self.ledger_type,
        ]
    }

    /// Number of populated levels. Entries are contiguous from the top, so
    /// this is the index of the first empty level.
    pub fn depth(&self) -> usize {
        self.levels()
            .iter()
            .take_while(|level| !level.trim().is_empty())
            .count()
    }
}

/// A ledger in one tenant's chart of accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Unique identifier for the ledger
    pub id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Human-readable ledger name
    pub name: String,
    /// Top-level category (Assets, Liability, Income, Expenses, Equity)
    pub category: String,
    /// Group within the category
    pub group: String,
    /// Optional sub-group levels; empty string when not set
    pub sub_group_1: String,
    pub sub_group_2: String,
    pub sub_group_3: String,
    /// Optional ledger type at the leaf level; empty string when not set
    pub ledger_type: String,
    /// Hierarchical code, unique per `(tenant_id, code)`; assigned exactly
    /// once at creation
    pub code: Option<String>,
    /// Dynamic onboarding answers (opening balance, bank details, ...)
    pub additional_data: HashMap<String, String>,
    /// When the ledger was created
    pub created_at: NaiveDateTime,
}

impl Ledger {
    /// Key under `additional_data` holding the opening balance answer.
    pub const OPENING_BALANCE_KEY: &'static str = "opening_balance";

    /// Opening balance parsed from `additional_data`.
    ///
    /// Absent or unparseable values are treated as zero; a zero-balance
    /// opening row is valid and expected downstream.
    pub fn opening_balance(&self) -> BigDecimal {
        self.additional_data
            .get(Self::OPENING_BALANCE_KEY)
            .and_then(|raw| raw.trim().parse::<BigDecimal>().ok())
            .unwrap_or_else(|| BigDecimal::from(0))
    }
}

/// Document series types a tenant can number independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesType {
    Sales,
    Purchase,
    Payment,
    Receipt,
    Journal,
    Contra,
    CreditNote,
    DebitNote,
}

impl SeriesType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesType::Sales => "sales",
            SeriesType::Purchase => "purchase",
            SeriesType::Payment => "payment",
            SeriesType::Receipt => "receipt",
            SeriesType::Journal => "journal",
            SeriesType::Contra => "contra",
            SeriesType::CreditNote => "credit_note",
            SeriesType::DebitNote => "debit_note",
        }
    }

    /// Conventional document-number prefix used by the standard seeding step
    pub fn default_prefix(&self) -> &'static str {
        match self {
            SeriesType::Sales => "SAL-",
            SeriesType::Purchase => "PUR-",
            SeriesType::Payment => "PAY-",
            SeriesType::Receipt => "RCT-",
            SeriesType::Journal => "JRN-",
            SeriesType::Contra => "CON-",
            SeriesType::CreditNote => "CRN-",
            SeriesType::DebitNote => "DBN-",
        }
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tenant, per-series document numbering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingConfig {
    pub tenant_id: String,
    pub series_type: SeriesType,
    /// Sub-series name, e.g. "Sales Invoice" or "Credit Note B2B"
    pub series_name: String,
    pub prefix: String,
    pub suffix: String,
    /// First number the series hands out
    pub start_from: u64,
    /// Next number to hand out; only ever increases
    pub current_number: u64,
    /// Zero-padding width; wider numbers render at full length
    pub required_digits: usize,
    /// Fiscal-year window this configuration covers, inclusive
    pub effective_from: NaiveDate,
    pub effective_to: NaiveDate,
    pub is_active: bool,
}

impl NumberingConfig {
    /// Whether `on_date` falls inside this configuration's active window
    pub fn covers(&self, on_date: NaiveDate) -> bool {
        self.is_active && self.effective_from <= on_date && on_date <= self.effective_to
    }

    /// Validate the counter and window invariants.
    ///
    /// Field-level checks (tenant id, series name) live in
    /// [`crate::utils::validation`] and run on the seeding path.
    pub fn validate(&self) -> MastersResult<()> {
        if self.current_number < self.start_from {
            return Err(MastersError::Validation(format!(
                "Current number {} cannot be below starting number {}",
                self.current_number, self.start_from
            )));
        }
        if self.effective_to < self.effective_from {
            return Err(MastersError::Validation(format!(
                "Series window ends ({}) before it starts ({})",
                self.effective_to, self.effective_from
            )));
        }
        Ok(())
    }
}

/// A number reserved from a series, together with the rendering fields in
/// effect at allocation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedNumber {
    pub value: u64,
    pub prefix: String,
    pub suffix: String,
    pub required_digits: usize,
}

/// Kinds of rows in the derived amount-transactions table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// The single seed row created when a cash/bank ledger is onboarded
    OpeningBalance,
    /// Ordinary postings created by the surrounding accounting flow
    Transaction,
}

/// A derived row tracking cash/bank ledger balances.
///
/// Rows are lifetime-bound to their parent [`Ledger`] and may only exist for
/// ledgers that satisfy [`crate::amounts::is_cash_or_bank_ledger`]; the
/// storage layer rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountTransaction {
    pub id: Uuid,
    pub tenant_id: String,
    pub ledger_id: String,
    /// Snapshot of the ledger name at row-creation time
    pub ledger_name: String,
    /// Snapshot of the ledger's first sub-group (Cash or Bank)
    pub sub_group_1: String,
    /// Snapshot of the ledger's hierarchical code
    pub code: Option<String>,
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    pub balance: BigDecimal,
    pub narration: String,
}

impl AmountTransaction {
    /// Build the opening-balance seed row for a ledger.
    ///
    /// Positive balances land on the debit side, negative ones on the credit
    /// side; `balance` keeps the signed value.
    pub fn opening_balance(ledger: &Ledger) -> Self {
        let balance = ledger.opening_balance();
        let zero = BigDecimal::from(0);
        let (debit, credit) = if balance >= zero {
            (balance.clone(), zero)
        } else {
            (zero, balance.abs())
        };
        Self {
            id: Uuid::new_v4(),
            tenant_id: ledger.tenant_id.clone(),
            ledger_id: ledger.id.clone(),
            ledger_name: ledger.name.clone(),
            sub_group_1: ledger.sub_group_1.clone(),
            code: ledger.code.clone(),
            transaction_date: ledger.created_at.date(),
            transaction_type: TransactionType::OpeningBalance,
            debit,
            credit,
            balance,
            narration: "Opening Balance".to_string(),
        }
    }
}

/// Errors that can occur in the masters engine
#[derive(Debug, thiserror::Error)]
pub enum MastersError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("No hierarchy code configured for path: {0}")]
    NoHierarchyMatch(String),
    #[error("Code space exhausted under base code '{0}'")]
    CodeSpaceExhausted(String),
    #[error("No active numbering series for {series_type} '{series_name}' on {on_date}")]
    NoActiveSeries {
        series_type: SeriesType,
        series_name: String,
        on_date: NaiveDate,
    },
    #[error("Ledger code '{0}' already exists for this tenant")]
    DuplicateCode(String),
    #[error("Opening balance row already exists for ledger '{0}'")]
    DuplicateOpeningBalance(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for masters operations
pub type MastersResult<T> = Result<T, MastersError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cash_ledger(opening: Option<&str>) -> Ledger {
        let mut additional_data = HashMap::new();
        if let Some(value) = opening {
            additional_data.insert(Ledger::OPENING_BALANCE_KEY.to_string(), value.to_string());
        }
        Ledger {
            id: "l1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Petty Cash".to_string(),
            category: "Assets".to_string(),
            group: "Cash and Bank Balances".to_string(),
            sub_group_1: "Cash".to_string(),
            sub_group_2: String::new(),
            sub_group_3: String::new(),
            ledger_type: String::new(),
            code: Some("0102040101".to_string()),
            additional_data,
            created_at: NaiveDate::from_ymd_opt(2025, 4, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn opening_balance_parses_additional_data() {
        assert_eq!(
            cash_ledger(Some("2500.50")).opening_balance(),
            "2500.50".parse::<BigDecimal>().unwrap()
        );
    }

    #[test]
    fn opening_balance_defaults_to_zero() {
        assert_eq!(cash_ledger(None).opening_balance(), BigDecimal::from(0));
        assert_eq!(
            cash_ledger(Some("not a number")).opening_balance(),
            BigDecimal::from(0)
        );
    }

    #[test]
    fn opening_balance_row_splits_debit_and_credit() {
        let row = AmountTransaction::opening_balance(&cash_ledger(Some("1000")));
        assert_eq!(row.transaction_type, TransactionType::OpeningBalance);
        assert_eq!(row.debit, BigDecimal::from(1000));
        assert_eq!(row.credit, BigDecimal::from(0));
        assert_eq!(row.balance, BigDecimal::from(1000));
        assert_eq!(
            row.transaction_date,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert_eq!(row.narration, "Opening Balance");

        let overdrawn = AmountTransaction::opening_balance(&cash_ledger(Some("-250")));
        assert_eq!(overdrawn.debit, BigDecimal::from(0));
        assert_eq!(overdrawn.credit, BigDecimal::from(250));
        assert_eq!(overdrawn.balance, BigDecimal::from(-250));
    }

    #[test]
    fn numbering_config_window() {
        let config = NumberingConfig {
            tenant_id: "t1".to_string(),
            series_type: SeriesType::Sales,
            series_name: "Sales Invoice".to_string(),
            prefix: "SAL-".to_string(),
            suffix: "/25-26".to_string(),
            start_from: 1,
            current_number: 1,
            required_digits: 4,
            effective_from: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            effective_to: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            is_active: true,
        };
        assert!(config.covers(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
        assert!(config.covers(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(!config.covers(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));

        let mut inactive = config.clone();
        inactive.is_active = false;
        assert!(!inactive.covers(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
    }

    #[test]
    fn numbering_config_validation() {
        let mut config = NumberingConfig {
            tenant_id: "t1".to_string(),
            series_type: SeriesType::Purchase,
            series_name: "Purchase Invoice".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            start_from: 10,
            current_number: 5,
            required_digits: 4,
            effective_from: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            effective_to: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            is_active: true,
        };
        assert!(config.validate().is_err());
        config.current_number = 10;
        assert!(config.validate().is_ok());
        config.effective_to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert!(config.validate().is_err());
    }
}
