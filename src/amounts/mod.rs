//! Derived cash/bank balance tracking
//!
//! The classification predicate decides which ledgers are balance-tracked;
//! the synchronizer keeps the derived amount-transactions table consistent
//! with that classification.

pub mod classify;
pub mod sync;

pub use classify::is_cash_or_bank_ledger;
pub use sync::TransactionSync;
