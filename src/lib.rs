//! # Masters Core
//!
//! The ledger-identity and derived-balance engine of a multi-tenant
//! accounting application. Every tenant maintains its own chart of accounts
//! and its own document-number series; this crate is the subsystem that keeps
//! both collision-free:
//!
//! - **Code assignment**: every new ledger gets a stable hierarchical code
//!   derived from a shared reference hierarchy, with longest-prefix matching
//!   and deterministic disambiguation
//! - **Document numbering**: sequential, configuration-driven numbers
//!   (prefix + zero-padded counter + suffix) per tenant, per series, and per
//!   fiscal-year window
//! - **Derived balance tracking**: cash/bank ledgers are classified by a
//!   single predicate and kept in sync with a derived amount-transactions
//!   table, including an idempotent backfill for pre-existing data
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage; uniqueness and counter atomicity live at the storage boundary
//!
//! ## Quick Start
//!
//! ```rust
//! use masters_core::{
//!     HierarchyPath, HierarchyTable, MastersEngine, NewLedger, utils::MemoryStorage,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> masters_core::MastersResult<()> {
//! let mut engine = MastersEngine::new(HierarchyTable::builtin(), MemoryStorage::new());
//!
//! let path = HierarchyPath::new("Assets", "Cash and Bank Balances").sub_group_1("Cash");
//! let ledger = engine
//!     .create_ledger(NewLedger::new("tenant-1", "Petty Cash", path).opening_balance("2500"))
//!     .await?;
//! assert!(ledger.code.is_some());
//! # Ok(())
//! # }
//! ```

pub mod amounts;
pub mod coding;
pub mod engine;
pub mod hierarchy;
pub mod numbering;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use amounts::{is_cash_or_bank_ledger, TransactionSync};
pub use coding::{CodeAssigner, HierarchyPath, NewLedger};
pub use engine::MastersEngine;
pub use hierarchy::HierarchyTable;
pub use numbering::SequenceAllocator;
pub use traits::*;
pub use types::*;
