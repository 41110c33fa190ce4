//! Ledger code assignment
//!
//! Resolves a hierarchy path to its pre-assigned reference code and makes the
//! result unique within the tenant.

pub mod assign;
pub mod path;

pub use assign::{CodeAssigner, NewLedger};
pub use path::HierarchyPath;
