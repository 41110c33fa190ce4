//! Code assignment engine

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::coding::HierarchyPath;
use crate::hierarchy::HierarchyTable;
use crate::traits::{DefaultLedgerValidator, LedgerValidator, MastersStorage};
use crate::types::*;

/// Highest disambiguation suffix; `.001` through `.999`
const SUFFIX_CAP: u32 = 999;

/// Input for creating a new ledger
#[derive(Debug, Clone)]
pub struct NewLedger {
    pub tenant_id: String,
    pub name: String,
    pub path: HierarchyPath,
    pub additional_data: HashMap<String, String>,
}

impl NewLedger {
    pub fn new(
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        path: HierarchyPath,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            name: name.into(),
            path,
            additional_data: HashMap::new(),
        }
    }

    /// Record the opening balance answer under the conventional key
    pub fn opening_balance(mut self, value: impl Into<String>) -> Self {
        self.additional_data
            .insert(Ledger::OPENING_BALANCE_KEY.to_string(), value.into());
        self
    }

    pub fn additional_data(mut self, data: HashMap<String, String>) -> Self {
        self.additional_data = data;
        self
    }
}

/// Code assignment engine
///
/// Resolves a hierarchy path to the matching reference code and produces a
/// tenant-unique ledger code from it.
pub struct CodeAssigner<S: MastersStorage> {
    hierarchy: Arc<HierarchyTable>,
    pub(crate) storage: S,
    validator: Box<dyn LedgerValidator>,
}

impl<S: MastersStorage> CodeAssigner<S> {
    /// Create a new code assigner over the shared reference hierarchy
    pub fn new(hierarchy: Arc<HierarchyTable>, storage: S) -> Self {
        Self {
            hierarchy,
            storage,
            validator: Box::new(DefaultLedgerValidator),
        }
    }

    /// Create a new code assigner with a custom ledger validator
    pub fn with_validator(
        hierarchy: Arc<HierarchyTable>,
        storage: S,
        validator: Box<dyn LedgerValidator>,
    ) -> Self {
        Self {
            hierarchy,
            storage,
            validator,
        }
    }

    /// Resolve a path to a tenant-unique code without persisting anything.
    ///
    /// Pure over the current ledger rows; the caller must persist the ledger
    /// with the returned code inside the same transaction that enforces
    /// `(tenant_id, code)` uniqueness, or use [`CodeAssigner::create_ledger`]
    /// which handles the race for it.
    pub async fn assign(&self, tenant_id: &str, path: &HierarchyPath) -> MastersResult<String> {
        path.validate()?;
        let base = self.base_code(path)?;
        self.disambiguate(tenant_id, &base).await
    }

    /// Assign a code and insert the ledger, retrying on a lost uniqueness
    /// race.
    ///
    /// The storage unique constraint is authoritative: a concurrent insert of
    /// the same candidate fails with [`MastersError::DuplicateCode`] and the
    /// candidate is re-derived, bounded by the `.999` suffix cap.
    pub async fn create_ledger(&mut self, new: NewLedger) -> MastersResult<Ledger> {
        new.path.validate()?;
        let base = self.base_code(&new.path)?;

        for attempt in 0..=SUFFIX_CAP {
            let code = self.disambiguate(&new.tenant_id, &base).await?;
            let ledger = build_ledger(&new, code);
            self.validator.validate_ledger(&ledger)?;

            match self.storage.insert_ledger(&ledger).await {
                Ok(()) => return Ok(ledger),
                Err(MastersError::DuplicateCode(code)) => {
                    debug!(
                        tenant_id = %new.tenant_id,
                        %code,
                        attempt,
                        "lost code uniqueness race, re-deriving candidate"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Err(MastersError::CodeSpaceExhausted(base))
    }

    fn base_code(&self, path: &HierarchyPath) -> MastersResult<String> {
        self.hierarchy
            .lookup(path)
            .map(|entry| entry.code.clone())
            .ok_or_else(|| MastersError::NoHierarchyMatch(path.to_string()))
    }

    /// Make the matched reference code unique within the tenant.
    ///
    /// The base code is used as-is when free; otherwise a 3-digit `.NNN`
    /// suffix one past the highest existing value is appended.
    async fn disambiguate(&self, tenant_id: &str, base: &str) -> MastersResult<String> {
        let existing = self
            .storage
            .ledger_codes_with_prefix(tenant_id, base)
            .await?;

        if !existing.iter().any(|code| code == base) {
            return Ok(base.to_string());
        }

        let next = existing
            .iter()
            .filter_map(|code| numeric_suffix(code, base))
            .max()
            .unwrap_or(0)
            + 1;

        if next > SUFFIX_CAP {
            return Err(MastersError::CodeSpaceExhausted(base.to_string()));
        }

        Ok(format!("{base}.{next:03}"))
    }
}

fn build_ledger(new: &NewLedger, code: String) -> Ledger {
    let path = &new.path;
    Ledger {
        id: Uuid::new_v4().to_string(),
        tenant_id: new.tenant_id.clone(),
        name: new.name.clone(),
        category: path.category.clone(),
        group: path.group.clone(),
        sub_group_1: path.sub_group_1.clone().unwrap_or_default(),
        sub_group_2: path.sub_group_2.clone().unwrap_or_default(),
        sub_group_3: path.sub_group_3.clone().unwrap_or_default(),
        ledger_type: path.ledger_type.clone().unwrap_or_default(),
        code: Some(code),
        additional_data: new.additional_data.clone(),
        created_at: chrono::Utc::now().naive_utc(),
    }
}

/// Parse the numeric disambiguation suffix of `code` under `base`, if any
fn numeric_suffix(code: &str, base: &str) -> Option<u32> {
    let digits = code.strip_prefix(base)?.strip_prefix('.')?;
    if digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
