//! Validation utilities

use crate::traits::LedgerValidator;
use crate::types::*;

/// Validate that a tenant identifier is usable as a scoping key
pub fn validate_tenant_id(tenant_id: &str) -> MastersResult<()> {
    if tenant_id.trim().is_empty() {
        return Err(MastersError::Validation(
            "Tenant ID cannot be empty".to_string(),
        ));
    }

    if tenant_id.len() > 64 {
        return Err(MastersError::Validation(
            "Tenant ID cannot exceed 64 characters".to_string(),
        ));
    }

    if !tenant_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MastersError::Validation(
            "Tenant ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that a ledger name is valid
pub fn validate_ledger_name(name: &str) -> MastersResult<()> {
    if name.trim().is_empty() {
        return Err(MastersError::Validation(
            "Ledger name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(MastersError::Validation(
            "Ledger name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a numbering series name is valid
pub fn validate_series_name(name: &str) -> MastersResult<()> {
    if name.trim().is_empty() {
        return Err(MastersError::Validation(
            "Series name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(MastersError::Validation(
            "Series name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced ledger validator with detailed checks
pub struct EnhancedLedgerValidator;

impl LedgerValidator for EnhancedLedgerValidator {
    fn validate_ledger(&self, ledger: &Ledger) -> MastersResult<()> {
        validate_tenant_id(&ledger.tenant_id)?;
        validate_ledger_name(&ledger.name)?;

        if ledger.category.trim().is_empty() || ledger.group.trim().is_empty() {
            return Err(MastersError::Validation(
                "Ledger must have a category and a group".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_rules() {
        assert!(validate_tenant_id("acme-retail_01").is_ok());
        assert!(validate_tenant_id("").is_err());
        assert!(validate_tenant_id("   ").is_err());
        assert!(validate_tenant_id("bad tenant").is_err());
        assert!(validate_tenant_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_ledger_name("Petty Cash").is_ok());
        assert!(validate_ledger_name("").is_err());
        assert!(validate_ledger_name(&"x".repeat(101)).is_err());

        assert!(validate_series_name("Credit Note B2B").is_ok());
        assert!(validate_series_name("  ").is_err());
    }
}
