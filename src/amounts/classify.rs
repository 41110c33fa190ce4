//! Ledger classification predicate

use crate::types::Ledger;

/// Group name marking the cash/bank branch of the chart
const CASH_AND_BANK_GROUP: &str = "cash and bank balances";

/// Sub-group keywords that qualify a ledger for balance tracking
const SUB_GROUP_KEYWORDS: [&str; 4] = ["cash", "bank", "cash-in-hand", "bank accounts"];

/// Whether a ledger represents a cash or bank account eligible for balance
/// tracking.
///
/// True iff the category is asset-like, the group is under "Cash and Bank
/// Balances", and the first sub-group names cash or bank. This predicate is
/// the single source of truth: the synchronizer consults it before creating
/// derived rows and the storage layer re-checks it on every
/// amount-transaction write, so the two can never disagree.
pub fn is_cash_or_bank_ledger(ledger: &Ledger) -> bool {
    is_asset_category(&ledger.category)
        && has_cash_and_bank_group(&ledger.group)
        && is_cash_or_bank_sub_group(&ledger.sub_group_1)
}

fn is_asset_category(category: &str) -> bool {
    let category = category.trim();
    category.eq_ignore_ascii_case("asset") || category.eq_ignore_ascii_case("assets")
}

fn has_cash_and_bank_group(group: &str) -> bool {
    group.to_lowercase().contains(CASH_AND_BANK_GROUP)
}

fn is_cash_or_bank_sub_group(sub_group: &str) -> bool {
    let sub_group = sub_group.trim().to_lowercase();
    if sub_group.is_empty() {
        return false;
    }
    sub_group == "cash"
        || sub_group == "bank"
        || SUB_GROUP_KEYWORDS
            .iter()
            .any(|keyword| sub_group.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ledger(category: &str, group: &str, sub_group_1: &str) -> Ledger {
        Ledger {
            id: "l1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Test".to_string(),
            category: category.to_string(),
            group: group.to_string(),
            sub_group_1: sub_group_1.to_string(),
            sub_group_2: String::new(),
            sub_group_3: String::new(),
            ledger_type: String::new(),
            code: None,
            additional_data: HashMap::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn qualifying_ledgers() {
        assert!(is_cash_or_bank_ledger(&ledger(
            "Asset",
            "Cash and Bank Balances",
            "Bank"
        )));
        assert!(is_cash_or_bank_ledger(&ledger(
            "Assets",
            "Cash and Bank Balances",
            "Cash"
        )));
        assert!(is_cash_or_bank_ledger(&ledger(
            "ASSETS",
            "Current Assets / Cash and Bank Balances",
            "Cash-in-Hand"
        )));
        assert!(is_cash_or_bank_ledger(&ledger(
            "assets",
            "cash and bank balances",
            "Bank Accounts"
        )));
    }

    #[test]
    fn non_qualifying_ledgers() {
        // Wrong category, matching group and sub-group.
        assert!(!is_cash_or_bank_ledger(&ledger(
            "Liability",
            "Cash and Bank Balances",
            "Cash"
        )));
        // Wrong group.
        assert!(!is_cash_or_bank_ledger(&ledger(
            "Assets",
            "Current Assets",
            "Cash"
        )));
        // Wrong sub-group.
        assert!(!is_cash_or_bank_ledger(&ledger(
            "Assets",
            "Cash and Bank Balances",
            "Sundry Debtors"
        )));
        // Missing sub-group.
        assert!(!is_cash_or_bank_ledger(&ledger(
            "Assets",
            "Cash and Bank Balances",
            ""
        )));
    }
}
