//! Reference hierarchy store
//!
//! An immutable, tenant-independent table mapping chart-of-accounts paths to
//! pre-assigned hierarchical codes. The table is loaded once (from the
//! builtin reference dataset or an external source) and is read-only from
//! then on.

use crate::coding::HierarchyPath;
use crate::types::HierarchyEntry;

/// The reference hierarchy table
#[derive(Debug, Clone, Default)]
pub struct HierarchyTable {
    entries: Vec<HierarchyEntry>,
}

impl HierarchyTable {
    /// Build a table from externally loaded entries
    pub fn from_entries(entries: Vec<HierarchyEntry>) -> Self {
        Self { entries }
    }

    /// The builtin reference dataset covering the standard chart used by
    /// small-business onboarding
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HierarchyEntry] {
        &self.entries
    }

    /// Longest-prefix lookup for a path.
    ///
    /// Tries the fully specified path first, then progressively drops
    /// trailing levels (ledger type, sub-group-3, sub-group-2, sub-group-1)
    /// until an entry matches; deeper, unspecified levels inherit the nearest
    /// ancestor's code. When several entries match at the same depth the
    /// lowest code string wins, so repeated lookups are deterministic.
    pub fn lookup(&self, path: &HierarchyPath) -> Option<&HierarchyEntry> {
        for depth in (2..=path.depth()).rev() {
            let matched = self
                .entries
                .iter()
                .filter(|entry| matches_at(entry, path, depth))
                .min_by(|a, b| a.code.cmp(&b.code));
            if matched.is_some() {
                return matched;
            }
        }
        None
    }
}

/// Whether `entry` sits at exactly `depth` levels and agrees with the first
/// `depth` levels of `path`. Comparison is on trimmed, ASCII-case-folded
/// text.
fn matches_at(entry: &HierarchyEntry, path: &HierarchyPath, depth: usize) -> bool {
    if entry.depth() != depth {
        return false;
    }
    let entry_levels = entry.levels();
    let path_levels = path.levels();
    (0..depth).all(|i| match path_levels[i] {
        Some(value) => entry_levels[i].trim().eq_ignore_ascii_case(value.trim()),
        None => false,
    })
}

fn entry(
    category: &str,
    group: &str,
    sub_group_1: &str,
    sub_group_2: &str,
    sub_group_3: &str,
    ledger_type: &str,
    code: &str,
) -> HierarchyEntry {
    HierarchyEntry {
        category: category.to_string(),
        group: group.to_string(),
        sub_group_1: sub_group_1.to_string(),
        sub_group_2: sub_group_2.to_string(),
        sub_group_3: sub_group_3.to_string(),
        ledger_type: ledger_type.to_string(),
        code: code.to_string(),
    }
}

fn builtin_entries() -> Vec<HierarchyEntry> {
    vec![
        // Liabilities
        entry("Liability", "Capital Account", "", "", "", "", "010101"),
        entry("Liability", "Reserves and Surplus", "", "", "", "", "010102"),
        entry("Liability", "Long-term borrowings", "", "", "", "", "01010304"),
        entry(
            "Liability",
            "Long-term borrowings",
            "Secured Loans",
            "",
            "",
            "",
            "0101030406",
        ),
        entry(
            "Liability",
            "Long-term borrowings",
            "Unsecured Loans",
            "",
            "",
            "",
            "0101030407",
        ),
        entry("Liability", "Current Liabilities", "", "", "", "", "010105"),
        entry(
            "Liability",
            "Current Liabilities",
            "Sundry Creditors",
            "",
            "",
            "",
            "01010501",
        ),
        entry(
            "Liability",
            "Current Liabilities",
            "Duties and Taxes",
            "",
            "",
            "",
            "01010502",
        ),
        // Assets
        entry("Assets", "Fixed Assets", "", "", "", "", "010201"),
        entry("Assets", "Investments", "", "", "", "", "010202"),
        entry("Assets", "Current Assets", "", "", "", "", "010203"),
        entry(
            "Assets",
            "Current Assets",
            "Sundry Debtors",
            "",
            "",
            "",
            "01020301",
        ),
        entry(
            "Assets",
            "Current Assets",
            "Stock-in-Hand",
            "",
            "",
            "",
            "01020302",
        ),
        entry("Assets", "Cash and Bank Balances", "", "", "", "", "010204"),
        entry(
            "Assets",
            "Cash and Bank Balances",
            "Cash",
            "",
            "",
            "",
            "01020401",
        ),
        entry(
            "Assets",
            "Cash and Bank Balances",
            "Cash",
            "Cash-in-Hand",
            "",
            "",
            "0102040101",
        ),
        entry(
            "Assets",
            "Cash and Bank Balances",
            "Bank",
            "",
            "",
            "",
            "01020402",
        ),
        entry(
            "Assets",
            "Cash and Bank Balances",
            "Bank",
            "Bank Accounts",
            "",
            "",
            "0102040201",
        ),
        entry(
            "Assets",
            "Cash and Bank Balances",
            "Bank",
            "Bank Accounts",
            "",
            "Current Account",
            "010204020101",
        ),
        entry(
            "Assets",
            "Cash and Bank Balances",
            "Bank",
            "Bank Accounts",
            "",
            "Savings Account",
            "010204020102",
        ),
        // Income
        entry("Income", "Direct Income", "", "", "", "", "010301"),
        entry("Income", "Indirect Income", "", "", "", "", "010302"),
        entry(
            "Income",
            "Direct Income",
            "Sales Accounts",
            "",
            "",
            "",
            "01030101",
        ),
        // Expenses
        entry("Expenses", "Direct Expenses", "", "", "", "", "010401"),
        entry("Expenses", "Indirect Expenses", "", "", "", "", "010402"),
        entry(
            "Expenses",
            "Direct Expenses",
            "Purchase Accounts",
            "",
            "",
            "",
            "01040101",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_populated() {
        let table = HierarchyTable::builtin();
        assert!(!table.is_empty());
    }

    #[test]
    fn exact_match_wins() {
        let table = HierarchyTable::builtin();
        let path = HierarchyPath::new("Assets", "Cash and Bank Balances")
            .sub_group_1("Bank")
            .sub_group_2("Bank Accounts");
        assert_eq!(table.lookup(&path).unwrap().code, "0102040201");
    }

    #[test]
    fn longest_prefix_falls_back_to_ancestor() {
        let table = HierarchyTable::builtin();
        // No entry exists for this leaf; the sub-group-1 entry's code is
        // inherited.
        let path = HierarchyPath::new("Liability", "Long-term borrowings")
            .sub_group_1("Secured Loans")
            .sub_group_2("Term Loans")
            .sub_group_3("From Banks");
        assert_eq!(table.lookup(&path).unwrap().code, "0101030406");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let table = HierarchyTable::builtin();
        let path = HierarchyPath::new("assets", "CASH AND BANK BALANCES").sub_group_1("cash");
        assert_eq!(table.lookup(&path).unwrap().code, "01020401");
    }

    #[test]
    fn no_match_at_any_depth_returns_none() {
        let table = HierarchyTable::builtin();
        let path = HierarchyPath::new("Contingent", "Off Balance Sheet");
        assert!(table.lookup(&path).is_none());
    }

    #[test]
    fn ties_break_on_lowest_code() {
        let table = HierarchyTable::from_entries(vec![
            entry("Assets", "Current Assets", "", "", "", "", "0202"),
            entry("Assets", "Current Assets", "", "", "", "", "0101"),
        ]);
        let path = HierarchyPath::new("Assets", "Current Assets");
        assert_eq!(table.lookup(&path).unwrap().code, "0101");
    }
}
