//! Hierarchy path selection for a new ledger

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{MastersError, MastersResult};

/// The hierarchy selection made for a new ledger.
///
/// Category and group are always present; the deeper levels are optional and
/// must be filled top-down (a sub-group-2 without a sub-group-1 is invalid).
/// A ledger created at group level simply leaves the rest unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPath {
    pub category: String,
    pub group: String,
    pub sub_group_1: Option<String>,
    pub sub_group_2: Option<String>,
    pub sub_group_3: Option<String>,
    pub ledger_type: Option<String>,
}

impl HierarchyPath {
    /// Create a group-level path
    pub fn new(category: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            group: group.into(),
            sub_group_1: None,
            sub_group_2: None,
            sub_group_3: None,
            ledger_type: None,
        }
    }

    pub fn sub_group_1(mut self, value: impl Into<String>) -> Self {
        self.sub_group_1 = Some(value.into());
        self
    }

    pub fn sub_group_2(mut self, value: impl Into<String>) -> Self {
        self.sub_group_2 = Some(value.into());
        self
    }

    pub fn sub_group_3(mut self, value: impl Into<String>) -> Self {
        self.sub_group_3 = Some(value.into());
        self
    }

    pub fn ledger_type(mut self, value: impl Into<String>) -> Self {
        self.ledger_type = Some(value.into());
        self
    }

    /// The six levels in order, shallowest first; `None` for unset levels
    pub fn levels(&self) -> [Option<&str>; 6] {
        [
            Some(self.category.as_str()),
            Some(self.group.as_str()),
            self.sub_group_1.as_deref(),
            self.sub_group_2.as_deref(),
            self.sub_group_3.as_deref(),
            self.ledger_type.as_deref(),
        ]
    }

    /// Number of specified levels, at least 2 for a valid path
    pub fn depth(&self) -> usize {
        self.levels()
            .iter()
            .take_while(|level| level.is_some())
            .count()
    }

    /// Validate that the path is well-formed: category and group are
    /// non-blank, set levels are non-blank, and levels are filled top-down
    /// with no gaps.
    pub fn validate(&self) -> MastersResult<()> {
        if self.category.trim().is_empty() {
            return Err(MastersError::Validation(
                "Hierarchy path category cannot be empty".to_string(),
            ));
        }
        if self.group.trim().is_empty() {
            return Err(MastersError::Validation(
                "Hierarchy path group cannot be empty".to_string(),
            ));
        }

        let mut seen_unset = false;
        for level in &self.levels()[2..] {
            match level {
                Some(value) if value.trim().is_empty() => {
                    return Err(MastersError::Validation(
                        "Hierarchy path levels cannot be blank when set".to_string(),
                    ));
                }
                Some(_) if seen_unset => {
                    return Err(MastersError::Validation(
                        "Hierarchy path levels must be filled top-down without gaps".to_string(),
                    ));
                }
                Some(_) => {}
                None => seen_unset = true,
            }
        }

        Ok(())
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for level in self.levels().into_iter().flatten() {
            if !first {
                write!(f, " > ")?;
            }
            f.write_str(level)?;
            first = false;
        }
        Ok(())
    }
}
