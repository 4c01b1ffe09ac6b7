//! ADP personnel spreadsheet → staging table → weekly active headcount.

use crate::config::AdpConfig;

pub mod aggregate;
pub mod load;
pub mod pipeline;
pub mod transform;

/// Which of the two tables a snapshot-date check or delete addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFamily {
    /// Row-level snapshot rows ("bronze").
    Staging,
    /// Per-department headcount facts ("silver").
    Summary,
}

impl TableFamily {
    /// The configured (unresolved) table name for this family.
    pub fn configured_name(self, adp: &AdpConfig) -> &str {
        match self {
            TableFamily::Staging => &adp.bronze_table,
            TableFamily::Summary => &adp.silver_table,
        }
    }
}

impl std::fmt::Display for TableFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableFamily::Staging => f.write_str("staging"),
            TableFamily::Summary => f.write_str("summary"),
        }
    }
}
