//! ClickUp time tracking → cleaned accounting CSV + Markdown billing summary.

use std::collections::HashMap;

use chrono::NaiveDate;

pub mod archive;
pub mod process;
pub mod report;
pub mod transform;

pub const RAW_DIR: &str = "raw/clickup_billing";
pub const CLEANED_DIR: &str = "output/monthly_billing/cleaned";
pub const REPORTS_DIR: &str = "output/monthly_billing/reports";
pub const RAW_ARCHIVE_DIR: &str = "raw/clickup_billing/archive";
pub const OUTPUT_ARCHIVE_DIR: &str = "output/monthly_billing/archive";

/// One tracked time entry after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRecord {
    pub date: NaiveDate,
    /// `YYYY-MM` of `date`.
    pub month_year: String,
    pub client: String,
    pub name: String,
    pub billable_hours: f64,
    pub task: Option<String>,
    pub task_id: Option<String>,
    pub rate: f64,
    pub amount: f64,
}

/// Map a ClickUp category onto a client name; unknown categories pass through.
pub fn transform_category(category: &str, transforms: &HashMap<String, String>) -> String {
    transforms
        .get(category)
        .cloned()
        .unwrap_or_else(|| category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_fall_back_to_themselves() {
        let transforms = HashMap::from([("ACME-INT".to_string(), "Acme".to_string())]);
        assert_eq!(transform_category("ACME-INT", &transforms), "Acme");
        assert_eq!(transform_category("Globex", &transforms), "Globex");
        assert_eq!(transform_category("", &transforms), "");
    }
}
