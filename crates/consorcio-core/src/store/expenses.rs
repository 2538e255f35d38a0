//! Monthly expense operations
//!
//! Expenses are bulk-inserted from the admin form and never updated or
//! deleted. Every list read is scoped to a building; the store is never
//! asked for an unscoped expense listing.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};
use crate::views;

use super::StoreClient;

const TABLE: &str = "expenses";

/// Reporting months must be `YYYY-MM`; enforced here, at the boundary
/// closest to persistence.
fn reporting_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}$").expect("static regex"))
}

/// Check a reporting-month string against the canonical `YYYY-MM` form.
pub fn validate_reporting_month(month: &str) -> Result<()> {
    if reporting_month_re().is_match(month) {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "Invalid reporting month '{}' (expected YYYY-MM)",
            month
        )))
    }
}

/// Filter for expense list reads
///
/// A building id is always required; the month is optional and matches
/// the canonical `expense_reporting_month` field exactly.
#[derive(Debug, Clone)]
pub struct ExpenseFilter {
    pub building_id: String,
    pub month: Option<String>,
}

impl ExpenseFilter {
    pub fn building(building_id: &str) -> Self {
        Self {
            building_id: building_id.to_string(),
            month: None,
        }
    }

    pub fn with_month(mut self, month: &str) -> Self {
        self.month = Some(month.to_string());
        self
    }
}

impl StoreClient {
    /// List a building's expenses, optionally narrowed to one reporting
    /// month, newest first.
    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        if filter.building_id.trim().is_empty() {
            return Err(Error::InvalidData(
                "A building id is required to list expenses".to_string(),
            ));
        }
        let mut query = vec![
            ("select", "*".to_string()),
            ("building_id", format!("eq.{}", filter.building_id)),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(month) = &filter.month {
            validate_reporting_month(month)?;
            query.push(("expense_reporting_month", format!("eq.{}", month)));
        }
        self.select(TABLE, &query).await
    }

    /// Distinct reporting months for a building, most recent first.
    ///
    /// This is the dropdown variant of the expense fetcher: the result
    /// collapses to month identifiers instead of full records.
    pub async fn reporting_months(&self, building_id: &str) -> Result<Vec<String>> {
        if building_id.trim().is_empty() {
            return Err(Error::InvalidData(
                "A building id is required to list reporting months".to_string(),
            ));
        }
        let query = vec![
            ("select", "expense_reporting_month".to_string()),
            ("building_id", format!("eq.{}", building_id)),
        ];

        #[derive(serde::Deserialize)]
        struct MonthRow {
            expense_reporting_month: String,
        }

        let rows: Vec<MonthRow> = self.select(TABLE, &query).await?;
        Ok(views::unique_months(
            rows.iter().map(|r| r.expense_reporting_month.as_str()),
        ))
    }

    /// Bulk-insert expenses after validating every row.
    ///
    /// Validation failures reject the whole submission; nothing is
    /// persisted.
    pub async fn insert_expenses(&self, rows: &[NewExpense]) -> Result<Vec<Expense>> {
        if rows.is_empty() {
            return Err(Error::InvalidData(
                "No expenses to insert".to_string(),
            ));
        }
        for (index, row) in rows.iter().enumerate() {
            validate_new_expense(row)
                .map_err(|e| Error::InvalidData(format!("Expense {}: {}", index + 1, e)))?;
        }
        self.insert(TABLE, rows).await
    }
}

fn validate_new_expense(row: &NewExpense) -> Result<()> {
    if row.building_id.trim().is_empty() {
        return Err(Error::InvalidData("Missing building_id".to_string()));
    }
    if !row.amount.is_finite() {
        return Err(Error::InvalidData("Amount is not a finite number".to_string()));
    }
    validate_reporting_month(&row.expense_reporting_month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporting_month_format() {
        assert!(validate_reporting_month("2024-11").is_ok());
        assert!(validate_reporting_month("2024-1").is_err());
        assert!(validate_reporting_month("24-11").is_err());
        assert!(validate_reporting_month("2024-11-01").is_err());
        assert!(validate_reporting_month("noviembre").is_err());
    }

    #[test]
    fn new_expense_validation() {
        let mut row = NewExpense {
            amount: 100.5,
            description: None,
            building_id: "b1".to_string(),
            provider_id: None,
            provider_name: None,
            provider_category: None,
            expense_reporting_month: "2024-11".to_string(),
        };
        assert!(validate_new_expense(&row).is_ok());

        row.building_id = " ".to_string();
        assert!(validate_new_expense(&row).is_err());

        row.building_id = "b1".to_string();
        row.amount = f64::NAN;
        assert!(validate_new_expense(&row).is_err());
    }
}
