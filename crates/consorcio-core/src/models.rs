//! Domain models for Consorcio

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed building
///
/// Buildings are created by administrators out-of-band; the application
/// only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub address: String,
    pub total_units: i64,
}

/// A vendor or service supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    /// Category name resolved by an application-side merge against
    /// `provider_categories`
    #[serde(default)]
    pub category_name: Option<String>,
}

/// Static reference data used to label providers and pick a badge style
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCategory {
    pub id: String,
    pub name: String,
}

/// A monthly common expense attributed to a reporting month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub description: Option<String>,
    pub building_id: String,
    pub provider_id: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub provider_category: Option<String>,
    /// Calendar month the expense is attributed to, in `YYYY-MM` form,
    /// independent of `created_at`
    pub expense_reporting_month: String,
    pub created_at: DateTime<Utc>,
}

/// An expense row to be inserted (no id or timestamp yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub description: Option<String>,
    pub building_id: String,
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_category: Option<String>,
    pub expense_reporting_month: String,
}

/// A one-off project expense ("gasto puntual")
///
/// Unlike monthly expenses, projects have a full CRUD lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub cost: f64,
    pub description: Option<String>,
    /// Whether the project is still active
    pub status: bool,
    pub provider_id: Option<String>,
    pub building_id: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub provider_category: Option<String>,
    #[serde(default)]
    pub building_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A project row to be inserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub cost: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub status: bool,
    pub provider_id: Option<String>,
    pub building_id: Option<String>,
}

/// Partial update for a project; only present fields are patched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.cost.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.provider_id.is_none()
            && self.building_id.is_none()
    }
}

/// Monetary amount as submitted by a form: either a JSON number or a
/// numeric string ("100.50")
///
/// Form clients historically submit amounts as strings; both shapes are
/// accepted and coerced, and anything that does not parse to a finite
/// number is a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Coerce to a finite f64, or `None` if the input is not numeric.
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            AmountInput::Number(n) => *n,
            AmountInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_input_coerces_numeric_strings() {
        let input: AmountInput = serde_json::from_str("\"100.50\"").unwrap();
        assert_eq!(input.as_finite(), Some(100.50));
    }

    #[test]
    fn amount_input_accepts_numbers() {
        let input: AmountInput = serde_json::from_str("50").unwrap();
        assert_eq!(input.as_finite(), Some(50.0));
    }

    #[test]
    fn amount_input_rejects_garbage() {
        let input: AmountInput = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(input.as_finite(), None);

        let empty: AmountInput = serde_json::from_str("\"\"").unwrap();
        assert_eq!(empty.as_finite(), None);
    }

    #[test]
    fn project_patch_empty_detection() {
        assert!(ProjectPatch::default().is_empty());
        let patch = ProjectPatch {
            cost: Some(10.0),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
