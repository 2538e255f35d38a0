//! Derived-view computations
//!
//! Pure, side-effect-free transformations from fetched records to what
//! a dashboard renders: distinct reporting months, month-filtered
//! subsets, aggregate totals, and the per-view fetch state machine.
//!
//! Month identifiers are always the canonical `YYYY-MM` reporting
//! month, sorted descending (most recent first). Months are never
//! derived from raw timestamps for expenses; only projects, which have
//! no reporting-month field, fall back to their creation date.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{Expense, Project};

/// Sentinel month identifier meaning "no month filter"
pub const ALL_MONTHS: &str = "all";

/// A record that can be attributed to a reporting month and summed
pub trait MonthlyRecord {
    /// Canonical `YYYY-MM` month identifier, if the record has one
    fn reporting_month(&self) -> Option<String>;
    /// Monetary value used in aggregation
    fn value(&self) -> Option<f64>;
}

impl MonthlyRecord for Expense {
    fn reporting_month(&self) -> Option<String> {
        Some(self.expense_reporting_month.clone())
    }

    fn value(&self) -> Option<f64> {
        Some(self.amount)
    }
}

impl MonthlyRecord for Project {
    /// Projects have no reporting-month field; the month is the
    /// creation date truncated to its calendar month.
    fn reporting_month(&self) -> Option<String> {
        Some(self.created_at.format("%Y-%m").to_string())
    }

    fn value(&self) -> Option<f64> {
        Some(self.cost)
    }
}

/// Distinct month identifiers, sorted descending (most recent first).
pub fn unique_months<'a, I>(months: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let set: BTreeSet<&str> = months.into_iter().filter(|m| !m.is_empty()).collect();
    set.into_iter().rev().map(String::from).collect()
}

/// Distinct month identifiers present in a record collection.
pub fn months_of<T: MonthlyRecord>(records: &[T]) -> Vec<String> {
    let set: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.reporting_month())
        .filter(|m| !m.is_empty())
        .collect();
    set.into_iter().rev().collect()
}

/// The subset of records attributed to `selected`.
///
/// The sentinel [`ALL_MONTHS`] (or no selection at all, before a
/// default has been auto-selected) returns the full collection.
pub fn filter_by_month<'a, T: MonthlyRecord>(
    records: &'a [T],
    selected: Option<&str>,
) -> Vec<&'a T> {
    match selected {
        None | Some(ALL_MONTHS) => records.iter().collect(),
        Some(month) => records
            .iter()
            .filter(|r| r.reporting_month().as_deref() == Some(month))
            .collect(),
    }
}

/// The month auto-selected on first load: the most recent available,
/// or the sentinel when there are none.
pub fn default_month(months: &[String]) -> String {
    months
        .first()
        .cloned()
        .unwrap_or_else(|| ALL_MONTHS.to_string())
}

/// Sum of record values; a missing or non-finite value counts as zero
/// rather than propagating NaN.
pub fn total<'a, T, I>(records: I) -> f64
where
    T: MonthlyRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter_map(|r| r.value())
        .filter(|v| v.is_finite())
        .sum()
}

/// Reformat a canonical `YYYY-MM` identifier as "Month YYYY"
/// (locale-independent English month names). Inputs that do not parse
/// are returned unchanged.
pub fn format_month(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

/// Fetch state of a single filtered view.
///
/// Idle -> Loading -> Loaded | Errored. A loaded view re-enters
/// Loading when invalidated or when its filter changes; an errored
/// view stays errored until a new load begins.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(T),
    Errored(String),
}

impl<T> ViewState<T> {
    /// Enter Loading from any state (mount, filter change, refresh).
    pub fn begin_load(&mut self) {
        *self = ViewState::Loading;
    }

    /// Resolve a pending load.
    pub fn resolve(&mut self, result: Result<T, String>) {
        *self = match result {
            Ok(data) => ViewState::Loaded(data),
            Err(message) => ViewState::Errored(message),
        };
    }

    /// Invalidate loaded data, forcing a reload. Has no effect on a
    /// view that holds no data.
    pub fn invalidate(&mut self) {
        if matches!(self, ViewState::Loaded(_)) {
            *self = ViewState::Loading;
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}
