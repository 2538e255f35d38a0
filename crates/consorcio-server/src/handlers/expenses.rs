//! Monthly expense handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json_body;
use crate::{AppError, AppState};
use consorcio_core::{
    views, AmountInput, Expense, ExpenseFilter, NewExpense, QueryKey,
};

/// Query parameters for expense list reads
#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    pub building_id: Option<String>,
    /// Reporting month in YYYY-MM form
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
}

/// GET /api/expenses - List a building's expenses, optionally narrowed
/// to one reporting month
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<ExpenseListResponse>, AppError> {
    let building_id = require_building(params.building_id.as_deref())?;

    let key = QueryKey::ExpenseList {
        building_id: building_id.to_string(),
        month: params.month.clone(),
    };
    let filter = build_filter(building_id, params.month.as_deref());
    let store = state.store.clone();
    let expenses = state
        .cache
        .get_or_fetch(&key, move || async move { store.list_expenses(&filter).await })
        .await?;

    Ok(Json(ExpenseListResponse { expenses }))
}

#[derive(Serialize)]
pub struct MonthListResponse {
    pub months: Vec<String>,
}

/// GET /api/expenses/months - Distinct reporting months for a
/// building's dropdown, most recent first
pub async fn list_expense_months(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<MonthListResponse>, AppError> {
    let building_id = require_building(params.building_id.as_deref())?;

    let key = QueryKey::ExpenseMonths {
        building_id: building_id.to_string(),
    };
    let store = state.store.clone();
    let owner = building_id.to_string();
    let months: Vec<String> = state
        .cache
        .get_or_fetch(&key, move || async move {
            store.reporting_months(&owner).await
        })
        .await?;

    // The most recent month is what a consumer opens next; warm it.
    if let Some(latest) = months.first() {
        let list_key = QueryKey::ExpenseList {
            building_id: building_id.to_string(),
            month: Some(latest.clone()),
        };
        let filter = build_filter(building_id, Some(latest));
        let store = state.store.clone();
        state.cache.prefetch(&list_key, move || async move {
            store.list_expenses(&filter).await
        });
    }

    Ok(Json(MonthListResponse { months }))
}

#[derive(Serialize)]
pub struct ExpenseSummaryResponse {
    pub building_id: String,
    /// The month the summary covers ("all" when unfiltered)
    pub month: String,
    /// Display label, e.g. "November 2024"
    pub month_label: String,
    pub total: f64,
    /// Equal share per apartment, when the building's unit count is known
    pub per_unit: Option<f64>,
    pub available_months: Vec<String>,
}

/// GET /api/expenses/summary - Month-filtered totals and the
/// per-apartment share residents see
pub async fn get_expense_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<ExpenseSummaryResponse>, AppError> {
    let building_id = require_building(params.building_id.as_deref())?;

    let months_key = QueryKey::ExpenseMonths {
        building_id: building_id.to_string(),
    };
    let store = state.store.clone();
    let owner = building_id.to_string();
    let available_months: Vec<String> = state
        .cache
        .get_or_fetch(&months_key, move || async move {
            store.reporting_months(&owner).await
        })
        .await?;

    // No explicit selection: auto-select the most recent month.
    let month = match params.month {
        Some(month) => month,
        None => views::default_month(&available_months),
    };
    let month_filter = (month != views::ALL_MONTHS).then(|| month.clone());

    let list_key = QueryKey::ExpenseList {
        building_id: building_id.to_string(),
        month: month_filter.clone(),
    };
    let filter = build_filter(building_id, month_filter.as_deref());
    let store = state.store.clone();
    let expenses: Vec<Expense> = state
        .cache
        .get_or_fetch(&list_key, move || async move {
            store.list_expenses(&filter).await
        })
        .await?;

    let total = views::total(expenses.iter());
    let per_unit = state
        .store
        .get_building(building_id)
        .await?
        .filter(|b| b.total_units > 0)
        .map(|b| total / b.total_units as f64);

    Ok(Json(ExpenseSummaryResponse {
        building_id: building_id.to_string(),
        month_label: views::format_month(&month),
        month,
        total,
        per_unit,
        available_months,
    }))
}

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
pub struct AddExpenseRequest {
    pub amount: Option<AmountInput>,
    pub description: Option<String>,
    pub building_id: Option<String>,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    pub provider_category: Option<String>,
    pub expense_reporting_month: Option<String>,
}

impl AddExpenseRequest {
    fn into_new_expense(self) -> Result<NewExpense, AppError> {
        let building_id = self
            .building_id
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("Missing building_id"))?;
        let amount = self
            .amount
            .as_ref()
            .and_then(AmountInput::as_finite)
            .ok_or_else(|| AppError::bad_request("Missing or non-numeric amount"))?;
        let month = self
            .expense_reporting_month
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("Missing expense_reporting_month"))?;

        Ok(NewExpense {
            amount,
            description: self.description,
            building_id,
            provider_id: self.provider_id,
            provider_name: self.provider_name,
            provider_category: self.provider_category,
            expense_reporting_month: month,
        })
    }
}

#[derive(Serialize)]
pub struct AddExpenseResponse {
    pub success: bool,
    pub message: String,
    pub expense: Expense,
}

/// POST /api/expenses/add - Insert one expense
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AddExpenseResponse>, AppError> {
    let req: AddExpenseRequest = read_json_body(request).await?;
    let row = req.into_new_expense()?;

    let mut created = state.store.insert_expenses(std::slice::from_ref(&row)).await?;
    let expense = created
        .pop()
        .ok_or_else(|| AppError::internal(anyhow::anyhow!("Store returned no expense")))?;

    state.cache.invalidate_resource("expenses").await;

    Ok(Json(AddExpenseResponse {
        success: true,
        message: "Expense recorded".to_string(),
        expense,
    }))
}

#[derive(Serialize)]
pub struct AddExpensesBulkResponse {
    pub success: bool,
    pub message: String,
    pub expenses: Vec<Expense>,
}

/// POST /api/expenses/add-bulk - Insert N expenses in one submission
pub async fn add_expenses_bulk(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AddExpensesBulkResponse>, AppError> {
    let reqs: Vec<AddExpenseRequest> = read_json_body(request).await?;
    if reqs.is_empty() {
        return Err(AppError::bad_request("No expenses submitted"));
    }

    let rows = reqs
        .into_iter()
        .map(AddExpenseRequest::into_new_expense)
        .collect::<Result<Vec<_>, _>>()?;

    let expenses = state.store.insert_expenses(&rows).await?;
    state.cache.invalidate_resource("expenses").await;

    Ok(Json(AddExpensesBulkResponse {
        success: true,
        message: format!("{} expenses recorded", expenses.len()),
        expenses,
    }))
}

fn require_building(building_id: Option<&str>) -> Result<&str, AppError> {
    building_id
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing building_id"))
}

fn build_filter(building_id: &str, month: Option<&str>) -> ExpenseFilter {
    let filter = ExpenseFilter::building(building_id);
    match month {
        Some(month) => filter.with_month(month),
        None => filter,
    }
}
