//! Summary report command implementation

use anyhow::{bail, Result};
use serde_json::json;

use consorcio_core::{badge_for_category, views, ExpenseFilter, StoreClient};

use super::{store_from_env, truncate};

pub async fn cmd_summary(building: &str, month: Option<&str>, json: bool) -> Result<()> {
    let store = store_from_env()?;
    cmd_summary_with(&store, building, month, json).await
}

pub async fn cmd_summary_with(
    store: &StoreClient,
    building: &str,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let months = store.reporting_months(building).await?;
    let month = match month {
        Some(month) => month.to_string(),
        None => views::default_month(&months),
    };

    let mut filter = ExpenseFilter::building(building);
    if month != views::ALL_MONTHS {
        filter = filter.with_month(&month);
    }
    let expenses = store.list_expenses(&filter).await?;

    let total = views::total(expenses.iter());
    let units = store
        .get_building(building)
        .await?
        .map(|b| b.total_units)
        .filter(|units| *units > 0);
    let per_unit = units.map(|units| total / units as f64);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "building_id": building,
                "month": month,
                "month_label": views::format_month(&month),
                "expense_count": expenses.len(),
                "total": total,
                "per_unit": per_unit,
                "available_months": months,
            }))?
        );
        return Ok(());
    }

    if expenses.is_empty() && months.is_empty() {
        bail!("No expenses recorded for building '{}'", building);
    }

    println!();
    println!("🏢 Expense summary: {}", views::format_month(&month));
    println!("   ─────────────────────────────────────────");
    for expense in &expenses {
        let description = expense.description.as_deref().unwrap_or("(no description)");
        let provider = expense.provider_name.as_deref().unwrap_or("-");
        let badge = badge_for_category(expense.provider_category.as_deref());
        println!(
            "   ${:>12.2}  {:<30}  {:<20}  [{}]",
            expense.amount,
            truncate(description, 30),
            truncate(provider, 20),
            badge
        );
    }
    println!("   ─────────────────────────────────────────");
    println!("   Expenses: {}", expenses.len());
    println!("   Total: ${:.2}", total);
    if let Some(per_unit) = per_unit {
        println!("   Per unit: ${:.2}", per_unit);
    }
    if !months.is_empty() {
        println!("   Months on record: {}", months.join(", "));
    }
    println!();

    Ok(())
}
