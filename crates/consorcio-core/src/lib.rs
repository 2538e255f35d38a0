//! Consorcio Core Library
//!
//! Shared functionality for the Consorcio building-expense
//! administration service:
//! - Typed records for buildings, providers, expenses, and projects
//! - Data-access functions against the remote hosted data store
//! - Filter-keyed query cache with stale-while-revalidate semantics
//! - Pure derived-view computations (months, filters, totals)
//! - Category-to-badge-style mapping for display grouping

pub mod badges;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod views;

/// Test utilities including the mock data-store server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use badges::{badge_for_category, BadgeStyle};
pub use cache::{QueryCache, QueryKey};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use models::{
    AmountInput, Building, Expense, NewExpense, NewProject, Project, ProjectPatch, Provider,
    ProviderCategory,
};
pub use store::{ExpenseFilter, StoreClient};
pub use views::{ViewState, ALL_MONTHS};
