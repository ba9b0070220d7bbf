//! # HTTP Routes
//!
//! ```text
//! GET    /health                          liveness + database check
//! GET    /sales?dateFrom&dateTo&category  sales + stats
//! POST   /sales                           record a sale            (201)
//! DELETE /sales?id=                       reverse a sale
//! GET    /sales/export?...                CSV report
//! GET    /inventory-items                 items by name
//! POST   /inventory-items                 create item              (201)
//! GET    /inventory-items/low-stock       items below threshold
//! GET    /inventory-items/reconcile       counter vs ledger mismatches
//! POST   /inventory-items/:id/restock     add stock
//! GET    /inventory-items/:id/ledger      movements, newest first
//! GET    /expenses                        expenses, newest first
//! POST   /expenses                        record expense           (201)
//! GET    /overview                        dashboard figures
//! ```
//!
//! Malformed JSON bodies and query strings are answered with the same
//! `{ "error", "code" }` body as every other failure.

pub mod expenses;
pub mod health;
pub mod inventory;
pub mod overview;
pub mod sales;

use axum::extract::rejection::{JsonRejection, QueryRejection};

use crate::error::ApiError;

pub(crate) fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}
