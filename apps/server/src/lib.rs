//! # Stockroom Server
//!
//! HTTP API of the inventory and sales dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Server                                 │
//! │                                                                         │
//! │  Browser ───► axum Router ───► Services ───► stockroom-db ───► SQLite  │
//! │                   │                │                                    │
//! │                   │                └── stockroom-core (validation,      │
//! │                   │                    money, reports)                  │
//! │                   └── ApiError { error, code } on failure               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

use axum::routing::{get, post};
use axum::Router;

pub use crate::config::{ServerConfig, WriteMode};
pub use crate::state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/sales",
            get(routes::sales::list_sales)
                .post(routes::sales::record_sale)
                .delete(routes::sales::reverse_sale),
        )
        .route("/sales/export", get(routes::sales::export_sales))
        .route(
            "/inventory-items",
            get(routes::inventory::list_items).post(routes::inventory::create_item),
        )
        .route("/inventory-items/low-stock", get(routes::inventory::low_stock))
        .route("/inventory-items/reconcile", get(routes::inventory::reconcile))
        .route("/inventory-items/:id/restock", post(routes::inventory::restock_item))
        .route("/inventory-items/:id/ledger", get(routes::inventory::item_ledger))
        .route(
            "/expenses",
            get(routes::expenses::list_expenses).post(routes::expenses::create_expense),
        )
        .route("/overview", get(routes::overview::overview))
        .with_state(state)
}
