//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! Everything in this crate is a pure function over plain data. The
//! database crate feeds it rows, the server feeds it requests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Web Dashboard (out of tree)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    POST /sales, DELETE /sales, GET /sales, /inventory-items     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │ SaleStats │  │  requests │  │   │
//! │  │   │   Sale    │  │  parsing  │  │ Overview  │  │   dates   │  │   │
//! │  │   │  Ledger   │  │           │  │   CSV     │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, SaleRecord, LedgerEntry, Expense)
//! - [`money`] - Money type with integer arithmetic and exact decimal parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//! - [`report`] - Sale statistics, overview figures, reconciliation, CSV export
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let unit_price = Money::parse_decimal("100").unwrap();
//! let total = unit_price.multiply_quantity(5);
//! assert_eq!(total.to_string(), "500.00");
//! ```

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

/// Stock level below which an item is flagged for restocking.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Note written on the ledger entry that carries an item's opening stock.
pub const OPENING_STOCK_NOTE: &str = "Opening stock";

/// Note written on the compensating entry of a reversed sale.
pub const SALE_REVERSAL_NOTE: &str = "Sale reversal - Restoring stock";

/// Builds the note of the "out" entry written when an item is sold.
pub fn sale_note(item_name: &str) -> String {
    format!("Sale - {}", item_name)
}
