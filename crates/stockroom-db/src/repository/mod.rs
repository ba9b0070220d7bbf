//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.inventory()   InventoryRepository   items, opening stock, restock  │
//! │  db.sales()       SaleRepository        sales, joined queries,          │
//! │                                         atomic record / reverse         │
//! │  db.ledger()      LedgerRepository      stock movements, balances       │
//! │  db.expenses()    ExpenseRepository     expenses                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multi-table writes share the connection-level helpers
//! `inventory::apply_movement` and `ledger::insert_entry` so every
//! transaction moves stock the same way.

pub mod expense;
pub mod inventory;
pub mod ledger;
pub mod sale;
