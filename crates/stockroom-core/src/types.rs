//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │   SaleRecord    │   │  LedgerEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  item_id (FK)   │   │  item_id (FK)   │──►    │
//! │  │  name, category │   │  quantity       │   │  entry_type     │       │
//! │  │  current_stock  │   │  unit_price     │   │  quantity       │       │
//! │  │  selling_price  │   │  total          │   │  total_amount   │       │
//! │  └─────────────────┘   │  sold_at        │   │  note           │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Expense      │   │ LedgerEntryType │                             │
//! │  │  amount_cents   │   │  In  / Out      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutability
//! - `InventoryItem.current_stock` only moves together with a ledger entry
//! - `SaleRecord` is immutable; reversal is a hard delete
//! - `LedgerEntry` is append-only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Inventory Item
// =============================================================================

/// A stocked item that can be sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the sale form and in reports.
    pub name: String,

    /// Free-form category ("Beverages", "Snacks", ...). Filters match exactly.
    pub category: String,

    /// Unit label ("pcs", "kg", "bottle").
    pub unit: String,

    /// Quantity on hand. Never negative.
    pub current_stock: i64,

    /// Price the item is normally sold at, in cents.
    pub selling_price_cents: Option<i64>,

    /// Purchase price in cents; fallback when no selling price is set.
    pub unit_price_cents: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Price suggested for a sale: selling price, else unit price.
    pub fn effective_price(&self) -> Option<Money> {
        self.selling_price_cents
            .or(self.unit_price_cents)
            .map(Money::from_cents)
    }

    /// Checks whether `quantity` can be taken from the current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }

    /// Checks whether the item sits below the restock threshold.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.current_stock < threshold
    }

    /// Minimal view embedded in sale responses.
    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
        }
    }
}

/// Minimal item view joined onto sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub category: String,
}

// =============================================================================
// Sale Record
// =============================================================================

/// The sale of a quantity of one inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub item_id: String,
    /// Always positive.
    pub quantity: i64,
    /// Always positive.
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Creates a sale stamped now with a fresh id. The total is computed
    /// here so it can never disagree with quantity and unit price.
    pub fn new(item_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        SaleRecord {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            quantity,
            unit_price_cents: unit_price.cents(),
            total_cents: unit_price.multiply_quantity(quantity).cents(),
            sold_at: Utc::now(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A sale joined with its item, when the item still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItem {
    pub sale: SaleRecord,
    pub item: Option<ItemSummary>,
}

// =============================================================================
// Ledger
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    /// Stock added (opening stock, restock, sale reversal).
    In,
    /// Stock removed (sale).
    Out,
}

impl LedgerEntryType {
    /// Signed effect on the stock counter of moving `quantity` units.
    #[inline]
    pub const fn signed(&self, quantity: i64) -> i64 {
        match self {
            LedgerEntryType::In => quantity,
            LedgerEntryType::Out => -quantity,
        }
    }

    /// The movement that undoes this one.
    #[inline]
    pub const fn opposite(&self) -> Self {
        match self {
            LedgerEntryType::In => LedgerEntryType::Out,
            LedgerEntryType::Out => LedgerEntryType::In,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::In => "in",
            LedgerEntryType::Out => "out",
        }
    }
}

/// An immutable record of one stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,
    pub item_id: String,
    pub entry_type: LedgerEntryType,
    /// Always positive; direction comes from `entry_type`.
    pub quantity: i64,
    pub total_amount_cents: i64,
    pub note: String,
    #[ts(as = "String")]
    pub logged_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        item_id: impl Into<String>,
        entry_type: LedgerEntryType,
        quantity: i64,
        total_amount: Money,
        note: impl Into<String>,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            entry_type,
            quantity,
            total_amount_cents: total_amount.cents(),
            note: note.into(),
            logged_at: Utc::now(),
        }
    }

    /// The "out" entry of a sale.
    pub fn for_sale(sale: &SaleRecord, item_name: &str) -> Self {
        Self::new(
            sale.item_id.clone(),
            LedgerEntryType::Out,
            sale.quantity,
            sale.total(),
            crate::sale_note(item_name),
        )
    }

    /// The "in" entry that undoes a sale.
    pub fn for_reversal(sale: &SaleRecord) -> Self {
        Self::new(
            sale.item_id.clone(),
            LedgerEntryType::In,
            sale.quantity,
            sale.total(),
            crate::SALE_REVERSAL_NOTE,
        )
    }

    /// Signed effect on the stock counter.
    #[inline]
    pub fn signed_quantity(&self) -> i64 {
        self.entry_type.signed(self.quantity)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// Money spent running the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub category: String,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub spent_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stock: i64, selling: Option<i64>, unit: Option<i64>) -> InventoryItem {
        InventoryItem {
            id: "item-1".to_string(),
            name: "Cola".to_string(),
            category: "Beverages".to_string(),
            unit: "bottle".to_string(),
            current_stock: stock,
            selling_price_cents: selling,
            unit_price_cents: unit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_falls_back_to_unit_price() {
        assert_eq!(item(5, Some(100), Some(60)).effective_price(), Some(Money::from_cents(100)));
        assert_eq!(item(5, None, Some(60)).effective_price(), Some(Money::from_cents(60)));
        assert_eq!(item(5, None, None).effective_price(), None);
    }

    #[test]
    fn test_can_sell_boundary() {
        let cola = item(5, None, None);
        assert!(cola.can_sell(5));
        assert!(!cola.can_sell(6));
    }

    #[test]
    fn test_low_stock_is_strictly_below_threshold() {
        assert!(item(9, None, None).is_low_stock(10));
        assert!(!item(10, None, None).is_low_stock(10));
    }

    #[test]
    fn test_new_sale_computes_total() {
        let sale = SaleRecord::new("item-1", 5, Money::from_cents(10000));
        assert_eq!(sale.total_cents, 50000);
        assert_eq!(sale.total().to_string(), "500.00");
    }

    #[test]
    fn test_reversal_entry_mirrors_sale() {
        let sale = SaleRecord::new("item-1", 3, Money::from_cents(250));
        let out = LedgerEntry::for_sale(&sale, "Cola");
        let back = LedgerEntry::for_reversal(&sale);

        assert_eq!(out.entry_type, LedgerEntryType::Out);
        assert_eq!(out.note, "Sale - Cola");
        assert_eq!(back.entry_type, LedgerEntryType::In);
        assert_eq!(back.quantity, out.quantity);
        assert_eq!(back.total_amount_cents, 750);
        assert_eq!(out.signed_quantity() + back.signed_quantity(), 0);
    }

    #[test]
    fn test_ledger_entry_type_signs() {
        assert_eq!(LedgerEntryType::In.signed(4), 4);
        assert_eq!(LedgerEntryType::Out.signed(4), -4);
        assert_eq!(LedgerEntryType::Out.opposite(), LedgerEntryType::In);
        assert_eq!(
            serde_json::to_string(&LedgerEntryType::Out).unwrap(),
            "\"out\""
        );
    }
}
