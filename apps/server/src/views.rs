//! # Response Views
//!
//! JSON shapes returned by the HTTP API. Amounts are stored as integer
//! cents and rendered here as decimal numbers in major units
//! (`50000` cents → `500.0`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use stockroom_core::report::{Overview, SaleStats, StockDiscrepancy};
use stockroom_core::{Expense, InventoryItem, ItemSummary, LedgerEntry, LedgerEntryType, SaleWithItem};

#[derive(Debug, Clone, Serialize)]
pub struct SaleView {
    pub id: String,
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
    pub sold_at: DateTime<Utc>,
    pub item: Option<ItemSummary>,
}

impl From<&SaleWithItem> for SaleView {
    fn from(row: &SaleWithItem) -> Self {
        SaleView {
            id: row.sale.id.clone(),
            item_id: row.sale.item_id.clone(),
            quantity: row.sale.quantity,
            unit_price: row.sale.unit_price().to_major_f64(),
            total: row.sale.total().to_major_f64(),
            sold_at: row.sale.sold_at,
            item: row.item.clone(),
        }
    }
}

/// `stats` of `GET /sales`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatsView {
    pub total_sales: i64,
    pub total_revenue: f64,
    pub total_items: i64,
    pub average_sale: f64,
}

impl From<SaleStats> for SaleStatsView {
    fn from(stats: SaleStats) -> Self {
        SaleStatsView {
            total_sales: stats.total_sales,
            total_revenue: stats.total_revenue.to_major_f64(),
            total_items: stats.total_items,
            average_sale: stats.average_sale.to_major_f64(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesView {
    pub sales: Vec<SaleView>,
    pub stats: SaleStatsView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub current_stock: i64,
    pub selling_price: Option<f64>,
    pub unit_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&InventoryItem> for ItemView {
    fn from(item: &InventoryItem) -> Self {
        let major = |cents: Option<i64>| cents.map(|c| stockroom_core::Money::from_cents(c).to_major_f64());
        ItemView {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            unit: item.unit.clone(),
            current_stock: item.current_stock,
            selling_price: major(item.selling_price_cents),
            unit_price: major(item.unit_price_cents),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryView {
    pub id: String,
    pub item_id: String,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub quantity: i64,
    pub total_amount: f64,
    pub note: String,
    pub logged_at: DateTime<Utc>,
}

impl From<&LedgerEntry> for LedgerEntryView {
    fn from(entry: &LedgerEntry) -> Self {
        LedgerEntryView {
            id: entry.id.clone(),
            item_id: entry.item_id.clone(),
            entry_type: entry.entry_type,
            quantity: entry.quantity,
            total_amount: entry.total_amount().to_major_f64(),
            note: entry.note.clone(),
            logged_at: entry.logged_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseView {
    pub id: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub spent_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseView {
    fn from(expense: &Expense) -> Self {
        ExpenseView {
            id: expense.id.clone(),
            description: expense.description.clone(),
            category: expense.category.clone(),
            amount: expense.amount().to_major_f64(),
            spent_at: expense.spent_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub total_expenses: f64,
    pub total_revenue: f64,
    pub net_profit: f64,
    pub total_items: i64,
    pub low_stock_items: i64,
    pub today_sales: f64,
    pub this_month_sales: f64,
}

impl From<Overview> for OverviewView {
    fn from(o: Overview) -> Self {
        OverviewView {
            total_expenses: o.total_expenses.to_major_f64(),
            total_revenue: o.total_revenue.to_major_f64(),
            net_profit: o.net_profit.to_major_f64(),
            total_items: o.total_items,
            low_stock_items: o.low_stock_items,
            today_sales: o.today_sales.to_major_f64(),
            this_month_sales: o.this_month_sales.to_major_f64(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscrepancyView {
    pub item_id: String,
    pub name: String,
    pub counter_stock: i64,
    pub ledger_stock: i64,
    pub drift: i64,
}

impl From<&StockDiscrepancy> for DiscrepancyView {
    fn from(d: &StockDiscrepancy) -> Self {
        DiscrepancyView {
            item_id: d.item_id.clone(),
            name: d.name.clone(),
            counter_stock: d.counter_stock,
            ledger_stock: d.ledger_stock,
            drift: d.drift(),
        }
    }
}

/// Maps a slice through a `From<&T>` view.
pub fn views<'a, T: 'a, V: From<&'a T>>(rows: &'a [T]) -> Vec<V> {
    rows.iter().map(V::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{Money, SaleRecord};

    #[test]
    fn test_sale_view_renders_major_units() {
        let row = SaleWithItem {
            sale: SaleRecord::new("item-1", 5, Money::from_cents(10000)),
            item: None,
        };
        let json = serde_json::to_value(SaleView::from(&row)).unwrap();

        assert_eq!(json["unit_price"], 100.0);
        assert_eq!(json["total"], 500.0);
        assert!(json["item"].is_null());
    }

    #[test]
    fn test_stats_view_is_camel_case() {
        let json = serde_json::to_value(SaleStatsView::from(SaleStats::default())).unwrap();
        assert_eq!(json["totalSales"], 0);
        assert_eq!(json["averageSale"], 0.0);
    }
}
