//! # Reporting
//!
//! Aggregations over already-fetched rows: sale statistics, the dashboard
//! overview, ledger reconciliation and the CSV sales report.
//!
//! ## Where The Numbers Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales (filtered)  ──► SaleStats   count, revenue, items, average      │
//! │                                                                         │
//! │  sales + expenses  ──► Overview    revenue − expenses = net profit      │
//! │  + items + now                     today / this month revenue           │
//! │                                    low-stock count                      │
//! │                                                                         │
//! │  items + ledger Σ  ──► StockDiscrepancy   counter ≠ Σin − Σout          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Expense, InventoryItem, SaleRecord, SaleWithItem};

// =============================================================================
// Sale Statistics
// =============================================================================

/// Statistics over a filtered set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleStats {
    pub total_sales: i64,
    pub total_revenue: Money,
    pub total_items: i64,
    /// revenue / count, rounded to the cent; zero for an empty set.
    pub average_sale: Money,
}

impl SaleStats {
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>) -> Self {
        let mut stats = SaleStats::default();
        for sale in sales {
            stats.total_sales += 1;
            stats.total_revenue += sale.total();
            stats.total_items += sale.quantity;
        }
        stats.average_sale = stats.total_revenue.divide_rounded(stats.total_sales);
        stats
    }

    pub fn from_joined(sales: &[SaleWithItem]) -> Self {
        Self::from_sales(sales.iter().map(|s| &s.sale))
    }
}

// =============================================================================
// Overview
// =============================================================================

/// Headline figures of the inventory dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Overview {
    pub total_expenses: Money,
    pub total_revenue: Money,
    pub net_profit: Money,
    pub total_items: i64,
    pub low_stock_items: i64,
    pub today_sales: Money,
    pub this_month_sales: Money,
}

impl Overview {
    /// Computes the overview at instant `now`. "Today" and "this month" are
    /// UTC calendar periods.
    pub fn compute(
        sales: &[SaleRecord],
        expenses: &[Expense],
        items: &[InventoryItem],
        now: DateTime<Utc>,
        low_stock_threshold: i64,
    ) -> Self {
        let total_expenses: Money = expenses.iter().map(Expense::amount).sum();
        let total_revenue: Money = sales.iter().map(SaleRecord::total).sum();

        let today = now.date_naive();
        let today_sales = sales
            .iter()
            .filter(|s| s.sold_at.date_naive() == today)
            .map(SaleRecord::total)
            .sum();
        let this_month_sales = sales
            .iter()
            .filter(|s| s.sold_at.year() == now.year() && s.sold_at.month() == now.month())
            .map(SaleRecord::total)
            .sum();

        let low_stock_items = items
            .iter()
            .filter(|i| i.is_low_stock(low_stock_threshold))
            .count() as i64;

        Overview {
            total_expenses,
            total_revenue,
            net_profit: total_revenue - total_expenses,
            total_items: items.len() as i64,
            low_stock_items,
            today_sales,
            this_month_sales,
        }
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// An item whose stock counter disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockDiscrepancy {
    pub item_id: String,
    pub name: String,
    pub counter_stock: i64,
    /// Σ in − Σ out over the item's ledger entries.
    pub ledger_stock: i64,
}

impl StockDiscrepancy {
    /// Positive when the counter shows more stock than the ledger explains.
    pub fn drift(&self) -> i64 {
        self.counter_stock - self.ledger_stock
    }
}

/// Compares every item's counter with its ledger balance.
///
/// Items without ledger entries have a ledger balance of zero.
pub fn reconcile(
    items: &[InventoryItem],
    ledger_balances: &HashMap<String, i64>,
) -> Vec<StockDiscrepancy> {
    items
        .iter()
        .filter_map(|item| {
            let ledger_stock = ledger_balances.get(&item.id).copied().unwrap_or(0);
            (ledger_stock != item.current_stock).then(|| StockDiscrepancy {
                item_id: item.id.clone(),
                name: item.name.clone(),
                counter_stock: item.current_stock,
                ledger_stock,
            })
        })
        .collect()
}

// =============================================================================
// CSV Export
// =============================================================================

const CSV_HEADERS: [&str; 7] = [
    "Date",
    "Time",
    "Item",
    "Category",
    "Quantity",
    "Unit Price",
    "Total",
];

/// Renders the sales report: a bare header line, then one row per sale
/// with every field quoted. Sales whose item is gone show `Unknown` / `N/A`.
pub fn sales_csv(sales: &[SaleWithItem]) -> CoreResult<String> {
    let mut header = csv_writer(QuoteStyle::Necessary, Vec::new());
    header.write_record(CSV_HEADERS).map_err(export_error)?;
    let buf = header.into_inner().map_err(|e| export_error(e.error()))?;

    let mut rows = csv_writer(QuoteStyle::Always, buf);
    for row in sales {
        let sale = &row.sale;
        let (name, category) = match &row.item {
            Some(item) => (item.name.as_str(), item.category.as_str()),
            None => ("Unknown", "N/A"),
        };
        rows.write_record([
            sale.sold_at.format("%Y-%m-%d").to_string().as_str(),
            sale.sold_at.format("%H:%M:%S").to_string().as_str(),
            name,
            category,
            sale.quantity.to_string().as_str(),
            sale.unit_price().to_string().as_str(),
            sale.total().to_string().as_str(),
        ])
        .map_err(export_error)?;
    }

    let buf = rows.into_inner().map_err(|e| export_error(e.error()))?;
    String::from_utf8(buf).map_err(export_error)
}

fn csv_writer(style: QuoteStyle, buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf)
}

fn export_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::Export(err.to_string())
}

/// File name of the report downloaded on `date`.
pub fn sales_csv_filename(date: DateTime<Utc>) -> String {
    format!("sales-report-{}.csv", date.format("%Y-%m-%d"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemSummary;
    use chrono::TimeZone;

    fn sale(id: &str, qty: i64, unit_cents: i64, at: DateTime<Utc>) -> SaleRecord {
        SaleRecord {
            id: id.to_string(),
            item_id: "item-1".to_string(),
            quantity: qty,
            unit_price_cents: unit_cents,
            total_cents: qty * unit_cents,
            sold_at: at,
        }
    }

    fn item(id: &str, stock: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            category: "Snacks".to_string(),
            unit: "pcs".to_string(),
            current_stock: stock,
            selling_price_cents: None,
            unit_price_cents: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_over_empty_set_have_zero_average() {
        let stats = SaleStats::from_sales(std::iter::empty());
        assert_eq!(stats, SaleStats::default());
        assert!(stats.average_sale.is_zero());
    }

    #[test]
    fn test_stats_sum_and_average() {
        let at = Utc::now();
        let sales = vec![sale("a", 5, 10000, at), sale("b", 1, 250, at), sale("c", 2, 125, at)];
        let stats = SaleStats::from_sales(&sales);

        assert_eq!(stats.total_sales, 3);
        assert_eq!(stats.total_items, 8);
        assert_eq!(stats.total_revenue.cents(), 50500);
        // 505.00 / 3 = 168.333...
        assert_eq!(stats.average_sale.cents(), 16833);
    }

    #[test]
    fn test_overview_periods_and_profit() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        let sales = vec![
            sale("today", 1, 1000, Utc.with_ymd_and_hms(2026, 10, 19, 1, 0, 0).unwrap()),
            sale("month", 1, 2000, Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap()),
            sale("older", 1, 4000, Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap()),
        ];
        let expenses = vec![Expense {
            id: "e1".to_string(),
            description: "Rent".to_string(),
            category: "Fixed".to_string(),
            amount_cents: 5000,
            spent_at: now,
        }];
        let items = vec![item("a", 3), item("b", 10), item("c", 0)];

        let overview = Overview::compute(&sales, &expenses, &items, now, 10);

        assert_eq!(overview.total_revenue.cents(), 7000);
        assert_eq!(overview.total_expenses.cents(), 5000);
        assert_eq!(overview.net_profit.cents(), 2000);
        assert_eq!(overview.today_sales.cents(), 1000);
        assert_eq!(overview.this_month_sales.cents(), 3000);
        assert_eq!(overview.total_items, 3);
        assert_eq!(overview.low_stock_items, 2);
    }

    #[test]
    fn test_reconcile_reports_only_mismatches() {
        let items = vec![item("a", 5), item("b", 7), item("c", 0)];
        let balances = HashMap::from([("a".to_string(), 5), ("b".to_string(), 9)]);

        let found = reconcile(&items, &balances);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_id, "b");
        assert_eq!(found[0].drift(), -2);
    }

    #[test]
    fn test_sales_csv_quotes_and_placeholders() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 9).unwrap();
        let rows = vec![
            SaleWithItem {
                sale: sale("a", 2, 150, at),
                item: Some(ItemSummary {
                    id: "item-1".to_string(),
                    name: "12\" Pizza".to_string(),
                    category: "Food".to_string(),
                }),
            },
            SaleWithItem {
                sale: sale("b", 1, 99, at),
                item: None,
            },
        ];

        let csv = sales_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Time,Item,Category,Quantity,Unit Price,Total");
        assert_eq!(
            lines[1],
            r#""2026-10-19","08:05:09","12"" Pizza","Food","2","1.50","3.00""#
        );
        assert_eq!(
            lines[2],
            r#""2026-10-19","08:05:09","Unknown","N/A","1","0.99","0.99""#
        );
    }

    #[test]
    fn test_csv_filename() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(sales_csv_filename(at), "sales-report-2026-01-05.csv");
    }
}
