//! # Validation Module
//!
//! Turns raw request payloads into validated commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (serde)                                       │
//! │  └── Shape: JSON object, integer quantities, decimal amounts           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Presence of required fields                                       │
//! │  ├── Ranges (> 0, >= 0)                                                │
//! │  └── Exact decimal → cents, calendar dates → UTC bounds               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches the store: a request that fails validation never
//! causes a write.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::money::{DecimalInput, Money};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_LABEL_LEN: usize = 100;
const MAX_NOTE_LEN: usize = 500;

/// Upper bound for any single stock quantity (sale, restock, opening
/// stock). Keeps counters and `quantity × price` inside i64 cents.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

// =============================================================================
// Sales
// =============================================================================

/// Raw body of `POST /sales`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSaleRequest {
    pub item_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<DecimalInput>,
}

/// A sale request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl NewSale {
    /// quantity × unit_price. Exact, since prices carry at most 2 decimals.
    #[inline]
    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Validates a sale request.
///
/// ## Rules
/// ```text
/// item_id, quantity, unit_price all present?  no → "Missing required fields: ..."
///      │
///      ▼
/// quantity > 0 and unit_price > 0?            no → "... must be greater than 0"
///      │
///      ▼
/// unit_price has ≤ 2 decimals?                no → "unit_price has invalid format"
///      │
///      ▼
/// NewSale
/// ```
pub fn validate_new_sale(req: &NewSaleRequest) -> ValidationResult<NewSale> {
    let item_id = req
        .item_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut missing = Vec::new();
    if item_id.is_none() {
        missing.push("item_id".to_string());
    }
    if req.quantity.is_none() {
        missing.push("quantity".to_string());
    }
    if req.unit_price.is_none() {
        missing.push("unit_price".to_string());
    }

    let (Some(item_id), Some(quantity), Some(raw_price)) =
        (item_id, req.quantity, req.unit_price.as_ref())
    else {
        return Err(ValidationError::MissingFields { fields: missing });
    };

    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    check_quantity_bound("quantity", quantity)?;

    let unit_price = parse_amount("unit_price", raw_price)?;
    if !unit_price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }

    // Keep the total within i64 cents.
    if unit_price.cents().checked_mul(quantity).is_none() {
        return Err(ValidationError::invalid_format("quantity", "total is too large"));
    }

    Ok(NewSale {
        item_id: item_id.to_string(),
        quantity,
        unit_price,
    })
}

/// Raw query string of `GET /sales` and `GET /sales/export`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub category: Option<String>,
}

/// Validated sale filter.
///
/// Date bounds are half-open: `from <= sold_at < until`. `until` is the
/// start of the day after `dateTo`, so the whole `dateTo` day is included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

/// Validates the sales query. Empty parameters count as absent.
pub fn validate_sales_query(query: &SalesQuery) -> ValidationResult<SalesFilter> {
    let date_from = non_empty(query.date_from.as_deref())
        .map(|s| parse_date("dateFrom", s))
        .transpose()?;
    let date_to = non_empty(query.date_to.as_deref())
        .map(|s| parse_date("dateTo", s))
        .transpose()?;

    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err(ValidationError::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }

    let until = match date_to {
        Some(to) => Some(
            to.checked_add_days(Days::new(1))
                .map(start_of_day)
                .ok_or_else(|| ValidationError::invalid_format("dateTo", "date out of range"))?,
        ),
        None => None,
    };

    Ok(SalesFilter {
        from: date_from.map(start_of_day),
        until,
        category: non_empty(query.category.as_deref()).map(str::to_string),
    })
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

// =============================================================================
// Inventory
// =============================================================================

/// Raw body of `POST /inventory-items`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub opening_stock: Option<i64>,
    pub selling_price: Option<DecimalInput>,
    pub unit_price: Option<DecimalInput>,
}

/// A validated new inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub opening_stock: i64,
    pub selling_price: Option<Money>,
    pub unit_price: Option<Money>,
}

/// Validates a new inventory item.
///
/// `opening_stock` defaults to 0; prices are optional but never negative.
pub fn validate_new_item(req: &NewItemRequest) -> ValidationResult<NewItem> {
    let name = required_text("name", req.name.as_deref(), MAX_NAME_LEN)?;
    let category = required_text("category", req.category.as_deref(), MAX_LABEL_LEN)?;
    let unit = required_text("unit", req.unit.as_deref(), MAX_LABEL_LEN)?;

    let opening_stock = req.opening_stock.unwrap_or(0);
    if opening_stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening_stock".to_string(),
        });
    }

    check_quantity_bound("opening_stock", opening_stock)?;

    let selling_price = optional_price("selling_price", req.selling_price.as_ref())?;
    let unit_price = optional_price("unit_price", req.unit_price.as_ref())?;

    // The opening ledger entry is valued at unit_price × opening_stock.
    if let Some(price) = unit_price {
        if price.checked_multiply_quantity(opening_stock).is_none() {
            return Err(ValidationError::invalid_format("opening_stock", "stock value is too large"));
        }
    }

    Ok(NewItem {
        name,
        category,
        unit,
        opening_stock,
        selling_price,
        unit_price,
    })
}

/// Raw body of `POST /inventory-items/:id/restock`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestockRequest {
    pub quantity: Option<i64>,
    pub note: Option<String>,
}

/// A validated restock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restock {
    pub quantity: i64,
    pub note: Option<String>,
}

pub fn validate_restock(req: &RestockRequest) -> ValidationResult<Restock> {
    let quantity = req.quantity.ok_or_else(|| ValidationError::Required {
        field: "quantity".to_string(),
    })?;
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    check_quantity_bound("quantity", quantity)?;

    let note = non_empty(req.note.as_deref()).map(str::to_string);
    if let Some(note) = &note {
        check_len("note", note, MAX_NOTE_LEN)?;
    }

    Ok(Restock { quantity, note })
}

// =============================================================================
// Expenses
// =============================================================================

/// Raw body of `POST /expenses`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExpenseRequest {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<DecimalInput>,
    pub spent_at: Option<DateTime<Utc>>,
}

/// A validated expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub category: String,
    pub amount: Money,
    pub spent_at: Option<DateTime<Utc>>,
}

pub fn validate_new_expense(req: &NewExpenseRequest) -> ValidationResult<NewExpense> {
    let description = required_text("description", req.description.as_deref(), MAX_NAME_LEN)?;
    let category = required_text("category", req.category.as_deref(), MAX_LABEL_LEN)?;

    let raw = req.amount.as_ref().ok_or_else(|| ValidationError::Required {
        field: "amount".to_string(),
    })?;
    let amount = parse_amount("amount", raw)?;
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(NewExpense {
        description,
        category,
        amount,
        spent_at: req.spent_at,
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn required_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<String> {
    let value = non_empty(value).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    check_len(field, value, max)?;
    Ok(value.to_string())
}

fn check_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn check_quantity_bound(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity > MAX_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

fn parse_amount(field: &str, raw: &DecimalInput) -> ValidationResult<Money> {
    raw.to_money()
        .map_err(|e| ValidationError::invalid_format(field, e.to_string()))
}

fn optional_price(field: &str, raw: Option<&DecimalInput>) -> ValidationResult<Option<Money>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let price = parse_amount(field, raw)?;
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(Some(price))
}

// =============================================================================
// Unit Tests
// =============================================================================
