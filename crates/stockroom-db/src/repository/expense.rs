//! # Expense Repository
//!
//! Database operations for business expenses.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use stockroom_core::validation::NewExpense;
use stockroom_core::Expense;

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists expenses, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, description, category, amount_cents, spent_at
            FROM expenses
            ORDER BY spent_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Inserts an expense. A missing `spent_at` means now.
    pub async fn create(&self, new: &NewExpense) -> DbResult<Expense> {
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description: new.description.clone(),
            category: new.category.clone(),
            amount_cents: new.amount.cents(),
            spent_at: new.spent_at.unwrap_or_else(Utc::now),
        };

        debug!(id = %expense.id, amount = expense.amount_cents, "Inserting expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, category, amount_cents, spent_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(&expense.category)
        .bind(expense.amount_cents)
        .bind(expense.spent_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use stockroom_core::Money;

    fn new_expense(description: &str, cents: i64, day: u32) -> NewExpense {
        NewExpense {
            description: description.to_string(),
            category: "Utilities".to_string(),
            amount: Money::from_cents(cents),
            spent_at: Some(Utc.with_ymd_and_hms(2026, 4, day, 9, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.expenses().create(&new_expense("Water bill", 4500, 2)).await.unwrap();
        db.expenses().create(&new_expense("Power bill", 12000, 9)).await.unwrap();

        let expenses = db.expenses().list().await.unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].description, "Power bill");
        assert_eq!(expenses[1].amount().cents(), 4500);
    }

    #[tokio::test]
    async fn test_missing_date_defaults_to_now() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let before = Utc::now();
        let mut new = new_expense("Rent", 50000, 1);
        new.spent_at = None;

        let expense = db.expenses().create(&new).await.unwrap();
        assert!(expense.spent_at >= before);
    }
}
