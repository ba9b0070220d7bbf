//! # Schema
//!
//! `migrations/sqlite` is compiled into the binary and applied on every
//! startup; applied files are tracked in `_sqlx_migrations`.
//!
//! ```text
//! inventory_items ──┬── sales            quantity > 0, unit_price_cents > 0
//!  current_stock>=0 │
//!                   └── ledger_entries   'in' | 'out', quantity > 0
//!                        (no UPDATE, no DELETE: both raise ABORT)
//! expenses                               amount_cents > 0
//! ```
//!
//! Every amount is an INTEGER column of cents (`*_cents`). Timestamps are
//! RFC 3339 UTC text, so `ORDER BY` and range filters compare them lexically.
//!
//! CHECK constraints keep stock and quantities in range even for writes
//! that bypass the repositories. Ledger rows are immutable once written;
//! a correction is a new compensating entry.
//!
//! Shipped migration files are frozen; schema changes go into a new
//! `NNN_description.sql` with the next number.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // A fresh database has no _sqlx_migrations table yet
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_all_migrations_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_schema_guards_stock_and_ledger() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pool = db.pool();
        sqlx::query(
            "INSERT INTO inventory_items (id, name, category, unit, current_stock, created_at, updated_at) \
             VALUES ('i1', 'Cola', 'Beverages', 'pcs', 1, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO ledger_entries (id, item_id, entry_type, quantity, total_amount_cents, note, logged_at) \
             VALUES ('l1', 'i1', 'in', 1, 0, 'Opening stock', '2026-01-01T00:00:00Z')",
        )
        .execute(pool)
        .await
        .unwrap();

        let negative = sqlx::query("UPDATE inventory_items SET current_stock = -1 WHERE id = 'i1'")
            .execute(pool)
            .await;
        assert!(negative.is_err());

        let edit = sqlx::query("UPDATE ledger_entries SET quantity = 2 WHERE id = 'l1'")
            .execute(pool)
            .await
            .unwrap_err();
        assert!(edit.to_string().contains("append-only"));

        let delete = sqlx::query("DELETE FROM ledger_entries WHERE id = 'l1'")
            .execute(pool)
            .await
            .unwrap_err();
        assert!(delete.to_string().contains("append-only"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();
    }
}
