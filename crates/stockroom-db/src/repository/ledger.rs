//! # Ledger Repository
//!
//! The stock ledger: one immutable row per movement. The table rejects
//! updates and deletes (see the triggers in the initial migration), so a
//! movement is only ever undone by posting its opposite.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::inventory::apply_movement;
use stockroom_core::LedgerEntry;

/// Repository for stock ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Posts a movement: adjusts the item's stock counter and appends the
    /// entry, both or neither.
    ///
    /// ## Errors
    /// - `NotFound` when the item doesn't exist
    /// - `InsufficientStock` when an "out" entry exceeds the stock on hand
    pub async fn post(&self, entry: &LedgerEntry) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        apply_movement(
            &mut *tx,
            &entry.item_id,
            entry.entry_type,
            entry.quantity,
            entry.logged_at,
        )
        .await?;
        insert_entry(&mut *tx, entry).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Entries of one item, newest first.
    pub async fn list_for_item(&self, item_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, item_id, entry_type, quantity, total_amount_cents, note, logged_at
            FROM ledger_entries
            WHERE item_id = ?1
            ORDER BY logged_at DESC, rowid DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Σ in − Σ out per item, for items that have any entries.
    pub async fn balances(&self) -> DbResult<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT item_id,
                   SUM(CASE WHEN entry_type = 'in' THEN quantity ELSE -quantity END)
            FROM ledger_entries
            GROUP BY item_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

/// Appends an entry on the given connection. Does not touch the stock
/// counter; callers pair it with `apply_movement`.
pub(crate) async fn insert_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> DbResult<()> {
    debug!(
        item_id = %entry.item_id,
        entry_type = entry.entry_type.as_str(),
        quantity = entry.quantity,
        "Appending ledger entry"
    );

    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, item_id, entry_type, quantity, total_amount_cents, note, logged_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.item_id)
    .bind(entry.entry_type)
    .bind(entry.quantity)
    .bind(entry.total_amount_cents)
    .bind(&entry.note)
    .bind(entry.logged_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
