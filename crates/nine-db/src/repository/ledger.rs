//! # Stock Ledger Repository
//!
//! The append-only, immutable record of every stock-quantity change.
//!
//! ## The Ledger As An Audit Trail
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Product's Ledger Trace                          │
//! │                                                                         │
//! │  time ──────────────────────────────────────────────────────────►      │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐            │
//! │  │ +50 balance=50 │─►│ -3  balance=47 │─►│ +10 balance=57 │            │
//! │  │ initial_setup  │  │ sale_checkout  │  │ manual_audit   │            │
//! │  └────────────────┘  └────────────────┘  └────────────────┘            │
//! │                                                                         │
//! │  Invariants:                                                            │
//! │  • each balance = previous balance + own change_amount                  │
//! │  • last balance = the product's current stock_quantity                  │
//! │  • entries are NEVER updated or deleted (schema triggers abort it)      │
//! │                                                                         │
//! │  The balance is supplied by whoever changed the stock; the ledger      │
//! │  records it without recomputing, so it stays an audit trail rather     │
//! │  than a second source of truth that could drift.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writes vs Reads
//! Appends only ever happen inside a caller's transaction (checkout, catalog
//! create/patch) so [`LedgerRepository::append`] takes the transaction
//! connection explicitly. Reads go through the pool and never block behind
//! writers (WAL snapshot reads).

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use nine_core::{StockLedgerEntry, StockReason};

const SELECT_COLUMNS: &str = "id, product_id, change_amount, balance, reason, created_at";

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

    /// Appends one entry inside the caller's transaction.
    ///
    /// ## Arguments
    /// * `conn` - the transaction connection the stock change itself runs on;
    ///   if that transaction rolls back, so does this entry
    /// * `product_id` / `change_amount` / `balance` - `balance` must be the
    ///   product's stock quantity immediately after the change
    /// * `reason` - why the stock moved
    /// * `at` - timestamp shared with the surrounding operation
    pub async fn append(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
        change_amount: i64,
        balance: i64,
        reason: StockReason,
        at: DateTime<Utc>,
    ) -> DbResult<StockLedgerEntry> {
        let entry = StockLedgerEntry {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            change_amount,
            balance,
            reason,
            created_at: at,
        };

        debug!(
            product_id = %entry.product_id,
            change = entry.change_amount,
            balance = entry.balance,
            "Appending stock ledger entry"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_ledger (id, product_id, change_amount, balance, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.product_id)
        .bind(entry.change_amount)
        .bind(entry.balance)
        .bind(entry.reason)
        .bind(entry.created_at)
        .execute(conn)
        .await?;

        Ok(entry)
    }

    /// The entry with the greatest timestamp at or before `instant`.
    ///
    /// ## Returns
    /// * `Ok(Some(entry))` - the product's stock balance as of that instant
    /// * `Ok(None)` - no recorded stock before the instant (the product was
    ///   not yet in inventory; valuation treats this as stock = 0)
    ///
    /// Ties on timestamp break on insertion order (rowid), so several
    /// entries written in one transaction read back in the order they were
    /// appended even under coarse clock resolution.
    pub async fn latest_entry_as_of(
        &self,
        product_id: &str,
        instant: DateTime<Utc>,
    ) -> DbResult<Option<StockLedgerEntry>> {
        let entry = sqlx::query_as::<_, StockLedgerEntry>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM stock_ledger
            WHERE product_id = ?1 AND created_at <= ?2
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#
        ))
        .bind(product_id)
        .bind(instant)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// All entries with timestamp in the inclusive window `[start, end]`,
    /// in timestamp order.
    pub async fn entries_in_window(
        &self,
        product_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<StockLedgerEntry>> {
        let entries = sqlx::query_as::<_, StockLedgerEntry>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM stock_ledger
            WHERE product_id = ?1 AND created_at >= ?2 AND created_at <= ?3
            ORDER BY created_at ASC, rowid ASC
            "#
        ))
        .bind(product_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// A product's full trace in timestamp order.
    pub async fn entries_for_product(&self, product_id: &str) -> DbResult<Vec<StockLedgerEntry>> {
        let entries = sqlx::query_as::<_, StockLedgerEntry>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM stock_ledger
            WHERE product_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Replays a product's entries from balance 0.
    ///
    /// ## Returns
    /// `Err` with the first inconsistent entry's id if the trace is broken,
    /// otherwise the final replayed balance. The invariant that this equals
    /// the product's current stock_quantity is checked by tests, not per
    /// call.
    pub async fn replay_balance(&self, product_id: &str) -> DbResult<Result<i64, String>> {
        let entries = self.entries_for_product(product_id).await?;

        let mut balance = 0i64;
        for entry in &entries {
            balance += entry.change_amount;
            if balance != entry.balance {
                return Ok(Err(entry.id.clone()));
            }
        }

        Ok(Ok(balance))
    }

    /// Counts all ledger entries (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_ledger")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
