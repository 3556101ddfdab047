//! # Checkout Engine
//!
//! Turns a cart into a committed sale: stock decrements, ledger entries,
//! sale header and line items all land atomically or not at all.
//!
//! ## Transaction Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Checkout, One Transaction                     │
//! │                                                                         │
//! │  validate lines          (outside the transaction, pure)                │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  ① lock      touch each product row, ascending id order                │
//! │  ② load      re-read the locked rows                                   │
//! │  ③ verify    running balance per product, so three lines of the       │
//! │  │           same product check against what the earlier lines left    │
//! │  ④ apply     per line, in submission order: UPDATE stock, INSERT      │
//! │  │           ledger (sale_checkout), INSERT item with price/cost       │
//! │  │           snapshots                                                  │
//! │       │                                                                 │
//! │  COMMIT  ──── or any error unwinds the whole thing                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite has no row locks; the write transaction itself is the exclusion
//! primitive. The lock phase issues a write as the transaction's first
//! statement, so the write lock is taken up front and two checkouts
//! serialize instead of deadlocking on a read-to-write upgrade; the busy
//! timeout bounds the wait. A checkout that loses the wait surfaces as a
//! retryable [`DbError::Conflict`].
//!
//! Receipt ids are `RCPT-{YYYYMMDD}-{8 hex}` with a random suffix, so two
//! sales in the same second get distinct ids; the UNIQUE index is the
//! backstop and the astronomically unlikely collision comes back as
//! [`DbError::DuplicateReceipt`] rather than a silently shared receipt.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{ledger::LedgerRepository, sale::SaleRepository};
use nine_core::{
    validation, CheckoutLine, CheckoutReceipt, CoreError, Money, Sale, SaleStatus, StockReason,
};

/// Which step of the checkout transaction failed, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckoutPhase {
    Lock,
    Load,
    Verify,
    Apply,
    Commit,
}

impl CheckoutPhase {
    fn as_str(self) -> &'static str {
        match self {
            CheckoutPhase::Lock => "lock",
            CheckoutPhase::Load => "load",
            CheckoutPhase::Verify => "verify",
            CheckoutPhase::Apply => "apply",
            CheckoutPhase::Commit => "commit",
        }
    }
}

/// A product row as seen inside the checkout transaction.
#[derive(Debug, sqlx::FromRow)]
struct LockedProduct {
    id: String,
    name: String,
    price_cents: i64,
    cost_cents: i64,
    stock_quantity: i64,
}

/// The transactional sale engine.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
    ledger: LedgerRepository,
    sales: SaleRepository,
}

impl CheckoutEngine {
    /// Creates a new CheckoutEngine.
    pub fn new(pool: SqlitePool) -> Self {
        let ledger = LedgerRepository::new(pool.clone());
        let sales = SaleRepository::new(pool.clone());
        CheckoutEngine { pool, ledger, sales }
    }

    /// Runs one checkout to completion.
    ///
    /// ## Arguments
    /// * `operator_id` - who rang the sale up (recorded, not authenticated)
    /// * `lines` - cart lines; the same product may appear more than once
    ///   and each occurrence is a separate line item
    ///
    /// ## Errors
    /// * [`DbError::Domain`] with [`CoreError::InsufficientStock`] - some
    ///   line cannot be covered; names the first offending product
    /// * [`DbError::Domain`] - empty cart, too many lines, bad quantities
    /// * [`DbError::NotFound`] - a line references a product that does not
    ///   exist
    /// * [`DbError::Conflict`] - lost the write lock wait; safe to retry
    #[instrument(skip(self, lines), fields(operator = %operator_id, line_count = lines.len()))]
    pub async fn checkout(
        &self,
        operator_id: &str,
        lines: &[CheckoutLine],
    ) -> DbResult<CheckoutReceipt> {
        // Limit breaches get the named engine errors; the shared validator
        // covers the rest (empty cart, blank ids, non-positive quantities)
        // before any lock is taken.
        if lines.len() > nine_core::MAX_CHECKOUT_LINES {
            return Err(CoreError::CheckoutTooLarge {
                max: nine_core::MAX_CHECKOUT_LINES,
            }
            .into());
        }
        for line in lines {
            if line.quantity > nine_core::MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: line.quantity,
                    max: nine_core::MAX_LINE_QUANTITY,
                }
                .into());
            }
        }
        validation::validate_checkout_lines(lines)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // ① Lock: touch every product row in one canonical order so
        // concurrent carts with overlapping products serialize identically.
        let mut product_ids: Vec<&str> = lines.iter().map(|l| l.product_id.as_str()).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        for product_id in &product_ids {
            let touched = sqlx::query("UPDATE products SET updated_at = updated_at WHERE id = ?1")
                .bind(product_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| self.trace_failure(CheckoutPhase::Lock, e.into()))?;
            if touched.rows_affected() == 0 {
                return Err(self.trace_failure(
                    CheckoutPhase::Lock,
                    DbError::not_found("product", *product_id),
                ));
            }
        }

        // ② Load the rows the transaction now owns.
        let mut products: BTreeMap<String, LockedProduct> = BTreeMap::new();
        for product_id in &product_ids {
            let product = sqlx::query_as::<_, LockedProduct>(
                "SELECT id, name, price_cents, cost_cents, stock_quantity \
                 FROM products WHERE id = ?1",
            )
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| self.trace_failure(CheckoutPhase::Load, e.into()))?;
            products.insert(product.id.clone(), product);
        }

        // ③ Verify against running balances, so repeated lines for one
        // product see what the lines before them already claimed.
        let mut balances: BTreeMap<&str, i64> = products
            .values()
            .map(|p| (p.id.as_str(), p.stock_quantity))
            .collect();
        let mut line_balances: Vec<i64> = Vec::with_capacity(lines.len());
        let mut total = Money::zero();

        for line in lines {
            let product = &products[&line.product_id];
            let balance = balances
                .get_mut(line.product_id.as_str())
                .ok_or_else(|| DbError::not_found("product", &line.product_id))?;

            if *balance < line.quantity {
                debug!(
                    phase = CheckoutPhase::Verify.as_str(),
                    product = %product.name,
                    requested = line.quantity,
                    available = *balance,
                    "Checkout rejected"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    requested: line.quantity,
                    available: *balance,
                }
                .into());
            }
            *balance -= line.quantity;
            line_balances.push(*balance);

            let line_total = Money::from_cents(product.price_cents)
                .checked_mul(line.quantity)
                .and_then(|t| total.checked_add(t))
                .ok_or_else(|| {
                    DbError::Internal(format!(
                        "checkout total overflow for product {}",
                        product.id
                    ))
                })?;
            total = line_total;
        }

        // ④ Apply: sale header first, then per line in submission order a
        // stock decrement, a ledger entry carrying the running balance the
        // verify phase computed, and the line item snapshot.
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            receipt_id: generate_receipt_id(now),
            operator_id: operator_id.to_string(),
            total_cents: total.cents(),
            status: SaleStatus::Completed,
            sale_time: now,
        };

        self.sales
            .insert_sale(&mut tx, &sale)
            .await
            .map_err(|e| self.trace_failure(CheckoutPhase::Apply, e))?;

        for (line, &new_balance) in lines.iter().zip(&line_balances) {
            let product = &products[&line.product_id];

            sqlx::query("UPDATE products SET stock_quantity = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(new_balance)
                .bind(now)
                .bind(&product.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| self.trace_failure(CheckoutPhase::Apply, e.into()))?;

            self.ledger
                .append(
                    &mut tx,
                    &product.id,
                    -line.quantity,
                    new_balance,
                    StockReason::SaleCheckout,
                    now,
                )
                .await
                .map_err(|e| self.trace_failure(CheckoutPhase::Apply, e))?;

            self.sales
                .insert_item(
                    &mut tx,
                    &sale.id,
                    &product.id,
                    line.quantity,
                    product.price_cents,
                    product.cost_cents,
                )
                .await
                .map_err(|e| self.trace_failure(CheckoutPhase::Apply, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| self.trace_failure(CheckoutPhase::Commit, e.into()))?;

        info!(
            receipt = %sale.receipt_id,
            total_cents = sale.total_cents,
            lines = lines.len(),
            "Checkout committed"
        );

        Ok(CheckoutReceipt {
            sale_id: sale.id,
            receipt_id: sale.receipt_id,
            total_cents: sale.total_cents,
        })
    }

    fn trace_failure(&self, phase: CheckoutPhase, err: DbError) -> DbError {
        debug!(phase = phase.as_str(), error = %err, "Checkout transaction unwound");
        err
    }
}

/// `RCPT-{YYYYMMDD}-{8 hex chars}`.
fn generate_receipt_id(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("RCPT-{}-{}", at.format("%Y%m%d"), &suffix[..8])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use nine_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, sku: &str, price: i64, cost: i64, stock: i64) -> String {
        db.products()
            .create(NewProduct {
                sku: sku.to_string(),
                name: format!("Product {sku}"),
                price_cents: price,
                cost_cents: cost,
                category: "Test".to_string(),
                stock_quantity: stock,
                image_url: None,
            })
            .await
            .unwrap()
            .id
    }

    fn line(product_id: &str, quantity: i64) -> CheckoutLine {
        CheckoutLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 50).await;
        let grinder = seed_product(&db, "GRD-001", 4999, 3000, 5).await;

        let receipt = db
            .checkout()
            .checkout("op-1", &[line(&espresso, 2), line(&grinder, 1)])
            .await
            .unwrap();

        // 2 * 1899 + 4999
        assert_eq!(receipt.total_cents, 8797);
        assert!(receipt.receipt_id.starts_with("RCPT-"));

        // Stock decremented
        assert_eq!(db.products().get_by_id(&espresso).await.unwrap().stock_quantity, 48);
        assert_eq!(db.products().get_by_id(&grinder).await.unwrap().stock_quantity, 4);

        // Ledger entries appended with the right reason and balances
        let trace = db.ledger().entries_for_product(&espresso).await.unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].change_amount, -2);
        assert_eq!(trace[1].balance, 48);
        assert_eq!(trace[1].reason, StockReason::SaleCheckout);

        // Sale and items queryable by receipt
        let sale = db.sales().get_by_receipt(&receipt.receipt_id).await.unwrap();
        assert_eq!(sale.total_cents, 8797);
        let items = db.sales().items_for_sale(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 50).await;
        let grinder = seed_product(&db, "GRD-001", 4999, 3000, 5).await;

        let err = db
            .checkout()
            .checkout("op-1", &[line(&espresso, 10), line(&grinder, 6)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 6, available: 5, .. })
        ));

        // Nothing moved, not even the line that would have succeeded
        assert_eq!(db.products().get_by_id(&espresso).await.unwrap().stock_quantity, 50);
        assert_eq!(db.products().get_by_id(&grinder).await.unwrap().stock_quantity, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.ledger().entries_for_product(&espresso).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_lines_check_against_running_balance() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 5).await;

        // 3 + 3 > 5 even though each line alone fits
        let err = db
            .checkout()
            .checkout("op-1", &[line(&espresso, 3), line(&espresso, 3)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 3, available: 2, .. })
        ));

        // 3 + 2 = 5 drains the product exactly, as two separate line items
        let receipt = db
            .checkout()
            .checkout("op-1", &[line(&espresso, 3), line(&espresso, 2)])
            .await
            .unwrap();
        assert_eq!(receipt.total_cents, 5 * 1899);

        let product = db.products().get_by_id(&espresso).await.unwrap();
        assert_eq!(product.stock_quantity, 0);

        let sale = db.sales().get_by_receipt(&receipt.receipt_id).await.unwrap();
        let items = db.sales().items_for_sale(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);

        // One ledger entry per line, each carrying the running balance
        let trace = db.ledger().entries_for_product(&espresso).await.unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[1].change_amount, -3);
        assert_eq!(trace[1].balance, 2);
        assert_eq!(trace[2].change_amount, -2);
        assert_eq!(trace[2].balance, 0);
    }

    #[tokio::test]
    async fn test_ledger_trace_follows_line_submission_order() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 10).await;

        db.checkout()
            .checkout("op-1", &[line(&espresso, 3), line(&espresso, 2)])
            .await
            .unwrap();

        let trace = db.ledger().entries_for_product(&espresso).await.unwrap();
        let steps: Vec<(i64, i64)> = trace.iter().map(|e| (e.change_amount, e.balance)).collect();
        assert_eq!(steps, vec![(10, 10), (-3, 7), (-2, 5)]);
        assert!(trace[1..].iter().all(|e| e.reason == StockReason::SaleCheckout));

        let replayed = db.ledger().replay_balance(&espresso).await.unwrap();
        assert_eq!(replayed, Ok(5));
    }

    #[tokio::test]
    async fn test_unknown_product_fails_the_cart() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 50).await;

        let err = db
            .checkout()
            .checkout("op-1", &[line(&espresso, 1), line("no-such-id", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert_eq!(db.products().get_by_id(&espresso).await.unwrap().stock_quantity, 50);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_and_oversized_carts_are_rejected() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 50).await;

        let err = db.checkout().checkout("op-1", &[]).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));

        let too_many: Vec<CheckoutLine> =
            (0..=nine_core::MAX_CHECKOUT_LINES).map(|_| line(&espresso, 1)).collect();
        let err = db.checkout().checkout("op-1", &too_many).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CheckoutTooLarge { .. })));

        let err = db
            .checkout()
            .checkout("op-1", &[line(&espresso, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }

    #[tokio::test]
    async fn test_blank_product_id_is_rejected_before_any_write() {
        let db = test_db().await;
        seed_product(&db, "ESP-001", 1899, 1100, 50).await;

        let err = db
            .checkout()
            .checkout("op-1", &[line("   ", 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(nine_core::ValidationError::Required { .. }))
        ));

        // Rejected pre-transaction: nothing was sold, nothing was logged
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.ledger().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_three_of_ten_leaves_seven_and_one_entry() {
        let db = test_db().await;
        let product = seed_product(&db, "WID-001", 500, 200, 10).await;

        let receipt = db
            .checkout()
            .checkout("op-1", &[line(&product, 3)])
            .await
            .unwrap();
        assert_eq!(receipt.total_cents, 1500);

        assert_eq!(db.products().get_by_id(&product).await.unwrap().stock_quantity, 7);

        let trace = db.ledger().entries_for_product(&product).await.unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].change_amount, -3);
        assert_eq!(trace[1].balance, 7);
        assert_eq!(trace[1].reason, StockReason::SaleCheckout);
    }

    #[tokio::test]
    async fn test_lost_write_lock_surfaces_retryable_conflict() {
        let path = std::env::temp_dir().join(format!(
            "ninepos-conflict-{}.db",
            Uuid::new_v4().simple()
        ));
        let short_wait = std::time::Duration::from_millis(100);

        let db_a = Database::new(DbConfig::new(&path).busy_timeout(short_wait))
            .await
            .unwrap();
        let db_b = Database::new(
            DbConfig::new(&path)
                .busy_timeout(short_wait)
                .run_migrations(false),
        )
        .await
        .unwrap();

        let espresso = seed_product(&db_a, "ESP-001", 1899, 1100, 50).await;

        // One handle holds the write lock in an open transaction
        let mut holder = db_a.pool().begin().await.unwrap();
        sqlx::query("UPDATE products SET updated_at = updated_at WHERE id = ?1")
            .bind(&espresso)
            .execute(&mut *holder)
            .await
            .unwrap();

        // The other handle's checkout cannot take the lock within the
        // busy timeout and comes back retryable
        let err = db_b
            .checkout()
            .checkout("op-1", &[line(&espresso, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)), "got {err}");
        assert!(err.is_retryable());

        // Once the lock is released the same request goes through
        holder.rollback().await.unwrap();
        db_b.checkout()
            .checkout("op-1", &[line(&espresso, 1)])
            .await
            .unwrap();

        db_a.close().await;
        db_b.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[tokio::test]
    async fn test_receipt_ids_are_distinct_within_one_second() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 50).await;

        let a = db.checkout().checkout("op-1", &[line(&espresso, 1)]).await.unwrap();
        let b = db.checkout().checkout("op-1", &[line(&espresso, 1)]).await.unwrap();

        assert_ne!(a.receipt_id, b.receipt_id);
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_never_oversell() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 10).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let engine = db.checkout();
            let product_id = espresso.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .checkout(&format!("op-{i}"), &[line(&product_id, 1)])
                    .await
            }));
        }

        let mut sold = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => rejected += 1,
                Err(other) => panic!("unexpected checkout error: {other}"),
            }
        }

        // Exactly the available stock was sold, never more
        assert_eq!(sold, 10);
        assert_eq!(rejected, 10);
        assert_eq!(db.products().get_by_id(&espresso).await.unwrap().stock_quantity, 0);
        assert_eq!(db.sales().count().await.unwrap(), 10);

        // The ledger trace replays to the final stock level
        let replayed = db.ledger().replay_balance(&espresso).await.unwrap();
        assert_eq!(replayed, Ok(0));
    }

    #[tokio::test]
    async fn test_ledger_replay_tracks_mixed_operations() {
        let db = test_db().await;
        let espresso = seed_product(&db, "ESP-001", 1899, 1100, 50).await;

        db.checkout().checkout("op-1", &[line(&espresso, 3)]).await.unwrap();
        db.products()
            .apply_patch(
                &espresso,
                nine_core::ProductPatch {
                    stock_quantity: Some(60),
                    ..nine_core::ProductPatch::default()
                },
            )
            .await
            .unwrap();
        db.checkout().checkout("op-2", &[line(&espresso, 5)]).await.unwrap();

        let product = db.products().get_by_id(&espresso).await.unwrap();
        assert_eq!(product.stock_quantity, 55);

        let replayed = db.ledger().replay_balance(&espresso).await.unwrap();
        assert_eq!(replayed, Ok(product.stock_quantity));
    }

    #[test]
    fn test_receipt_id_format() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let id = generate_receipt_id(at);

        assert!(id.starts_with("RCPT-20260830-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
