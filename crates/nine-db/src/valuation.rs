//! # Valuation Engine
//!
//! Answers "what is the inventory worth" three ways, all grouped by
//! category with a grand total:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  live          current stock_quantity x current cost, per product   │
//! │                                                                      │
//! │  as-of(t)      the ledger balance at the last entry <= t, so the    │
//! │                report reconstructs stock levels for any past         │
//! │                instant from history alone                            │
//! │                                                                      │
//! │  added(a, b)   sum of POSITIVE ledger changes inside [a, b];        │
//! │                answers "how much inventory value did we take in      │
//! │                this window", ignoring what sales drained             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cost basis is always the product's CURRENT cost price, including for
//! historical instants. Per-entry cost snapshots exist only on sale items,
//! not ledger entries, so a product repriced since `t` is valued at today's
//! cost; the quantities are exact, the cost basis is an approximation.
//!
//! Products whose ledger is empty before `t` (created later, or never
//! stocked) simply do not appear in the as-of report. Deleted products keep
//! their ledger rows but have no current cost, so they are out of scope for
//! every variant.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{ledger::LedgerRepository, product::ProductRepository};
use nine_core::{validation, ValuationBuilder, ValuationReport};

/// Temporal inventory valuation over the product catalog and stock ledger.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    products: ProductRepository,
    ledger: LedgerRepository,
}

impl ValuationEngine {
    /// Creates a new ValuationEngine.
    pub fn new(pool: SqlitePool) -> Self {
        ValuationEngine {
            products: ProductRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool),
        }
    }

    /// Values current stock at current cost. Zero-stock products appear
    /// with a zero line so the catalog and the report stay congruent.
    pub async fn live_valuation(&self) -> DbResult<ValuationReport> {
        let products = self.products.list().await?;
        let mut builder = ValuationBuilder::new();

        for product in &products {
            builder.push(
                product.display_category(),
                &product.name,
                product.stock_quantity,
                product.cost(),
            );
        }

        let report = builder.build();
        debug!(
            categories = report.categories.len(),
            grand_total_cents = report.grand_total_cents,
            "Live valuation computed"
        );
        Ok(report)
    }

    /// Values stock as it stood at `instant`, reconstructed from the
    /// ledger. Products with no ledger entry at or before the instant are
    /// omitted, as are products whose balance at that instant was zero.
    pub async fn valuation_as_of(&self, instant: DateTime<Utc>) -> DbResult<ValuationReport> {
        let products = self.products.list().await?;
        let mut builder = ValuationBuilder::new();

        for product in &products {
            let Some(entry) = self.ledger.latest_entry_as_of(&product.id, instant).await? else {
                continue;
            };
            if entry.balance <= 0 {
                continue;
            }
            builder.push(
                product.display_category(),
                &product.name,
                entry.balance,
                product.cost(),
            );
        }

        let report = builder.build();
        debug!(
            instant = %instant,
            categories = report.categories.len(),
            grand_total_cents = report.grand_total_cents,
            "As-of valuation computed"
        );
        Ok(report)
    }

    /// Values the stock RECEIVED inside the inclusive window `[start, end]`:
    /// positive ledger changes only, so sales in the window do not offset
    /// deliveries. Products with nothing added are omitted.
    pub async fn valuation_added_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<ValuationReport> {
        let products = self.products.list().await?;
        let mut builder = ValuationBuilder::new();

        for product in &products {
            let entries = self.ledger.entries_in_window(&product.id, start, end).await?;
            let added: i64 = entries
                .iter()
                .filter(|e| e.change_amount > 0)
                .map(|e| e.change_amount)
                .sum();
            if added == 0 {
                continue;
            }
            builder.push(
                product.display_category(),
                &product.name,
                added,
                product.cost(),
            );
        }

        let report = builder.build();
        debug!(
            start = %start,
            end = %end,
            grand_total_cents = report.grand_total_cents,
            "Added-in-window valuation computed"
        );
        Ok(report)
    }

    /// Text-parameter form of [`valuation_as_of`]: `date` is `YYYY-MM-DD`
    /// and `time` an optional `HH:MM`, defaulting to end of day.
    ///
    /// [`valuation_as_of`]: ValuationEngine::valuation_as_of
    pub async fn valuation_as_of_str(
        &self,
        date: &str,
        time: Option<&str>,
    ) -> DbResult<ValuationReport> {
        let (_, instant) = validation::report_window(date, None, time)?;
        self.valuation_as_of(instant).await
    }

    /// Text-parameter form of [`valuation_added_in_window`] over one day,
    /// with optional `HH:MM` bounds.
    ///
    /// [`valuation_added_in_window`]: ValuationEngine::valuation_added_in_window
    pub async fn valuation_added_str(
        &self,
        date: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> DbResult<ValuationReport> {
        let (start, end) = validation::report_window(date, start, end)?;
        self.valuation_added_in_window(start, end).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use nine_core::{NewProduct, ProductPatch};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed(db: &Database, sku: &str, category: &str, cost: i64, stock: i64) -> String {
        db.products()
            .create(NewProduct {
                sku: sku.to_string(),
                name: format!("Product {sku}"),
                price_cents: cost * 2,
                cost_cents: cost,
                category: category.to_string(),
                stock_quantity: stock,
                image_url: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_live_valuation_groups_and_totals() {
        let db = test_db().await;
        seed(&db, "ESP-001", "Coffee", 1100, 50).await;
        seed(&db, "GRD-001", "Equipment", 3000, 5).await;
        seed(&db, "MISC-01", "", 200, 10).await;

        let report = db.valuation().live_valuation().await.unwrap();

        // Sorted category order, empty category folded into Uncategorized
        let names: Vec<&str> = report.categories.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Equipment", "Uncategorized"]);

        let coffee = report.category("Coffee").unwrap();
        assert_eq!(coffee.subtotal_cents, 50 * 1100);

        assert_eq!(
            report.grand_total_cents,
            50 * 1100 + 5 * 3000 + 10 * 200
        );
    }

    #[tokio::test]
    async fn test_as_of_reconstructs_past_stock() {
        let db = test_db().await;
        let espresso = seed(&db, "ESP-001", "Coffee", 1100, 50).await;
        let after_create = Utc::now();

        // Drain some stock after the snapshot instant
        db.products()
            .apply_patch(
                &espresso,
                ProductPatch {
                    stock_quantity: Some(30),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        // Live report sees 30, the as-of report sees 50
        let live = db.valuation().live_valuation().await.unwrap();
        assert_eq!(live.grand_total_cents, 30 * 1100);

        let past = db.valuation().valuation_as_of(after_create).await.unwrap();
        assert_eq!(past.grand_total_cents, 50 * 1100);
    }

    #[tokio::test]
    async fn test_as_of_now_matches_live() {
        let db = test_db().await;
        let espresso = seed(&db, "ESP-001", "Coffee", 1100, 50).await;
        seed(&db, "GRD-001", "Equipment", 3000, 5).await;
        db.products()
            .apply_patch(
                &espresso,
                ProductPatch {
                    stock_quantity: Some(42),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        let live = db.valuation().live_valuation().await.unwrap();
        let as_of_now = db.valuation().valuation_as_of(Utc::now()).await.unwrap();
        assert_eq!(live, as_of_now);
    }

    #[tokio::test]
    async fn test_as_of_omits_products_created_later() {
        let db = test_db().await;
        seed(&db, "ESP-001", "Coffee", 1100, 50).await;
        let between = Utc::now();
        seed(&db, "GRD-001", "Equipment", 3000, 5).await;

        let report = db.valuation().valuation_as_of(between).await.unwrap();
        assert!(report.category("Coffee").is_some());
        assert!(report.category("Equipment").is_none());
        assert_eq!(report.grand_total_cents, 50 * 1100);
    }

    #[tokio::test]
    async fn test_added_in_window_counts_only_positive_changes() {
        let db = test_db().await;
        let start = Utc::now();
        let espresso = seed(&db, "ESP-001", "Coffee", 1100, 50).await;

        // -20 then +10 inside the window: only the +10 and the initial +50 count
        db.products()
            .apply_patch(
                &espresso,
                ProductPatch {
                    stock_quantity: Some(30),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        db.products()
            .apply_patch(
                &espresso,
                ProductPatch {
                    stock_quantity: Some(40),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        let end = Utc::now();

        let report = db
            .valuation()
            .valuation_added_in_window(start, end)
            .await
            .unwrap();
        assert_eq!(report.grand_total_cents, (50 + 10) * 1100);
    }

    #[tokio::test]
    async fn test_added_in_window_restock_minus_sale_counts_restock_only() {
        let db = test_db().await;
        let start = Utc::now();
        // Created empty, so the only positive change is the +50 restock
        let product = seed(&db, "BRD-001", "Bakery", 150, 0).await;

        db.products()
            .apply_patch(
                &product,
                ProductPatch {
                    stock_quantity: Some(50),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        db.checkout()
            .checkout(
                "op-1",
                &[nine_core::CheckoutLine {
                    product_id: product.clone(),
                    quantity: 3,
                }],
            )
            .await
            .unwrap();
        let end = Utc::now();

        // 50 units at cost 150, the -3 sale ignored: 7500, not 7050
        let report = db
            .valuation()
            .valuation_added_in_window(start, end)
            .await
            .unwrap();
        assert_eq!(report.grand_total_cents, 50 * 150);
    }

    #[tokio::test]
    async fn test_added_in_window_omits_untouched_products() {
        let db = test_db().await;
        seed(&db, "ESP-001", "Coffee", 1100, 50).await;
        let start = Utc::now();
        let end = start + chrono::Duration::hours(1);

        let report = db
            .valuation()
            .valuation_added_in_window(start, end)
            .await
            .unwrap();
        assert!(report.categories.is_empty());
        assert_eq!(report.grand_total_cents, 0);
    }

    #[tokio::test]
    async fn test_text_window_rejects_inverted_bounds() {
        let db = test_db().await;
        let err = db
            .valuation()
            .valuation_added_str("2026-08-30", Some("18:00"), Some("09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DbError::Domain(_)));
    }
}
