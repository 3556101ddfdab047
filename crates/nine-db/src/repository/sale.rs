//! # Sale Repository
//!
//! Persistence for completed sales and their line items.
//!
//! Sales are only ever created by the checkout engine, inside its
//! transaction, so the insert methods take the transaction connection the
//! same way [`LedgerRepository::append`] does. Reads serve receipt lookup
//! and reporting.
//!
//! Line items snapshot `price_at_sale_cents` and `cost_at_sale_cents` so a
//! later catalog repricing never rewrites what a historical receipt says.
//!
//! [`LedgerRepository::append`]: crate::repository::ledger::LedgerRepository::append

use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use nine_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, receipt_id, operator_id, total_cents, status, sale_time";
const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, price_at_sale_cents, cost_at_sale_cents";

/// Repository for sale record operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts the sale header inside the caller's transaction.
    ///
    /// ## Errors
    /// * [`DbError::DuplicateReceipt`] - the receipt id is already taken
    pub async fn insert_sale(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales (id, receipt_id, operator_id, total_cents, status, sale_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.receipt_id)
        .bind(&sale.operator_id)
        .bind(sale.total_cents)
        .bind(sale.status)
        .bind(sale.sale_time)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one line item inside the caller's transaction, assigning its
    /// UUID here.
    pub async fn insert_item(
        &self,
        conn: &mut SqliteConnection,
        sale_id: &str,
        product_id: &str,
        quantity: i64,
        price_at_sale_cents: i64,
        cost_at_sale_cents: i64,
    ) -> DbResult<SaleItem> {
        let item = SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            price_at_sale_cents,
            cost_at_sale_cents,
        };

        sqlx::query(
            r#"
            INSERT INTO sale_items
                (id, sale_id, product_id, quantity, price_at_sale_cents, cost_at_sale_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price_at_sale_cents)
        .bind(item.cost_at_sale_cents)
        .execute(conn)
        .await?;

        Ok(item)
    }

    /// Looks a sale up by UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Sale> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("sale", id))?;

        Ok(sale)
    }

    /// Looks a sale up by its printed receipt id.
    pub async fn get_by_receipt(&self, receipt_id: &str) -> DbResult<Sale> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE receipt_id = ?1"
        ))
        .bind(receipt_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("sale", receipt_id))?;

        Ok(sale)
    }

    /// Line items for one sale, in insertion order.
    pub async fn items_for_sale(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid ASC"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Sales in the inclusive window `[start, end]`, newest first.
    pub async fn list_in_window(
        &self,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS} FROM sales
            WHERE sale_time >= ?1 AND sale_time <= ?2
            ORDER BY sale_time DESC, id DESC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts all recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use nine_core::SaleStatus;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_sale(receipt_id: &str) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            receipt_id: receipt_id.to_string(),
            operator_id: "op-1".to_string(),
            total_cents: 4297,
            status: SaleStatus::Completed,
            sale_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let sales = db.sales();
        let sale = sample_sale("RCPT-20260830-a1b2c3d4");

        let mut tx = db.pool().begin().await.unwrap();
        sales.insert_sale(&mut tx, &sale).await.unwrap();
        tx.commit().await.unwrap();

        let by_id = sales.get_by_id(&sale.id).await.unwrap();
        assert_eq!(by_id.receipt_id, sale.receipt_id);
        assert_eq!(by_id.status, SaleStatus::Completed);

        let by_receipt = sales.get_by_receipt(&sale.receipt_id).await.unwrap();
        assert_eq!(by_receipt.id, sale.id);
        assert_eq!(by_receipt.total_cents, 4297);
    }

    #[tokio::test]
    async fn test_duplicate_receipt_id_is_rejected() {
        let db = test_db().await;
        let sales = db.sales();

        let mut tx = db.pool().begin().await.unwrap();
        sales
            .insert_sale(&mut tx, &sample_sale("RCPT-20260830-deadbeef"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let err = sales
            .insert_sale(&mut tx, &sample_sale("RCPT-20260830-deadbeef"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateReceipt { .. }));
    }

    #[tokio::test]
    async fn test_items_keep_price_and_cost_snapshots() {
        let db = test_db().await;
        let sales = db.sales();
        let sale = sample_sale("RCPT-20260830-00000001");

        // A product row for the item's foreign key
        let product = db
            .products()
            .create(nine_core::NewProduct {
                sku: "ESP-001".to_string(),
                name: "Espresso Beans 1kg".to_string(),
                price_cents: 1899,
                cost_cents: 1100,
                category: "Coffee".to_string(),
                stock_quantity: 10,
                image_url: None,
            })
            .await
            .unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        sales.insert_sale(&mut tx, &sale).await.unwrap();
        sales
            .insert_item(&mut tx, &sale.id, &product.id, 2, 1899, 1100)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let items = sales.items_for_sale(&sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price_at_sale_cents, 1899);
        assert_eq!(items[0].cost_at_sale_cents, 1100);
        assert_eq!(items[0].line_total(), nine_core::Money::from_cents(3798));
    }

    #[tokio::test]
    async fn test_sold_product_cannot_be_deleted() {
        let db = test_db().await;
        let product = db
            .products()
            .create(nine_core::NewProduct {
                sku: "ESP-001".to_string(),
                name: "Espresso Beans 1kg".to_string(),
                price_cents: 1899,
                cost_cents: 1100,
                category: "Coffee".to_string(),
                stock_quantity: 10,
                image_url: None,
            })
            .await
            .unwrap();

        let sale = sample_sale("RCPT-20260830-00000002");
        let mut tx = db.pool().begin().await.unwrap();
        db.sales().insert_sale(&mut tx, &sale).await.unwrap();
        db.sales()
            .insert_item(&mut tx, &sale.id, &product.id, 1, 1899, 1100)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let err = db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(nine_core::CoreError::ProductInUse(_))
        ));
    }
}
