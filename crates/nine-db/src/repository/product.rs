//! # Product Repository
//!
//! CRUD for the product catalog, with every stock-touching write paired with
//! its ledger entry in one transaction.
//!
//! ## Stock Changes Always Travel With A Ledger Entry
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  create(stock=50)          patch(stock 50→47)         delete        │
//! │                                                                      │
//! │  BEGIN                     BEGIN                      BEGIN          │
//! │   INSERT products           UPDATE products            check for     │
//! │   INSERT ledger             INSERT ledger              sale_items    │
//! │    +50, bal=50,              -3, bal=47,               refs          │
//! │    initial_setup             manual_audit             DELETE product │
//! │  COMMIT                    COMMIT                     COMMIT         │
//! │                                                       (ledger rows   │
//! │                                                        are kept)     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identity is dual: the immutable UUID `id` is what ledger and sale rows
//! reference; the merchant-facing `sku` is unique but only for lookup.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::LedgerRepository;
use nine_core::{
    validation, NewProduct, Product, ProductPatch, StockReason,
};

const SELECT_COLUMNS: &str = "id, sku, name, price_cents, cost_cents, category, \
     stock_quantity, stock_reserved, image_url, created_at, updated_at";

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    ledger: LedgerRepository,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        let ledger = LedgerRepository::new(pool.clone());
        ProductRepository { pool, ledger }
    }

    /// Creates a product and, when it starts with stock, the matching
    /// `initial_setup` ledger entry in the same transaction.
    ///
    /// ## Errors
    /// * [`DbError::Domain`] - a field fails validation
    /// * [`DbError::UniqueViolation`] - the SKU is already taken
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        validation::validate_sku(&new.sku)?;
        validation::validate_product_name(&new.name)?;
        validation::validate_price_cents("price_cents", new.price_cents)?;
        validation::validate_price_cents("cost_cents", new.cost_cents)?;
        validation::validate_stock_quantity(new.stock_quantity)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: new.sku,
            name: new.name,
            price_cents: new.price_cents,
            cost_cents: new.cost_cents,
            category: new.category,
            stock_quantity: new.stock_quantity,
            stock_reserved: 0,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products
                (id, sku, name, price_cents, cost_cents, category,
                 stock_quantity, stock_reserved, image_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(&product.category)
        .bind(product.stock_quantity)
        .bind(product.stock_reserved)
        .bind(&product.image_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        if product.stock_quantity > 0 {
            self.ledger
                .append(
                    &mut tx,
                    &product.id,
                    product.stock_quantity,
                    product.stock_quantity,
                    StockReason::InitialSetup,
                    now,
                )
                .await?;
        }

        tx.commit().await?;

        info!(id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    /// Gets a product by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("product", id))?;

        Ok(product)
    }

    /// Gets a product by its merchant-facing SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("product", sku))?;

        Ok(product)
    }

    /// Lists the full catalog, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Applies a partial update. Absent fields are left untouched; the SKU
    /// and id are immutable. A stock_quantity change writes a `manual_audit`
    /// ledger entry for the delta in the same transaction.
    ///
    /// ## Errors
    /// * [`DbError::NotFound`] - no product with that id
    /// * [`DbError::Domain`] - a supplied field fails validation
    pub async fn apply_patch(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        if patch.is_empty() {
            return Err(nine_core::ValidationError::Required {
                field: "patch".to_string(),
            }
            .into());
        }
        if let Some(name) = &patch.name {
            validation::validate_product_name(name)?;
        }
        if let Some(price) = patch.price_cents {
            validation::validate_price_cents("price_cents", price)?;
        }
        if let Some(cost) = patch.cost_cents {
            validation::validate_price_cents("cost_cents", cost)?;
        }
        if let Some(stock) = patch.stock_quantity {
            validation::validate_stock_quantity(stock)?;
        }

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("product", id))?;

        let now = Utc::now();
        let stock_before = current.stock_quantity;
        let updated = Product {
            id: current.id,
            sku: current.sku,
            name: patch.name.unwrap_or(current.name),
            price_cents: patch.price_cents.unwrap_or(current.price_cents),
            cost_cents: patch.cost_cents.unwrap_or(current.cost_cents),
            category: patch.category.unwrap_or(current.category),
            stock_quantity: patch.stock_quantity.unwrap_or(current.stock_quantity),
            stock_reserved: current.stock_reserved,
            image_url: patch.image_url.or(current.image_url),
            created_at: current.created_at,
            updated_at: now,
        };

        sqlx::query(
            r#"
            UPDATE products
            SET name = ?1, price_cents = ?2, cost_cents = ?3, category = ?4,
                stock_quantity = ?5, image_url = ?6, updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&updated.name)
        .bind(updated.price_cents)
        .bind(updated.cost_cents)
        .bind(&updated.category)
        .bind(updated.stock_quantity)
        .bind(&updated.image_url)
        .bind(updated.updated_at)
        .bind(&updated.id)
        .execute(&mut *tx)
        .await?;

        // Record the stock delta, if any, in the same transaction
        if let Some(new_stock) = patch.stock_quantity {
            let delta = new_stock - stock_before;
            if delta != 0 {
                self.ledger
                    .append(
                        &mut tx,
                        &updated.id,
                        delta,
                        new_stock,
                        StockReason::ManualAudit,
                        now,
                    )
                    .await?;
            }
        }

        tx.commit().await?;

        debug!(id = %updated.id, "Product patched");
        Ok(updated)
    }

    /// Deletes a product that has never been sold.
    ///
    /// Ledger rows are deliberately left behind; they reference the product
    /// weakly and remain valid history.
    ///
    /// ## Errors
    /// * [`DbError::NotFound`] - no product with that id
    /// * [`DbError::Domain`] with [`CoreError::ProductInUse`] - the product
    ///   appears on at least one sale line
    ///
    /// [`CoreError::ProductInUse`]: nine_core::CoreError::ProductInUse
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let referenced: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if referenced > 0 {
            return Err(nine_core::CoreError::ProductInUse(id.to_string()).into());
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", id));
        }

        tx.commit().await?;

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
