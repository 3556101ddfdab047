//! # Domain Types
//!
//! Core domain types used throughout NinePOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ StockLedgerEntry│   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  product_id     │   │  receipt_id     │       │
//! │  │  price_cents    │   │  change_amount  │   │  operator_id    │       │
//! │  │  cost_cents     │   │  balance        │   │  total_cents    │       │
//! │  │  stock_quantity │   │  reason         │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockReason   │   │   SaleStatus    │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  InitialSetup   │   │  Completed      │   │  price_at_sale  │       │
//! │  │  ManualAudit    │   │  Voided         │   │  cost_at_sale   │       │
//! │  │  SaleCheckout   │   └─────────────────┘   │  (snapshots)    │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, receipt_id) - human-readable, externally visible
//!
//! ## Immutability Rules
//! `StockLedgerEntry` and committed `Sale`/`SaleItem` rows are append-only:
//! there is no update or delete operation for them anywhere in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Stock Reason
// =============================================================================

/// Why a stock quantity changed.
///
/// Every mutation of `Product::stock_quantity` produces exactly one ledger
/// entry tagged with one of these reasons, appended in the same transaction
/// as the mutation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    /// Product was created with nonzero opening stock.
    InitialSetup,
    /// An operator edited stock directly (audit, restock, shrinkage fix).
    ManualAudit,
    /// Stock left the store through a committed checkout.
    SaleCheckout,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// ## Invariant
/// `stock_quantity >= 0` at all times. Any operation that would make it
/// negative is rejected before being applied (and the schema carries a
/// CHECK constraint as a second line of defense).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - unique business identifier (barcode scans
    /// resolve products through this).
    pub sku: String,

    /// Display name shown to cashier and on receipts.
    pub name: String,

    /// Sell price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost price in cents (used for inventory valuation).
    pub cost_cents: i64,

    /// Category used to group valuation reports. May be empty; an empty
    /// category is displayed as "Uncategorized" at query time, never stored
    /// as such.
    pub category: String,

    /// Current on-hand stock.
    pub stock_quantity: i64,

    /// Stock held for omnichannel orders. Carried on the model; not yet
    /// consumed by checkout.
    pub stock_reserved: i64,

    /// Optional product image URL.
    pub image_url: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sell price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }

    /// Category name as it appears in reports.
    pub fn display_category(&self) -> &str {
        if self.category.is_empty() {
            crate::UNCATEGORIZED
        } else {
            &self.category
        }
    }
}

/// Input for creating a catalog product.
///
/// Creating a product with `stock_quantity > 0` appends an `InitialSetup`
/// ledger entry in the same transaction as the insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub category: String,
    pub stock_quantity: i64,
    pub image_url: Option<String>,
}

/// Explicit optional-field patch for catalog edits.
///
/// ## Why not a free-form map?
/// Each field is validated on its own, and a `stock_quantity` change is the
/// only field that triggers a ledger entry (reason `ManualAudit`, change =
/// new - old). A typed patch makes that rule checkable at compile time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_cents: Option<i64>,
    pub category: Option<String>,
    pub stock_quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// True when no field is set (such a patch is rejected as a validation
    /// error before any query runs).
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price_cents.is_none()
            && self.cost_cents.is_none()
            && self.category.is_none()
            && self.stock_quantity.is_none()
            && self.image_url.is_none()
    }
}

// =============================================================================
// Stock Ledger Entry
// =============================================================================

/// One immutable record of a single stock-quantity change.
///
/// ## Trace Invariant
/// For a given product, entries ordered by timestamp form a trace where each
/// entry's `balance` equals the previous entry's balance plus its own
/// `change_amount`, and the last entry's balance equals the product's
/// current stock quantity.
///
/// The `balance` is supplied by the caller that performed the stock change;
/// the ledger records it and never recomputes it. That keeps the ledger an
/// audit trail, not a second source of truth that could drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLedgerEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this entry belongs to (weak reference: entries survive
    /// product lifecycle events other than deletion).
    pub product_id: String,

    /// Signed change: positive = stock added, negative = stock removed.
    pub change_amount: i64,

    /// The product's stock quantity immediately after this change.
    pub balance: i64,

    /// Why the stock changed.
    pub reason: StockReason,

    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Sales are created already completed by the checkout engine; `Voided`
/// exists for forward compatibility with refunds (out of scope today).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale has been paid and finalized.
    Completed,
    /// Sale was cancelled after the fact.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction header.
///
/// Created together with its `SaleItem` rows inside the checkout
/// transaction. Never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Externally visible unique receipt label (e.g. `RCPT-20260830-1A2B3C4D`).
    pub receipt_id: String,
    /// The authenticated operator who rang the sale up. Resolved by the
    /// auth layer before the core is invoked.
    pub operator_id: String,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub sale_time: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product pricing at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Sell price in cents at time of sale (frozen; later catalog price
    /// changes must not affect it).
    pub price_at_sale_cents: i64,
    /// Cost price in cents at time of sale (frozen; for profit reporting).
    pub cost_at_sale_cents: i64,
}

impl SaleItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price_at_sale(&self) -> Money {
        Money::from_cents(self.price_at_sale_cents)
    }

    /// Line total: frozen price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_sale() * self.quantity
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// One requested line of a checkout: "this product, this many units".
///
/// Lines are processed in submission order; the same product may appear on
/// more than one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_sell() {
        let p = sample_product(10);
        assert!(p.can_sell(10));
        assert!(p.can_sell(3));
        assert!(!p.can_sell(11));
    }

    #[test]
    fn test_display_category_falls_back() {
        let mut p = sample_product(1);
        p.category = String::new();
        assert_eq!(p.display_category(), "Uncategorized");
        p.category = "Drinks".to_string();
        assert_eq!(p.display_category(), "Drinks");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            stock_quantity: Some(5),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_sale_item_line_total() {
        let item = SaleItem {
            id: "i1".to_string(),
            sale_id: "s1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            price_at_sale_cents: 500,
            cost_at_sale_cents: 200,
        };
        assert_eq!(item.line_total().cents(), 1500);
    }

    fn sample_product(stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p1".to_string(),
            sku: "SKU-1".to_string(),
            name: "Sample".to_string(),
            price_cents: 500,
            cost_cents: 200,
            category: "Misc".to_string(),
            stock_quantity: stock,
            stock_reserved: 0,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
