//! # Report Shapes
//!
//! Pure data shapes and grouping math for valuation and sales reports.
//!
//! ## Grouped Valuation Output
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ValuationReport                                    │
//! │                                                                         │
//! │  CategoryGroup "Drinks"                                                 │
//! │  ├── ValuationItem { name, quantity, cost_cents, total_cost_cents }    │
//! │  ├── ValuationItem { ... }                                             │
//! │  └── subtotal_cents = Σ item totals                                    │
//! │                                                                         │
//! │  CategoryGroup "Uncategorized"   ← empty category, query-time label    │
//! │  └── ...                                                               │
//! │                                                                         │
//! │  grand_total_cents = Σ subtotals                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Categories are emitted sorted by name (BTreeMap iteration order) so
//! reports and tests are deterministic. Items keep insertion order within
//! their group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;

// =============================================================================
// Valuation Report
// =============================================================================

/// A single row in a valuation report: one product's stock valued at cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationItem {
    pub name: String,
    pub quantity: i64,
    pub cost_cents: i64,
    /// quantity × cost_cents.
    pub total_cost_cents: i64,
}

/// One category's worth of valuation rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category_name: String,
    pub items: Vec<ValuationItem>,
    pub subtotal_cents: i64,
}

/// The full grouped valuation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Sorted by category name.
    pub categories: Vec<CategoryGroup>,
    pub grand_total_cents: i64,
}

impl ValuationReport {
    /// Looks up one category group by name (test and caller convenience).
    pub fn category(&self, name: &str) -> Option<&CategoryGroup> {
        self.categories.iter().find(|c| c.category_name == name)
    }

    /// Grand total as Money.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.grand_total_cents)
    }
}

// =============================================================================
// Valuation Builder
// =============================================================================

/// Accumulates `(category, item)` rows into a grouped, ordered report.
///
/// All three valuation queries (live, as-of, added-in-window) share this
/// grouping math; only how they compute a product's quantity differs.
#[derive(Debug, Default)]
pub struct ValuationBuilder {
    groups: BTreeMap<String, Vec<ValuationItem>>,
}

impl ValuationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one product row. `category` should already be the display
    /// category ("Uncategorized" for products stored without one).
    pub fn push(&mut self, category: &str, name: &str, quantity: i64, cost: Money) {
        let total = cost * quantity;
        self.groups
            .entry(category.to_string())
            .or_default()
            .push(ValuationItem {
                name: name.to_string(),
                quantity,
                cost_cents: cost.cents(),
                total_cost_cents: total.cents(),
            });
    }

    /// Finishes the report: per-category subtotals plus the grand total,
    /// categories in name order.
    pub fn build(self) -> ValuationReport {
        let mut grand_total = Money::zero();
        let categories = self
            .groups
            .into_iter()
            .map(|(category_name, items)| {
                let subtotal: Money = items
                    .iter()
                    .map(|i| Money::from_cents(i.total_cost_cents))
                    .sum();
                grand_total += subtotal;
                CategoryGroup {
                    category_name,
                    items,
                    subtotal_cents: subtotal.cents(),
                }
            })
            .collect();

        ValuationReport {
            categories,
            grand_total_cents: grand_total.cents(),
        }
    }
}

// =============================================================================
// Sales Reports
// =============================================================================

/// Revenue and order count over a time window.
///
/// Missing data yields zeros, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_revenue_cents: i64,
    pub total_count: i64,
}

/// One row of the top-sellers report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopSeller {
    pub product_id: String,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

// =============================================================================
// Checkout Output
// =============================================================================

/// What a successful checkout returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub sale_id: String,
    pub receipt_id: String,
    pub total_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
