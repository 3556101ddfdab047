//! # nine-core: Pure Business Logic for NinePOS
//!
//! This crate is the **heart** of the NinePOS checkout and inventory
//! subsystem. It contains all business logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        NinePOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          External callers (HTTP layer, agent, tooling)          │   │
//! │  │    resolve auth + licensing BEFORE invoking the core            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ operator identity + typed requests     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ nine-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ Valuation │  │   rules   │  │   │
//! │  │   │  Ledger   │  │  (cents)  │  │ TopSeller │  │  windows  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    nine-db (Database Layer)                     │   │
//! │  │    SQLite repositories, CheckoutEngine, ValuationEngine         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockLedgerEntry, Sale, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`report`] - Report shapes (valuation groups, sales summaries)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation and window parsing
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use nine_core::money::Money;
//!
//! // Create money from cents (never from floats!)
//! let cost = Money::from_cents(150); // $1.50
//!
//! // Valuation math: 50 units received at $1.50 cost
//! let value = cost * 50;
//! assert_eq!(value.cents(), 7500); // $75.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use nine_core::Money` instead of
// `use nine_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use report::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Category name used in valuation reports for products stored with an
/// empty category.
///
/// ## Why at query time?
/// The empty category is never rewritten in the catalog; grouping applies
/// this label when building a report so catalog data stays exactly as the
/// operator entered it.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Maximum lines allowed in a single checkout request
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CHECKOUT_LINES: usize = 100;

/// Maximum quantity of a single line in a checkout
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
