//! # nine-db: Storage and Engines for NinePOS
//!
//! This crate provides database access for the NinePOS backend.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        NinePOS Data Flow                                │
//! │                                                                         │
//! │  Caller (checkout, catalog edit, report request)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      nine-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌─────────────────┐  │   │
//! │  │   │   Engines    │   │  Repositories  │   │    Database     │  │   │
//! │  │   │              │   │                │   │    (pool.rs)    │  │   │
//! │  │   │ Checkout     │──►│ ProductRepo    │──►│  SqlitePool     │  │   │
//! │  │   │ Valuation    │   │ LedgerRepo     │   │  WAL + busy     │  │   │
//! │  │   │ SalesReport  │   │ SaleRepo       │   │  timeout        │  │   │
//! │  │   └──────────────┘   └────────────────┘   └─────────────────┘  │   │
//! │  │                                                 │               │   │
//! │  └─────────────────────────────────────────────────┼───────────────┘   │
//! │                                                    ▼                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   products │ stock_ledger (append-only) │ sales │ sale_items   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, ledger, sale)
//! - [`checkout`] - The transactional sale engine
//! - [`valuation`] - Live and temporal inventory valuation
//! - [`reports`] - Revenue, order count and top-seller aggregates
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nine_db::{Database, DbConfig};
//!
//! // Create database with default config (migrations run on startup)
//! let config = DbConfig::new("path/to/ninepos.db");
//! let db = Database::new(config).await?;
//!
//! // Ring up a sale
//! let receipt = db.checkout().checkout("op-1", &lines).await?;
//!
//! // Value the inventory as it stood yesterday evening
//! let report = db.valuation().valuation_as_of_str("2026-08-29", Some("18:00")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;
pub mod valuation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Engine re-exports for convenience
pub use checkout::CheckoutEngine;
pub use reports::SalesReportEngine;
pub use valuation::ValuationEngine;

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
