//! # Repository Layer
//!
//! One repository per aggregate, each a thin typed wrapper over the pool:
//!
//! - [`product::ProductRepository`] - catalog CRUD, stock changes paired
//!   with their ledger entries
//! - [`ledger::LedgerRepository`] - append-only stock history and the
//!   temporal reads the valuation engine is built on
//! - [`sale::SaleRepository`] - sale headers and snapshot line items
//!
//! Writes that must be atomic with other writes take a `&mut
//! SqliteConnection` so the caller owns the transaction; everything else
//! borrows the pool.

pub mod ledger;
pub mod product;
pub mod sale;
