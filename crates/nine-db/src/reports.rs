//! # Sales Report Engine
//!
//! Aggregates over completed sales: revenue, order counts, top sellers.
//!
//! ## Window Semantics
//! Every report runs over an inclusive `[start, end]` window of
//! `sale_time`. The text-parameter forms take one calendar day with
//! optional `HH:MM` bounds, defaulting to the whole day.
//!
//! Empty windows are an answer, not an error: zero revenue, zero orders,
//! no rows.
//!
//! ## Top Sellers
//! Ranked by units sold descending, with product id ascending as the
//! tiebreak so equal products come back in a stable order. Revenue uses the
//! frozen `price_at_sale_cents`, so a catalog repricing never rewrites last
//! week's report.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use nine_core::{validation, SalesSummary, TopSeller};

/// Default row cap for the top-sellers report.
pub const DEFAULT_TOP_SELLERS_LIMIT: i64 = 10;

/// Read-only aggregates over the sales tables.
#[derive(Debug, Clone)]
pub struct SalesReportEngine {
    pool: SqlitePool,
}

impl SalesReportEngine {
    /// Creates a new SalesReportEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SalesReportEngine { pool }
    }

    /// Total revenue and number of completed sales in `[start, end]`.
    pub async fn revenue_and_count(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<SalesSummary> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COUNT(*)
            FROM sales
            WHERE status = 'completed' AND sale_time >= ?1 AND sale_time <= ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let summary = SalesSummary {
            total_revenue_cents: row.0,
            total_count: row.1,
        };
        debug!(
            revenue_cents = summary.total_revenue_cents,
            orders = summary.total_count,
            "Sales summary computed"
        );
        Ok(summary)
    }

    /// The best-selling products in `[start, end]`, at most `limit` rows.
    ///
    /// Product names come from the current catalog; a product sold and then
    /// deleted is still counted but falls back to its id as the name.
    pub async fn top_sellers(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<TopSeller>> {
        let rows = sqlx::query_as::<_, TopSeller>(
            r#"
            SELECT
                si.product_id AS product_id,
                COALESCE(p.name, si.product_id) AS name,
                SUM(si.quantity) AS units_sold,
                SUM(si.quantity * si.price_at_sale_cents) AS revenue_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN products p ON p.id = si.product_id
            WHERE s.status = 'completed' AND s.sale_time >= ?1 AND s.sale_time <= ?2
            GROUP BY si.product_id
            ORDER BY units_sold DESC, si.product_id ASC
            LIMIT ?3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The best-selling products across all recorded sales, at most `limit`
    /// rows. Same ranking as [`top_sellers`], no time window.
    ///
    /// [`top_sellers`]: SalesReportEngine::top_sellers
    pub async fn top_sellers_all_time(&self, limit: i64) -> DbResult<Vec<TopSeller>> {
        let rows = sqlx::query_as::<_, TopSeller>(
            r#"
            SELECT
                si.product_id AS product_id,
                COALESCE(p.name, si.product_id) AS name,
                SUM(si.quantity) AS units_sold,
                SUM(si.quantity * si.price_at_sale_cents) AS revenue_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN products p ON p.id = si.product_id
            WHERE s.status = 'completed'
            GROUP BY si.product_id
            ORDER BY units_sold DESC, si.product_id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Text-parameter form of [`revenue_and_count`] over one calendar day,
    /// with optional `HH:MM` bounds.
    ///
    /// [`revenue_and_count`]: SalesReportEngine::revenue_and_count
    pub async fn daily_summary(
        &self,
        date: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> DbResult<SalesSummary> {
        let (start, end) = validation::report_window(date, start, end)?;
        self.revenue_and_count(start, end).await
    }

    /// Text-parameter form of [`top_sellers`] over one calendar day.
    ///
    /// [`top_sellers`]: SalesReportEngine::top_sellers
    pub async fn daily_top_sellers(
        &self,
        date: &str,
        start: Option<&str>,
        end: Option<&str>,
        limit: Option<i64>,
    ) -> DbResult<Vec<TopSeller>> {
        let (start, end) = validation::report_window(date, start, end)?;
        self.top_sellers(start, end, limit.unwrap_or(DEFAULT_TOP_SELLERS_LIMIT))
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
