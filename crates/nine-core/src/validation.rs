//! # Validation Module
//!
//! Input validation utilities for NinePOS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: External caller (HTTP layer / agent)                         │
//! │  ├── Basic format checks, request shaping                              │
//! │  └── Auth + licensing gates                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any lock or query)                       │
//! │  ├── Business rule validation                                          │
//! │  └── A request rejected here has ZERO side effects                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (sku, receipt_id)                              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nine_core::validation::{validate_sku, validate_quantity, report_window};
//!
//! validate_sku("COKE-330").unwrap();
//! validate_quantity(5).unwrap();
//!
//! // Valuation window for one calendar day
//! let (start, end) = report_window("2026-02-27", None, None).unwrap();
//! assert!(start < end);
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::error::ValidationError;
use crate::types::CheckoutLine;
use crate::{MAX_CHECKOUT_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 100 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use nine_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(200).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 100,
        });
    }

    // Check for valid characters (alphanumeric, hyphen, underscore)
    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a checkout line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost in cents.
///
/// Zero is allowed (giveaway or not-yet-priced items); negative is not.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a stock quantity (absolute, not a delta).
///
/// The stock invariant is `stock_quantity >= 0`; a request carrying a
/// negative absolute value is malformed.
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock_quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Checkout Validators
// =============================================================================

/// Validates the full line list of a checkout request.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CHECKOUT_LINES lines
/// - Every line id non-empty, every quantity valid
///
/// Runs before the checkout transaction begins: a request rejected here has
/// taken no locks and written nothing.
pub fn validate_checkout_lines(lines: &[CheckoutLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if lines.len() > MAX_CHECKOUT_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_CHECKOUT_LINES as i64,
        });
    }

    for line in lines {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            });
        }
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Report Window Parsing
// =============================================================================
// Valuation queries accept a calendar date and optional time-of-day bounds
// in canonical text form (`YYYY-MM-DD`, `HH:MM`). Parsing lives here so the
// engines only ever see UTC instants.

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_report_date(text: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

/// Parses a time of day in `HH:MM` form.
pub fn parse_time_of_day(field: &str, text: &str) -> ValidationResult<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected HH:MM".to_string(),
        }
    })
}

/// Builds an inclusive UTC window for one calendar day.
///
/// ## Defaults
/// - No start bound: `00:00`
/// - No end bound: end of day (`23:59:59`)
///
/// ## Example
/// ```rust
/// use nine_core::validation::report_window;
///
/// let (start, end) = report_window("2026-02-27", Some("09:00"), Some("17:30")).unwrap();
/// assert_eq!(start.to_rfc3339(), "2026-02-27T09:00:00+00:00");
/// assert_eq!(end.to_rfc3339(), "2026-02-27T17:30:59+00:00");
/// ```
pub fn report_window(
    date: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> ValidationResult<(DateTime<Utc>, DateTime<Utc>)> {
    let day = parse_report_date(date)?;

    let start_time = match start {
        Some(text) => parse_time_of_day("start_time", text)?,
        None => NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
    };

    // End bounds are inclusive to the minute: 17:30 covers through 17:30:59.
    let end_time = match end {
        Some(text) => {
            let t = parse_time_of_day("end_time", text)?;
            t.with_second(59).unwrap_or(t)
        }
        None => NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
    };

    if end_time < start_time {
        return Err(ValidationError::InvertedWindow {
            start: start_time.format("%H:%M").to_string(),
            end: end_time.format("%H:%M").to_string(),
        });
    }

    let start_at = Utc.from_utc_datetime(&day.and_time(start_time));
    let end_at = Utc.from_utc_datetime(&day.and_time(end_time));

    Ok((start_at, end_at))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("abc_123").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_prices_and_stock() {
        assert!(validate_price_cents("price_cents", 0).is_ok());
        assert!(validate_price_cents("price_cents", -1).is_err());
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_checkout_lines() {
        let line = |id: &str, qty: i64| CheckoutLine {
            product_id: id.to_string(),
            quantity: qty,
        };

        assert!(validate_checkout_lines(&[]).is_err());
        assert!(validate_checkout_lines(&[line("p1", 2)]).is_ok());
        assert!(validate_checkout_lines(&[line("", 2)]).is_err());
        assert!(validate_checkout_lines(&[line("p1", 0)]).is_err());

        let too_many: Vec<_> = (0..101).map(|i| line(&format!("p{i}"), 1)).collect();
        assert!(validate_checkout_lines(&too_many).is_err());
    }

    #[test]
    fn test_parse_report_date() {
        assert!(parse_report_date("2026-02-27").is_ok());
        assert!(parse_report_date(" 2026-02-27 ").is_ok());
        assert!(parse_report_date("27/02/2026").is_err());
        assert!(parse_report_date("2026-13-01").is_err());
    }

    #[test]
    fn test_report_window_full_day_default() {
        let (start, end) = report_window("2026-02-27", None, None).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-02-27T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-02-27T23:59:59+00:00");
    }

    #[test]
    fn test_report_window_bounds() {
        let (start, end) = report_window("2026-02-27", Some("09:00"), Some("17:30")).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-02-27T09:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-02-27T17:30:59+00:00");
    }

    #[test]
    fn test_report_window_inverted() {
        assert!(report_window("2026-02-27", Some("18:00"), Some("09:00")).is_err());
    }

    #[test]
    fn test_report_window_bad_time() {
        assert!(report_window("2026-02-27", Some("9am"), None).is_err());
    }
}
