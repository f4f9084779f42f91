//! Normalization of raw recognition output.
//!
//! The recognition service is an OCR pipeline and its output is inherently
//! noisy: fields go missing, numbers arrive as strings, whole sections drop
//! out. Everything here degrades to defaults instead of failing, because a
//! partially-readable bill is still splittable; the only hard failure is a
//! payload with no items sequence at all.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    currency::BillCurrency,
    receipt::{LineItem, Receipt, RestaurantInfo, ServiceCharge, Vat},
};

/// Errors that can occur while normalizing recognition output.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The payload could not be parsed as JSON at all.
    #[error("recognition payload is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    /// `items` was missing or not a sequence.
    #[error("recognition payload has no items sequence")]
    MalformedReceipt,
}

/// Parse a raw service response and normalize it into a [`Receipt`].
///
/// # Errors
///
/// - [`RecognitionError::InvalidJson`]: the payload is not JSON.
/// - [`RecognitionError::MalformedReceipt`]: no items sequence was found.
pub fn from_json(payload: &str) -> Result<Receipt, RecognitionError> {
    let value: Value = serde_json::from_str(payload).map_err(RecognitionError::InvalidJson)?;

    normalize(&value)
}

/// Normalize already-parsed recognition output into a [`Receipt`].
///
/// The upload service wraps the bill in a `{message, uuid, response: {..}}`
/// envelope; a `response` object is unwrapped before normalizing.
///
/// # Errors
///
/// Returns [`RecognitionError::MalformedReceipt`] if `items` is missing or
/// not a sequence. Every other missing or unreadable field degrades to a
/// default.
pub fn normalize(payload: &Value) -> Result<Receipt, RecognitionError> {
    let bill = match payload.get("response") {
        Some(inner) if inner.is_object() => inner,
        _ => payload,
    };

    let raw_items = bill
        .get("items")
        .and_then(Value::as_array)
        .ok_or(RecognitionError::MalformedReceipt)?;

    let items = normalize_items(raw_items);

    let subtotal = decimal_field(bill, "total")
        .or_else(|| decimal_field(bill, "subtotal"))
        .unwrap_or_else(|| {
            let resum: Decimal = items.iter().map(LineItem::sum).sum();
            debug!(%resum, "payload has no printed total; re-summing items");
            resum
        });

    let printed_total = decimal_field(bill, "total");

    let currency = bill
        .get("currency")
        .and_then(Value::as_str)
        .map_or_else(BillCurrency::default, BillCurrency::from_code);

    Ok(Receipt::new(
        normalize_restaurant(bill),
        items,
        subtotal,
        normalize_vat(bill.get("vat")),
        normalize_service_charge(bill.get("service_charge")),
        currency,
        printed_total,
    ))
}

fn normalize_items(raw_items: &[Value]) -> Vec<LineItem> {
    let mut used_positions = FxHashSet::default();
    let mut items = Vec::with_capacity(raw_items.len());

    for (fallback, raw) in (1u32..).zip(raw_items) {
        let mut position = decimal_field(raw, "position")
            .and_then(|position| position.to_u32())
            .unwrap_or(fallback);

        // Positions key the selection mapping, so collisions would merge two
        // distinct entries.
        if !used_positions.insert(position) {
            let reassigned = next_free_position(&used_positions);
            warn!(position, reassigned, "duplicate item position");
            position = reassigned;
            used_positions.insert(position);
        }

        items.push(normalize_item(position, raw));
    }

    items
}

fn next_free_position(used_positions: &FxHashSet<u32>) -> u32 {
    used_positions
        .iter()
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

fn normalize_item(position: u32, raw: &Value) -> LineItem {
    let name = string_field(raw, "name").unwrap_or_else(|| {
        debug!(position, "item has no name; using placeholder");
        "Unknown".to_string()
    });

    let quantity = decimal_field(raw, "quantity").unwrap_or_else(|| {
        debug!(position, "item has no quantity; defaulting to 0");
        Decimal::ZERO
    });

    let unit_price = decimal_field(raw, "price").unwrap_or_else(|| {
        debug!(position, "item has no price; defaulting to 0");
        Decimal::ZERO
    });

    let mut sum = decimal_field(raw, "sum").unwrap_or_else(|| quantity * unit_price);

    if sum < Decimal::ZERO {
        warn!(position, %sum, "negative item sum; clamping to 0");
        sum = Decimal::ZERO;
    }

    LineItem::new(position, name, quantity, unit_price, sum)
}

fn normalize_restaurant(bill: &Value) -> RestaurantInfo {
    let defaults = RestaurantInfo::default();

    RestaurantInfo {
        name: string_field(bill, "restaurant").unwrap_or(defaults.name),
        table_number: string_field(bill, "table_number").unwrap_or(defaults.table_number),
        order_number: string_field(bill, "order_number").unwrap_or(defaults.order_number),
        date: string_field(bill, "date").unwrap_or(defaults.date),
        time: string_field(bill, "time").unwrap_or(defaults.time),
        waiter: string_field(bill, "waiter").unwrap_or(defaults.waiter),
    }
}

fn normalize_vat(raw: Option<&Value>) -> Vat {
    let Some(raw) = raw else {
        return Vat::default();
    };

    Vat::new(
        decimal_field(raw, "rate").unwrap_or(Decimal::ZERO),
        decimal_field(raw, "amount").unwrap_or(Decimal::ZERO),
    )
}

fn normalize_service_charge(raw: Option<&Value>) -> ServiceCharge {
    let Some(raw) = raw else {
        return ServiceCharge::default();
    };

    let defaults = ServiceCharge::default();

    ServiceCharge {
        name: string_field(raw, "name").unwrap_or(defaults.name),
        amount: decimal_field(raw, "amount").unwrap_or(Decimal::ZERO),
    }
}

/// Read a string field, treating non-string values as absent.
fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Read a numeric field, accepting JSON numbers and numeric strings.
fn decimal_field(obj: &Value, key: &str) -> Option<Decimal> {
    obj.get(key).and_then(decimal_value)
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Decimal::from_i64(int)
            } else {
                number.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
