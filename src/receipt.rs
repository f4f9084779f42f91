//! Receipt model.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::currency::BillCurrency;

/// Errors related to receipt lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReceiptError {
    /// No line item carries the requested position.
    #[error("no line item at position {0}")]
    ItemNotFound(u32),
}

/// One priced entry on a scanned bill.
///
/// `sum` is the total printed on the receipt and is authoritative: it is
/// never recomputed from `quantity * unit_price`, which may disagree with it
/// due to rounding at the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    position: u32,
    name: String,
    quantity: Decimal,
    unit_price: Decimal,
    sum: Decimal,
}

impl LineItem {
    /// Create a new line item.
    #[must_use]
    pub fn new(
        position: u32,
        name: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        sum: Decimal,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            quantity,
            unit_price,
            sum,
        }
    }

    /// Position of this entry on the receipt; unique and stable.
    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Display name; not used in any computation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Printed purchase quantity; may be fractional (e.g. 0.5 portions).
    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Printed per-unit price.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Printed total for this entry; authoritative.
    #[must_use]
    pub fn sum(&self) -> Decimal {
        self.sum
    }
}

/// Value-added tax as recognised from the receipt.
///
/// `printed_amount` is provenance only; [`Receipt::vat_amount`] is the
/// authoritative value for settlement math.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vat {
    /// Rate in percent points (12 means 12%).
    pub rate: Decimal,

    /// Amount printed on the receipt, if any.
    pub printed_amount: Decimal,
}

impl Vat {
    /// Create a VAT record from a rate in percent points.
    #[must_use]
    pub fn new(rate: Decimal, printed_amount: Decimal) -> Self {
        Self {
            rate,
            printed_amount,
        }
    }
}

/// A named absolute service charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCharge {
    /// Label printed on the receipt.
    pub name: String,

    /// Absolute amount, not a percentage.
    pub amount: Decimal,
}

impl Default for ServiceCharge {
    fn default() -> Self {
        Self {
            name: "Service Charge".to_string(),
            amount: Decimal::ZERO,
        }
    }
}

/// Venue metadata recognised from the receipt header.
///
/// Every field is a total string: normalization substitutes placeholders for
/// anything the recognition service could not read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantInfo {
    /// Venue name.
    pub name: String,

    /// Table number.
    pub table_number: String,

    /// Order number.
    pub order_number: String,

    /// Date printed on the receipt.
    pub date: String,

    /// Time printed on the receipt.
    pub time: String,

    /// Waiter name.
    pub waiter: String,
}

impl Default for RestaurantInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            table_number: "N/A".to_string(),
            order_number: "N/A".to_string(),
            date: "N/A".to_string(),
            time: "N/A".to_string(),
            waiter: "N/A".to_string(),
        }
    }
}

/// A normalized scanned bill.
///
/// Created once per scan and immutable afterwards; splitting sessions borrow
/// it and never write through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    restaurant: RestaurantInfo,
    items: Vec<LineItem>,
    subtotal: Decimal,
    vat: Vat,
    service_charge: ServiceCharge,
    currency: BillCurrency,
    printed_total: Option<Decimal>,
}

impl Receipt {
    /// Create a receipt from already-normalized parts.
    #[must_use]
    pub fn new(
        restaurant: RestaurantInfo,
        items: Vec<LineItem>,
        subtotal: Decimal,
        vat: Vat,
        service_charge: ServiceCharge,
        currency: BillCurrency,
        printed_total: Option<Decimal>,
    ) -> Self {
        Self {
            restaurant,
            items,
            subtotal,
            vat,
            service_charge,
            currency,
            printed_total,
        }
    }

    /// Line items in receipt print order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line item by its position.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::ItemNotFound`] if no item carries `position`.
    pub fn item(&self, position: u32) -> Result<&LineItem, ReceiptError> {
        self.items
            .iter()
            .find(|item| item.position == position)
            .ok_or(ReceiptError::ItemNotFound(position))
    }

    /// Subtotal as printed on the receipt.
    ///
    /// Authoritative: may differ from a naive re-sum of item sums due to
    /// rounding at the source.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// The recognised VAT record.
    #[must_use]
    pub fn vat(&self) -> &Vat {
        &self.vat
    }

    /// The recognised service charge.
    #[must_use]
    pub fn service_charge(&self) -> &ServiceCharge {
        &self.service_charge
    }

    /// Venue metadata.
    #[must_use]
    pub fn restaurant(&self) -> &RestaurantInfo {
        &self.restaurant
    }

    /// Currency the bill is denominated in.
    #[must_use]
    pub fn currency(&self) -> BillCurrency {
        self.currency
    }

    /// Total printed on the receipt, if the recognition service supplied one.
    ///
    /// Display-only provenance; [`Receipt::grand_total`] is authoritative.
    #[must_use]
    pub fn printed_total(&self) -> Option<Decimal> {
        self.printed_total
    }

    /// VAT amount derived from the subtotal and the recognised rate.
    #[must_use]
    pub fn vat_amount(&self) -> Decimal {
        Percentage::from(self.vat.rate / Decimal::ONE_HUNDRED) * self.subtotal
    }

    /// Grand total: subtotal plus service charge plus derived VAT.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.subtotal + self.service_charge.amount + self.vat_amount()
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the receipt has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn test_receipt() -> Receipt {
        let items = vec![
            LineItem::new(
                1,
                "Flatbread",
                Decimal::from(2),
                Decimal::from(4000),
                Decimal::from(8000),
            ),
            LineItem::new(
                2,
                "Dumplings",
                Decimal::from(1),
                Decimal::from(16000),
                Decimal::from(16000),
            ),
        ];

        Receipt::new(
            RestaurantInfo::default(),
            items,
            Decimal::from(33000),
            Vat::new(Decimal::from(12), Decimal::ZERO),
            ServiceCharge::default(),
            BillCurrency::Uzs,
            None,
        )
    }

    #[test]
    fn vat_amount_is_subtotal_times_rate() {
        let receipt = test_receipt();

        assert_eq!(receipt.vat_amount(), Decimal::from(3960));
    }

    #[test]
    fn grand_total_adds_service_and_vat() {
        let receipt = test_receipt();

        assert_eq!(receipt.grand_total(), Decimal::from(36960));
    }

    #[test]
    fn grand_total_includes_service_charge_amount() {
        let mut receipt = test_receipt();
        receipt.service_charge = ServiceCharge {
            name: "Service".to_string(),
            amount: Decimal::from(500),
        };

        assert_eq!(receipt.grand_total(), Decimal::from(37460));
    }

    #[test]
    fn zero_rate_vat_amount_is_zero() {
        let mut receipt = test_receipt();
        receipt.vat = Vat::default();

        assert_eq!(receipt.vat_amount(), Decimal::ZERO);
        assert_eq!(receipt.grand_total(), receipt.subtotal());
    }

    #[test]
    fn item_lookup_finds_by_position() -> TestResult {
        let receipt = test_receipt();

        let item = receipt.item(2)?;

        assert_eq!(item.name(), "Dumplings");
        assert_eq!(item.sum(), Decimal::from(16000));

        Ok(())
    }

    #[test]
    fn item_lookup_missing_returns_error() {
        let receipt = test_receipt();

        assert_eq!(receipt.item(99), Err(ReceiptError::ItemNotFound(99)));
    }

    #[test]
    fn subtotal_is_printed_value_not_a_resum() {
        // 8000 + 16000 = 24000, but the printed subtotal says 33000 and wins.
        let receipt = test_receipt();

        assert_eq!(receipt.subtotal(), Decimal::from(33000));
    }

    #[test]
    fn default_placeholders_are_total_strings() {
        let info = RestaurantInfo::default();

        assert_eq!(info.name, "Unknown");
        assert_eq!(info.table_number, "N/A");
        assert_eq!(info.waiter, "N/A");
    }

    #[test]
    fn len_and_is_empty_reflect_items() {
        let receipt = test_receipt();

        assert_eq!(receipt.len(), 2);
        assert!(!receipt.is_empty());
    }
}
