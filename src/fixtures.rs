//! Embedded sample payloads for tests and demos.

use crate::{
    receipt::Receipt,
    recognition::{self, RecognitionError},
};

/// A complete recognition-service response for a scanned lunch bill,
/// including the upload envelope.
pub const SAMPLE_RESPONSE: &str = r#"{
    "message": "Successfully uploaded photo.jpg",
    "uuid": "1d3e4b75-1009-49cd-a079-a98521808b07",
    "response": {
        "restaurant": "Чайхана Нават",
        "table_number": "12",
        "currency": "UZS",
        "items": [
            {"position": 1, "name": "Бабушкин хлеб", "quantity": 2, "price": 4000, "sum": 8000},
            {"position": 2, "name": "Сочники", "quantity": 1, "price": 16000, "sum": 16000},
            {"position": 3, "name": "Кетчуп 15гр", "quantity": 2, "price": 2000, "sum": 4000},
            {"position": 4, "name": "Картофель фри", "quantity": 1, "price": 8000, "sum": 8000},
            {"position": 5, "name": "Рис отварной", "quantity": 0.5, "price": 7000, "sum": 3500}
        ],
        "total": 39500,
        "vat": {"rate": 12, "amount": 4740},
        "service_charge": {"name": "Service Charge", "amount": 0}
    }
}"#;

/// A response with most fields missing, as a struggling scan produces.
pub const PARTIAL_RESPONSE: &str = r#"{
    "response": {
        "items": [
            {"name": "Чай"},
            {"position": 7, "name": "Плов", "quantity": 2, "price": 30000}
        ]
    }
}"#;

/// Normalize [`SAMPLE_RESPONSE`] into a receipt.
///
/// # Errors
///
/// Returns a [`RecognitionError`] if the embedded payload fails to
/// normalize.
pub fn sample_receipt() -> Result<Receipt, RecognitionError> {
    recognition::from_json(SAMPLE_RESPONSE)
}

/// Normalize [`PARTIAL_RESPONSE`] into a receipt.
///
/// # Errors
///
/// Returns a [`RecognitionError`] if the embedded payload fails to
/// normalize.
pub fn partial_receipt() -> Result<Receipt, RecognitionError> {
    recognition::from_json(PARTIAL_RESPONSE)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::currency::BillCurrency;

    use super::*;

    #[test]
    fn sample_receipt_normalizes_cleanly() -> TestResult {
        let receipt = sample_receipt()?;

        assert_eq!(receipt.len(), 5);
        assert_eq!(receipt.subtotal(), Decimal::from(39500));
        assert_eq!(receipt.currency(), BillCurrency::Uzs);

        Ok(())
    }

    #[test]
    fn partial_receipt_fills_in_defaults() -> TestResult {
        let receipt = partial_receipt()?;

        assert_eq!(receipt.len(), 2);
        assert_eq!(receipt.item(1)?.sum(), Decimal::ZERO);
        assert_eq!(receipt.item(7)?.sum(), Decimal::from(60000));
        assert_eq!(receipt.subtotal(), Decimal::from(60000));

        Ok(())
    }
}
