//! Splitcheck prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    currency::{BillCurrency, format},
    receipt::{LineItem, Receipt, ReceiptError, RestaurantInfo, ServiceCharge, Vat},
    recognition::{RecognitionError, from_json, normalize},
    selection::Selection,
    session::{Participant, ParticipantKey, SplitError, SplitPolicy, SplitSession},
    settlement::{ClaimedShare, ParticipantShare, Settlement},
    summary::{SummaryError, bill_text, settlement_text, write_bill, write_settlement},
};
