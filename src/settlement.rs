//! Group settlement.
//!
//! A [`Settlement`] is a read-only projection of a session: it is rebuilt
//! from the underlying selections every time it is requested and is never
//! stored as separate mutable state that could drift from them.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{currency::BillCurrency, session::SplitSession};

/// One claimed line item at its split price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimedShare {
    /// Position of the line item on the receipt.
    pub position: u32,

    /// Item display name.
    pub name: String,

    /// Shares of the item this participant claimed.
    pub shares: u32,

    /// Amount owed for those shares.
    pub amount: Decimal,
}

/// One participant's slice of the settlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantShare {
    /// Participant display name.
    pub name: String,

    /// Total this participant owes.
    pub amount: Decimal,

    /// Claimed items in receipt print order.
    pub items: Vec<ClaimedShare>,
}

/// Everything a settlement screen needs to show for a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// Per-participant breakdown, in participant join order.
    pub shares: Vec<ParticipantShare>,

    /// Sum of all participants' owed amounts.
    pub claimed_total: Decimal,

    /// Portion of the subtotal nobody has claimed yet.
    pub remaining_unclaimed: Decimal,

    /// Receipt subtotal.
    pub subtotal: Decimal,

    /// Derived VAT amount.
    pub vat_amount: Decimal,

    /// Service charge amount.
    pub service_charge: Decimal,

    /// Subtotal plus service charge plus VAT.
    pub grand_total: Decimal,

    /// Currency the bill is denominated in.
    pub currency: BillCurrency,
}

impl Settlement {
    /// Build a settlement snapshot from a session's current selections.
    #[must_use]
    pub fn from_session(session: &SplitSession<'_>) -> Self {
        let receipt = session.receipt();

        let shares: Vec<ParticipantShare> = session
            .participants()
            .map(|(_, participant)| {
                let mut items: Vec<ClaimedShare> = participant
                    .selection()
                    .iter()
                    .filter_map(|(position, shares)| {
                        let item = receipt.item(position).ok()?;
                        let amount = session.share_price(position).ok()? * Decimal::from(shares);

                        Some(ClaimedShare {
                            position,
                            name: item.name().to_string(),
                            shares,
                            amount,
                        })
                    })
                    .collect();

                items.sort_unstable_by_key(|share| share.position);

                ParticipantShare {
                    name: participant.display_name().to_string(),
                    amount: items.iter().map(|share| share.amount).sum(),
                    items,
                }
            })
            .collect();

        let claimed_total = shares.iter().map(|share| share.amount).sum();

        Settlement {
            shares,
            claimed_total,
            remaining_unclaimed: receipt.subtotal() - claimed_total,
            subtotal: receipt.subtotal(),
            vat_amount: receipt.vat_amount(),
            service_charge: receipt.service_charge().amount,
            grand_total: receipt.grand_total(),
            currency: receipt.currency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::receipt::{LineItem, Receipt, RestaurantInfo, ServiceCharge, Vat};

    use super::*;

    fn test_receipt() -> Receipt {
        let items = vec![
            LineItem::new(
                1,
                "Baked sweet potato",
                Decimal::from(2),
                Decimal::from(1600),
                Decimal::from(3200),
            ),
            LineItem::new(
                2,
                "Beshbarmak",
                Decimal::ONE,
                Decimal::from(7400),
                Decimal::from(7400),
            ),
        ];

        Receipt::new(
            RestaurantInfo::default(),
            items,
            Decimal::from(10600),
            Vat::new(Decimal::from(12), Decimal::ZERO),
            ServiceCharge::default(),
            BillCurrency::Rub,
            None,
        )
    }

    #[test]
    fn settlement_reflects_each_participants_claims() -> TestResult {
        let receipt = test_receipt();
        let mut session = SplitSession::new(&receipt);

        let eduard = session.add_participant("Eduard");
        let igor = session.add_participant("Igor");
        session.add_participant("Shawn");

        session.increment(eduard, 1)?;
        session.increment(eduard, 2)?;
        session.increment(igor, 1)?;

        let settlement = Settlement::from_session(&session);

        assert_eq!(settlement.shares.len(), 3);

        let eduard_share = &settlement.shares[0];
        assert_eq!(eduard_share.name, "Eduard");
        assert_eq!(eduard_share.amount, Decimal::from(9000));
        assert_eq!(eduard_share.items.len(), 2);
        assert_eq!(eduard_share.items[0].position, 1);
        assert_eq!(eduard_share.items[0].amount, Decimal::from(1600));
        assert_eq!(eduard_share.items[1].name, "Beshbarmak");

        let igor_share = &settlement.shares[1];
        assert_eq!(igor_share.amount, Decimal::from(1600));

        let shawn_share = &settlement.shares[2];
        assert_eq!(shawn_share.amount, Decimal::ZERO);
        assert!(shawn_share.items.is_empty());

        assert_eq!(settlement.claimed_total, Decimal::from(10600));
        assert_eq!(settlement.remaining_unclaimed, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn totals_match_the_receipt_derivations() {
        let receipt = test_receipt();
        let session = SplitSession::new(&receipt);

        let settlement = Settlement::from_session(&session);

        assert_eq!(settlement.subtotal, Decimal::from(10600));
        assert_eq!(settlement.vat_amount, Decimal::from(1272));
        assert_eq!(settlement.service_charge, Decimal::ZERO);
        assert_eq!(settlement.grand_total, Decimal::from(11872));
        assert_eq!(settlement.currency, BillCurrency::Rub);
    }

    #[test]
    fn unclaimed_receipt_leaves_the_whole_subtotal_remaining() {
        let receipt = test_receipt();
        let mut session = SplitSession::new(&receipt);
        session.add_participant("You");

        let settlement = Settlement::from_session(&session);

        assert_eq!(settlement.claimed_total, Decimal::ZERO);
        assert_eq!(settlement.remaining_unclaimed, Decimal::from(10600));
    }

    #[test]
    fn remaining_unclaimed_is_never_negative_under_full_claims() -> TestResult {
        let receipt = test_receipt();
        let mut session = SplitSession::new(&receipt);

        let first = session.add_participant("Eduard");
        let second = session.add_participant("Igor");

        // Claim every share of every item, then keep trying to over-claim.
        for position in [1, 2] {
            for _ in 0..10 {
                session.increment(first, position)?;
                session.increment(second, position)?;
            }
        }

        let settlement = Settlement::from_session(&session);

        assert!(
            settlement.remaining_unclaimed >= Decimal::ZERO,
            "claims exceeded the receipt subtotal"
        );

        Ok(())
    }

    #[test]
    fn settlement_is_recomputed_not_cached() -> TestResult {
        let receipt = test_receipt();
        let mut session = SplitSession::new(&receipt);
        let diner = session.add_participant("You");

        session.increment(diner, 2)?;
        let before = Settlement::from_session(&session);

        session.decrement(diner, 2)?;
        let after = Settlement::from_session(&session);

        assert_eq!(before.claimed_total, Decimal::from(7400));
        assert_eq!(after.claimed_total, Decimal::ZERO);

        Ok(())
    }
}
