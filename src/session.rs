//! Splitting sessions.
//!
//! A session binds a fixed [`Receipt`] to a set of participants and their
//! selections. Every derived value (share prices, owed amounts, remainders)
//! is recomputed from the selections on demand, so any read after a mutation
//! on the same session reflects that mutation; there is no cache to go stale.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Serialize;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::{
    receipt::{LineItem, Receipt, ReceiptError},
    selection::Selection,
};

new_key_type! {
    /// Participant key.
    pub struct ParticipantKey;
}

/// Policy knobs for a splitting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    /// Most shares a single line item may be divided into when reconfigured.
    pub max_split_quantity: u32,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            max_split_quantity: 10,
        }
    }
}

/// Errors from split-session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    /// A split quantity must divide an item into at least one share.
    #[error("split quantity must be at least 1")]
    InvalidSplitQuantity,

    /// The referenced participant is not part of this session.
    #[error("unknown participant")]
    UnknownParticipant,

    /// Bubbled-up line item lookup failure.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// A diner taking part in a splitting session.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    display_name: String,
    selection: Selection,
}

impl Participant {
    /// Name shown in the settlement view.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// This participant's current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// One bill-splitting session over a fixed receipt.
///
/// The receipt is shared and immutable; each participant's selection is an
/// independent mutable cell, and the split configuration (how many shares
/// each item divides into) is shared across participants so that claims from
/// different people draw from the same pool of shares.
#[derive(Debug)]
pub struct SplitSession<'r> {
    receipt: &'r Receipt,
    policy: SplitPolicy,
    split_overrides: FxHashMap<u32, u32>,
    participants: SlotMap<ParticipantKey, Participant>,
}

impl<'r> SplitSession<'r> {
    /// Start a session with the default policy.
    #[must_use]
    pub fn new(receipt: &'r Receipt) -> Self {
        Self::with_policy(receipt, SplitPolicy::default())
    }

    /// Start a session with an explicit policy.
    #[must_use]
    pub fn with_policy(receipt: &'r Receipt, policy: SplitPolicy) -> Self {
        Self {
            receipt,
            policy,
            split_overrides: FxHashMap::default(),
            participants: SlotMap::with_key(),
        }
    }

    /// The receipt this session splits.
    #[must_use]
    pub fn receipt(&self) -> &'r Receipt {
        self.receipt
    }

    /// The session policy.
    #[must_use]
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Add a participant with an empty selection.
    pub fn add_participant(&mut self, display_name: impl Into<String>) -> ParticipantKey {
        let display_name = display_name.into();
        debug!(name = %display_name, "participant joined session");

        self.participants.insert(Participant {
            display_name,
            selection: Selection::new(),
        })
    }

    /// Remove a participant, releasing all their claims.
    pub fn remove_participant(&mut self, key: ParticipantKey) -> Option<Participant> {
        self.participants.remove(key)
    }

    /// Look up a participant.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::UnknownParticipant`] for a stale or foreign key.
    pub fn participant(&self, key: ParticipantKey) -> Result<&Participant, SplitError> {
        self.participants
            .get(key)
            .ok_or(SplitError::UnknownParticipant)
    }

    /// Iterate over all participants in insertion order.
    pub fn participants(&self) -> impl Iterator<Item = (ParticipantKey, &Participant)> {
        self.participants.iter()
    }

    /// Number of participants in the session.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Claim one more share of the item at `position` for `participant`.
    ///
    /// Shares draw from a pool shared by the whole session: the ceiling is
    /// the item's split quantity minus whatever other participants already
    /// claimed, so the group as a whole can never claim more shares than the
    /// item divides into. A call at the ceiling is a no-op, not an error.
    /// Items with zero printed quantity can never be claimed. Returns the
    /// resulting claimed count.
    ///
    /// # Errors
    ///
    /// - [`SplitError::UnknownParticipant`] for a stale or foreign key.
    /// - [`SplitError::Receipt`] if no item carries `position`.
    pub fn increment(
        &mut self,
        participant: ParticipantKey,
        position: u32,
    ) -> Result<u32, SplitError> {
        let item = self.receipt.item(position)?;
        let ceiling = self.claim_ceiling(item, participant);

        let entry = self
            .participants
            .get_mut(participant)
            .ok_or(SplitError::UnknownParticipant)?;

        let claimed = entry.selection.increment(position, ceiling);
        debug!(position, claimed, ceiling, "share claimed");

        Ok(claimed)
    }

    /// Release one share of the item at `position` for `participant`.
    ///
    /// Saturates at zero; the selection entry disappears when the count
    /// reaches zero. Returns the resulting claimed count.
    ///
    /// # Errors
    ///
    /// - [`SplitError::UnknownParticipant`] for a stale or foreign key.
    /// - [`SplitError::Receipt`] if no item carries `position`.
    pub fn decrement(
        &mut self,
        participant: ParticipantKey,
        position: u32,
    ) -> Result<u32, SplitError> {
        self.receipt.item(position)?;

        let entry = self
            .participants
            .get_mut(participant)
            .ok_or(SplitError::UnknownParticipant)?;

        let claimed = entry.selection.decrement(position);
        debug!(position, claimed, "share released");

        Ok(claimed)
    }

    /// Reconfigure how many shares the item at `position` divides into.
    ///
    /// Values above the policy cap clamp to the cap. Existing claims clamp
    /// down to fit the new share pool (drained in participant join order) as
    /// a side effect, so the session is never left claiming more shares than
    /// the item divides into. Returns the effective share count.
    ///
    /// # Errors
    ///
    /// - [`SplitError::InvalidSplitQuantity`] if `shares` is zero.
    /// - [`SplitError::Receipt`] if no item carries `position`.
    pub fn set_split_quantity(&mut self, position: u32, shares: u32) -> Result<u32, SplitError> {
        if shares == 0 {
            return Err(SplitError::InvalidSplitQuantity);
        }

        let item = self.receipt.item(position)?;
        let effective = shares.min(self.policy.max_split_quantity);
        let mut pool = if item.quantity().is_zero() {
            0
        } else {
            effective
        };

        self.split_overrides.insert(position, effective);

        for participant in self.participants.values_mut() {
            let kept = participant.selection.claimed(position).min(pool);
            participant.selection.clamp_to(position, kept);
            pool -= kept;
        }

        debug!(position, shares = effective, "split quantity reconfigured");

        Ok(effective)
    }

    /// Number of equal shares the item at `position` divides into.
    ///
    /// Defaults to one share per printed unit (rounded up for fractional
    /// quantities, never below one) unless reconfigured.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::Receipt`] if no item carries `position`.
    pub fn split_quantity(&self, position: u32) -> Result<u32, SplitError> {
        let item = self.receipt.item(position)?;

        Ok(self.split_quantity_of(item))
    }

    /// Price of one share of the item at `position`.
    ///
    /// This is `sum / split_quantity` over the authoritative printed sum,
    /// never `unit_price`; the divisor is always at least one.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::Receipt`] if no item carries `position`.
    pub fn share_price(&self, position: u32) -> Result<Decimal, SplitError> {
        let item = self.receipt.item(position)?;

        Ok(self.share_price_of(item))
    }

    /// Amount `participant` currently owes, derived from their selection.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::UnknownParticipant`] for a stale or foreign key.
    pub fn owed_amount(&self, participant: ParticipantKey) -> Result<Decimal, SplitError> {
        let entry = self.participant(participant)?;

        Ok(self.owed_of(entry))
    }

    /// Sum of all participants' owed amounts.
    #[must_use]
    pub fn claimed_total(&self) -> Decimal {
        self.participants
            .values()
            .map(|participant| self.owed_of(participant))
            .sum()
    }

    /// Portion of the subtotal no participant has claimed yet.
    #[must_use]
    pub fn remaining_unclaimed(&self) -> Decimal {
        self.receipt.subtotal() - self.claimed_total()
    }

    fn owed_of(&self, participant: &Participant) -> Decimal {
        participant
            .selection
            .iter()
            .map(|(position, claimed)| {
                let Ok(item) = self.receipt.item(position) else {
                    debug_assert!(false, "selection references unknown position {position}");
                    return Decimal::ZERO;
                };

                self.share_price_of(item) * Decimal::from(claimed)
            })
            .sum()
    }

    fn share_price_of(&self, item: &LineItem) -> Decimal {
        item.sum() / Decimal::from(self.split_quantity_of(item))
    }

    fn split_quantity_of(&self, item: &LineItem) -> u32 {
        self.split_overrides
            .get(&item.position())
            .copied()
            .unwrap_or_else(|| default_split_quantity(item))
    }

    /// Most shares of `item` the claimant may hold: the split quantity minus
    /// shares already claimed by everyone else.
    fn claim_ceiling(&self, item: &LineItem, claimant: ParticipantKey) -> u32 {
        if item.quantity().is_zero() {
            return 0;
        }

        let claimed_by_others: u32 = self
            .participants
            .iter()
            .filter(|(key, _)| *key != claimant)
            .map(|(_, participant)| participant.selection.claimed(item.position()))
            .sum();

        self.split_quantity_of(item)
            .saturating_sub(claimed_by_others)
    }
}

/// One share per printed unit, rounded up, never below one.
fn default_split_quantity(item: &LineItem) -> u32 {
    item.quantity().ceil().to_u32().unwrap_or(1).max(1)
}
