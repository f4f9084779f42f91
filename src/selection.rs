//! Split selections.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// One participant's claimed shares, keyed by line-item position.
///
/// An entry whose count reaches zero is removed from the mapping; absence is
/// the canonical "not selected" predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    claimed: FxHashMap<u32, u32>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares claimed for the item at `position`; zero when absent.
    #[must_use]
    pub fn claimed(&self, position: u32) -> u32 {
        self.claimed.get(&position).copied().unwrap_or(0)
    }

    /// Whether the item at `position` has at least one claimed share.
    #[must_use]
    pub fn is_selected(&self, position: u32) -> bool {
        self.claimed.contains_key(&position)
    }

    /// Number of distinct items with claimed shares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Iterate over `(position, claimed)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.claimed
            .iter()
            .map(|(&position, &claimed)| (position, claimed))
    }

    /// Claim one more share, saturating at `ceiling`.
    ///
    /// Returns the resulting count. A ceiling of zero means the item cannot
    /// be claimed at all and the call is a no-op.
    pub(crate) fn increment(&mut self, position: u32, ceiling: u32) -> u32 {
        let next = self.claimed(position).saturating_add(1).min(ceiling);

        if next > 0 {
            self.claimed.insert(position, next);
        }

        next
    }

    /// Release one share, saturating at zero.
    ///
    /// Returns the resulting count; the entry is removed when it reaches zero.
    pub(crate) fn decrement(&mut self, position: u32) -> u32 {
        let next = self.claimed(position).saturating_sub(1);

        if next == 0 {
            self.claimed.remove(&position);
        } else {
            self.claimed.insert(position, next);
        }

        next
    }

    /// Clamp the claimed count down to `ceiling`.
    ///
    /// Used when an item's split quantity is lowered below the current claim;
    /// the claim shrinks, it never errors.
    pub(crate) fn clamp_to(&mut self, position: u32, ceiling: u32) {
        if ceiling == 0 {
            self.claimed.remove(&position);
            return;
        }

        if let Some(count) = self.claimed.get_mut(&position) {
            *count = (*count).min(ceiling);
        }
    }
}
