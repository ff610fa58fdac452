//! The rotating "currently online" subset of the roster.
//!
//! Membership is FIFO: rotation always evicts the longest-standing members
//! and admits fresh ids drawn uniformly from the inactive pool. The admin
//! identity is never admitted.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::identity::Roster;

/// Result of one rotation tick, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOutcome {
    /// How many members were actually swapped this tick.
    pub swapped: usize,
    /// The swap size that was requested.
    pub requested: usize,
}

impl RotationOutcome {
    pub fn is_partial(&self) -> bool {
        self.swapped < self.requested
    }
}

/// Fixed-size set of identity ids eligible to author background messages.
#[derive(Debug)]
pub struct ActiveSet {
    // Front = oldest member, the next to be rotated out.
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl ActiveSet {
    /// Draw the initial set: a uniform sample without replacement from the
    /// roster's non-admin ids. A roster smaller than `size` yields a
    /// correspondingly smaller set.
    pub fn initial(rng: &mut impl Rng, roster: &Roster, size: usize) -> Self {
        let candidates = roster.synthetic_ids();
        let chosen: Vec<String> = candidates
            .choose_multiple(rng, size.min(candidates.len()))
            .cloned()
            .collect();
        let members = chosen.iter().cloned().collect();
        ActiveSet {
            order: chosen.into(),
            members,
        }
    }

    /// Swap out the `swap_size` oldest members for fresh inactive ids.
    ///
    /// When fewer inactive candidates exist than requested the swap is
    /// partial; with no candidates at all the tick is a no-op. The set size
    /// never changes.
    pub fn rotate(&mut self, rng: &mut impl Rng, roster: &Roster, swap_size: usize) -> RotationOutcome {
        let inactive: Vec<String> = roster
            .synthetic_ids()
            .into_iter()
            .filter(|id| !self.members.contains(id))
            .collect();
        let swapped = swap_size.min(inactive.len()).min(self.order.len());

        for _ in 0..swapped {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        for fresh in inactive.choose_multiple(rng, swapped) {
            self.order.push_back(fresh.clone());
            self.members.insert(fresh.clone());
        }

        RotationOutcome {
            swapped,
            requested: swap_size,
        }
    }

    /// Pick a uniformly random member, if any.
    pub fn pick(&self, rng: &mut impl Rng) -> Option<String> {
        if self.order.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.order.len());
        Some(self.order[index].clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Current member ids, oldest first.
    pub fn ids(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}
