//! Weekly push/pull/legs rotation and the per-run used workout set

use std::collections::HashSet;

use crate::catalog::{Split, Workout};

use super::ranker::Ranked;

/// Split per weekday, Monday first
pub const WEEKLY_SPLIT: [Split; 7] = [
    Split::Push,
    Split::Pull,
    Split::Legs,
    Split::Rest,
    Split::Push,
    Split::Pull,
    Split::Legs,
];

/// Split for a weekday index (0 = Monday). Out-of-range indices rest.
pub fn split_for_weekday(weekday: u32) -> Split {
    WEEKLY_SPLIT
        .get(weekday as usize)
        .copied()
        .unwrap_or(Split::Rest)
}

/// Workout ids already recommended earlier in the same weekly run.
/// Only biases scoring; nothing is removed from candidacy.
#[derive(Debug, Clone, Default)]
pub struct UsedWorkouts {
    ids: HashSet<u32>,
}

impl UsedWorkouts {
    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn insert(&mut self, id: u32) {
        self.ids.insert(id);
    }

    /// Record a finalized day of recommendations
    pub fn record(&mut self, picks: &[Ranked<'_, Workout>]) {
        self.ids.extend(picks.iter().map(|r| r.item.id));
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_weekly_rotation() {
        let splits: Vec<Split> = (0..7).map(split_for_weekday).collect();
        assert_eq!(
            splits,
            vec![Split::Push, Split::Pull, Split::Legs, Split::Rest, Split::Push, Split::Pull, Split::Legs]
        );
    }

    #[test]
    fn test_out_of_range_is_rest() {
        assert_eq!(split_for_weekday(7), Split::Rest);
        assert_eq!(split_for_weekday(u32::MAX), Split::Rest);
    }

    #[test]
    fn test_record_grows_monotonically() {
        let catalog = Catalog::sample();
        let mut used = UsedWorkouts::default();
        assert!(used.is_empty());

        let first: Vec<_> = catalog.workouts()[..2]
            .iter()
            .map(|w| Ranked { item: w, score: 1.0 })
            .collect();
        used.record(&first);
        assert_eq!(used.len(), 2);

        let second: Vec<_> = catalog.workouts()[1..4]
            .iter()
            .map(|w| Ranked { item: w, score: 1.0 })
            .collect();
        used.record(&second);
        assert_eq!(used.len(), 4);
        assert!(catalog.workouts()[..4].iter().all(|w| used.contains(w.id)));
    }
}
