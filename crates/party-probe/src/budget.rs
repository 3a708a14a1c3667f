//! Attribute-point budget model.
//!
//! Mirrors the rule the character creator applies to its "points left"
//! readout: every stat starts at a baseline, the player gets an extra pool,
//! and
//!
//! ```text
//! remaining = pool + 4 * baseline - (strength + dexterity + energy + health)
//! ```
//!
//! An allocation is submit-valid exactly when `remaining == 0`. The readout
//! the page shows is only ever an observation to assert against; fixture
//! validity is decided here.

use serde::{Deserialize, Serialize};

use crate::draft::Stats;

/// Starting value of every stat
pub const DEFAULT_BASELINE: u32 = 10;

/// Extra points to distribute
pub const DEFAULT_POOL: u32 = 15;

/// Number of stats on the form
pub const STAT_COUNT: u32 = 4;

/// Point accounting parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Baseline value of each stat
    pub baseline: u32,
    /// Initial point pool
    pub pool: u32,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            pool: DEFAULT_POOL,
        }
    }
}

impl Budget {
    /// Create a budget
    #[must_use]
    pub const fn new(baseline: u32, pool: u32) -> Self {
        Self { baseline, pool }
    }

    /// Sum the four stats must reach (55 for the default budget)
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pool as u64 + STAT_COUNT as u64 * self.baseline as u64
    }

    /// Points left to spend; negative when over-allocated
    #[must_use]
    pub fn remaining(&self, stats: &Stats) -> i64 {
        let spent: i64 = stats.to_array().iter().map(|&v| i64::from(v)).sum();
        self.total() as i64 - spent
    }

    /// Remaining points for loose values in form order
    #[must_use]
    pub fn remaining_for(&self, strength: u32, dexterity: u32, energy: u32, health: u32) -> i64 {
        self.remaining(&Stats::new(strength, dexterity, energy, health))
    }

    /// Whether the allocation spends exactly the whole budget
    #[must_use]
    pub fn is_valid(&self, stats: &Stats) -> bool {
        self.remaining(stats) == 0
    }

    /// What the untouched form shows: every stat at baseline
    #[must_use]
    pub const fn starting_stats(&self) -> Stats {
        Stats::new(self.baseline, self.baseline, self.baseline, self.baseline)
    }

    /// An allocation known to be rejected (the untouched form, pool unspent)
    ///
    /// Returns `None` for a zero pool, where the untouched form is valid.
    #[must_use]
    pub fn invalid_example(&self) -> Option<Stats> {
        (self.pool > 0).then(|| self.starting_stats())
    }

    /// Whether a single stat can hold the whole budget
    ///
    /// False when `baseline + pool` overflows `u32`; such a budget has valid
    /// allocations no form field can express.
    #[must_use]
    pub const fn is_representable(&self) -> bool {
        self.baseline.checked_add(self.pool).is_some()
    }

    /// Every valid allocation in lexicographic order, starting from zero
    #[must_use]
    pub fn allocations(&self) -> ValidAllocations {
        ValidAllocations::new(self.total(), None, 0)
    }

    /// Valid allocations where no single stat exceeds `cap`
    #[must_use]
    pub fn allocations_capped(&self, cap: u32) -> ValidAllocations {
        ValidAllocations::new(self.total(), Some(u64::from(cap)), 0)
    }

    /// Valid allocations with every stat at or above the baseline
    ///
    /// Spreads the pool over the four stats, so the first item is available
    /// immediately whatever the baseline.
    #[must_use]
    pub fn allocations_from_baseline(&self) -> ValidAllocations {
        ValidAllocations::new(u64::from(self.pool), None, u64::from(self.baseline))
    }

    /// Deterministic valid allocation picked by `seed`
    ///
    /// Starts from the baseline and hands the pool out one point at a time to
    /// the stat chosen by a small LCG over `seed`, so the same seed always
    /// yields the same fixture. `None` when the budget is not representable.
    #[must_use]
    pub fn spread(&self, seed: u64) -> Option<Stats> {
        if !self.is_representable() {
            return None;
        }
        let mut values = [self.baseline; 4];
        let mut state = seed;
        for _ in 0..self.pool {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let slot = ((state >> 33) % u64::from(STAT_COUNT)) as usize;
            values[slot] = values[slot].checked_add(1)?;
        }
        Some(Stats::from(values))
    }
}

/// Iterator over stat tuples that sum to a fixed total
///
/// Iteration ends at the first tuple a `u32` stat cannot hold.
#[derive(Debug, Clone)]
pub struct ValidAllocations {
    total: u64,
    cap: u64,
    base: u64,
    next: Option<[u64; 3]>,
}

impl ValidAllocations {
    fn new(total: u64, cap: Option<u64>, base: u64) -> Self {
        let cap = cap.unwrap_or(total).min(total);
        let mut iter = Self {
            total,
            cap,
            base,
            next: Some([0, 0, 0]),
        };
        if !iter.is_allowed([0, 0, 0]) {
            iter.advance();
        }
        iter
    }

    fn is_allowed(&self, [a, b, c]: [u64; 3]) -> bool {
        let used = a + b + c;
        used <= self.total && self.total - used <= self.cap
    }

    fn advance(&mut self) {
        while let Some([a, b, c]) = self.next {
            let candidate = if c < self.cap && a + b + c < self.total {
                [a, b, c + 1]
            } else if b < self.cap && a + b < self.total {
                [a, b + 1, 0]
            } else if a < self.cap && a < self.total {
                [a + 1, 0, 0]
            } else {
                self.next = None;
                return;
            };
            self.next = Some(candidate);
            if self.is_allowed(candidate) {
                return;
            }
        }
    }
}

impl Iterator for ValidAllocations {
    type Item = Stats;

    fn next(&mut self) -> Option<Stats> {
        let [a, b, c] = self.next?;
        let d = self.total - a - b - c;
        self.advance();
        let base = self.base;
        let stat = move |v: u64| u32::try_from(v + base).ok();
        match (stat(a), stat(b), stat(c), stat(d)) {
            (Some(a), Some(b), Some(c), Some(d)) => Some(Stats::new(a, b, c, d)),
            _ => {
                self.next = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod remaining_tests {
        use super::*;

        #[test]
        fn test_default_total_is_55() {
            assert_eq!(Budget::default().total(), 55);
        }

        #[test]
        fn test_untouched_form_shows_pool() {
            let budget = Budget::default();
            assert_eq!(budget.remaining(&budget.starting_stats()), 15);
        }

        #[test]
        fn test_reference_allocations() {
            let budget = Budget::default();
            assert_eq!(budget.remaining_for(5, 4, 3, 3), 40);
            assert_eq!(budget.remaining_for(4, 4, 4, 3), 40);
            assert_eq!(budget.remaining_for(15, 15, 15, 10), 0);
            assert!(budget.is_valid(&Stats::new(15, 15, 15, 10)));
            assert!(!budget.is_valid(&Stats::new(5, 4, 3, 3)));
        }

        #[test]
        fn test_overspend_is_negative() {
            assert_eq!(Budget::default().remaining_for(20, 20, 20, 20), -25);
        }

        #[test]
        fn test_extreme_values_do_not_overflow() {
            let budget = Budget::default();
            let r = budget.remaining_for(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
            assert_eq!(r, 55 - 4 * i64::from(u32::MAX));
        }

        #[test]
        fn test_custom_budget() {
            let budget = Budget::new(5, 3);
            assert_eq!(budget.total(), 23);
            assert_eq!(budget.remaining_for(5, 5, 5, 5), 3);
        }
    }

    mod generator_tests {
        use super::*;

        #[test]
        fn test_allocations_all_valid_and_counted() {
            let budget = Budget::new(1, 2); // total 6
            let all: Vec<Stats> = budget.allocations().collect();
            // stars and bars: C(6 + 3, 3)
            assert_eq!(all.len(), 84);
            assert!(all.iter().all(|s| budget.is_valid(s)));
            assert_eq!(all.first(), Some(&Stats::new(0, 0, 0, 6)));
            assert_eq!(all.last(), Some(&Stats::new(6, 0, 0, 0)));
        }

        #[test]
        fn test_allocations_are_distinct() {
            let budget = Budget::new(1, 2);
            let mut all: Vec<[u32; 4]> = budget.allocations().map(|s| s.to_array()).collect();
            let before = all.len();
            all.sort_unstable();
            all.dedup();
            assert_eq!(all.len(), before);
        }

        #[test]
        fn test_capped_allocations_respect_cap() {
            let budget = Budget::default();
            let capped: Vec<Stats> = budget.allocations_capped(20).take(500).collect();
            assert!(!capped.is_empty());
            for s in &capped {
                assert!(budget.is_valid(s));
                assert!(s.to_array().iter().all(|&v| v <= 20));
            }
        }

        #[test]
        fn test_impossible_cap_yields_nothing() {
            // 4 * 13 = 52 < 55
            assert_eq!(Budget::default().allocations_capped(13).count(), 0);
        }

        #[test]
        fn test_spread_is_deterministic() {
            let budget = Budget::default();
            assert_eq!(budget.spread(7), budget.spread(7));
            assert!(budget.is_valid(&budget.spread(7).unwrap()));
        }

        #[test]
        fn test_baseline_allocations_start_at_baseline() {
            let budget = Budget::default();
            let first: Vec<Stats> = budget.allocations_from_baseline().take(2).collect();
            assert_eq!(first, vec![Stats::new(10, 10, 10, 25), Stats::new(10, 10, 11, 24)]);
            // stars and bars over the pool only: C(15 + 3, 3)
            assert_eq!(budget.allocations_from_baseline().count(), 816);
        }

        #[test]
        fn test_large_baseline_allocations_are_immediate() {
            let budget = Budget::new(1000, 15);
            let first: Vec<Stats> = budget.allocations_from_baseline().take(2).collect();
            assert_eq!(
                first,
                vec![Stats::new(1000, 1000, 1000, 1015), Stats::new(1000, 1000, 1001, 1014)]
            );
            assert!(first.iter().all(|s| budget.is_valid(s)));
        }

        #[test]
        fn test_unrepresentable_budget() {
            let budget = Budget::new(u32::MAX, 1);
            assert!(!budget.is_representable());
            assert_eq!(budget.spread(3), None);
            assert_eq!(budget.allocations().next(), None);
            assert_eq!(budget.allocations_from_baseline().next(), None);
            assert!(Budget::new(u32::MAX - 15, 15).is_representable());
        }

        #[test]
        fn test_invalid_example() {
            let budget = Budget::default();
            let stats = budget.invalid_example().unwrap();
            assert!(!budget.is_valid(&stats));
            assert!(Budget::new(10, 0).invalid_example().is_none());
        }
    }

    proptest! {
        #[test]
        fn prop_remaining_is_total_minus_sum(
            a in 0u32..1000, b in 0u32..1000, c in 0u32..1000, d in 0u32..1000
        ) {
            let budget = Budget::default();
            let expected = 55 - i64::from(a) - i64::from(b) - i64::from(c) - i64::from(d);
            prop_assert_eq!(budget.remaining_for(a, b, c, d), expected);
            prop_assert_eq!(budget.is_valid(&Stats::new(a, b, c, d)), expected == 0);
        }

        #[test]
        fn prop_spread_always_valid(seed in any::<u64>(), baseline in 0u32..50, pool in 0u32..50) {
            let budget = Budget::new(baseline, pool);
            let stats = budget.spread(seed).unwrap();
            prop_assert!(budget.is_valid(&stats));
            prop_assert!(stats.to_array().iter().all(|&v| v >= baseline));
        }
    }
}
