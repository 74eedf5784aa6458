use serde::Serialize;

use super::fingerprint::{Fingerprint, FINGERPRINT_BITS};
use crate::catalog::ReferenceTable;
use crate::config::MatchConfig;

/// Distance reported for a cell nothing matched.
pub const UNMATCHED_DISTANCE: u32 = FINGERPRINT_BITS;

/// A reference entry and its distance to the queried fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub asset_name: String,
    pub distance: u32,
}

/// Outcome of matching one fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// Best candidate is close enough to stand alone
    Confident(Candidate),
    /// Every candidate within the distance cap, best first
    Ambiguous(Vec<Candidate>),
    /// Nothing within the distance cap
    Unmatched,
}

impl MatchResult {
    /// Candidates best first; empty when unmatched.
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            MatchResult::Confident(best) => std::slice::from_ref(best),
            MatchResult::Ambiguous(all) => all,
            MatchResult::Unmatched => &[],
        }
    }

    pub fn best_distance(&self) -> u32 {
        self.candidates()
            .first()
            .map_or(UNMATCHED_DISTANCE, |c| c.distance)
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self, MatchResult::Unmatched)
    }
}

/// Hamming-distance matcher with a two-level confidence policy.
#[derive(Clone, Debug)]
pub struct HashMatcher {
    max_distance: u32,
    confident_distance: u32,
}

impl HashMatcher {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            max_distance: config.max_distance,
            confident_distance: config.confident_distance,
        }
    }

    /// Ranks every reference entry by distance to `fingerprint`.
    ///
    /// Entries farther than `max_distance` are dropped. If the best remaining
    /// one is within `confident_distance` it is returned alone.
    pub fn match_fingerprint(
        &self,
        fingerprint: &Fingerprint,
        table: &ReferenceTable,
    ) -> MatchResult {
        let mut ranked: Vec<Candidate> = table
            .entries()
            .iter()
            .map(|entry| Candidate {
                asset_name: entry.asset_name.clone(),
                distance: fingerprint.distance(&entry.fingerprint),
            })
            .filter(|c| c.distance <= self.max_distance)
            .collect();
        ranked.sort_by_key(|c| c.distance);

        match ranked.first() {
            None => MatchResult::Unmatched,
            Some(best) if best.distance <= self.confident_distance => {
                MatchResult::Confident(best.clone())
            }
            Some(_) => MatchResult::Ambiguous(ranked),
        }
    }
}

impl Default for HashMatcher {
    fn default() -> Self {
        Self::new(&MatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceEntry;

    fn entry(name: &str, bits: u64) -> ReferenceEntry {
        ReferenceEntry {
            asset_name: name.to_string(),
            fingerprint: Fingerprint::from_bits(bits),
        }
    }

    /// Fingerprint differing from `base` in the lowest `n` bits.
    fn flip(base: u64, n: u32) -> u64 {
        if n == 0 { base } else { base ^ (u64::MAX >> (64 - n)) }
    }

    const QUERY: u64 = 0xF0F0_1234_ABCD_0F0F;

    fn query(table: &ReferenceTable) -> MatchResult {
        HashMatcher::default().match_fingerprint(&Fingerprint::from_bits(QUERY), table)
    }

    #[test]
    fn test_exact_match_is_confident() {
        let table = ReferenceTable::new(vec![
            entry("near", flip(QUERY, 12)),
            entry("exact", QUERY),
            entry("far", !QUERY),
        ]);

        let result = query(&table);
        assert_eq!(
            result,
            MatchResult::Confident(Candidate {
                asset_name: "exact".to_string(),
                distance: 0
            })
        );
        assert_eq!(result.best_distance(), 0);
    }

    #[test]
    fn test_ambiguous_keeps_all_within_cap_sorted() {
        let table = ReferenceTable::new(vec![
            entry("d20", flip(QUERY, 20)),
            entry("d30", flip(QUERY, 30)),
            entry("d11", flip(QUERY, 11)),
            entry("d24", flip(QUERY, 24)),
        ]);

        let result = query(&table);
        let names: Vec<&str> = result
            .candidates()
            .iter()
            .map(|c| c.asset_name.as_str())
            .collect();
        assert_eq!(names, vec!["d11", "d20", "d24"]);
        assert!(matches!(result, MatchResult::Ambiguous(_)));
    }

    #[test]
    fn test_confident_boundary_is_inclusive() {
        let table = ReferenceTable::new(vec![
            entry("d10", flip(QUERY, 10)),
            entry("d15", flip(QUERY, 15)),
        ]);

        let result = query(&table);
        assert_eq!(result.candidates().len(), 1);
        assert_eq!(result.best_distance(), 10);
    }

    #[test]
    fn test_nothing_within_cap_is_unmatched() {
        let table = ReferenceTable::new(vec![entry("d25", flip(QUERY, 25)), entry("inv", !QUERY)]);

        let result = query(&table);
        assert!(result.is_unmatched());
        assert!(result.candidates().is_empty());
        assert_eq!(result.best_distance(), UNMATCHED_DISTANCE);
    }

    #[test]
    fn test_empty_table_is_unmatched() {
        let result = HashMatcher::default()
            .match_fingerprint(&Fingerprint::from_bits(QUERY), &ReferenceTable::default());
        assert!(result.is_unmatched());
    }

    #[test]
    fn test_equal_distances_keep_table_order() {
        let table = ReferenceTable::new(vec![
            entry("first", flip(QUERY, 16)),
            entry("second", flip(QUERY, 16)),
        ]);

        let result = query(&table);
        let names: Vec<&str> = result
            .candidates()
            .iter()
            .map(|c| c.asset_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
