//! # Seeding
//!
//! Seeds decide where a participant is placed in a bracket. Seeds supplied by the registry are
//! honored when they are valid; every other participant is seeded by registration order.
//!
//! Seeding is fully deterministic. Nothing in this module is random, statistically or
//! cryptographically: the same input always produces the same seeds.
use std::collections::HashSet;

use crate::{BracketParticipant, Participant};

/// Assigns a seed to every participant and returns the participants sorted ascending by seed.
///
/// A seed supplied by the registry is kept if it lies within `1..=N` and no earlier
/// participant already claimed it. All other participants receive the lowest unused seed,
/// in input order. The returned seeds are always a permutation of `1..=N`.
pub fn assign_seeds<I>(participants: I) -> Vec<BracketParticipant>
where
    I: IntoIterator<Item = Participant>,
{
    let participants: Vec<Participant> = participants.into_iter().collect();
    let len = participants.len();

    let mut used = HashSet::with_capacity(len);
    let mut seeds = Vec::with_capacity(len);

    for participant in &participants {
        let seed = match participant.seed {
            Some(seed) if seed >= 1 && seed as usize <= len && !used.contains(&seed) => {
                used.insert(seed);
                Some(seed)
            }
            Some(seed) => {
                log::warn!(
                    "Ignoring invalid seed {} of participant {}",
                    seed,
                    participant.id
                );
                None
            }
            None => None,
        };

        seeds.push(seed);
    }

    let mut next_seed = 1;
    let mut seeded: Vec<BracketParticipant> = participants
        .into_iter()
        .zip(seeds)
        .map(|(participant, seed)| {
            let seed = match seed {
                Some(seed) => seed,
                None => {
                    while used.contains(&next_seed) {
                        next_seed += 1;
                    }

                    used.insert(next_seed);
                    next_seed
                }
            };

            BracketParticipant {
                id: participant.id,
                name: participant.name,
                kind: participant.kind,
                seed,
                is_eliminated: false,
            }
        })
        .collect();

    seeded.sort_by_key(|p| p.seed);
    seeded
}

/// Returns the seeds of a bracket with `bracket_size` slots in standard tournament order.
/// Every two consecutive seeds form a first round match, e.g. for 8 slots:
/// `[1, 8, 4, 5, 2, 7, 3, 6]`.
///
/// The order guarantees that seed 1 plays the lowest seed and that the two best seeds can
/// only meet in the final. `bracket_size` must be a power of two.
pub fn standard_order(bracket_size: usize) -> Vec<u32> {
    debug_assert!(bracket_size == 0 || bracket_size.is_power_of_two());

    if bracket_size == 0 {
        return Vec::new();
    }

    let mut order = vec![1_u32];
    while order.len() < bracket_size {
        let sum = order.len() as u32 * 2 + 1;

        order = order
            .into_iter()
            .flat_map(|seed| [seed, sum - seed])
            .collect();
    }

    order
}

#[cfg(test)]
mod tests {
    use super::{assign_seeds, standard_order};
    use crate::participants;

    #[test]
    fn test_standard_order() {
        assert_eq!(standard_order(0), Vec::<u32>::new());
        assert_eq!(standard_order(1), vec![1]);
        assert_eq!(standard_order(2), vec![1, 2]);
        assert_eq!(standard_order(4), vec![1, 4, 2, 3]);
        assert_eq!(standard_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
        assert_eq!(
            standard_order(16),
            vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
        );
    }

    #[test]
    fn test_assign_seeds_registration_order() {
        let seeded = assign_seeds(participants!["a", "b", "c"]);

        let seeds: Vec<_> = seeded.iter().map(|p| (p.id.as_str(), p.seed)).collect();
        assert_eq!(seeds, [("a", 1), ("b", 2), ("c", 3)]);
        assert!(seeded.iter().all(|p| !p.is_eliminated));
    }

    #[test]
    fn test_assign_seeds_explicit() {
        let seeded = assign_seeds(participants!["a", "b" => 1, "c", "d" => 3]);

        let seeds: Vec<_> = seeded.iter().map(|p| (p.id.as_str(), p.seed)).collect();
        assert_eq!(seeds, [("b", 1), ("a", 2), ("d", 3), ("c", 4)]);
    }

    #[test]
    fn test_assign_seeds_invalid() {
        // Out of range and duplicated seeds fall back to registration order.
        let seeded = assign_seeds(participants!["a" => 2, "b" => 2, "c" => 9, "d" => 0]);

        let seeds: Vec<_> = seeded.iter().map(|p| (p.id.as_str(), p.seed)).collect();
        assert_eq!(seeds, [("b", 1), ("a", 2), ("c", 3), ("d", 4)]);
    }

    #[test]
    fn test_assign_seeds_permutation() {
        for n in 0..20 {
            let seeded = assign_seeds(crate::tests::players(n));
            let mut seeds: Vec<_> = seeded.iter().map(|p| p.seed).collect();
            seeds.sort_unstable();

            assert_eq!(seeds, (1..=n as u32).collect::<Vec<_>>());
        }
    }
}
