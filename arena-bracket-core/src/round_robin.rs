use crate::{EntrantSpot, Entrants, Match, MatchId, Matches};

/// A round robin bracket: every participant plays every other participant exactly once.
///
/// Rounds are scheduled using the circle method. With an odd number of entrants a phantom
/// entrant is added and whoever is paired against it sits out that round.
#[derive(Clone, Debug)]
pub(crate) struct RoundRobin {
    entrants: Entrants,
    matches: Matches,
}

impl RoundRobin {
    pub fn new(entrants: Entrants) -> Self {
        log::debug!(
            "Creating new RoundRobin bracket with {} entrants",
            entrants.len()
        );

        // entrants.len() if even, entrants.len() + 1 if odd.
        let entrants_even = if entrants.len() % 2 == 0 {
            entrants.len()
        } else {
            entrants.len() + 1
        };

        let num_rounds = entrants_even.saturating_sub(1);
        let matches_per_round = entrants.len() / 2;

        let mut matches = Matches::with_capacity(num_rounds * matches_per_round);

        // Pin entrant 0 and rotate all others once per round.
        for round in 0..num_rounds {
            let mut number = 0;

            for index in 0..entrants_even / 2 {
                let first = Self::circle_entrant(entrants_even, round, index);
                let second = Self::circle_entrant(entrants_even, round, entrants_even - index - 1);

                // The phantom entrant is out of bounds.
                let (Some(first), Some(second)) = (entrants.get(first), entrants.get(second)) else {
                    continue;
                };

                number += 1;
                matches.push(Match::new(
                    MatchId::new(format!("rr_match_{}_{}", round + 1, number)),
                    round + 1,
                    [
                        EntrantSpot::Entrant(first.id.clone()),
                        EntrantSpot::Entrant(second.id.clone()),
                    ],
                ));
            }
        }

        log::debug!(
            "Created new RoundRobin bracket with {} matches",
            matches.len()
        );

        Self { entrants, matches }
    }

    /// Returns the index of entrant of the at the given `index` in a circle of length `n` at
    /// the given `round`.
    #[inline]
    fn circle_entrant(n: usize, round: usize, index: usize) -> usize {
        debug_assert!(n % 2 == 0);

        if index == 0 {
            return 0;
        }

        match index as isize - round as isize {
            res if res <= 0 => n - res.unsigned_abs() - 1,
            res => res as usize,
        }
    }

    #[inline]
    pub fn into_parts(self) -> (Entrants, Matches) {
        (self.entrants, self.matches)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::RoundRobin;
    use crate::tests::players;
    use crate::{build_with_kind, BracketKind, EntrantSpot, ParticipantId};

    #[test]
    fn test_circle_entrant() {
        let round: Vec<_> = (0..6).map(|i| RoundRobin::circle_entrant(6, 0, i)).collect();
        assert_eq!(round, [0, 1, 2, 3, 4, 5]);

        let round: Vec<_> = (0..6).map(|i| RoundRobin::circle_entrant(6, 1, i)).collect();
        assert_eq!(round, [0, 5, 1, 2, 3, 4]);

        let round: Vec<_> = (0..6).map(|i| RoundRobin::circle_entrant(6, 2, i)).collect();
        assert_eq!(round, [0, 4, 5, 1, 2, 3]);
    }

    #[test]
    fn test_round_robin() {
        let bracket = build_with_kind(players(4), BracketKind::RoundRobin);

        let matches: Vec<_> = bracket
            .matches()
            .iter()
            .map(|m| {
                let [a, b] = m.entrants();
                (
                    m.id().as_str(),
                    a.entrant().map(ParticipantId::as_str),
                    b.entrant().map(ParticipantId::as_str),
                )
            })
            .collect();

        assert_eq!(
            matches,
            [
                ("rr_match_1_1", Some("p1"), Some("p4")),
                ("rr_match_1_2", Some("p2"), Some("p3")),
                ("rr_match_2_1", Some("p1"), Some("p3")),
                ("rr_match_2_2", Some("p4"), Some("p2")),
                ("rr_match_3_1", Some("p1"), Some("p2")),
                ("rr_match_3_2", Some("p3"), Some("p4")),
            ]
        );
    }

    #[test]
    fn test_round_robin_shape() {
        for n in 0..=21 {
            let bracket = build_with_kind(players(n), BracketKind::RoundRobin);

            let rounds = match n {
                0 | 1 => 0,
                n if n % 2 == 0 => n - 1,
                n => n,
            };

            assert_eq!(bracket.rounds().len(), rounds);
            assert_eq!(bracket.matches().len(), n * n.saturating_sub(1) / 2);

            for round in bracket.rounds() {
                assert_eq!(round.matches().len(), n / 2);

                // Nobody plays twice in the same round.
                let mut seen = HashSet::new();
                for id in round.matches() {
                    let r#match = bracket.get_match(id).unwrap();
                    for spot in r#match.entrants() {
                        assert!(seen.insert(spot.entrant().unwrap().clone()));
                    }
                }
            }

            // Every pair meets exactly once.
            let mut pairs = HashSet::new();
            for r#match in bracket.matches().iter() {
                assert!(r#match.entrants().iter().all(EntrantSpot::is_entrant));
                assert!(r#match.next().is_none());

                let mut pair: Vec<_> = r#match
                    .entrants()
                    .iter()
                    .filter_map(EntrantSpot::entrant)
                    .cloned()
                    .collect();
                pair.sort();

                assert_ne!(pair[0], pair[1]);
                assert!(pairs.insert(pair));
            }
        }
    }
}
