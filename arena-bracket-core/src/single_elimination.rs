use crate::seeding;
use crate::utils::NumExt;
use crate::{EntrantSpot, Entrants, Match, MatchId, Matches, NextSlot};

/// A single elimination bracket.
///
/// The first round has `bracket_size / 2` matches where `bracket_size` is the smallest power of
/// two that fits all entrants. Entrants are placed in standard seeding order, so byes are
/// always given to the top seeds. Every following round halves the number of matches until
/// the final.
#[derive(Clone, Debug)]
pub(crate) struct SingleElimination {
    entrants: Entrants,
    matches: Matches,
}

impl SingleElimination {
    /// Creates a new `SingleElimination` bracket with the given `entrants`. `entrants` must be
    /// ordered ascending by seed.
    pub fn new(entrants: Entrants) -> Self {
        log::debug!(
            "Creating new SingleElimination bracket with {} entrants",
            entrants.len()
        );

        let bracket_size = Self::bracket_size(entrants.len());
        let num_rounds = Self::num_rounds(entrants.len());

        let mut matches = Matches::with_capacity(Self::calculate_matches(entrants.len()));

        if num_rounds > 0 {
            let order = seeding::standard_order(bracket_size);

            for (index, seeds) in order.chunks_exact(2).enumerate() {
                let spot = |seed: u32| {
                    EntrantSpot::new(
                        entrants
                            .get(seed as usize - 1)
                            .map(|entrant| entrant.id.clone()),
                    )
                };

                let entrants = [spot(seeds[0]), spot(seeds[1])];

                let mut r#match = Match::new(match_id(1, index), 1, entrants);
                if let Some(next) = next_slot(1, index, num_rounds) {
                    r#match = r#match.with_next(next);
                }

                matches.push(r#match);
            }
        }

        for round in 2..=num_rounds {
            for index in 0..Self::matches_in_round(bracket_size, round) {
                let mut r#match = Match::tbd(match_id(round, index), round);
                if let Some(next) = next_slot(round, index, num_rounds) {
                    r#match = r#match.with_next(next);
                }

                matches.push(r#match);
            }
        }

        Self::advance_byes(&mut matches);

        log::debug!(
            "Created new SingleElimination bracket with {} matches",
            matches.len()
        );

        Self { entrants, matches }
    }

    /// Returns the smallest power of two that fits `entrants`.
    pub fn bracket_size(entrants: usize) -> usize {
        match entrants {
            0 => 0,
            n => n.next_power_of_two(),
        }
    }

    /// Returns the number of rounds required for `entrants`.
    #[inline]
    pub fn num_rounds(entrants: usize) -> usize {
        entrants.ilog2_ceil()
    }

    /// Returns the number of matches in the 1-based `round` of a bracket with `bracket_size`
    /// slots.
    #[inline]
    pub fn matches_in_round(bracket_size: usize, round: usize) -> usize {
        bracket_size >> round
    }

    /// Returns the total number of matches required for `entrants`. Every match eliminates
    /// exactly one slot until one is left.
    #[inline]
    fn calculate_matches(entrants: usize) -> usize {
        match entrants {
            0 | 1 => 0,
            n => n.next_power_of_two() - 1,
        }
    }

    /// Decides all first round matches with a single entrant and moves that entrant into the
    /// next round.
    fn advance_byes(matches: &mut Matches) {
        let byes: Vec<_> = matches
            .round(1)
            .filter(|m| m.is_bye())
            .filter_map(|m| {
                let winner = m.entrants().iter().find_map(EntrantSpot::entrant)?;
                Some((m.id().clone(), winner.clone(), m.next().cloned()))
            })
            .collect();

        for (id, winner, next) in byes {
            log::debug!("Advancing {} by bye in {}", winner, id);

            if let Some(next) = next {
                if let Some(r#match) = matches.get_by_id_mut(&next.match_id) {
                    r#match.set_spot(next.position, EntrantSpot::Entrant(winner.clone()));
                }
            }

            if let Some(r#match) = matches.get_by_id_mut(&id) {
                r#match.set_winner(winner);
            }
        }
    }

    #[inline]
    pub fn into_parts(self) -> (Entrants, Matches) {
        (self.entrants, self.matches)
    }
}

/// Returns the id of the match at the 0-based `index` within the 1-based `round`.
fn match_id(round: usize, index: usize) -> MatchId {
    MatchId::new(format!("match_{}_{}", round, index + 1))
}

/// Returns the slot the winner of the match at `index` in `round` advances into, or `None`
/// for the final.
fn next_slot(round: usize, index: usize, num_rounds: usize) -> Option<NextSlot> {
    if round >= num_rounds {
        return None;
    }

    Some(NextSlot {
        match_id: match_id(round + 1, index / 2),
        position: index % 2,
    })
}

#[cfg(test)]
mod tests {
    use super::SingleElimination;
    use crate::tests::players;
    use crate::{build_with_kind, BracketKind, EntrantSpot, MatchId, NextSlot, ParticipantId};

    fn entrant(id: &str) -> EntrantSpot<ParticipantId> {
        EntrantSpot::Entrant(ParticipantId::from(id))
    }

    #[test]
    fn test_bracket_size() {
        assert_eq!(SingleElimination::bracket_size(0), 0);
        assert_eq!(SingleElimination::bracket_size(1), 1);
        assert_eq!(SingleElimination::bracket_size(2), 2);
        assert_eq!(SingleElimination::bracket_size(3), 4);
        assert_eq!(SingleElimination::bracket_size(5), 8);
        assert_eq!(SingleElimination::bracket_size(8), 8);
        assert_eq!(SingleElimination::bracket_size(9), 16);
        assert_eq!(SingleElimination::bracket_size(64), 64);
    }

    #[test]
    fn test_single_elimination() {
        let bracket = build_with_kind(players(0), BracketKind::SingleElimination);
        assert!(bracket.rounds().is_empty());
        assert!(bracket.matches().is_empty());

        let bracket = build_with_kind(players(1), BracketKind::SingleElimination);
        assert!(bracket.rounds().is_empty());
        assert!(bracket.matches().is_empty());

        let bracket = build_with_kind(players(2), BracketKind::SingleElimination);
        assert_eq!(bracket.rounds().len(), 1);
        assert_eq!(bracket.matches()[0].entrants(), &[entrant("p1"), entrant("p2")]);
        assert_eq!(bracket.matches()[0].next(), None);

        let bracket = build_with_kind(players(4), BracketKind::SingleElimination);
        let entrants: Vec<_> = bracket.matches().iter().map(|m| m.entrants().clone()).collect();
        assert_eq!(
            entrants,
            [
                [entrant("p1"), entrant("p4")],
                [entrant("p2"), entrant("p3")],
                [EntrantSpot::TBD, EntrantSpot::TBD],
            ]
        );
    }

    #[test]
    fn test_single_elimination_five() {
        let bracket = build_with_kind(players(5), BracketKind::SingleElimination);

        assert_eq!(bracket.bracket_size(), 8);

        let rounds: Vec<_> = bracket.rounds().iter().map(|r| r.matches().len()).collect();
        assert_eq!(rounds, [4, 2, 1]);

        // Seeds 1, 2 and 3 receive a bye and are already placed in round 2.
        let entrants: Vec<_> = bracket.matches().iter().map(|m| m.entrants().clone()).collect();
        assert_eq!(
            entrants,
            [
                [entrant("p1"), EntrantSpot::Empty],
                [entrant("p4"), entrant("p5")],
                [entrant("p2"), EntrantSpot::Empty],
                [entrant("p3"), EntrantSpot::Empty],
                [entrant("p1"), EntrantSpot::TBD],
                [entrant("p2"), entrant("p3")],
                [EntrantSpot::TBD, EntrantSpot::TBD],
            ]
        );

        let winners: Vec<_> = bracket
            .matches()
            .iter()
            .map(|m| m.winner().map(ParticipantId::as_str))
            .collect();
        assert_eq!(
            winners,
            [Some("p1"), None, Some("p2"), Some("p3"), None, None, None]
        );

        assert!(bracket.participants().iter().all(|p| !p.is_eliminated));
    }

    #[test]
    fn test_single_elimination_next_slots() {
        let bracket = build_with_kind(players(8), BracketKind::SingleElimination);

        let next: Vec<_> = bracket.matches().iter().map(|m| m.next().cloned()).collect();
        let slot = |id: &str, position| {
            Some(NextSlot {
                match_id: MatchId::from(id),
                position,
            })
        };

        assert_eq!(
            next,
            [
                slot("match_2_1", 0),
                slot("match_2_1", 1),
                slot("match_2_2", 0),
                slot("match_2_2", 1),
                slot("match_3_1", 0),
                slot("match_3_1", 1),
                None,
            ]
        );
    }

    #[test]
    fn test_single_elimination_shape() {
        for n in 2..=70 {
            let bracket = build_with_kind(players(n), BracketKind::SingleElimination);
            let size = bracket.bracket_size();

            assert!(size.is_power_of_two());
            assert!(size >= n && size < 2 * n);
            assert_eq!(bracket.matches().len(), size - 1);
            assert_eq!(bracket.rounds()[0].matches().len(), size / 2);

            for rounds in bracket.rounds().windows(2) {
                assert_eq!(rounds[1].matches().len() * 2, rounds[0].matches().len());
            }

            let total: usize = bracket.rounds().iter().map(|r| r.matches().len()).sum();
            assert_eq!(total, size - 1);

            // Every participant appears exactly once in round 1.
            for participant in bracket.participants().iter() {
                let count = bracket
                    .matches()
                    .round(1)
                    .filter(|m| m.contains(&participant.id))
                    .count();
                assert_eq!(count, 1);
            }

            // No first round match is a double bye.
            assert!(bracket
                .matches()
                .round(1)
                .all(|m| m.entrants().iter().any(EntrantSpot::is_entrant)));
        }
    }
}
