use std::collections::{HashMap, HashSet};

use crate::utils::NumExt;
use crate::{Bracket, EntrantSpot, Entrants, Match, MatchId, Matches, ParticipantId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A swiss group stage bracket.
///
/// # Implementation notes
///
/// The pairing system is based on the Monrad system, the tie-breaking system is based on the
/// Buchholz system.
// The initial round pairs every entrant with the next one by seed: #1 v #2, #3 v #4, etc.
// All later rounds are empty until the previous round is fully reported and are then paired
// by score first and seed second, see `pair`. With an odd number of entrants one entrant sits
// out every round and receives `score_bye` points.
#[derive(Clone, Debug)]
pub(crate) struct Swiss {
    entrants: Entrants,
    matches: Matches,
}

impl Swiss {
    /// Creates a new `Swiss` bracket using the given `entrants`. `entrants` must be ordered
    /// ascending by seed.
    pub fn new(entrants: Entrants) -> Self {
        log::debug!(
            "Creating new Swiss bracket with {} entrants",
            entrants.len()
        );

        let num_rounds = entrants.len().ilog2_ceil();
        let num_matches = Self::matches_per_round(entrants.len());

        let mut matches = Matches::with_capacity(num_rounds * num_matches);

        // Build the first round.
        if num_rounds > 0 {
            for (index, pair) in entrants.chunks_exact(2).enumerate() {
                matches.push(Match::new(
                    match_id(1, index),
                    1,
                    [
                        EntrantSpot::Entrant(pair[0].id.clone()),
                        EntrantSpot::Entrant(pair[1].id.clone()),
                    ],
                ));
            }
        }

        // Remaining rounds.
        for round in 2..=num_rounds {
            for index in 0..num_matches {
                matches.push(Match::tbd(match_id(round, index), round));
            }
        }

        Self { entrants, matches }
    }

    /// Returns the number of matches in every round. With an odd number of entrants one
    /// entrant has a bye.
    #[inline]
    pub fn matches_per_round(entrants: usize) -> usize {
        entrants / 2
    }

    #[inline]
    pub fn into_parts(self) -> (Entrants, Matches) {
        (self.entrants, self.matches)
    }
}

fn match_id(round: usize, index: usize) -> MatchId {
    MatchId::new(format!("swiss_match_{}_{}", round, index + 1))
}

/// The points awarded by the swiss standings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwissOptions {
    /// How many points to award for a win.
    pub score_win: u64,
    /// How many points to award for a loss.
    pub score_loss: u64,
    /// How many points to award for a bye.
    pub score_bye: u64,
}

impl Default for SwissOptions {
    fn default() -> Self {
        Self {
            score_win: 1,
            score_loss: 0,
            score_bye: 1,
        }
    }
}

/// The record of a single participant in a swiss bracket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Score {
    pub wins: u64,
    pub losses: u64,
    pub byes: u64,
    pub score: u64,
    /// The sum of wins of all opponents.
    pub buchholz: u64,
}

/// Returns the score of every participant, ordered by score, then Buchholz rating, then seed.
pub(crate) fn scores(bracket: &Bracket, options: &SwissOptions) -> Vec<(ParticipantId, Score)> {
    let participants = bracket.participants();

    let index: HashMap<&ParticipantId, usize> = participants
        .iter()
        .enumerate()
        .map(|(index, participant)| (&participant.id, index))
        .collect();

    let mut scores = vec![Score::default(); participants.len()];
    let mut opponents = vec![Vec::new(); participants.len()];

    for round in bracket.rounds() {
        if let Some(bye) = bye_of_round(bracket, round.round_number()) {
            if let Some(&bye) = index.get(bye) {
                scores[bye].byes += 1;
            }
        }

        for r#match in bracket.matches().round(round.round_number()) {
            // Skip matches that are not complete.
            let Some(winner) = r#match.winner() else {
                continue;
            };

            let loser = r#match.opponent_of(winner).and_then(|loser| index.get(loser));
            let (Some(&winner), Some(&loser)) = (index.get(winner), loser) else {
                continue;
            };

            scores[winner].wins += 1;
            scores[loser].losses += 1;
            opponents[winner].push(loser);
            opponents[loser].push(winner);
        }
    }

    let wins: Vec<u64> = scores.iter().map(|score| score.wins).collect();
    for (score, opponents) in scores.iter_mut().zip(&opponents) {
        score.score = score.wins * options.score_win
            + score.losses * options.score_loss
            + score.byes * options.score_bye;
        score.buchholz = opponents.iter().map(|&opponent| wins[opponent]).sum();
    }

    // Participants are ordered by seed, a stable sort keeps that order for ties.
    let mut entries: Vec<_> = participants
        .iter()
        .map(|participant| participant.id.clone())
        .zip(scores)
        .collect();

    entries.sort_by(|(_, a), (_, b)| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.buchholz.cmp(&a.buchholz))
    });

    entries
}

/// Returns the participant sitting out the given `round`. This is `None` with an even number
/// of participants or while the round is not paired yet.
pub(crate) fn bye_of_round(bracket: &Bracket, round: usize) -> Option<&ParticipantId> {
    if bracket.participants().len() % 2 == 0 {
        return None;
    }

    let matches: Vec<&Match> = bracket.matches().round(round).collect();
    if matches.is_empty() || matches.iter().any(|m| m.has_tbd()) {
        return None;
    }

    bracket
        .participants()
        .iter()
        .map(|participant| &participant.id)
        .find(|id| !matches.iter().any(|m| m.contains(*id)))
}

/// Returns all pairs of participants that already met, the smaller id first.
pub(crate) fn played_pairs(bracket: &Bracket) -> HashSet<(&ParticipantId, &ParticipantId)> {
    bracket
        .matches()
        .iter()
        .filter_map(|m| match m.entrants() {
            [EntrantSpot::Entrant(a), EntrantSpot::Entrant(b)] => Some(ordered(a, b)),
            _ => None,
        })
        .collect()
}

#[inline]
fn ordered<'a>(
    a: &'a ParticipantId,
    b: &'a ParticipantId,
) -> (&'a ParticipantId, &'a ParticipantId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pairs the participants of `ranking` for a new round. `ranking` is ordered from the best to
/// the worst participant.
///
/// With an odd number of participants the lowest ranked participant that did not have a bye
/// yet sits out. The remaining participants are paired from the top: every participant is
/// paired with the best ranked participant left that it did not play yet, as long as the rest
/// of the pool can still be paired without rematches. If no pairing without rematches exists,
/// every participant is paired with the best ranked participant left that it did not play yet,
/// or with the best ranked participant left if it already played everyone.
pub(crate) fn pair<'a>(
    ranking: &[&'a ParticipantId],
    played: &HashSet<(&'a ParticipantId, &'a ParticipantId)>,
    had_bye: &HashSet<&'a ParticipantId>,
) -> (Vec<[&'a ParticipantId; 2]>, Option<&'a ParticipantId>) {
    let mut pool = ranking.to_vec();

    let bye = if pool.len() % 2 != 0 {
        let index = pool
            .iter()
            .rposition(|id| !had_bye.contains(id))
            .unwrap_or(pool.len() - 1);

        Some(pool.remove(index))
    } else {
        None
    };

    let mut budget = PAIRING_BUDGET;
    if let Some(pairs) = pair_unplayed(&pool, played, &mut budget) {
        return (pairs, bye);
    }

    log::debug!("Cannot pair {} participants without rematches", pool.len());

    let mut pairs = Vec::with_capacity(pool.len() / 2);
    while !pool.is_empty() {
        let first = pool.remove(0);

        let index = pool
            .iter()
            .position(|&second| !played.contains(&ordered(first, second)))
            .unwrap_or(0);

        let second = pool.remove(index);
        pairs.push([first, second]);
    }

    (pairs, bye)
}

/// The maximum number of candidate pairs [`pair_unplayed`] tries before giving up.
const PAIRING_BUDGET: usize = 100_000;

/// Pairs all of `pool` without any rematch, trying the best ranked opponents first. Returns
/// `None` if no such pairing exists or `budget` runs out.
fn pair_unplayed<'a>(
    pool: &[&'a ParticipantId],
    played: &HashSet<(&'a ParticipantId, &'a ParticipantId)>,
    budget: &mut usize,
) -> Option<Vec<[&'a ParticipantId; 2]>> {
    let Some((&first, rest)) = pool.split_first() else {
        return Some(Vec::new());
    };

    for (index, &second) in rest.iter().enumerate() {
        if played.contains(&ordered(first, second)) {
            continue;
        }

        if *budget == 0 {
            return None;
        }
        *budget -= 1;

        let mut remaining = rest.to_vec();
        remaining.remove(index);

        if let Some(mut pairs) = pair_unplayed(&remaining, played, budget) {
            pairs.insert(0, [first, second]);
            return Some(pairs);
        }
    }

    None
}
