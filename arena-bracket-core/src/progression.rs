//! # Progression
//!
//! Moves a [`Bracket`] forward as results come in.
//!
//! All functions in this module are pure: they take a bracket by reference and return a new
//! bracket. None of them fail. Unknown identifiers and results that cannot be applied are
//! logged and ignored, the returned bracket is then an unchanged copy of the input.
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::standings::Standings;
use crate::swiss::{self, SwissOptions};
use crate::{Bracket, BracketKind, EntrantSpot, MatchId, ParticipantId};

/// Returns the first match of the first round that is not completed yet.
///
/// Note that `participant_id` is not used to select the match: the returned match is not
/// necessarily one the participant plays in. Use [`next_match_for`] to route a single
/// participant.
pub fn next_pending_match<'a, Q>(bracket: &'a Bracket, participant_id: &Q) -> Option<&'a MatchId>
where
    Q: AsRef<str> + ?Sized,
{
    log::trace!(
        "Looking up next pending match for {}",
        participant_id.as_ref()
    );

    bracket
        .rounds()
        .iter()
        .find(|round| !round.is_completed())
        .and_then(|round| round.matches().first())
}

/// Returns the first undecided match the participant with the given `participant_id` is
/// currently seated in.
///
/// This is `None` if the participant is eliminated, finished all its matches or waits for the
/// result of another match.
pub fn next_match_for<'a, Q>(bracket: &'a Bracket, participant_id: &Q) -> Option<&'a MatchId>
where
    Q: AsRef<str> + ?Sized,
{
    bracket
        .matches()
        .iter()
        .find(|m| !m.is_decided() && m.contains(participant_id))
        .map(|m| m.id())
}

/// Records `winner_id` as the winner of the match `match_id`.
///
/// In elimination brackets the opponent of the winner is eliminated and the winner advances
/// into the next slot of the match. In round robin and swiss brackets only the winner is
/// recorded.
///
/// The result is ignored if the match does not exist, if `winner_id` is not seated in it, if
/// its opponent is not known yet or if the match is already decided.
///
/// Rounds are never marked as completed by this function, see [`complete_reported_rounds`].
pub fn apply_result<M, W>(bracket: &Bracket, match_id: &M, winner_id: &W) -> Bracket
where
    M: AsRef<str> + ?Sized,
    W: AsRef<str> + ?Sized,
{
    let (match_id, winner_id) = (match_id.as_ref(), winner_id.as_ref());
    let mut bracket = bracket.clone();

    let Some(r#match) = bracket.matches.get_by_id(match_id) else {
        log::debug!("Ignoring result for unknown match {}", match_id);
        return bracket;
    };

    if let Some(winner) = r#match.winner() {
        log::warn!(
            "Ignoring result for match {}: already won by {}",
            match_id,
            winner
        );
        return bracket;
    }

    let Some(loser) = r#match.opponent_of(winner_id).cloned() else {
        log::debug!(
            "Ignoring result for match {}: {} is not seated against a known opponent",
            match_id,
            winner_id
        );
        return bracket;
    };

    let next = r#match.next().cloned();
    let winner = ParticipantId::new(winner_id);

    log::debug!("{} won match {} against {}", winner, match_id, loser);

    if let Some(r#match) = bracket.matches.get_by_id_mut(match_id) {
        r#match.set_winner(winner.clone());
    }

    if bracket.kind.is_elimination() {
        if let Some(participant) = bracket.participants.get_by_id_mut(&loser) {
            participant.is_eliminated = true;
        }

        if let Some(next) = next {
            if let Some(r#match) = bracket.matches.get_by_id_mut(&next.match_id) {
                r#match.set_spot(next.position, EntrantSpot::Entrant(winner));
            }
        }
    }

    bracket
}

/// Marks every round whose matches all have a winner as completed. Completed rounds are never
/// reverted.
pub fn complete_reported_rounds(bracket: &Bracket) -> Bracket {
    let mut bracket = bracket.clone();

    for round in bracket.rounds.iter_mut() {
        if round.is_completed {
            continue;
        }

        let reported = round.matches.iter().all(|id| {
            bracket
                .matches
                .get_by_id(id)
                .map(|m| m.is_decided())
                .unwrap_or(false)
        });

        if reported {
            log::debug!("Round {} is completed", round.round_number);
            round.is_completed = true;
        }
    }

    bracket
}

/// Pairs the next round of a swiss bracket.
///
/// The next round is the first round that is not paired yet. All earlier rounds must be fully
/// reported. Participants are ranked by their `points` (descending), then by seed. Participants
/// missing from `points` have zero points. See [`swiss_points`] for the points of the default
/// swiss standings.
///
/// Returns an unchanged copy if the bracket is not a swiss bracket, if all rounds are already
/// paired or if an earlier round still has matches without a result.
pub fn pair_next_round(bracket: &Bracket, points: &HashMap<ParticipantId, u64>) -> Bracket {
    let mut next = bracket.clone();

    if bracket.kind() != BracketKind::Swiss {
        log::debug!("Ignoring pairing request for {} bracket", bracket.kind());
        return next;
    }

    let Some(round) = bracket
        .rounds()
        .iter()
        .find(|round| {
            round
                .matches()
                .iter()
                .any(|id| bracket.get_match(id).map(|m| m.has_tbd()).unwrap_or(false))
        })
    else {
        log::debug!("All rounds are already paired");
        return next;
    };

    let unreported = bracket
        .matches()
        .iter()
        .filter(|m| m.round() < round.round_number() && !m.is_decided())
        .count();

    if unreported > 0 {
        log::debug!(
            "Cannot pair round {}: {} matches without result",
            round.round_number(),
            unreported
        );
        return next;
    }

    let mut ranking: Vec<_> = bracket.participants().iter().collect();
    ranking.sort_by_key(|p| (Reverse(points.get(&p.id).copied().unwrap_or(0)), p.seed));
    let ranking: Vec<_> = ranking.into_iter().map(|p| &p.id).collect();

    let had_bye: HashSet<_> = (1..round.round_number())
        .filter_map(|round| swiss::bye_of_round(bracket, round))
        .collect();

    let (pairs, bye) = swiss::pair(&ranking, &swiss::played_pairs(bracket), &had_bye);

    for (id, [first, second]) in round.matches().iter().zip(pairs) {
        if let Some(r#match) = next.matches.get_by_id_mut(id) {
            r#match.set_spot(0, EntrantSpot::Entrant(first.clone()));
            r#match.set_spot(1, EntrantSpot::Entrant(second.clone()));
        }
    }

    match bye {
        Some(bye) => log::debug!("Paired round {}, {} has a bye", round.round_number(), bye),
        None => log::debug!("Paired round {}", round.round_number()),
    }

    next
}

/// Returns the swiss points of every participant: wins, losses and byes weighted by `options`.
pub fn swiss_points(bracket: &Bracket, options: &SwissOptions) -> HashMap<ParticipantId, u64> {
    swiss::scores(bracket, options)
        .into_iter()
        .map(|(id, score)| (id, score.score))
        .collect()
}

/// Returns the swiss standings of `bracket`.
///
/// Entries are ranked by score, then by Buchholz rating (the sum of wins of all opponents),
/// then by seed.
pub fn swiss_standings(bracket: &Bracket, options: &SwissOptions) -> Standings {
    let mut builder = Standings::builder();
    builder.key("Wins");
    builder.key("Losses");
    builder.key("Byes");
    builder.key("Score");
    builder.key("Buchholz");

    for (id, score) in swiss::scores(bracket, options) {
        builder.entry(id, |builder| {
            builder.value(score.wins);
            builder.value(score.losses);
            builder.value(score.byes);
            builder.value(score.score);
            builder.value(score.buchholz);
        });
    }

    builder.build()
}
