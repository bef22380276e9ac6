use arena_bracket_core::lifecycle::{can_start, TournamentStatus};
use arena_bracket_core::progression::{
    apply_result, complete_reported_rounds, next_match_for, next_pending_match, pair_next_round,
    swiss_points, swiss_standings,
};
use arena_bracket_core::{build, Bracket, MatchId, ParticipantId};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::config::Config;
use crate::store::{Store, TournamentRecord};
use crate::utils::print_json;
use crate::Error;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the bracket from the registered participants and start the tournament.
    Build {
        id: String,
        /// Build even if the tournament cannot be started yet or already has a bracket.
        #[clap(long)]
        force: bool,
    },
    /// Report the winner of a match.
    Result {
        id: String,
        match_id: MatchId,
        winner: ParticipantId,
    },
    /// Mark every round whose matches are all reported as completed.
    CompleteRounds { id: String },
    /// Pair the next swiss round from the current standings.
    Pair { id: String },
    /// Show the next pending match and the next match of a participant.
    Next {
        id: String,
        participant: ParticipantId,
    },
    /// Print the bracket.
    Show { id: String },
    /// Print wins, losses, byes, score and Buchholz rating of every participant.
    Standings { id: String },
}

impl Command {
    pub fn run(self, config: &Config, store: &Store) -> Result<(), Error> {
        match self {
            Self::Build { id, force } => {
                let now = Utc::now();
                let bracket = store.update(&id, |record| start(record, force, now))?;

                print_json(&bracket)?;
            }
            Self::Result {
                id,
                match_id,
                winner,
            } => {
                let bracket = store.update(&id, |record| {
                    update_bracket(record, |bracket| {
                        let next = apply_result(bracket, &match_id, &winner);
                        if next == *bracket {
                            log::warn!("Result {} for {} was not applied", winner, match_id);
                        }

                        next
                    })
                })?;

                print_json(&bracket)?;
            }
            Self::CompleteRounds { id } => {
                let bracket = store.update(&id, |record| {
                    update_bracket(record, complete_reported_rounds)
                })?;

                print_json(&bracket)?;
            }
            Self::Pair { id } => {
                let bracket = store.update(&id, |record| {
                    update_bracket(record, |bracket| {
                        let points = swiss_points(bracket, &config.swiss);
                        pair_next_round(bracket, &points)
                    })
                })?;

                print_json(&bracket)?;
            }
            Self::Next { id, participant } => {
                let record = store.get(&id)?;
                let bracket = bracket(&record)?;

                print_json(&json!({
                    "nextPendingMatch": next_pending_match(bracket, &participant),
                    "nextMatch": next_match_for(bracket, &participant),
                }))?;
            }
            Self::Show { id } => {
                let record = store.get(&id)?;
                print_json(bracket(&record)?)?;
            }
            Self::Standings { id } => {
                let record = store.get(&id)?;
                let standings = swiss_standings(bracket(&record)?, &config.swiss);

                print_json(&standings)?;
            }
        }

        Ok(())
    }
}

/// Builds the bracket of `record` and marks the tournament as live.
///
/// Unless `force` is set the tournament must not have a bracket yet and must be startable at
/// `now`.
pub fn start(
    record: &mut TournamentRecord,
    force: bool,
    now: DateTime<Utc>,
) -> Result<Bracket, Error> {
    if !force {
        if record.bracket.is_some() {
            return Err(Error::BracketExists(record.id.clone()));
        }

        if !can_start(&record.tournament, now) {
            return Err(Error::CannotStart(record.id.clone()));
        }
    }

    if record.tournament.status.is_terminal() {
        return Err(Error::Retired(record.id.clone()));
    }

    let bracket = build(record.participants.clone(), record.kind.as_str())?;

    log::info!(
        "Built {} bracket for {} with {} rounds",
        bracket.kind(),
        record.id,
        bracket.rounds().len()
    );

    record.tournament.status = TournamentStatus::Live;
    record.bracket = Some(bracket.clone());
    Ok(bracket)
}

/// Replaces the bracket of `record` with the bracket returned by `f`. A live tournament whose
/// bracket is finished afterwards is marked as completed.
pub fn update_bracket<F>(record: &mut TournamentRecord, f: F) -> Result<Bracket, Error>
where
    F: FnOnce(&Bracket) -> Bracket,
{
    if record.tournament.status.is_terminal() {
        return Err(Error::Retired(record.id.clone()));
    }

    let next = f(bracket(record)?);

    if next.is_finished() && record.tournament.status == TournamentStatus::Live {
        log::info!("Tournament {} is completed", record.id);
        record.tournament.status = TournamentStatus::Completed;
    }

    record.bracket = Some(next.clone());
    Ok(next)
}

fn bracket(record: &TournamentRecord) -> Result<&Bracket, Error> {
    record
        .bracket
        .as_ref()
        .ok_or_else(|| Error::NoBracket(record.id.clone()))
}
