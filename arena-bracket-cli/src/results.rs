use arena_bracket_core::scoring::{GameMode, Leaderboard, MatchResult, PointsTable};
use arena_bracket_core::ParticipantId;
use clap::Subcommand;
use serde_json::json;

use crate::config::Config;
use crate::store::{Store, TournamentRecord};
use crate::utils::print_json;
use crate::Error;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the points for a single placement.
    Score {
        placement: u32,
        kills: u32,
        /// BR or CS.
        #[clap(long, default_value = "BR")]
        mode: GameMode,
    },
    /// Record the placement and kills of a participant in a game.
    Add {
        id: String,
        participant: ParticipantId,
        placement: u32,
        kills: u32,
    },
    /// Print the leaderboard aggregated from all recorded results.
    Leaderboard {
        id: String,
        /// Only print the first N entries.
        #[clap(long)]
        top: Option<usize>,
    },
}

impl Command {
    pub fn run(self, config: &Config, store: &Store) -> Result<(), Error> {
        match self {
            Self::Score {
                placement,
                kills,
                mode,
            } => {
                print_json(&json!({
                    "placement": placement,
                    "kills": kills,
                    "mode": mode,
                    "points": config.scoring.score(placement, kills, mode),
                }))?;
            }
            Self::Add {
                id,
                participant,
                placement,
                kills,
            } => {
                let result = store.update(&id, |record| {
                    add_result(record, participant, placement, kills, &config.scoring)
                })?;

                print_json(&result)?;
            }
            Self::Leaderboard { id, top } => {
                let record = store.get(&id)?;
                let leaderboard = Leaderboard::from_results(&record.results);

                match top {
                    Some(n) => print_json(leaderboard.top(n))?,
                    None => print_json(&leaderboard)?,
                }
            }
        }

        Ok(())
    }
}

/// Records the placement and kills of `participant` in `record`, scored with `table`.
pub fn add_result(
    record: &mut TournamentRecord,
    participant: ParticipantId,
    placement: u32,
    kills: u32,
    table: &PointsTable,
) -> Result<MatchResult, Error> {
    if record.tournament.status.is_terminal() {
        return Err(Error::Retired(record.id.clone()));
    }

    if record.participants.iter().all(|p| p.id != participant) {
        log::warn!("{} is not a participant of {}", participant, record.id);
    }

    let result = MatchResult::with_table(participant, placement, kills, record.mode, table);

    record.results.push(result.clone());
    Ok(result)
}
