use arena_bracket_core::lifecycle::{
    can_start_now, is_live, is_registration_open, status_from_dates, Tournament, TournamentFormat,
};
use arena_bracket_core::scoring::GameMode;
use arena_bracket_core::{BracketKind, Participant, ParticipantId, ParticipantKind};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::config::Config;
use crate::store::{Store, TournamentRecord};
use crate::utils::{print_json, Prompt};
use crate::Error;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the ids of all tournaments.
    List,
    /// Create a new tournament. Missing values are prompted for.
    Create {
        id: String,
        #[clap(long)]
        name: Option<String>,
        /// SINGLE_ELIMINATION, DOUBLE_ELIMINATION, ROUND_ROBIN or SWISS.
        #[clap(long)]
        kind: Option<BracketKind>,
        /// BR or CS.
        #[clap(long)]
        mode: Option<GameMode>,
        /// SOLO, DUO or SQUAD.
        #[clap(long)]
        format: Option<TournamentFormat>,
        /// RFC 3339 timestamp, e.g. 2024-05-01T12:00:00Z.
        #[clap(long)]
        deadline: Option<DateTime<Utc>>,
        #[clap(long)]
        max_participants: Option<usize>,
        #[clap(long)]
        start: Option<DateTime<Utc>>,
        #[clap(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Register a team or player.
    Register {
        id: String,
        participant: ParticipantId,
        #[clap(long)]
        name: Option<String>,
        /// TEAM or PLAYER. Defaults to the kind the tournament format takes.
        #[clap(long)]
        kind: Option<ParticipantKind>,
        #[clap(long)]
        seed: Option<u32>,
    },
    /// Check whether the tournament can be started now.
    CanStart { id: String },
    /// Show the status derived from the tournament dates.
    Status {
        id: String,
        /// Store the derived status.
        #[clap(long)]
        update: bool,
    },
    /// Print the complete tournament record.
    Show { id: String },
}

impl Command {
    pub fn run(self, _config: &Config, store: &Store) -> Result<(), Error> {
        match self {
            Self::List => {
                print_json(&store.list()?)?;
            }
            Self::Create {
                id,
                name,
                kind,
                mode,
                format,
                deadline,
                max_participants,
                start,
                end,
            } => {
                let name = Prompt::new("Name").or(name).read_valid()?;
                let kind = Prompt::new("Bracket type").or(kind).read_valid()?;
                let mode = Prompt::new("Game mode ('BR' or 'CS')")
                    .or(mode)
                    .read_valid()?;
                let format = Prompt::new("Format ('SOLO', 'DUO' or 'SQUAD')")
                    .or(format)
                    .read_valid()?;
                let deadline = Prompt::new("Registration deadline")
                    .or(deadline)
                    .read_valid()?;

                let mut tournament = Tournament::new(format, deadline);
                tournament.max_participants = max_participants;
                tournament.start_date = start;
                tournament.end_date = end;

                let record = TournamentRecord::new(id, name, kind, mode, tournament);
                store.insert(&record)?;

                print_json(&record)?;
            }
            Self::Register {
                id,
                participant,
                name,
                kind,
                seed,
            } => {
                let record = store.update(&id, |record| {
                    let kind = kind.unwrap_or_else(|| record.tournament.format.participant_kind());

                    record
                        .tournament
                        .register(kind, participant.clone(), Utc::now())?;

                    let name = name.unwrap_or_else(|| participant.to_string());
                    let mut entry = Participant::new(participant, name, kind);
                    entry.seed = seed;
                    record.participants.push(entry);

                    Ok::<_, Error>(record.tournament.clone())
                })?;

                print_json(&record)?;
            }
            Self::CanStart { id } => {
                let record = store.get(&id)?;

                print_json(&json!({
                    "id": record.id,
                    "canStart": can_start_now(&record.tournament),
                }))?;
            }
            Self::Status { id, update } => {
                let now = Utc::now();
                let mut record = store.get(&id)?;
                let status = status_from_dates(&record.tournament, now);

                if update && status != record.tournament.status {
                    log::info!(
                        "Changing status of {} from {} to {}",
                        record.id,
                        record.tournament.status,
                        status
                    );

                    record.tournament.status = status;
                    store.put(&mut record)?;
                }

                print_json(&json!({
                    "id": record.id,
                    "status": status,
                    "isRegistrationOpen": is_registration_open(&record.tournament, now),
                    "isLive": is_live(&record.tournament, now),
                }))?;
            }
            Self::Show { id } => {
                print_json(&store.get(&id)?)?;
            }
        }

        Ok(())
    }
}
