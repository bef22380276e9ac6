//! # Lifecycle
//!
//! The registration and start gates of a tournament.
//!
//! A tournament moves through the states `UPCOMING`, `REGISTRATION`, `LIVE` and `COMPLETED`,
//! or ends in `CANCELLED`. The bracket may only be built once [`can_start`] returns `true`.
//! All checks take the current time as an argument; the `*_now` variants read the system
//! clock.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{ParticipantId, ParticipantKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The minimum number of registered teams or players required to start a tournament.
pub const MIN_PARTICIPANTS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TournamentStatus {
    Upcoming,
    Registration,
    Live,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    /// Returns `true` if the tournament cannot change its status anymore.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Display for TournamentStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Upcoming => "UPCOMING",
            Self::Registration => "REGISTRATION",
            Self::Live => "LIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        })
    }
}

/// The team size of a tournament.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TournamentFormat {
    Solo,
    Duo,
    Squad,
}

impl TournamentFormat {
    /// Returns the kind of participant accepted by this format.
    #[inline]
    pub fn participant_kind(self) -> ParticipantKind {
        match self {
            Self::Solo => ParticipantKind::Player,
            Self::Duo | Self::Squad => ParticipantKind::Team,
        }
    }
}

impl Display for TournamentFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Solo => "SOLO",
            Self::Duo => "DUO",
            Self::Squad => "SQUAD",
        })
    }
}

impl FromStr for TournamentFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SOLO" => Ok(Self::Solo),
            "DUO" => Ok(Self::Duo),
            "SQUAD" => Ok(Self::Squad),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown tournament format: {0}")]
pub struct UnknownFormat(pub String);

/// The registration state of a tournament.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Tournament {
    #[cfg_attr(feature = "serde", serde(default))]
    pub registered_teams: Vec<ParticipantId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub registered_players: Vec<ParticipantId>,
    pub registration_deadline: DateTime<Utc>,
    pub status: TournamentStatus,
    pub format: TournamentFormat,
    /// The maximum number of registrations. `None` means unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_participants: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_date: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_date: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Creates a new `Tournament` that is open for registration until `registration_deadline`.
    pub fn new(format: TournamentFormat, registration_deadline: DateTime<Utc>) -> Self {
        Self {
            registered_teams: Vec::new(),
            registered_players: Vec::new(),
            registration_deadline,
            status: TournamentStatus::Registration,
            format,
            max_participants: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Returns the total number of registered teams and players.
    #[inline]
    pub fn registrations(&self) -> usize {
        self.registered_teams.len() + self.registered_players.len()
    }

    /// Returns `true` if `id` is registered as a team or as a player.
    pub fn is_registered<Q>(&self, id: &Q) -> bool
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.registered_teams
            .iter()
            .chain(&self.registered_players)
            .any(|registered| registered == id)
    }

    /// Registers the participant `id` of the given `kind`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] if [`check_registration`] rejects the participant. The
    /// tournament is not changed in that case.
    pub fn register(
        &mut self,
        kind: ParticipantKind,
        id: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<(), RegistrationError> {
        check_registration(self, kind, &id, now)?;

        log::debug!("Registering {} {}", kind, id);

        match kind {
            ParticipantKind::Team => self.registered_teams.push(id),
            ParticipantKind::Player => self.registered_players.push(id),
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("registration is not open")]
    Closed,
    #[error("{0} is already registered")]
    AlreadyRegistered(ParticipantId),
    #[error("tournament is full: {max} participants")]
    Full { max: usize },
    #[error("{format} tournaments do not accept {kind} registrations")]
    KindMismatch {
        format: TournamentFormat,
        kind: ParticipantKind,
    },
}

/// Returns `true` if the tournament may be started at `now`.
///
/// This is the case if at least [`MIN_PARTICIPANTS`] teams or at least [`MIN_PARTICIPANTS`]
/// players are registered, the registration deadline has passed and the tournament is still
/// in the `REGISTRATION` state.
pub fn can_start(tournament: &Tournament, now: DateTime<Utc>) -> bool {
    let enough = tournament.registered_teams.len() >= MIN_PARTICIPANTS
        || tournament.registered_players.len() >= MIN_PARTICIPANTS;

    enough
        && now > tournament.registration_deadline
        && tournament.status == TournamentStatus::Registration
}

/// Returns `true` if the tournament may be started now. See [`can_start`].
#[inline]
pub fn can_start_now(tournament: &Tournament) -> bool {
    can_start(tournament, Utc::now())
}

/// Returns `true` if the tournament accepts registrations at `now`.
pub fn is_registration_open(tournament: &Tournament, now: DateTime<Utc>) -> bool {
    tournament.status == TournamentStatus::Registration && tournament.registration_deadline > now
}

/// Returns `true` if the tournament is being played at `now`. A missing start or end date
/// does not limit the live period.
pub fn is_live(tournament: &Tournament, now: DateTime<Utc>) -> bool {
    tournament.status == TournamentStatus::Live
        && tournament.start_date.map_or(true, |start| now > start)
        && tournament.end_date.map_or(true, |end| now < end)
}

/// Returns the status a tournament should have at `now` according to its dates.
///
/// A cancelled tournament stays cancelled.
pub fn status_from_dates(tournament: &Tournament, now: DateTime<Utc>) -> TournamentStatus {
    if tournament.status == TournamentStatus::Cancelled {
        return TournamentStatus::Cancelled;
    }

    if matches!(tournament.end_date, Some(end) if now > end) {
        return TournamentStatus::Completed;
    }

    if matches!(tournament.start_date, Some(start) if now > start) {
        return TournamentStatus::Live;
    }

    if now < tournament.registration_deadline {
        TournamentStatus::Registration
    } else {
        TournamentStatus::Upcoming
    }
}

/// Checks whether the participant `id` of the given `kind` may register at `now`.
///
/// # Errors
///
/// Returns the first reason the registration is rejected:
/// - [`Closed`] if registration is not open,
/// - [`AlreadyRegistered`] if `id` is already registered,
/// - [`Full`] if `max_participants` is reached,
/// - [`KindMismatch`] if `kind` does not fit the format of the tournament.
///
/// [`Closed`]: RegistrationError::Closed
/// [`AlreadyRegistered`]: RegistrationError::AlreadyRegistered
/// [`Full`]: RegistrationError::Full
/// [`KindMismatch`]: RegistrationError::KindMismatch
pub fn check_registration(
    tournament: &Tournament,
    kind: ParticipantKind,
    id: &ParticipantId,
    now: DateTime<Utc>,
) -> Result<(), RegistrationError> {
    if !is_registration_open(tournament, now) {
        return Err(RegistrationError::Closed);
    }

    if tournament.is_registered(id) {
        return Err(RegistrationError::AlreadyRegistered(id.clone()));
    }

    if let Some(max) = tournament.max_participants {
        if tournament.registrations() >= max {
            return Err(RegistrationError::Full { max });
        }
    }

    if tournament.format.participant_kind() != kind {
        return Err(RegistrationError::KindMismatch {
            format: tournament.format,
            kind,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{
        can_start, check_registration, is_live, is_registration_open, status_from_dates,
        RegistrationError, Tournament, TournamentFormat, TournamentStatus, UnknownFormat,
    };
    use crate::{ParticipantId, ParticipantKind};

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn tournament(format: TournamentFormat, teams: usize, players: usize) -> Tournament {
        let mut tournament = Tournament::new(format, deadline());
        tournament.registered_teams = (0..teams)
            .map(|i| ParticipantId::new(format!("team_{}", i)))
            .collect();
        tournament.registered_players = (0..players)
            .map(|i| ParticipantId::new(format!("player_{}", i)))
            .collect();
        tournament
    }

    #[test]
    fn test_can_start() {
        let after = deadline() + Duration::seconds(1);

        assert!(can_start(&tournament(TournamentFormat::Squad, 4, 0), after));
        assert!(can_start(&tournament(TournamentFormat::Solo, 0, 4), after));
        assert!(can_start(&tournament(TournamentFormat::Duo, 3, 4), after));
    }

    #[test]
    fn test_can_start_not_enough_participants() {
        let after = deadline() + Duration::days(1);

        assert!(!can_start(&tournament(TournamentFormat::Squad, 3, 0), after));
        assert!(!can_start(&tournament(TournamentFormat::Solo, 0, 3), after));
        // Teams and players are not added up.
        assert!(!can_start(&tournament(TournamentFormat::Duo, 3, 3), after));
    }

    #[test]
    fn test_can_start_deadline() {
        let tournament = tournament(TournamentFormat::Squad, 8, 0);

        assert!(!can_start(&tournament, deadline() - Duration::minutes(5)));
        // The deadline itself is still part of the registration period.
        assert!(!can_start(&tournament, deadline()));
        assert!(can_start(&tournament, deadline() + Duration::minutes(5)));
    }

    #[test]
    fn test_can_start_status() {
        let after = deadline() + Duration::days(1);

        for status in [
            TournamentStatus::Upcoming,
            TournamentStatus::Live,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            let mut tournament = tournament(TournamentFormat::Squad, 8, 0);
            tournament.status = status;
            assert!(!can_start(&tournament, after));
        }
    }

    #[test]
    fn test_registration() {
        let before = deadline() - Duration::hours(1);
        let mut tournament = tournament(TournamentFormat::Squad, 1, 0);
        tournament.max_participants = Some(2);

        assert!(is_registration_open(&tournament, before));
        assert!(!is_registration_open(&tournament, deadline()));

        assert_eq!(
            check_registration(
                &tournament,
                ParticipantKind::Player,
                &ParticipantId::from("p1"),
                before
            ),
            Err(RegistrationError::KindMismatch {
                format: TournamentFormat::Squad,
                kind: ParticipantKind::Player
            })
        );

        assert_eq!(
            tournament.register(ParticipantKind::Team, ParticipantId::from("team_0"), before),
            Err(RegistrationError::AlreadyRegistered(ParticipantId::from(
                "team_0"
            )))
        );

        assert_eq!(
            tournament.register(ParticipantKind::Team, ParticipantId::from("t"), before),
            Ok(())
        );
        assert!(tournament.is_registered("t"));

        assert_eq!(
            tournament.register(ParticipantKind::Team, ParticipantId::from("u"), before),
            Err(RegistrationError::Full { max: 2 })
        );

        tournament.max_participants = None;
        assert_eq!(
            tournament.register(
                ParticipantKind::Team,
                ParticipantId::from("u"),
                deadline() + Duration::hours(1)
            ),
            Err(RegistrationError::Closed)
        );
        assert_eq!(tournament.registrations(), 2);
    }

    #[test]
    fn test_is_live() {
        let mut tournament = tournament(TournamentFormat::Solo, 0, 4);
        tournament.status = TournamentStatus::Live;
        tournament.start_date = Some(deadline() + Duration::days(1));
        tournament.end_date = Some(deadline() + Duration::days(2));

        assert!(!is_live(&tournament, deadline()));
        assert!(is_live(&tournament, deadline() + Duration::hours(36)));
        assert!(!is_live(&tournament, deadline() + Duration::days(3)));

        tournament.end_date = None;
        assert!(is_live(&tournament, deadline() + Duration::days(3)));
    }

    #[test]
    fn test_status_from_dates() {
        let mut tournament = tournament(TournamentFormat::Solo, 0, 4);
        tournament.start_date = Some(deadline() + Duration::days(1));
        tournament.end_date = Some(deadline() + Duration::days(2));

        let status = |tournament: &Tournament, hours| {
            status_from_dates(tournament, deadline() + Duration::hours(hours))
        };

        assert_eq!(status(&tournament, -1), TournamentStatus::Registration);
        assert_eq!(status(&tournament, 1), TournamentStatus::Upcoming);
        assert_eq!(status(&tournament, 25), TournamentStatus::Live);
        assert_eq!(status(&tournament, 49), TournamentStatus::Completed);

        tournament.status = TournamentStatus::Cancelled;
        assert_eq!(status(&tournament, 25), TournamentStatus::Cancelled);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("solo".parse::<TournamentFormat>(), Ok(TournamentFormat::Solo));
        assert_eq!("SQUAD".parse::<TournamentFormat>(), Ok(TournamentFormat::Squad));
        assert_eq!(
            "TRIO".parse::<TournamentFormat>(),
            Err(UnknownFormat("TRIO".to_owned()))
        );
        assert_eq!(TournamentFormat::Duo.participant_kind(), ParticipantKind::Team);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_status_serde() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &TournamentStatus::Registration,
            &[Token::UnitVariant {
                name: "TournamentStatus",
                variant: "REGISTRATION",
            }],
        );
        assert_tokens(
            &TournamentFormat::Squad,
            &[Token::UnitVariant {
                name: "TournamentFormat",
                variant: "SQUAD",
            }],
        );
    }
}
