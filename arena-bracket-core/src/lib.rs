//! # arena-bracket-core
//!
//! This crate contains the engine that turns a roster of registered participants into a
//! tournament bracket and keeps that bracket up to date while results come in. It supports
//! four formats: single elimination, double elimination (winners bracket only), round robin
//! and swiss.
//!
//! Important types:
//! - [`Bracket`]: The complete structure of a tournament: rounds, matches and participants.
//! - [`Participant`]: An entrant as supplied by the registry, optionally with a seed.
//! - [`BracketParticipant`]: A participant inside a bracket with its final seed and
//! elimination flag.
//! - [`Match`]: A *match* of two parties, including the slot its winner advances into.
//! - [`EntrantSpot`]: A *spot* within a match, which can contain a participant, be a bye
//! or contain a to-be-decided spot.
//!
//! The engine is built from pure functions: every operation takes a [`Bracket`] by reference
//! and returns a new value. Hosts storing brackets must serialize writes per tournament
//! themselves.
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to almost all types.
//!
pub mod lifecycle;
pub mod progression;
pub mod scoring;
pub mod seeding;
pub mod standings;

mod bracket;
mod double_elimination;
mod round_robin;
mod single_elimination;
mod swiss;
mod utils;

pub use bracket::{build, build_with_kind, Bracket, BracketKind, BracketRound};
pub use swiss::SwissOptions;

use thiserror::Error;

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut, Index};
use std::result;
use std::str::FromStr;
use std::vec::IntoIter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! id {
    ($name:ident) => {
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new<S>(id: S) -> Self
            where
                S: Into<String>,
            {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            #[inline]
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            #[inline]
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            #[inline]
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            #[inline]
            fn from_str(s: &str) -> result::Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }
    };
}

id!(ParticipantId);
id!(MatchId);

/// The kind of a [`Participant`]. A tournament only ever accepts one kind, see
/// [`TournamentFormat`].
///
/// [`TournamentFormat`]: lifecycle::TournamentFormat
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ParticipantKind {
    Team,
    Player,
}

impl Display for ParticipantKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Team => "TEAM",
            Self::Player => "PLAYER",
        })
    }
}

impl FromStr for ParticipantKind {
    type Err = UnknownParticipantKind;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("TEAM") {
            Ok(Self::Team)
        } else if s.eq_ignore_ascii_case("PLAYER") {
            Ok(Self::Player)
        } else {
            Err(UnknownParticipantKind(s.to_owned()))
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown participant kind: {0}")]
pub struct UnknownParticipantKind(pub String);

/// A registered entrant as supplied by the participant registry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ParticipantKind,
    /// A seed assigned by the registry. Participants without a seed are seeded by
    /// registration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u32>,
}

impl Participant {
    pub fn new<I, N>(id: I, name: N, kind: ParticipantKind) -> Self
    where
        I: Into<ParticipantId>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            seed: None,
        }
    }

    #[inline]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A participant as held by a [`Bracket`]: the registry data with the final seed and the
/// elimination flag layered on top.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BracketParticipant {
    pub id: ParticipantId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ParticipantKind,
    pub seed: u32,
    pub is_eliminated: bool,
}

/// A wrapper around a `Vec<BracketParticipant>`, ordered ascending by seed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Entrants {
    entrants: Vec<BracketParticipant>,
}

impl Entrants {
    /// Creates a new empty `Entrants` list.
    #[inline]
    pub fn new() -> Self {
        Self {
            entrants: Vec::new(),
        }
    }

    /// Returns the participant with the given `id`.
    pub fn get_by_id<Q>(&self, id: &Q) -> Option<&BracketParticipant>
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.entrants.iter().find(|e| e.id == id)
    }

    pub(crate) fn get_by_id_mut<Q>(&mut self, id: &Q) -> Option<&mut BracketParticipant>
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.entrants.iter_mut().find(|e| e.id == id)
    }
}

impl FromIterator<BracketParticipant> for Entrants {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = BracketParticipant>,
    {
        let entrants = iter.into_iter().collect();

        Self { entrants }
    }
}

impl IntoIterator for Entrants {
    type Item = BracketParticipant;
    type IntoIter = IntoIter<BracketParticipant>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entrants.into_iter()
    }
}

impl Deref for Entrants {
    type Target = Vec<BracketParticipant>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.entrants
    }
}

impl From<Vec<BracketParticipant>> for Entrants {
    #[inline]
    fn from(entrants: Vec<BracketParticipant>) -> Self {
        Self { entrants }
    }
}

/// A wrapper around a `Vec<Match>` in round order: all matches of round 1 first, then round
/// 2 and so on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Matches {
    matches: Vec<Match>,
}

impl Matches {
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matches: Vec::with_capacity(capacity),
        }
    }

    /// Returns the [`Match`] with the given `id`.
    pub fn get_by_id<Q>(&self, id: &Q) -> Option<&Match>
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.matches.iter().find(|m| m.id == id)
    }

    pub(crate) fn get_by_id_mut<Q>(&mut self, id: &Q) -> Option<&mut Match>
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Returns all matches of the round with the given 1-based `round` number.
    pub fn round(&self, round: usize) -> impl Iterator<Item = &Match> + '_ {
        self.matches.iter().filter(move |m| m.round == round)
    }
}

impl Deref for Matches {
    type Target = Vec<Match>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.matches
    }
}

impl DerefMut for Matches {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.matches
    }
}

impl From<Vec<Match>> for Matches {
    #[inline]
    fn from(matches: Vec<Match>) -> Self {
        Self { matches }
    }
}

/// An `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported bracket type: {0}")]
    UnsupportedBracketType(String),
    #[error("invalid round number: expected {expected}, found {found}")]
    InvalidRoundNumber { expected: usize, found: usize },
    #[error("duplicate match {0}")]
    DuplicateMatch(MatchId),
    #[error("round {round} refers to unknown match {id}")]
    UnknownMatch { round: usize, id: MatchId },
    #[error("invalid number of matches in round {round}: expected {expected}, found {found}")]
    InvalidNumberOfMatches {
        round: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid seeds: expected a permutation of 1..={0}")]
    InvalidSeeds(usize),
    #[error("invalid entrant: match {match_id} refers to unknown participant {participant}")]
    InvalidEntrant {
        match_id: MatchId,
        participant: ParticipantId,
    },
}

/// The slot the winner of a match advances into.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NextSlot {
    pub match_id: MatchId,
    /// Either 0 or 1.
    pub position: usize,
}

/// A match consisting of 2 parties.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    id: MatchId,
    round: usize,
    entrants: [EntrantSpot<ParticipantId>; 2],
    #[cfg_attr(feature = "serde", serde(default))]
    winner: Option<ParticipantId>,
    #[cfg_attr(feature = "serde", serde(default))]
    next: Option<NextSlot>,
}

impl Match {
    pub(crate) fn new(id: MatchId, round: usize, entrants: [EntrantSpot<ParticipantId>; 2]) -> Self {
        Self {
            id,
            round,
            entrants,
            winner: None,
            next: None,
        }
    }

    /// Creates a match whose both spots are yet to be decided.
    #[inline]
    pub(crate) fn tbd(id: MatchId, round: usize) -> Self {
        Self::new(id, round, [EntrantSpot::TBD, EntrantSpot::TBD])
    }

    #[inline]
    pub(crate) fn with_next(mut self, next: NextSlot) -> Self {
        self.next = Some(next);
        self
    }

    #[inline]
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Returns the 1-based round number of this match.
    #[inline]
    pub fn round(&self) -> usize {
        self.round
    }

    #[inline]
    pub fn entrants(&self) -> &[EntrantSpot<ParticipantId>; 2] {
        &self.entrants
    }

    /// Returns a reference to the spot at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&EntrantSpot<ParticipantId>> {
        self.entrants.get(index)
    }

    #[inline]
    pub fn winner(&self) -> Option<&ParticipantId> {
        self.winner.as_ref()
    }

    #[inline]
    pub fn next(&self) -> Option<&NextSlot> {
        self.next.as_ref()
    }

    /// Returns `true` if a winner has been recorded for this match.
    #[inline]
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Returns `true` if exactly one spot of this match is a bye.
    pub fn is_bye(&self) -> bool {
        matches!(
            self.entrants,
            [EntrantSpot::Entrant(_), EntrantSpot::Empty]
                | [EntrantSpot::Empty, EntrantSpot::Entrant(_)]
        )
    }

    /// Returns `true` if any spot is still [`TBD`].
    ///
    /// [`TBD`]: EntrantSpot::TBD
    #[inline]
    pub fn has_tbd(&self) -> bool {
        self.entrants.iter().any(EntrantSpot::is_tbd)
    }

    /// Returns `true` if the participant with the given `id` is seated in this match.
    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.entrants
            .iter()
            .any(|spot| matches!(spot, EntrantSpot::Entrant(e) if e == id))
    }

    /// Returns the opponent of the participant with the given `id`. Returns `None` if the
    /// participant is not seated in this match or its opponent is not known yet.
    pub fn opponent_of<Q>(&self, id: &Q) -> Option<&ParticipantId>
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        match &self.entrants {
            [EntrantSpot::Entrant(a), EntrantSpot::Entrant(b)] if a == id => Some(b),
            [EntrantSpot::Entrant(a), EntrantSpot::Entrant(b)] if b == id => Some(a),
            _ => None,
        }
    }

    pub(crate) fn set_winner(&mut self, winner: ParticipantId) {
        self.winner = Some(winner);
    }

    pub(crate) fn set_spot(&mut self, position: usize, spot: EntrantSpot<ParticipantId>) {
        if let Some(slot) = self.entrants.get_mut(position) {
            *slot = spot;
        }
    }
}

impl Index<usize> for Match {
    type Output = EntrantSpot<ParticipantId>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.entrants[index]
    }
}

/// A spot for a participant in the bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntrantSpot<T> {
    Entrant(T),
    /// A bye: this spot stays permanently empty.
    Empty,
    /// Decided by the outcome of an earlier match or by the next swiss pairing.
    TBD,
}

impl<T> EntrantSpot<T> {
    /// Creates a new `EntrantSpot` from an [`Option`]. A `Some(T)` value will translate into
    /// a `Entrant(T)` value, a `None` value will translate into a `Empty` value.
    pub fn new(entrant: Option<T>) -> Self {
        match entrant {
            Some(entrant) => Self::Entrant(entrant),
            None => Self::Empty,
        }
    }

    /// Returns `true` if the `EntrantSpot` is [`Entrant`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use arena_bracket_core::EntrantSpot;
    /// let spot = EntrantSpot::Entrant(());
    /// assert!(spot.is_entrant());
    /// ```
    /// [`Entrant`]: Self::Entrant
    pub fn is_entrant(&self) -> bool {
        matches!(self, Self::Entrant(_))
    }

    /// Returns `true` if the `EntrantSpot` is [`Empty`].
    ///
    /// [`Empty`]: Self::Empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` if the `EntrantSpot` is [`TBD`].
    ///
    /// [`TBD`]: Self::TBD
    pub fn is_tbd(&self) -> bool {
        matches!(self, Self::TBD)
    }

    /// Returns the contained entrant, if any.
    pub fn entrant(&self) -> Option<&T> {
        match self {
            Self::Entrant(entrant) => Some(entrant),
            _ => None,
        }
    }

    /// Converts an `&EntrantSpot<T>` into an `EntrantSpot<&T>`.
    pub fn as_ref(&self) -> EntrantSpot<&T> {
        match *self {
            Self::Entrant(ref entrant) => EntrantSpot::Entrant(entrant),
            Self::Empty => EntrantSpot::Empty,
            Self::TBD => EntrantSpot::TBD,
        }
    }

    /// Maps `EntrantSpot<T>` to `EntrantSpot<U>` by applying `f` on it.
    pub fn map<U, F>(self, f: F) -> EntrantSpot<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Entrant(entrant) => EntrantSpot::Entrant(f(entrant)),
            Self::Empty => EntrantSpot::Empty,
            Self::TBD => EntrantSpot::TBD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EntrantSpot, Match, MatchId, ParticipantId, ParticipantKind, UnknownParticipantKind,
    };

    /// Builds a `Vec<Participant>` of players from a list of ids. An id may be followed by
    /// `=> seed` to give it an explicit seed.
    #[macro_export]
    macro_rules! participants {
        ($($id:expr $(=> $seed:expr)?),*$(,)?) => {
            vec![$(
                {
                    #[allow(unused_mut)]
                    let mut participant = $crate::Participant::new(
                        $id,
                        format!("Player {}", $id),
                        $crate::ParticipantKind::Player,
                    );
                    $(participant.seed = Some($seed);)?
                    participant
                }
            ),*]
        };
    }

    /// Builds `n` players with the ids `p1..=pn`.
    pub fn players(n: usize) -> Vec<crate::Participant> {
        (1..=n)
            .map(|i| {
                crate::Participant::new(
                    format!("p{}", i),
                    format!("Player {}", i),
                    crate::ParticipantKind::Player,
                )
            })
            .collect()
    }

    #[test]
    fn test_match_opponent_of() {
        let r#match = Match::new(
            MatchId::from("match_1_1"),
            1,
            [
                EntrantSpot::Entrant(ParticipantId::from("a")),
                EntrantSpot::Entrant(ParticipantId::from("b")),
            ],
        );

        assert!(r#match.contains("a"));
        assert!(!r#match.contains("c"));
        assert_eq!(r#match.opponent_of("a"), Some(&ParticipantId::from("b")));
        assert_eq!(r#match.opponent_of("b"), Some(&ParticipantId::from("a")));
        assert_eq!(r#match.opponent_of("c"), None);
        assert!(!r#match.is_bye());
    }

    #[test]
    fn test_match_bye() {
        let r#match = Match::new(
            MatchId::from("match_1_1"),
            1,
            [
                EntrantSpot::Empty,
                EntrantSpot::Entrant(ParticipantId::from("a")),
            ],
        );

        assert!(r#match.is_bye());
        assert!(!r#match.has_tbd());
        assert_eq!(r#match.opponent_of("a"), None);

        let r#match = Match::tbd(MatchId::from("match_2_1"), 2);
        assert!(!r#match.is_bye());
        assert!(r#match.has_tbd());
    }

    #[test]
    fn test_entrant_spot() {
        let spot = EntrantSpot::new(Some(1));
        assert!(spot.is_entrant());
        assert_eq!(spot.entrant(), Some(&1));
        assert_eq!(spot.map(|v| v * 2), EntrantSpot::Entrant(2));

        let spot: EntrantSpot<i32> = EntrantSpot::new(None);
        assert!(spot.is_empty());
        assert_eq!(spot.entrant(), None);
        assert!(EntrantSpot::<i32>::TBD.is_tbd());
    }

    #[test]
    fn test_participant_kind_from_str() {
        assert_eq!("TEAM".parse::<ParticipantKind>(), Ok(ParticipantKind::Team));
        assert_eq!("player".parse::<ParticipantKind>(), Ok(ParticipantKind::Player));
        assert_eq!(
            "squad".parse::<ParticipantKind>(),
            Err(UnknownParticipantKind(String::from("squad")))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_participant_id_serde() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(&ParticipantId::from("team_1"), &[Token::Str("team_1")]);
        assert_tokens(&MatchId::from("match_1_1"), &[Token::Str("match_1_1")]);
    }
}
