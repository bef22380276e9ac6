use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::double_elimination::DoubleElimination;
use crate::round_robin::RoundRobin;
use crate::seeding;
use crate::single_elimination::SingleElimination;
use crate::swiss::Swiss;
use crate::{
    BracketParticipant, EntrantSpot, Entrants, Error, Match, MatchId, Matches, Participant,
    Result,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The format of a [`Bracket`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BracketKind {
    SingleElimination,
    /// Currently only the winners bracket is built. There is no losers bracket and no grand
    /// final; a loss eliminates just like in [`SingleElimination`].
    ///
    /// [`SingleElimination`]: Self::SingleElimination
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl BracketKind {
    /// Returns `true` if losing a match eliminates a participant.
    #[inline]
    pub fn is_elimination(self) -> bool {
        matches!(self, Self::SingleElimination | Self::DoubleElimination)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleElimination => "SINGLE_ELIMINATION",
            Self::DoubleElimination => "DOUBLE_ELIMINATION",
            Self::RoundRobin => "ROUND_ROBIN",
            Self::Swiss => "SWISS",
        }
    }
}

impl Display for BracketKind {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BracketKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SINGLE_ELIMINATION" => Ok(Self::SingleElimination),
            "DOUBLE_ELIMINATION" => Ok(Self::DoubleElimination),
            "ROUND_ROBIN" => Ok(Self::RoundRobin),
            "SWISS" => Ok(Self::Swiss),
            _ => Err(Error::UnsupportedBracketType(s.to_owned())),
        }
    }
}

/// A single round of a [`Bracket`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BracketRound {
    pub(crate) round_number: usize,
    pub(crate) matches: Vec<MatchId>,
    pub(crate) is_completed: bool,
}

impl BracketRound {
    /// Returns the 1-based number of this round.
    #[inline]
    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// Returns the ids of all matches scheduled for this round.
    #[inline]
    pub fn matches(&self) -> &[MatchId] {
        &self.matches
    }

    /// Returns `true` once the round has been marked as completed. See
    /// [`complete_reported_rounds`].
    ///
    /// [`complete_reported_rounds`]: crate::progression::complete_reported_rounds
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

/// The complete structure of a tournament.
///
/// Once built the structure of a `Bracket` never changes: the rounds, the match ids and the
/// slot each winner advances into are fixed. Only results, spots that were waiting for a
/// result and the `is_completed` and `is_eliminated` flags are updated by the operations in
/// [`progression`].
///
/// [`progression`]: crate::progression
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bracket {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub(crate) kind: BracketKind,
    pub(crate) rounds: Vec<BracketRound>,
    pub(crate) participants: Entrants,
    pub(crate) matches: Matches,
}

impl Bracket {
    /// Creates a new `Bracket` from already built matches. The rounds are derived from the
    /// round numbers of `matches`, which must be in round order.
    fn from_parts(kind: BracketKind, participants: Entrants, matches: Matches) -> Self {
        let mut rounds: Vec<BracketRound> = Vec::new();

        for r#match in matches.iter() {
            match rounds.last_mut() {
                Some(round) if round.round_number == r#match.round() => {
                    round.matches.push(r#match.id().clone());
                }
                _ => rounds.push(BracketRound {
                    round_number: r#match.round(),
                    matches: vec![r#match.id().clone()],
                    is_completed: false,
                }),
            }
        }

        log::debug!(
            "Created new {} bracket with {} participants, {} rounds and {} matches",
            kind,
            participants.len(),
            rounds.len(),
            matches.len()
        );

        Self {
            kind,
            rounds,
            participants,
            matches,
        }
    }

    #[inline]
    pub fn kind(&self) -> BracketKind {
        self.kind
    }

    /// Returns all rounds, round 1 first.
    #[inline]
    pub fn rounds(&self) -> &[BracketRound] {
        &self.rounds
    }

    /// Returns the round with the given 1-based `round_number`.
    #[inline]
    pub fn round(&self, round_number: usize) -> Option<&BracketRound> {
        round_number
            .checked_sub(1)
            .and_then(|index| self.rounds.get(index))
    }

    /// Returns all participants, ordered ascending by seed.
    #[inline]
    pub fn participants(&self) -> &Entrants {
        &self.participants
    }

    #[inline]
    pub fn participant<Q>(&self, id: &Q) -> Option<&BracketParticipant>
    where
        Q: AsRef<str> + ?Sized,
    {
        self.participants.get_by_id(id)
    }

    /// Returns all matches in round order.
    #[inline]
    pub fn matches(&self) -> &Matches {
        &self.matches
    }

    #[inline]
    pub fn get_match<Q>(&self, id: &Q) -> Option<&Match>
    where
        Q: AsRef<str> + ?Sized,
    {
        self.matches.get_by_id(id)
    }

    /// Returns the number of slots in the first round. For elimination brackets this is the
    /// smallest power of two that fits all participants, for all other formats this is the
    /// number of participants.
    pub fn bracket_size(&self) -> usize {
        match self.kind {
            BracketKind::SingleElimination | BracketKind::DoubleElimination => {
                SingleElimination::bracket_size(self.participants.len())
            }
            BracketKind::RoundRobin | BracketKind::Swiss => self.participants.len(),
        }
    }

    /// Returns `true` once every round is completed.
    pub fn is_finished(&self) -> bool {
        self.rounds.iter().all(|round| round.is_completed)
    }

    /// Checks that the bracket upholds all structural invariants. This should be used for
    /// brackets that are loaded from an untrusted store.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as an [`enum@Error`].
    pub fn validate(&self) -> Result<()> {
        for (index, round) in self.rounds.iter().enumerate() {
            if round.round_number != index + 1 {
                return Err(Error::InvalidRoundNumber {
                    expected: index + 1,
                    found: round.round_number,
                });
            }
        }

        let mut ids = HashSet::with_capacity(self.matches.len());
        for r#match in self.matches.iter() {
            if !ids.insert(r#match.id()) {
                return Err(Error::DuplicateMatch(r#match.id().clone()));
            }

            let listed = self
                .round(r#match.round())
                .map(|round| round.matches.contains(r#match.id()))
                .unwrap_or(false);

            if !listed {
                return Err(Error::UnknownMatch {
                    round: r#match.round(),
                    id: r#match.id().clone(),
                });
            }

            if let Some(next) = r#match.next() {
                if self.matches.get_by_id(&next.match_id).is_none() {
                    return Err(Error::UnknownMatch {
                        round: r#match.round() + 1,
                        id: next.match_id.clone(),
                    });
                }
            }

            let seated = r#match.entrants().iter().filter_map(EntrantSpot::entrant);
            for participant in seated.chain(r#match.winner()) {
                if self.participants.get_by_id(participant).is_none() {
                    return Err(Error::InvalidEntrant {
                        match_id: r#match.id().clone(),
                        participant: participant.clone(),
                    });
                }
            }
        }

        for round in &self.rounds {
            for id in &round.matches {
                match self.matches.get_by_id(id) {
                    Some(r#match) if r#match.round() == round.round_number => (),
                    _ => {
                        return Err(Error::UnknownMatch {
                            round: round.round_number,
                            id: id.clone(),
                        })
                    }
                }
            }
        }

        // Matches shrink toward the final.
        if self.kind.is_elimination() {
            if let Some(first) = self.rounds.first() {
                for round in &self.rounds {
                    let expected = u32::try_from(round.round_number - 1)
                        .ok()
                        .and_then(|shift| first.matches.len().checked_shr(shift))
                        .unwrap_or(0);

                    // A round without matches lies beyond the final.
                    if expected == 0 || round.matches.len() != expected {
                        return Err(Error::InvalidNumberOfMatches {
                            round: round.round_number,
                            expected,
                            found: round.matches.len(),
                        });
                    }
                }
            }
        }

        let mut seeds: Vec<u32> = self.participants.iter().map(|p| p.seed).collect();
        seeds.sort_unstable();
        if seeds.iter().zip(1..).any(|(seed, expected)| *seed != expected) {
            return Err(Error::InvalidSeeds(self.participants.len()));
        }

        Ok(())
    }
}

/// Builds a new [`Bracket`] of the format named by `kind` for `participants`.
///
/// `kind` is one of `SINGLE_ELIMINATION`, `DOUBLE_ELIMINATION`, `ROUND_ROBIN` or `SWISS`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedBracketType`] if `kind` names no known format. No bracket is
/// built in that case.
pub fn build<I>(participants: I, kind: &str) -> Result<Bracket>
where
    I: IntoIterator<Item = Participant>,
{
    let kind = kind.parse()?;
    Ok(build_with_kind(participants, kind))
}

/// Builds a new [`Bracket`] of the given `kind` for `participants`.
///
/// Participants are seeded with [`assign_seeds`] first. This is a pure function: the same
/// input always produces the same bracket.
///
/// [`assign_seeds`]: seeding::assign_seeds
pub fn build_with_kind<I>(participants: I, kind: BracketKind) -> Bracket
where
    I: IntoIterator<Item = Participant>,
{
    let entrants = Entrants::from(seeding::assign_seeds(participants));

    let (entrants, matches) = match kind {
        BracketKind::SingleElimination => SingleElimination::new(entrants).into_parts(),
        BracketKind::DoubleElimination => DoubleElimination::new(entrants).into_parts(),
        BracketKind::RoundRobin => RoundRobin::new(entrants).into_parts(),
        BracketKind::Swiss => Swiss::new(entrants).into_parts(),
    };

    Bracket::from_parts(kind, entrants, matches)
}

#[cfg(test)]
mod tests {
    use super::{build, build_with_kind, BracketKind, BracketRound};
    use crate::tests::players;
    use crate::{Error, MatchId};

    #[test]
    fn test_bracket_kind_from_str() {
        assert_eq!(
            "SINGLE_ELIMINATION".parse::<BracketKind>(),
            Ok(BracketKind::SingleElimination)
        );
        assert_eq!(
            "double-elimination".parse::<BracketKind>(),
            Ok(BracketKind::DoubleElimination)
        );
        assert_eq!(
            "Round_Robin".parse::<BracketKind>(),
            Ok(BracketKind::RoundRobin)
        );
        assert_eq!("SWISS".parse::<BracketKind>(), Ok(BracketKind::Swiss));
        assert_eq!(
            "LADDER".parse::<BracketKind>(),
            Err(Error::UnsupportedBracketType("LADDER".to_owned()))
        );

        for kind in [
            BracketKind::SingleElimination,
            BracketKind::DoubleElimination,
            BracketKind::RoundRobin,
            BracketKind::Swiss,
        ] {
            assert_eq!(kind.to_string().parse::<BracketKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_build_unsupported() {
        assert_eq!(
            build(players(8), "KING_OF_THE_HILL"),
            Err(Error::UnsupportedBracketType("KING_OF_THE_HILL".to_owned()))
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        for kind in ["SINGLE_ELIMINATION", "DOUBLE_ELIMINATION", "ROUND_ROBIN", "SWISS"] {
            let a = build(players(11), kind).unwrap();
            let b = build(players(11), kind).unwrap();

            assert_eq!(a, b);
            assert_eq!(a.kind().as_str(), kind);
        }
    }

    #[test]
    fn test_build_validates() {
        for n in 0..=24 {
            for kind in [
                BracketKind::SingleElimination,
                BracketKind::DoubleElimination,
                BracketKind::RoundRobin,
                BracketKind::Swiss,
            ] {
                let bracket = build_with_kind(players(n), kind);
                assert_eq!(bracket.validate(), Ok(()), "{} with {} participants", kind, n);
            }
        }
    }

    #[test]
    fn test_validate_invalid() {
        let bracket = build_with_kind(players(4), BracketKind::SingleElimination);

        let mut invalid = bracket.clone();
        invalid.rounds[1].round_number = 3;
        assert_eq!(
            invalid.validate(),
            Err(Error::InvalidRoundNumber {
                expected: 2,
                found: 3
            })
        );

        let mut invalid = bracket.clone();
        invalid.rounds[0].matches.pop();
        assert_eq!(
            invalid.validate(),
            Err(Error::UnknownMatch {
                round: 1,
                id: MatchId::from("match_1_2"),
            })
        );

        let mut invalid = bracket.clone();
        invalid.participants = invalid
            .participants
            .iter()
            .cloned()
            .map(|mut p| {
                p.seed = 1;
                p
            })
            .collect();
        assert_eq!(invalid.validate(), Err(Error::InvalidSeeds(4)));

        let mut invalid = bracket.clone();
        for round_number in 3..=70 {
            invalid.rounds.push(BracketRound {
                round_number,
                matches: Vec::new(),
                is_completed: false,
            });
        }
        assert_eq!(
            invalid.validate(),
            Err(Error::InvalidNumberOfMatches {
                round: 3,
                expected: 0,
                found: 0,
            })
        );

        let mut invalid = bracket;
        invalid.matches[1] = invalid.matches[0].clone();
        assert_eq!(
            invalid.validate(),
            Err(Error::DuplicateMatch(MatchId::from("match_1_1")))
        );
    }

    #[test]
    fn test_round_lookup() {
        let bracket = build_with_kind(players(8), BracketKind::SingleElimination);

        assert!(bracket.round(0).is_none());
        assert_eq!(bracket.round(1).map(|r| r.matches().len()), Some(4));
        assert_eq!(bracket.round(3).map(|r| r.matches().len()), Some(1));
        assert!(bracket.round(4).is_none());
        assert!(!bracket.is_finished());
    }
}
