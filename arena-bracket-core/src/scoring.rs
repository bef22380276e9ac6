//! # Scoring
//!
//! Converts the placement and kill count of a participant in a single match into points and
//! aggregates match results into a [`Leaderboard`].
//!
//! Points depend on the [`GameMode`] of the match:
//! - `BR` (battle royale): points for the placement plus 2 points per kill.
//! - `CS` (clash squad): 10 points for a win plus 1 point per kill.
//!
//! Scoring never fails. Placements outside of the points table contribute no placement points.
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use crate::standings::Standings;
use crate::ParticipantId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The points awarded for placements 1 to 12 in a battle royale match.
pub const PLACEMENT_POINTS: [u64; 12] = [20, 15, 12, 10, 8, 6, 5, 4, 3, 2, 1, 1];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameMode {
    /// Battle royale.
    #[cfg_attr(feature = "serde", serde(rename = "BR"))]
    Br,
    /// Clash squad.
    #[cfg_attr(feature = "serde", serde(rename = "CS"))]
    Cs,
}

impl Display for GameMode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Br => "BR",
            Self::Cs => "CS",
        })
    }
}

impl FromStr for GameMode {
    type Err = UnknownGameMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BR") {
            Ok(Self::Br)
        } else if s.eq_ignore_ascii_case("CS") {
            Ok(Self::Cs)
        } else {
            Err(UnknownGameMode(s.to_owned()))
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown game mode: {0}")]
pub struct UnknownGameMode(pub String);

/// The points awarded for placements and kills.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PointsTable {
    /// The points for placements `1..=placement.len()` in a battle royale match.
    pub placement: Cow<'static, [u64]>,
    /// The points per kill in a battle royale match.
    pub kill: u64,
    /// The points for winning a clash squad match.
    pub win: u64,
    /// The points per kill in a clash squad match.
    pub cs_kill: u64,
}

impl PointsTable {
    /// The standard points table.
    pub const STANDARD: Self = Self {
        placement: Cow::Borrowed(&PLACEMENT_POINTS),
        kill: 2,
        win: 10,
        cs_kill: 1,
    };

    /// Returns the points for a 1-based `placement` in a battle royale match. Placements
    /// outside of the table return 0.
    pub fn placement_points(&self, placement: u32) -> u64 {
        (placement as usize)
            .checked_sub(1)
            .and_then(|index| self.placement.get(index))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the points for a `placement` with `kills` in a match of the given `mode`.
    pub fn score(&self, placement: u32, kills: u32, mode: GameMode) -> u64 {
        let kills = u64::from(kills);

        match mode {
            GameMode::Br => self
                .placement_points(placement)
                .saturating_add(kills.saturating_mul(self.kill)),
            GameMode::Cs => {
                let win = if placement == 1 { self.win } else { 0 };
                win.saturating_add(kills.saturating_mul(self.cs_kill))
            }
        }
    }
}

impl Default for PointsTable {
    #[inline]
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Returns the points for a `placement` with `kills` in a match of the given `mode` using the
/// [`STANDARD`] points table.
///
/// # Examples
///
/// ```
/// # use arena_bracket_core::scoring::{score, GameMode};
/// assert_eq!(score(1, 0, GameMode::Br), 20);
/// assert_eq!(score(1, 3, GameMode::Cs), 13);
/// ```
///
/// [`STANDARD`]: PointsTable::STANDARD
#[inline]
pub fn score(placement: u32, kills: u32, mode: GameMode) -> u64 {
    PointsTable::STANDARD.score(placement, kills, mode)
}

/// The result of a single participant in a single match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MatchResult {
    pub participant_id: ParticipantId,
    pub placement: u32,
    pub kills: u32,
    points: u64,
}

impl MatchResult {
    /// Creates a new `MatchResult` scored with the [`STANDARD`] points table.
    ///
    /// [`STANDARD`]: PointsTable::STANDARD
    #[inline]
    pub fn new(participant_id: ParticipantId, placement: u32, kills: u32, mode: GameMode) -> Self {
        Self::with_table(participant_id, placement, kills, mode, &PointsTable::STANDARD)
    }

    /// Creates a new `MatchResult` scored with the given points `table`.
    pub fn with_table(
        participant_id: ParticipantId,
        placement: u32,
        kills: u32,
        mode: GameMode,
        table: &PointsTable,
    ) -> Self {
        Self {
            points: table.score(placement, kills, mode),
            participant_id,
            placement,
            kills,
        }
    }

    /// Returns the points derived from the placement and kills of this result.
    #[inline]
    pub fn points(&self) -> u64 {
        self.points
    }

    /// Returns `true` if the participant won the match.
    #[inline]
    pub fn is_win(&self) -> bool {
        self.placement == 1
    }
}

/// The accumulated results of a single participant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LeaderboardEntry {
    pub participant_id: ParticipantId,
    pub points: u64,
    pub kills: u64,
    pub matches: u32,
    pub wins: u32,
}

/// Participants ranked by their accumulated points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Aggregates `results` per participant. Entries are ordered by points, then by kills, then
    /// by participant id.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchResult>,
    {
        let mut entries: HashMap<&ParticipantId, LeaderboardEntry> = HashMap::new();

        for result in results {
            let entry = entries
                .entry(&result.participant_id)
                .or_insert_with(|| LeaderboardEntry {
                    participant_id: result.participant_id.clone(),
                    ..Default::default()
                });

            entry.points = entry.points.saturating_add(result.points);
            entry.kills = entry.kills.saturating_add(u64::from(result.kills));
            entry.matches = entry.matches.saturating_add(1);
            if result.is_win() {
                entry.wins = entry.wins.saturating_add(1);
            }
        }

        let mut entries: Vec<_> = entries.into_values().collect();
        entries.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| b.kills.cmp(&a.kills))
                .then_with(|| a.participant_id.cmp(&b.participant_id))
        });

        Self { entries }
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, LeaderboardEntry> {
        self.entries.iter()
    }

    /// Returns the best `n` entries.
    #[inline]
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn standings(&self) -> Standings {
        let mut builder = Standings::builder();
        builder.key("Points");
        builder.key("Kills");
        builder.key("Matches");
        builder.key("Wins");

        for entry in &self.entries {
            builder.entry(entry.participant_id.clone(), |builder| {
                builder.value(entry.points);
                builder.value(entry.kills);
                builder.value(entry.matches);
                builder.value(entry.wins);
            });
        }

        builder.build()
    }
}

impl<'a> IntoIterator for &'a Leaderboard {
    type Item = &'a LeaderboardEntry;
    type IntoIter = std::slice::Iter<'a, LeaderboardEntry>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
