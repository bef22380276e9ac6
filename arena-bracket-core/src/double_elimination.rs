use crate::single_elimination::SingleElimination;
use crate::{Entrants, Matches};

/// A double elimination bracket.
///
/// Only the winners bracket is built: it is laid out exactly like a [`SingleElimination`]
/// bracket and a loss eliminates a participant. There is no losers bracket and no grand final
/// yet.
// TODO: Build the losers bracket and the grand final. Losers of winners round `r` drop into
// losers round `2r - 1`, which needs a second set of next slots on `Match`.
#[derive(Clone, Debug)]
pub(crate) struct DoubleElimination {
    upper: SingleElimination,
}

impl DoubleElimination {
    /// Creates a new `DoubleElimination` bracket with the given `entrants`. `entrants` must be
    /// ordered ascending by seed.
    pub fn new(entrants: Entrants) -> Self {
        log::debug!(
            "Creating a new DoubleElimination bracket with {} entrants",
            entrants.len()
        );

        Self {
            upper: SingleElimination::new(entrants),
        }
    }

    #[inline]
    pub fn into_parts(self) -> (Entrants, Matches) {
        self.upper.into_parts()
    }
}
