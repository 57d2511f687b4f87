use std::fmt;

/// One of the two compared images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Work the scheduler can run on its worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationKind {
    #[default]
    NoOp,
    /// Resample one side and recompute its rects.
    ScaleOneSide(Side),
    /// Resample both sides and recompute their rects.
    ScaleBothSides,
    /// Compare the visible regions of both scaled images.
    CompareOnly,
    /// Recompute source/target rects of both sides, keeping the scaled images.
    UpdateRectsOnly,
}

impl OperationKind {
    /// Whether completing this operation changes surface geometry and must be
    /// followed by a compare pass.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            OperationKind::ScaleOneSide(_)
                | OperationKind::ScaleBothSides
                | OperationKind::UpdateRectsOnly
        )
    }

    /// Combine an abandoned, unapplied operation with the one replacing it so
    /// the replacement still covers every surface the old one would have
    /// touched.
    pub fn merge(self, next: OperationKind) -> OperationKind {
        use OperationKind::*;
        match (self, next) {
            (NoOp | CompareOnly, next) => next,
            (current, NoOp | CompareOnly) => current,
            (ScaleBothSides, _) | (_, ScaleBothSides) => ScaleBothSides,
            (UpdateRectsOnly, UpdateRectsOnly) => UpdateRectsOnly,
            (ScaleOneSide(a), ScaleOneSide(b)) if a == b => ScaleOneSide(a),
            // One side rescales while the other still needs fresh rects.
            _ => ScaleBothSides,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::NoOp => write!(f, "Idle"),
            OperationKind::ScaleOneSide(side) => write!(f, "Scaling {side} image"),
            OperationKind::ScaleBothSides => write!(f, "Scaling images"),
            OperationKind::CompareOnly => write!(f, "Comparing"),
            OperationKind::UpdateRectsOnly => write!(f, "Updating view"),
        }
    }
}

/// Whether an operation is outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Busy,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Idle"),
            Status::Busy => write!(f, "Busy"),
        }
    }
}

/// Outcome of comparing the visible regions of both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchState {
    /// Not computed yet, a side is missing, or the visible region is empty.
    #[default]
    Unknown,
    /// The visible regions have different sizes.
    Incomparable,
    Match,
    NoMatch,
}

impl MatchState {
    pub fn from_equal(equal: bool) -> MatchState {
        if equal {
            MatchState::Match
        } else {
            MatchState::NoMatch
        }
    }

    /// Only a completed, successful comparison counts as a match.
    pub fn is_match(&self) -> bool {
        *self == MatchState::Match
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchState::Unknown => write!(f, "Unknown"),
            MatchState::Incomparable => write!(f, "Incomparable"),
            MatchState::Match => write!(f, "Match"),
            MatchState::NoMatch => write!(f, "No match"),
        }
    }
}
