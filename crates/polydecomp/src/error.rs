//! Errors surfaced by decomposition edits and validation.

use std::fmt;

use crate::arena::PointId;

#[derive(Clone, Debug, PartialEq)]
pub enum DecompError {
    /// Zero-length segment, identical endpoints, or a direction that overlaps
    /// an existing segment at a shared point.
    DegenerateInput { reason: String },
    /// Invariant violation found by `check_consistency` or by an edit that met
    /// a structure it cannot have produced itself.
    InconsistentTopology { reason: String },
    /// Only free points (degree 0) may be deleted.
    PointInUse { point: PointId, degree: usize },
    /// The endpoints of a new segment lie in different polygons.
    CrossesBoundary { a: PointId, b: PointId },
    /// A handle that does not belong to this decomposition.
    UnknownEntity { kind: &'static str, id: usize },
}

impl DecompError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentTopology {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DecompError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateInput { reason } => write!(f, "degenerate input: {reason}"),
            Self::InconsistentTopology { reason } => write!(f, "inconsistent topology: {reason}"),
            Self::PointInUse { point, degree } => {
                write!(f, "{point} has {degree} incident segments and cannot be deleted")
            }
            Self::CrossesBoundary { a, b } => {
                write!(f, "segment {a}-{b} would cross a polygon boundary")
            }
            Self::UnknownEntity { kind, id } => write!(f, "unknown {kind} id {id}"),
        }
    }
}

impl std::error::Error for DecompError {}
