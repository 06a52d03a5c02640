//! Entity records and value types of the decomposition.
//!
//! Orientation conventions
//! - A segment has `vtxs = [out_vtx, in_vtx]`.
//! - `(s, Left)` runs out → in, `(s, Right)` runs in → out.
//! - The face bounded by a half-edge lies on its left, so the end vertex of
//!   `(s, side)` is `vtxs[side.index()]`.
//! - Wires are traversed with the face on the left: face boundaries run
//!   counterclockwise, component outlines clockwise.

use std::collections::BTreeSet;

use crate::arena::{PointId, PolygonId, SegmentId, WireId};
use crate::geometry::{colocated, Vec2};

/// Vertex index inside `Segment::vtxs`.
pub const OUT_VTX: usize = 0;
pub const IN_VTX: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Right = 0,
    Left = 1,
}

impl Side {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Self {
        if i == 0 {
            Side::Right
        } else {
            Side::Left
        }
    }

    #[inline]
    pub fn other(self) -> Self {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
        }
    }

    /// Side whose half-edge arrives at vertex `vtx`.
    #[inline]
    pub fn incoming(vtx: usize) -> Self {
        Self::from_index(vtx)
    }

    /// Side whose half-edge leaves vertex `vtx`.
    #[inline]
    pub fn outgoing(vtx: usize) -> Self {
        Self::from_index(1 - vtx)
    }
}

/// One oriented side of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdge {
    pub seg: SegmentId,
    pub side: Side,
}

impl HalfEdge {
    #[inline]
    pub fn new(seg: SegmentId, side: Side) -> Self {
        Self { seg, side }
    }

    #[inline]
    pub fn twin(self) -> Self {
        Self::new(self.seg, self.side.other())
    }
}

/// Result of locating a new segment direction among the half-edges of a point.
///
/// `prev` is the half-edge arriving at the point that must continue into the
/// new segment, `next` the half-edge leaving the point that the new segment must
/// continue into, and `wire` the boundary loop both belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insertion {
    pub prev: HalfEdge,
    pub next: HalfEdge,
    pub wire: WireId,
}

#[derive(Clone, Debug)]
pub struct Point {
    pub xy: Vec2,
    /// Owning polygon while the point is free (no incident segments).
    pub poly: Option<PolygonId>,
    /// Incident segment ends as `(segment, vertex index)`; unordered.
    pub segments: Vec<(SegmentId, usize)>,
}

impl Point {
    pub(crate) fn free(xy: Vec2, poly: PolygonId) -> Self {
        Self {
            xy,
            poly: Some(poly),
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn colocated(&self, xy: Vec2, tol: f64) -> bool {
        colocated(self.xy, xy, tol)
    }
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub vtxs: [PointId; 2],
    /// Next half-edge along the wire, per side.
    pub next: [HalfEdge; 2],
    /// Owning wire, per side.
    pub wire: [WireId; 2],
}

impl Segment {
    /// Both sides on the same wire: the segment does not separate two faces.
    #[inline]
    pub fn is_dendrite(&self) -> bool {
        self.wire[0] == self.wire[1]
    }

    /// Vertex index of `pt`, if it is an endpoint.
    #[inline]
    pub fn vtx_index(&self, pt: PointId) -> Option<usize> {
        self.vtxs.iter().position(|v| *v == pt)
    }

    #[inline]
    pub fn other_vtx(&self, pt: PointId) -> PointId {
        if self.vtxs[OUT_VTX] == pt {
            self.vtxs[IN_VTX]
        } else {
            self.vtxs[OUT_VTX]
        }
    }
}

#[derive(Clone, Debug)]
pub struct Wire {
    pub polygon: PolygonId,
    pub parent: Option<WireId>,
    pub childs: BTreeSet<WireId>,
    /// Any half-edge of the loop; `None` only for the root wire.
    pub start: Option<HalfEdge>,
}

impl Wire {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct Polygon {
    pub outer_wire: WireId,
    pub free_points: BTreeSet<PointId>,
}

/// Effect of an edit on the polygon set, reported for redraw invalidation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PolygonChange {
    /// No polygon changed.
    #[default]
    None,
    /// A closed loop carved the new polygon out of `parent`.
    Add { parent: PolygonId, new: PolygonId },
    /// Boundaries of these polygons changed; the polygon set did not.
    Shape(Vec<PolygonId>),
    /// `orig` was cut in two; `new` is the second half.
    Split { orig: PolygonId, new: PolygonId },
    /// `removed` was merged into `kept`.
    Join { kept: PolygonId, removed: PolygonId },
}

/// Value produced by a mutating call plus the polygon changes it caused, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Edit<T> {
    pub value: T,
    pub changes: Vec<PolygonChange>,
}

impl<T> Edit<T> {
    pub(crate) fn new(value: T, changes: Vec<PolygonChange>) -> Self {
        Self { value, changes }
    }

    /// Most recent change of the call (`None` if nothing was recorded).
    pub fn last_change(&self) -> PolygonChange {
        self.changes.last().cloned().unwrap_or_default()
    }
}

/// Result of `snap_point`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Snap {
    /// Within tolerance of an existing point.
    Point(PointId),
    /// Within tolerance of a segment interior, at parameter `t` from its out vertex.
    Segment(SegmentId, f64),
    /// Free space inside this polygon.
    Polygon(PolygonId),
}

/// Decomposition settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecompCfg {
    /// Absolute colocation/snapping distance.
    pub tolerance: f64,
}

impl Default for DecompCfg {
    fn default() -> Self {
        Self { tolerance: 0.01 }
    }
}
