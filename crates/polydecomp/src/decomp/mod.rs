//! Planar subdivision: points, segments, boundary loops (wires) and polygons.
//!
//! Purpose
//! - Keep a topologically consistent partition of the plane under incremental
//!   edits (add/delete point and segment, drag, overlay) and report which
//!   polygons each edit touched.
//!
//! Structure
//! - `Decomposition` owns four id tables. Every cross reference is a handle.
//! - Segments carry the half-edge links (`next`, `wire` per side); points carry
//!   their incident segment ends; a wire is one half-edge cycle plus its place
//!   in the nesting forest; a polygon is an outer wire plus free points, its
//!   holes being the children of its outer wire.
//! - Forest shape: root wire → outlines of components floating in the outer
//!   polygon → their inner face wires (outer wires of polygons) → holes of
//!   those polygons → … The root wire has no half-edges and belongs to the
//!   outer polygon, which is never removed.
//!
//! Split by concern
//! - `point` (angular insertion), `segment` (split/join/flip), `wire` (cycles,
//!   containment, point location), `polygon` (depth, free points), `edit`
//!   (caller-facing surgery), `displace`, `overlay`, `consistency`, `io`.

mod consistency;
mod displace;
mod edit;
mod io;
mod overlay;
mod point;
mod polygon;
mod segment;
mod types;
mod wire;

pub use io::{NodeSet, PolygonDesc};
pub use overlay::{EntityMaps, Overlay};
pub use types::{
    DecompCfg, Edit, HalfEdge, Insertion, Point, Polygon, PolygonChange, Segment, Side, Snap, Wire,
    IN_VTX, OUT_VTX,
};

use std::collections::{BTreeMap, BTreeSet};

use crate::arena::{IdMap, PointId, PolygonId, SegmentId, WireId};
use crate::error::DecompError;
use crate::geometry::{project_to_segment, Vec2};

/// Dense 0-based indices for external consumers, in ascending id order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Indices {
    pub points: BTreeMap<PointId, usize>,
    pub segments: BTreeMap<SegmentId, usize>,
    pub polygons: BTreeMap<PolygonId, usize>,
}

#[derive(Clone, Debug)]
pub struct Decomposition {
    cfg: DecompCfg,
    points: IdMap<PointId, Point>,
    segments: IdMap<SegmentId, Segment>,
    wires: IdMap<WireId, Wire>,
    polygons: IdMap<PolygonId, Polygon>,
    outer_polygon: PolygonId,
}

impl Default for Decomposition {
    fn default() -> Self {
        Self::new()
    }
}

impl Decomposition {
    pub fn new() -> Self {
        Self::with_cfg(DecompCfg::default())
    }

    pub fn with_cfg(cfg: DecompCfg) -> Self {
        let mut wires: IdMap<WireId, Wire> = IdMap::new();
        let mut polygons: IdMap<PolygonId, Polygon> = IdMap::new();
        let root = wires.next_id();
        let outer_polygon = polygons.insert(Polygon {
            outer_wire: root,
            free_points: BTreeSet::new(),
        });
        wires.insert(Wire {
            polygon: outer_polygon,
            parent: None,
            childs: BTreeSet::new(),
            start: None,
        });
        Self {
            cfg,
            points: IdMap::new(),
            segments: IdMap::new(),
            wires,
            polygons,
            outer_polygon,
        }
    }

    pub fn cfg(&self) -> DecompCfg {
        self.cfg
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.cfg.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.cfg.tolerance = tolerance;
    }

    /// The unbounded polygon; its outer wire is the forest root.
    #[inline]
    pub fn outer_polygon(&self) -> PolygonId {
        self.outer_polygon
    }

    #[inline]
    pub fn root_wire(&self) -> WireId {
        self.polygons[self.outer_polygon].outer_wire
    }

    pub fn points(&self) -> &IdMap<PointId, Point> {
        &self.points
    }

    pub fn segments(&self) -> &IdMap<SegmentId, Segment> {
        &self.segments
    }

    pub fn wires(&self) -> &IdMap<WireId, Wire> {
        &self.wires
    }

    pub fn polygons(&self) -> &IdMap<PolygonId, Polygon> {
        &self.polygons
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id)
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.get(id)
    }

    // ---- checked lookups for caller-supplied handles ----

    pub(crate) fn check_point(&self, id: PointId) -> Result<&Point, DecompError> {
        self.points.get(id).ok_or(DecompError::UnknownEntity {
            kind: "point",
            id: id.0,
        })
    }

    pub(crate) fn check_segment(&self, id: SegmentId) -> Result<&Segment, DecompError> {
        self.segments.get(id).ok_or(DecompError::UnknownEntity {
            kind: "segment",
            id: id.0,
        })
    }

    pub(crate) fn check_wire(&self, id: WireId) -> Result<&Wire, DecompError> {
        self.wires.get(id).ok_or(DecompError::UnknownEntity {
            kind: "wire",
            id: id.0,
        })
    }

    pub(crate) fn check_polygon(&self, id: PolygonId) -> Result<&Polygon, DecompError> {
        self.polygons.get(id).ok_or(DecompError::UnknownEntity {
            kind: "polygon",
            id: id.0,
        })
    }

    // ---- half-edge navigation ----

    #[inline]
    pub(crate) fn xy(&self, pt: PointId) -> Vec2 {
        self.points[pt].xy
    }

    #[inline]
    pub fn next_of(&self, h: HalfEdge) -> HalfEdge {
        self.segments[h.seg].next[h.side.index()]
    }

    #[inline]
    pub(crate) fn set_next(&mut self, h: HalfEdge, next: HalfEdge) {
        self.segments[h.seg].next[h.side.index()] = next;
    }

    #[inline]
    pub fn wire_of(&self, h: HalfEdge) -> WireId {
        self.segments[h.seg].wire[h.side.index()]
    }

    #[inline]
    pub(crate) fn set_wire(&mut self, h: HalfEdge, wire: WireId) {
        self.segments[h.seg].wire[h.side.index()] = wire;
    }

    /// Vertex the half-edge arrives at.
    #[inline]
    pub fn end_point(&self, h: HalfEdge) -> PointId {
        self.segments[h.seg].vtxs[h.side.index()]
    }

    /// Vertex the half-edge leaves from.
    #[inline]
    pub fn start_point(&self, h: HalfEdge) -> PointId {
        self.segments[h.seg].vtxs[1 - h.side.index()]
    }

    /// Segment joining `a` and `b`, in either orientation.
    pub fn segment_between(&self, a: PointId, b: PointId) -> Option<SegmentId> {
        self.points[a]
            .segments
            .iter()
            .map(|(s, _)| *s)
            .find(|s| self.segments[*s].other_vtx(a) == b)
    }

    // ---- snapping ----

    /// Resolve a coordinate against existing geometry.
    ///
    /// Points win over segments. Among candidates within tolerance the closest
    /// wins, equal distances go to the lowest id.
    pub fn snap_point(&self, xy: Vec2) -> Snap {
        let tol = self.tolerance();
        let mut best_pt: Option<(f64, PointId)> = None;
        for (id, p) in self.points.iter() {
            let d = (p.xy - xy).norm();
            if d <= tol && best_pt.map_or(true, |(bd, _)| d < bd) {
                best_pt = Some((d, id));
            }
        }
        if let Some((_, id)) = best_pt {
            tracing::trace!(%id, "snap to point");
            return Snap::Point(id);
        }

        let mut best_seg: Option<(f64, SegmentId, f64)> = None;
        for (id, s) in self.segments.iter() {
            let (t, d) = project_to_segment(xy, self.xy(s.vtxs[OUT_VTX]), self.xy(s.vtxs[IN_VTX]));
            if d <= tol && best_seg.map_or(true, |(bd, _, _)| d < bd) {
                best_seg = Some((d, id, t));
            }
        }
        if let Some((_, id, t)) = best_seg {
            tracing::trace!(%id, t, "snap to segment");
            return Snap::Segment(id, t);
        }
        Snap::Polygon(self.find_polygon(xy))
    }

    /// Dense indices of points, segments and polygons in ascending id order.
    pub fn make_indices(&self) -> Indices {
        Indices {
            points: self.points.keys().enumerate().map(|(i, k)| (k, i)).collect(),
            segments: self.segments.keys().enumerate().map(|(i, k)| (k, i)).collect(),
            polygons: self.polygons.keys().enumerate().map(|(i, k)| (k, i)).collect(),
        }
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod proptests;
