//! Caller-facing edits: points, segments, lines.
//!
//! Each call validates before mutating. `add_line` is composed of several
//! primitive steps and restores a snapshot when any of them fails.

use std::collections::BTreeSet;

use super::types::{Edit, HalfEdge, Point, PolygonChange, Side, Snap, IN_VTX, OUT_VTX};
use super::Decomposition;
use crate::arena::{PointId, PolygonId, SegmentId, WireId};
use crate::error::DecompError;
use crate::geometry::{colocated, project_to_segment, segment_intersection, Vec2};

/// Where a new line has to pass through existing geometry.
#[derive(Clone, Copy, Debug)]
enum Stop {
    Existing(PointId),
    Crossing(SegmentId, Vec2),
}

impl Stop {
    fn xy(&self, d: &Decomposition) -> Vec2 {
        match *self {
            Stop::Existing(p) => d.xy(p),
            Stop::Crossing(_, xy) => xy,
        }
    }
}

impl Decomposition {
    /// Place a point at `xy`, snapping to existing geometry.
    ///
    /// Snapping to a point returns it unchanged. Snapping to a segment splits the
    /// segment at the projection of `xy`. Otherwise a free point is created in
    /// the polygon containing `xy`.
    pub fn add_point(&mut self, xy: Vec2) -> Result<Edit<PointId>, DecompError> {
        match self.snap_point(xy) {
            Snap::Point(p) => Ok(Edit::new(p, Vec::new())),
            Snap::Segment(s, t) => {
                let seg = &self.segments[s];
                let (a, b) = (self.xy(seg.vtxs[OUT_VTX]), self.xy(seg.vtxs[IN_VTX]));
                let (m, _) = self.split_segment(s, a + (b - a) * t);
                let change = PolygonChange::Shape(self.side_polygons(s));
                Ok(Edit::new(m, vec![change]))
            }
            Snap::Polygon(poly) => Ok(Edit::new(self.insert_free_point(xy, poly), Vec::new())),
        }
    }

    /// Create a free point at `xy` owned by `poly`, without snapping.
    pub fn add_free_point(&mut self, xy: Vec2, poly: PolygonId) -> Result<PointId, DecompError> {
        self.check_polygon(poly)?;
        Ok(self.insert_free_point(xy, poly))
    }

    fn insert_free_point(&mut self, xy: Vec2, poly: PolygonId) -> PointId {
        let p = self.points.insert(Point::free(xy, poly));
        self.polygons[poly].free_points.insert(p);
        tracing::trace!(%p, %poly, "free point");
        p
    }

    /// Remove a point without segments.
    pub fn delete_point(&mut self, pt: PointId) -> Result<Edit<()>, DecompError> {
        let point = self.check_point(pt)?;
        if !point.is_free() {
            return Err(DecompError::PointInUse {
                point: pt,
                degree: point.degree(),
            });
        }
        if let Some(poly) = point.poly {
            self.polygons[poly].free_points.remove(&pt);
        }
        self.points.remove(pt);
        Ok(Edit::new((), Vec::new()))
    }

    /// Connect two existing points by a straight segment.
    ///
    /// The segment must not cross existing segments; `add_line` takes care of
    /// that. An existing segment between the points is returned as is.
    pub fn new_segment(&mut self, a: PointId, b: PointId) -> Result<Edit<SegmentId>, DecompError> {
        self.check_point(a)?;
        self.check_point(b)?;
        if a == b {
            return Err(DecompError::degenerate(format!("segment from {a} to itself")));
        }
        if colocated(self.xy(a), self.xy(b), self.tolerance()) {
            return Err(DecompError::degenerate(format!("{a} and {b} are colocated")));
        }
        if let Some(s) = self.segment_between(a, b) {
            return Ok(Edit::new(s, Vec::new()));
        }
        let dir = self.xy(b) - self.xy(a);
        let ins_a = self.insert_segment(a, dir)?;
        let ins_b = self.insert_segment(b, -dir)?;
        let poly = match (self.attach_polygon(a, ins_a), self.attach_polygon(b, ins_b)) {
            (Some(pa), Some(pb)) if pa == pb => pa,
            _ => return Err(DecompError::CrossesBoundary { a, b }),
        };

        let (s, change) = match (ins_a, ins_b) {
            (None, None) => {
                let w: WireId = self.wires.next_id();
                let s = self.create_segment(a, b, w);
                let outer = self.polygons[poly].outer_wire;
                self.add_wire(poly, outer, HalfEdge::new(s, Side::Left));
                self.link_tip(s, OUT_VTX);
                self.link_tip(s, IN_VTX);
                self.unfree_point(a);
                self.unfree_point(b);
                tracing::debug!(%s, %w, %poly, "new component");
                (s, PolygonChange::None)
            }
            (Some(ia), None) => {
                let s = self.create_segment(a, b, ia.wire);
                self.link_end(s, OUT_VTX, ia);
                self.link_tip(s, IN_VTX);
                self.unfree_point(b);
                (s, PolygonChange::Shape(vec![poly]))
            }
            (None, Some(ib)) => {
                let s = self.create_segment(a, b, ib.wire);
                self.link_end(s, IN_VTX, ib);
                self.link_tip(s, OUT_VTX);
                self.unfree_point(a);
                (s, PolygonChange::Shape(vec![poly]))
            }
            (Some(ia), Some(ib)) => {
                let s = self.create_segment(a, b, ia.wire);
                self.link_end(s, OUT_VTX, ia);
                self.link_end(s, IN_VTX, ib);
                if ia.wire == ib.wire {
                    (s, self.split_wire(ia.wire, s))
                } else {
                    self.join_wires(ia.wire, ib.wire, s);
                    (s, PolygonChange::Shape(vec![poly]))
                }
            }
        };
        Ok(Edit::new(s, vec![change]))
    }

    /// Insert the straight line from `a` to `b`.
    ///
    /// Both ends are snapped. Existing points within tolerance of the line become
    /// vertices of it, and crossed segments are split at the crossing. Returns
    /// the segments forming the line, from `a` to `b`. On error the
    /// decomposition is left unchanged.
    pub fn add_line(&mut self, a: Vec2, b: Vec2) -> Result<Edit<Vec<SegmentId>>, DecompError> {
        let snapshot = self.clone();
        let result = self.insert_line(a, b);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    /// `add_line` without the snapshot; a failure may leave a partial line.
    pub(crate) fn insert_line(&mut self, a: Vec2, b: Vec2) -> Result<Edit<Vec<SegmentId>>, DecompError> {
        let mut changes = Vec::new();
        let pa = self.add_point(a)?;
        changes.extend(pa.changes);
        let pb = self.add_point(b)?;
        changes.extend(pb.changes);
        let (pa, pb) = (pa.value, pb.value);
        if pa == pb {
            return Err(DecompError::degenerate(format!(
                "both ends of the line snap to {pa}"
            )));
        }

        let stops = self.line_stops(pa, pb);
        let mut line = Vec::with_capacity(stops.len() + 1);
        let mut prev = pa;
        for stop in stops {
            let pt = match stop {
                Stop::Existing(p) => p,
                Stop::Crossing(s, xy) => {
                    let (m, _) = self.split_segment(s, xy);
                    changes.push(PolygonChange::Shape(self.side_polygons(s)));
                    m
                }
            };
            let e = self.new_segment(prev, pt)?;
            line.push(e.value);
            changes.extend(e.changes);
            prev = pt;
        }
        let e = self.new_segment(prev, pb)?;
        line.push(e.value);
        changes.extend(e.changes);
        tracing::debug!(%pa, %pb, segments = line.len(), "line added");
        Ok(Edit::new(line, changes))
    }

    /// Existing points on the open line `pa → pb` and proper crossings with
    /// existing segments, ordered from `pa`, colocated stops merged.
    fn line_stops(&self, pa: PointId, pb: PointId) -> Vec<Stop> {
        let (p, q) = (self.xy(pa), self.xy(pb));
        let tol = self.tolerance();
        let mut stops: Vec<(f64, Stop)> = Vec::new();
        for (id, pt) in self.points.iter() {
            if id == pa || id == pb {
                continue;
            }
            let (t, d) = project_to_segment(pt.xy, p, q);
            if d <= tol && t > 0.0 && t < 1.0 {
                stops.push((t, Stop::Existing(id)));
            }
        }
        for (id, seg) in self.segments.iter() {
            let (u0, u1) = (self.xy(seg.vtxs[OUT_VTX]), self.xy(seg.vtxs[IN_VTX]));
            if let Some((t, _)) = segment_intersection(p, q, u0, u1) {
                let x = p + (q - p) * t;
                let near_end = [u0, u1, p, q].iter().any(|e| colocated(*e, x, tol));
                if !near_end {
                    stops.push((t, Stop::Crossing(id, x)));
                }
            }
        }
        stops.sort_by(|l, r| l.0.partial_cmp(&r.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut merged: Vec<Stop> = Vec::with_capacity(stops.len());
        for (_, stop) in stops {
            let xy = stop.xy(self);
            match merged.last_mut() {
                Some(last) if colocated(last.xy(self), xy, tol) => {
                    // An existing point absorbs a crossing next to it.
                    if let (Stop::Crossing(..), Stop::Existing(_)) = (*last, stop) {
                        *last = stop;
                    }
                }
                _ => merged.push(stop),
            }
        }
        merged
    }

    /// Remove a segment, merging or separating wires and polygons as needed.
    pub fn delete_segment(&mut self, s: SegmentId) -> Result<Edit<()>, DecompError> {
        let seg = self.check_segment(s)?.clone();
        let wl = seg.wire[Side::Left.index()];
        let wr = seg.wire[Side::Right.index()];
        let outer_l = self.polygons[self.wires[wl].polygon].outer_wire == wl;
        let outer_r = self.polygons[self.wires[wr].polygon].outer_wire == wr;
        if wl != wr && !outer_l && !outer_r {
            return Err(DecompError::inconsistent(format!(
                "{s} separates two component outlines {wl} and {wr}"
            )));
        }

        // Per end: (point, is tip, arrival into s, continuation out of s).
        let ends: [(PointId, bool, HalfEdge, HalfEdge); 2] = [OUT_VTX, IN_VTX].map(|v| {
            let out = HalfEdge::new(s, Side::outgoing(v));
            let inc = HalfEdge::new(s, Side::incoming(v));
            let prev = self.prev_of(out);
            (seg.vtxs[v], prev == inc, prev, self.next_of(inc))
        });
        for (_, tip, prev, next) in ends {
            if !tip {
                self.set_next(prev, next);
            }
        }
        self.remove_segment_record(s);

        let change = if wl == wr {
            self.detach_dendrite(wl, ends)
        } else {
            self.merge_faces(wl, wr, outer_l && outer_r, ends[0].3)
        };
        tracing::debug!(%s, ?change, "segment deleted");
        Ok(Edit::new((), vec![change]))
    }

    /// Wire `w` lost a segment that had it on both sides.
    fn detach_dendrite(&mut self, w: WireId, ends: [(PointId, bool, HalfEdge, HalfEdge); 2]) -> PolygonChange {
        let poly = self.wires[w].polygon;
        let [(a, a_tip, _, na), (b, b_tip, _, nb)] = ends;
        match (a_tip, b_tip) {
            (true, true) => {
                self.drop_wire(w);
                self.move_free_point(a, poly);
                self.move_free_point(b, poly);
                tracing::debug!(%w, "component removed");
                PolygonChange::None
            }
            (true, false) | (false, true) => {
                let (tip, rest) = if a_tip { (a, nb) } else { (b, na) };
                self.wires[w].start = Some(rest);
                self.move_free_point(tip, poly);
                PolygonChange::Shape(vec![poly])
            }
            (false, false) => {
                self.split_bridge(w, na, nb);
                PolygonChange::Shape(vec![poly])
            }
        }
    }

    /// A bridge of wire `w` was removed; the cycles through `na` and `nb` are
    /// now separate.
    fn split_bridge(&mut self, w: WireId, na: HalfEdge, nb: HalfEdge) {
        let poly = self.wires[w].polygon;
        let ca = self.cycle_from(na);
        let cb = self.cycle_from(nb);
        if self.polygons[poly].outer_wire == w {
            // The face boundary keeps the counterclockwise part; the rest is an island.
            let (keep, island, island_start) = if self.cycle_area(&ca) >= self.cycle_area(&cb) {
                (na, cb, nb)
            } else {
                (nb, ca, na)
            };
            self.wires[w].start = Some(keep);
            let hole = self.add_wire(poly, w, island_start);
            self.relabel_cycle(&island, hole);
            let island_pts = self.component_points(self.start_point(island_start));
            if let Some(parent) = self.wires[w].parent {
                let faces: Vec<WireId> = self.wires[parent]
                    .childs
                    .iter()
                    .copied()
                    .filter(|f| *f != w && self.wire_in_points(*f, &island_pts))
                    .collect();
                for f in faces {
                    self.reparent(f, hole);
                }
            }
            tracing::debug!(%w, %hole, "island separated");
        } else {
            // A component outline falls apart into two components.
            self.wires[w].start = Some(na);
            let parent = self.wires[w].parent.unwrap_or(w);
            let w2 = self.add_wire(poly, parent, nb);
            self.relabel_cycle(&cb, w2);
            let pts = self.component_points(self.start_point(nb));
            let faces: Vec<WireId> = self.wires[w]
                .childs
                .iter()
                .copied()
                .filter(|f| self.wire_in_points(*f, &pts))
                .collect();
            for f in faces {
                self.reparent(f, w2);
            }
            tracing::debug!(%w, %w2, "component separated");
        }
    }

    fn wire_in_points(&self, w: WireId, pts: &BTreeSet<PointId>) -> bool {
        self.wires[w]
            .start
            .is_some_and(|h| pts.contains(&self.start_point(h)))
    }

    /// The wires on both sides of a removed segment differ; the face on one side
    /// is absorbed by the other.
    fn merge_faces(&mut self, wl: WireId, wr: WireId, both_faces: bool, start: HalfEdge) -> PolygonChange {
        let (pl, pr) = (self.wires[wl].polygon, self.wires[wr].polygon);
        let (kept, removed, keep_w, drop_w) = if both_faces {
            if pl < pr {
                (pl, pr, wl, wr)
            } else {
                (pr, pl, wr, wl)
            }
        } else if self.polygons[pl].outer_wire == wl {
            // Left side is a face of the component, right side its outline.
            (pr, pl, wr, wl)
        } else {
            (pl, pr, wl, wr)
        };
        let holes: Vec<WireId> = self.wires[self.polygons[removed].outer_wire]
            .childs
            .iter()
            .copied()
            .collect();
        for h in holes {
            self.reparent_hole(h, kept);
        }
        let frees: Vec<PointId> = self.polygons[removed].free_points.iter().copied().collect();
        for p in frees {
            self.move_free_point(p, kept);
        }
        self.drop_wire(drop_w);
        self.polygons.remove(removed);
        self.wires[keep_w].start = Some(start);
        let cycle = self.cycle_from(start);
        self.relabel_cycle(&cycle, keep_w);
        tracing::debug!(%kept, %removed, "polygons joined");
        PolygonChange::Join { kept, removed }
    }
}
