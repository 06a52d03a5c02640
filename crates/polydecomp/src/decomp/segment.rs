//! Segment-level surgery: creation, removal, split at an interior point, the
//! inverse join at a degree-2 point, and orientation flip.
//!
//! Splitting and joining never change wires or polygons; they only relink the
//! half-edge cycles on both sides.

use super::types::{Edit, HalfEdge, Insertion, Point, PolygonChange, Segment, Side, IN_VTX, OUT_VTX};
use super::Decomposition;
use crate::arena::{PointId, PolygonId, SegmentId, WireId};
use crate::error::DecompError;
use crate::geometry::{crosses_x_ray, point_segment_distance, Vec2};

impl Decomposition {
    /// Does the horizontal half-line to the right of `xy` cross segment `seg`?
    pub fn is_on_x_line(&self, seg: SegmentId, xy: Vec2) -> Result<bool, DecompError> {
        let s = self.check_segment(seg)?;
        Ok(crosses_x_ray(self.xy(s.vtxs[OUT_VTX]), self.xy(s.vtxs[IN_VTX]), xy))
    }

    /// Insert the segment record `a → b` with self-referencing links; the
    /// caller wires it in.
    pub(crate) fn create_segment(&mut self, a: PointId, b: PointId, wire: WireId) -> SegmentId {
        let id = self.segments.next_id();
        let s = self.segments.insert(Segment {
            vtxs: [a, b],
            next: [HalfEdge::new(id, Side::Left), HalfEdge::new(id, Side::Right)],
            wire: [wire, wire],
        });
        self.points[a].segments.push((s, OUT_VTX));
        self.points[b].segments.push((s, IN_VTX));
        s
    }

    /// Drop the segment record and its point ends. Links must already be detached.
    pub(crate) fn remove_segment_record(&mut self, s: SegmentId) {
        if let Some(seg) = self.segments.remove(s) {
            for v in seg.vtxs {
                self.points[v].segments.retain(|(x, _)| *x != s);
            }
        }
    }

    /// Hook the end `vtx` of segment `s` into the wedge found by `insert_segment`.
    pub(crate) fn link_end(&mut self, s: SegmentId, vtx: usize, ins: Insertion) {
        let out = HalfEdge::new(s, Side::outgoing(vtx));
        let inc = HalfEdge::new(s, Side::incoming(vtx));
        self.set_next(ins.prev, out);
        self.set_next(inc, ins.next);
    }

    /// Turn segment end `vtx` into a tip: arriving continues straight back.
    pub(crate) fn link_tip(&mut self, s: SegmentId, vtx: usize) {
        let out = HalfEdge::new(s, Side::outgoing(vtx));
        let inc = HalfEdge::new(s, Side::incoming(vtx));
        self.set_next(inc, out);
    }

    /// Split `s` at `xy` (assumed on its interior). `s` keeps its out part,
    /// a new segment takes the in part; both inherit the side wires.
    pub(crate) fn split_segment(&mut self, s: SegmentId, xy: Vec2) -> (PointId, SegmentId) {
        let seg = self.segments[s].clone();
        let b = seg.vtxs[IN_VTX];
        let l = HalfEdge::new(s, Side::Left);
        let r = HalfEdge::new(s, Side::Right);
        let x = self.next_of(l);
        let prev_b = self.prev_of(r);

        let m = self.points.insert(Point {
            xy,
            poly: None,
            segments: Vec::new(),
        });
        let s2 = self.segments.insert(Segment {
            vtxs: [m, b],
            next: [r, l],
            wire: seg.wire,
        });
        let l2 = HalfEdge::new(s2, Side::Left);
        let r2 = HalfEdge::new(s2, Side::Right);

        self.segments[s].vtxs[IN_VTX] = m;
        for end in self.points[b].segments.iter_mut() {
            if *end == (s, IN_VTX) {
                *end = (s2, IN_VTX);
            }
        }
        self.points[m].segments = vec![(s, IN_VTX), (s2, OUT_VTX)];

        self.set_next(l, l2);
        self.set_next(r2, r);
        if prev_b == l {
            self.set_next(l2, r2);
        } else {
            self.set_next(l2, x);
            self.set_next(prev_b, r2);
        }
        tracing::trace!(%s, %s2, %m, "split segment");
        (m, s2)
    }

    /// Reverse the orientation of `s`, relabelling its two half-edges.
    pub(crate) fn flip_segment(&mut self, s: SegmentId) {
        let l = HalfEdge::new(s, Side::Left);
        let r = HalfEdge::new(s, Side::Right);
        let swap = |h: HalfEdge| {
            if h == l {
                r
            } else if h == r {
                l
            } else {
                h
            }
        };
        let prev_l = self.prev_of(l);
        let prev_r = self.prev_of(r);
        let old_wires = self.segments[s].wire;

        let seg = &mut self.segments[s];
        seg.vtxs.swap(0, 1);
        seg.next.swap(0, 1);
        seg.wire.swap(0, 1);
        seg.next = [swap(seg.next[0]), swap(seg.next[1])];
        let vtxs = seg.vtxs;

        self.set_next(swap(prev_l), r);
        self.set_next(swap(prev_r), l);

        for (v, pt) in vtxs.iter().enumerate() {
            for end in self.points[*pt].segments.iter_mut() {
                if end.0 == s {
                    end.1 = v;
                }
            }
        }
        let mut seen = Vec::new();
        for w in old_wires {
            if seen.contains(&w) {
                continue;
            }
            seen.push(w);
            if let Some(start) = self.wires[w].start {
                self.wires[w].start = Some(swap(start));
            }
        }
    }

    /// Merge the two collinear segments meeting at the degree-2 point `mid` into
    /// one and remove `mid`. Inverse of a segment split.
    pub fn join_segments(&mut self, mid: PointId) -> Result<Edit<SegmentId>, DecompError> {
        let point = self.check_point(mid)?;
        if point.degree() != 2 {
            return Err(DecompError::degenerate(format!(
                "{mid} has degree {}, joining needs exactly 2",
                point.degree()
            )));
        }
        let (s1, s2) = (point.segments[0].0, point.segments[1].0);
        let c1 = self.segments[s1].other_vtx(mid);
        let c2 = self.segments[s2].other_vtx(mid);
        if c1 == c2 || self.segment_between(c1, c2).is_some() {
            return Err(DecompError::degenerate(format!(
                "joining at {mid} would duplicate a segment"
            )));
        }
        if point_segment_distance(self.xy(mid), self.xy(c1), self.xy(c2)) > self.tolerance() {
            return Err(DecompError::degenerate(format!(
                "segments at {mid} are not collinear"
            )));
        }

        if self.segments[s1].vtxs[IN_VTX] != mid {
            self.flip_segment(s1);
        }
        if self.segments[s2].vtxs[OUT_VTX] != mid {
            self.flip_segment(s2);
        }
        // Now s1: c1 → mid, s2: mid → c2.
        let l1 = HalfEdge::new(s1, Side::Left);
        let r1 = HalfEdge::new(s1, Side::Right);
        let l2 = HalfEdge::new(s2, Side::Left);
        let r2 = HalfEdge::new(s2, Side::Right);
        let x = self.next_of(l2);
        let prev_c2 = self.prev_of(r2);

        for side in [Side::Right, Side::Left] {
            let w = self.wire_of(HalfEdge::new(s2, side));
            if self.wires[w].start == Some(HalfEdge::new(s2, side)) {
                self.wires[w].start = Some(HalfEdge::new(s1, side));
            }
        }
        self.segments[s1].vtxs[IN_VTX] = c2;
        if prev_c2 == l2 {
            self.set_next(l1, r1);
        } else {
            self.set_next(l1, x);
            self.set_next(prev_c2, r1);
        }
        self.segments.remove(s2);
        for end in self.points[c2].segments.iter_mut() {
            if *end == (s2, IN_VTX) {
                *end = (s1, IN_VTX);
            }
        }
        self.points.remove(mid);
        tracing::debug!(%s1, %s2, %mid, "joined segments");

        let change = PolygonChange::Shape(self.side_polygons(s1));
        Ok(Edit::new(s1, vec![change]))
    }

    /// Polygons on the two sides of `s`, deduplicated and sorted.
    pub(crate) fn side_polygons(&self, s: SegmentId) -> Vec<PolygonId> {
        let mut polys: Vec<_> = self.segments[s]
            .wire
            .iter()
            .map(|w| self.wires[*w].polygon)
            .collect();
        polys.sort();
        polys.dedup();
        polys
    }
}
