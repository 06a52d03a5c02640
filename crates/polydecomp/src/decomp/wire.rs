//! Wire cycles, containment, point location and the wire split/join surgery
//! that follows a segment insertion.

use std::collections::{BTreeSet, VecDeque};

use super::types::{HalfEdge, PolygonChange, Polygon, Side, Wire};
use super::Decomposition;
use crate::arena::{PointId, PolygonId, SegmentId, WireId};
use crate::error::DecompError;
use crate::geometry::{crosses_x_ray, signed_area, Vec2};

impl Decomposition {
    /// Half-edges of the cycle through `start`, in traversal order.
    pub(crate) fn cycle_from(&self, start: HalfEdge) -> Vec<HalfEdge> {
        let limit = 2 * self.segments.len();
        let mut cycle = vec![start];
        let mut h = self.next_of(start);
        while h != start && cycle.len() <= limit {
            cycle.push(h);
            h = self.next_of(h);
        }
        cycle
    }

    /// Half-edges of wire `w` in traversal order; empty for the root wire.
    pub fn wire_half_edges(&self, w: WireId) -> Result<Vec<HalfEdge>, DecompError> {
        Ok(self.check_wire(w)?.start.map(|s| self.cycle_from(s)).unwrap_or_default())
    }

    pub(crate) fn cycle_area(&self, cycle: &[HalfEdge]) -> f64 {
        signed_area(
            cycle
                .iter()
                .map(|h| (self.xy(self.start_point(*h)), self.xy(self.end_point(*h)))),
        )
    }

    /// Signed area enclosed by wire `w`: positive for face boundaries, negative
    /// for component outlines, zero for trees and the root.
    pub fn wire_area(&self, w: WireId) -> Result<f64, DecompError> {
        Ok(self.cycle_area(&self.wire_half_edges(w)?))
    }

    /// Is `xy` inside the region bounded by wire `w`?
    ///
    /// Ray parity over the wire's half-edges; dendrites are walked twice and
    /// cancel. The root wire contains the whole plane.
    pub fn contains_point(&self, w: WireId, xy: Vec2) -> Result<bool, DecompError> {
        let wire = self.check_wire(w)?;
        Ok(match wire.start {
            None => true,
            Some(start) => self.cycle_contains(&self.cycle_from(start), xy),
        })
    }

    pub(crate) fn cycle_contains(&self, cycle: &[HalfEdge], xy: Vec2) -> bool {
        cycle
            .iter()
            .filter(|h| crosses_x_ray(self.xy(self.start_point(**h)), self.xy(self.end_point(**h)), xy))
            .count()
            % 2
            == 1
    }

    fn wire_contains(&self, w: WireId, xy: Vec2) -> bool {
        match self.wires[w].start {
            None => true,
            Some(start) => self.cycle_contains(&self.cycle_from(start), xy),
        }
    }

    /// Polygon containing `xy`, found by descending the wire forest from the root.
    pub fn find_polygon(&self, xy: Vec2) -> PolygonId {
        let mut w = self.root_wire();
        while let Some(child) = self.wires[w]
            .childs
            .iter()
            .copied()
            .find(|c| self.wire_contains(*c, xy))
        {
            w = child;
        }
        self.wires[w].polygon
    }

    /// A vertex of wire `w`, used as its location when testing nesting.
    pub(crate) fn wire_anchor(&self, w: WireId) -> Option<Vec2> {
        self.wires[w].start.map(|h| self.xy(self.start_point(h)))
    }

    /// Points reachable from `pt` over segments.
    pub(crate) fn component_points(&self, pt: PointId) -> BTreeSet<PointId> {
        let mut seen = BTreeSet::from([pt]);
        let mut queue = VecDeque::from([pt]);
        while let Some(p) = queue.pop_front() {
            for (s, _) in &self.points[p].segments {
                let q = self.segments[*s].other_vtx(p);
                if seen.insert(q) {
                    queue.push_back(q);
                }
            }
        }
        seen
    }

    /// Assign every half-edge of `cycle` to wire `w`.
    pub(crate) fn relabel_cycle(&mut self, cycle: &[HalfEdge], w: WireId) {
        for h in cycle {
            self.set_wire(*h, w);
        }
    }

    pub(crate) fn reparent(&mut self, child: WireId, parent: WireId) {
        if let Some(old) = self.wires[child].parent {
            self.wires[old].childs.remove(&child);
        }
        self.wires[child].parent = Some(parent);
        self.wires[parent].childs.insert(child);
    }

    /// Make component outline `hole` a hole of polygon `poly`.
    pub(crate) fn reparent_hole(&mut self, hole: WireId, poly: PolygonId) {
        let outer = self.polygons[poly].outer_wire;
        self.reparent(hole, outer);
        self.wires[hole].polygon = poly;
    }

    /// Remove wire `w` from the forest and the table.
    pub(crate) fn drop_wire(&mut self, w: WireId) {
        if let Some(parent) = self.wires[w].parent {
            self.wires[parent].childs.remove(&w);
        }
        self.wires.remove(w);
    }

    /// Create a wire and link it under `parent`.
    pub(crate) fn add_wire(&mut self, polygon: PolygonId, parent: WireId, start: HalfEdge) -> WireId {
        let w = self.wires.insert(Wire {
            polygon,
            parent: Some(parent),
            childs: BTreeSet::new(),
            start: Some(start),
        });
        self.wires[parent].childs.insert(w);
        w
    }

    /// Create a polygon whose outer wire is the cycle through `start`, linked
    /// under `parent`. Returns the polygon and its wire.
    fn add_polygon(&mut self, parent: WireId, start: HalfEdge) -> (PolygonId, WireId) {
        let p = self.polygons.next_id();
        let w = self.add_wire(p, parent, start);
        let inserted = self.polygons.insert(Polygon {
            outer_wire: w,
            free_points: BTreeSet::new(),
        });
        debug_assert_eq!(inserted, p);
        (p, w)
    }

    /// Move the holes of `from` (children of its outer wire, except `skip`) and
    /// its free points that lie inside the cycle of `into_wire` over to polygon `to`.
    fn move_enclosed(&mut self, from: PolygonId, skip: WireId, to: PolygonId, into_wire: WireId) {
        let cycle = self.wire_half_edges(into_wire).unwrap_or_default();
        let from_outer = self.polygons[from].outer_wire;
        let holes: Vec<WireId> = self.wires[from_outer]
            .childs
            .iter()
            .copied()
            .filter(|h| *h != skip)
            .filter(|h| self.wire_anchor(*h).is_some_and(|xy| self.cycle_contains(&cycle, xy)))
            .collect();
        for h in holes {
            self.reparent_hole(h, to);
        }
        let frees: Vec<PointId> = self.polygons[from]
            .free_points
            .iter()
            .copied()
            .filter(|p| self.cycle_contains(&cycle, self.xy(*p)))
            .collect();
        for p in frees {
            self.move_free_point(p, to);
        }
    }

    /// Segment `s` was linked with both ends on wire `w`, closing a loop.
    /// Split `w` into the two cycles through the sides of `s`.
    pub(crate) fn split_wire(&mut self, w: WireId, s: SegmentId) -> PolygonChange {
        let left = HalfEdge::new(s, Side::Left);
        let right = HalfEdge::new(s, Side::Right);
        let c_left = self.cycle_from(left);
        let c_right = self.cycle_from(right);
        let poly = self.wires[w].polygon;

        if self.polygons[poly].outer_wire == w {
            // A chord across the face: the left cycle becomes a new polygon.
            let parent = self.wires[w].parent.unwrap_or(w);
            let (p2, w2) = self.add_polygon(parent, left);
            self.relabel_cycle(&c_left, w2);
            self.wires[w].start = Some(right);
            self.move_enclosed(poly, w2, p2, w2);
            tracing::debug!(orig = %poly, new = %p2, "polygon split");
            PolygonChange::Split { orig: poly, new: p2 }
        } else {
            // A component outline closes a loop: the counterclockwise cycle
            // bounds a new face inside the component.
            let (inner, outer, inner_start, outer_start) =
                if self.cycle_area(&c_left) >= self.cycle_area(&c_right) {
                    (c_left, c_right, left, right)
                } else {
                    (c_right, c_left, right, left)
                };
            let (p2, w2) = self.add_polygon(w, inner_start);
            self.relabel_cycle(&inner, w2);
            self.relabel_cycle(&outer, w);
            self.wires[w].start = Some(outer_start);
            self.move_enclosed(poly, w, p2, w2);
            tracing::debug!(parent = %poly, new = %p2, "polygon added");
            PolygonChange::Add { parent: poly, new: p2 }
        }
    }

    /// Segment `s` was linked between wires `w1` and `w2` of the same polygon;
    /// merge them into one.
    pub(crate) fn join_wires(&mut self, w1: WireId, w2: WireId, s: SegmentId) -> WireId {
        let poly = self.wires[w1].polygon;
        let outer = self.polygons[poly].outer_wire;
        let (keep, drop) = if w2 == outer || (w1 != outer && w2 < w1) {
            (w2, w1)
        } else {
            (w1, w2)
        };
        let new_parent = if keep == outer {
            self.wires[keep].parent.unwrap_or(keep)
        } else {
            keep
        };
        let orphans: Vec<WireId> = self.wires[drop].childs.iter().copied().collect();
        for c in orphans {
            self.reparent(c, new_parent);
        }
        self.drop_wire(drop);
        let cycle = self.cycle_from(HalfEdge::new(s, Side::Left));
        self.relabel_cycle(&cycle, keep);
        tracing::debug!(%keep, %drop, "wires joined");
        keep
    }

    /// Hand free point `p` over to polygon `to`.
    pub(crate) fn move_free_point(&mut self, p: PointId, to: PolygonId) {
        if let Some(old) = self.points[p].poly {
            self.polygons[old].free_points.remove(&p);
        }
        self.points[p].poly = Some(to);
        self.polygons[to].free_points.insert(p);
    }

    /// Point `p` stops being free (it got a segment).
    pub(crate) fn unfree_point(&mut self, p: PointId) {
        if let Some(old) = self.points[p].poly.take() {
            self.polygons[old].free_points.remove(&p);
        }
    }
}
