//! Full structural validation. Not used on the edit path.

use std::collections::BTreeSet;

use super::types::{HalfEdge, Side};
use super::Decomposition;
use crate::error::DecompError;

macro_rules! ensure {
    ($cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err(DecompError::inconsistent(format!($($fmt)+)));
        }
    };
}

impl Decomposition {
    /// Validate every cross reference, every wire cycle, the wire forest and the
    /// angular order of half-edges at every point.
    pub fn check_consistency(&self) -> Result<(), DecompError> {
        self.check_points()?;
        self.check_segments()?;
        self.check_wires()?;
        self.check_polygons()?;
        self.check_angular_order()?;
        Ok(())
    }

    fn check_points(&self) -> Result<(), DecompError> {
        for (id, p) in self.points.iter() {
            for &(s, v) in &p.segments {
                let seg = self.check_segment(s)?;
                ensure!(seg.vtxs[v] == id, "{id} lists {s} end {v} which is {}", seg.vtxs[v]);
            }
            match p.poly {
                Some(poly) => {
                    ensure!(p.is_free(), "{id} has segments but is owned by {poly}");
                    let owner = self.check_polygon(poly)?;
                    ensure!(owner.free_points.contains(&id), "{poly} does not list free {id}");
                }
                None => ensure!(!p.is_free(), "{id} has neither segments nor a polygon"),
            }
        }
        Ok(())
    }

    fn check_segments(&self) -> Result<(), DecompError> {
        for (id, s) in self.segments.iter() {
            ensure!(s.vtxs[0] != s.vtxs[1], "{id} is a loop");
            for v in 0..2 {
                let pt = self.check_point(s.vtxs[v])?;
                ensure!(pt.segments.contains(&(id, v)), "{} misses end {v} of {id}", s.vtxs[v]);
            }
            for side in [Side::Right, Side::Left] {
                let h = HalfEdge::new(id, side);
                self.check_wire(self.wire_of(h))?;
                let next = self.next_of(h);
                self.check_segment(next.seg)?;
                ensure!(
                    self.start_point(next) == self.end_point(h),
                    "{id}/{side:?} is followed by {}/{:?} from another point",
                    next.seg,
                    next.side
                );
                ensure!(
                    self.wire_of(next) == self.wire_of(h),
                    "{id}/{side:?} and its successor lie on different wires"
                );
            }
        }
        Ok(())
    }

    fn check_wires(&self) -> Result<(), DecompError> {
        let tol2 = self.tolerance() * self.tolerance();
        let mut roots = 0;
        let mut covered = 0;
        for (id, w) in self.wires.iter() {
            let poly = self.check_polygon(w.polygon)?;
            for c in &w.childs {
                ensure!(self.check_wire(*c)?.parent == Some(id), "{c} is listed under {id}");
            }
            let Some(parent) = w.parent else {
                roots += 1;
                ensure!(w.start.is_none(), "root {id} has half-edges");
                ensure!(w.polygon == self.outer_polygon, "root {id} is not the outer boundary");
                continue;
            };
            ensure!(self.check_wire(parent)?.childs.contains(&id), "{parent} does not list {id}");

            let Some(start) = w.start else {
                return Err(DecompError::inconsistent(format!("{id} has no half-edges")));
            };
            let cycle = self.cycle_from(start);
            ensure!(
                self.next_of(cycle[cycle.len() - 1]) == start,
                "{id} does not close within {} half-edges",
                cycle.len()
            );
            for h in &cycle {
                ensure!(self.wire_of(*h) == id, "{}/{:?} on the cycle of {id} names another wire", h.seg, h.side);
            }
            covered += cycle.len();

            let parent_is_face = self.polygons[self.wires[parent].polygon].outer_wire == parent;
            let area = self.cycle_area(&cycle);
            if poly.outer_wire == id {
                ensure!(!parent_is_face, "face {id} nested directly in face {parent}");
                ensure!(area > 0.0, "face {id} has area {area}");
            } else {
                ensure!(parent_is_face, "outline {id} nested in outline {parent}");
                ensure!(
                    self.polygons[w.polygon].outer_wire == parent,
                    "outline {id} is not a hole of its polygon"
                );
                ensure!(area <= tol2, "outline {id} has area {area}");
            }
        }
        ensure!(roots == 1, "{roots} root wires");
        ensure!(
            covered == 2 * self.segments.len(),
            "wire cycles cover {covered} half-edges of {} segments",
            self.segments.len()
        );
        Ok(())
    }

    fn check_polygons(&self) -> Result<(), DecompError> {
        let mut outer_wires = BTreeSet::new();
        for (id, p) in self.polygons.iter() {
            ensure!(self.check_wire(p.outer_wire)?.polygon == id, "outer wire of {id} names another polygon");
            ensure!(outer_wires.insert(p.outer_wire), "{} bounds two polygons", p.outer_wire);
            for fp in &p.free_points {
                ensure!(self.check_point(*fp)?.poly == Some(id), "{fp} is listed by {id} but owned elsewhere");
            }
        }
        Ok(())
    }

    /// Arriving along a segment continues along the next segment clockwise.
    fn check_angular_order(&self) -> Result<(), DecompError> {
        for id in self.points.keys() {
            let ends = self.ordered_ends(id);
            for (i, &(s, v)) in ends.iter().enumerate() {
                let (cw_s, cw_v) = ends[(i + ends.len() - 1) % ends.len()];
                let inc = HalfEdge::new(s, Side::incoming(v));
                let expected = HalfEdge::new(cw_s, Side::outgoing(cw_v));
                ensure!(
                    self.next_of(inc) == expected,
                    "at {id} arriving along {s} does not turn into {cw_s}"
                );
            }
        }
        Ok(())
    }
}
