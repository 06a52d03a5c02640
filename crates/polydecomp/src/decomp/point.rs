//! Angular bookkeeping around a point.
//!
//! At every vertex the wire rule is: the half-edge arriving along segment `e`
//! continues with the half-edge leaving along the first segment met when turning
//! clockwise from `e`. All link repair after insertion or removal follows from it.

use super::types::{HalfEdge, Insertion, Side};
use super::Decomposition;
use crate::arena::{PointId, PolygonId, SegmentId};
use crate::error::DecompError;
use crate::geometry::{angle_of, ccw_delta, Vec2, ANGLE_EPS};

impl Decomposition {
    /// Direction angle of the segment end `(seg, vtx)` seen from its vertex.
    pub(crate) fn end_angle(&self, seg: SegmentId, vtx: usize) -> f64 {
        let s = &self.segments[seg];
        angle_of(self.xy(s.vtxs[1 - vtx]) - self.xy(s.vtxs[vtx]))
    }

    /// Incident segment ends of `pt` sorted counterclockwise by direction.
    pub fn ordered_ends(&self, pt: PointId) -> Vec<(SegmentId, usize)> {
        let mut ends: Vec<(f64, (SegmentId, usize))> = self.points[pt]
            .segments
            .iter()
            .map(|&(s, v)| (self.end_angle(s, v), (s, v)))
            .collect();
        ends.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        ends.into_iter().map(|(_, e)| e).collect()
    }

    /// Where a segment leaving `pt` in `direction` attaches.
    ///
    /// Returns `Ok(None)` for a point without segments. For one segment both
    /// sides of that segment are returned; otherwise the wedge between the
    /// nearest segments clockwise and counterclockwise of `direction`.
    /// A direction coinciding with an existing segment is rejected.
    pub fn insert_segment(&self, pt: PointId, direction: Vec2) -> Result<Option<Insertion>, DecompError> {
        let point = self.check_point(pt)?;
        if point.segments.is_empty() {
            return Ok(None);
        }
        let gamma = angle_of(direction);
        let mut ccw: Option<(f64, (SegmentId, usize))> = None;
        let mut cw: Option<(f64, (SegmentId, usize))> = None;
        for &(s, v) in &point.segments {
            let delta = ccw_delta(gamma, self.end_angle(s, v));
            if delta < ANGLE_EPS || std::f64::consts::TAU - delta < ANGLE_EPS {
                return Err(DecompError::degenerate(format!(
                    "direction at {pt} overlaps {s}"
                )));
            }
            if ccw.map_or(true, |(d, _)| delta < d) {
                ccw = Some((delta, (s, v)));
            }
            if cw.map_or(true, |(d, _)| delta > d) {
                cw = Some((delta, (s, v)));
            }
        }
        let (Some((_, (ccw_seg, ccw_vtx))), Some((_, (cw_seg, cw_vtx)))) = (ccw, cw) else {
            return Ok(None);
        };
        let prev = HalfEdge::new(ccw_seg, Side::incoming(ccw_vtx));
        let next = HalfEdge::new(cw_seg, Side::outgoing(cw_vtx));
        Ok(Some(Insertion {
            prev,
            next,
            wire: self.wire_of(next),
        }))
    }

    /// Half-edge whose `next` is `h`, searched among the arrivals at `h`'s start.
    pub(crate) fn prev_of(&self, h: HalfEdge) -> HalfEdge {
        let pt = self.start_point(h);
        self.points[pt]
            .segments
            .iter()
            .map(|&(s, v)| HalfEdge::new(s, Side::incoming(v)))
            .find(|inc| self.next_of(*inc) == h)
            .unwrap_or_else(|| h.twin())
    }

    /// Polygon a new segment end at `pt` lies in, given its insertion wedge.
    pub(crate) fn attach_polygon(&self, pt: PointId, ins: Option<Insertion>) -> Option<PolygonId> {
        match ins {
            Some(i) => Some(self.wires[i.wire].polygon),
            None => self.points[pt].poly,
        }
    }
}
