//! Drag validation and application.
//!
//! `check_displacement` clamps a rigid translation of a point set so that no
//! point gets within tolerance of a segment it is not an end of, and no two
//! points get within tolerance of each other. Segments with one moving end sweep
//! a fan; their ends still move along one direction, which keeps every contact
//! equation quadratic.

use std::collections::BTreeSet;

use super::types::{Edit, PolygonChange};
use super::Decomposition;
use crate::arena::{PointId, PolygonId};
use crate::error::DecompError;
use crate::geometry::{first_point_contact, first_segment_contact, Vec2};

impl Decomposition {
    /// Largest translation of `points` along `direction`, at most `max_distance`
    /// long, that keeps the decomposition valid.
    ///
    /// The value is the allowed displacement vector; the change lists the
    /// polygons a drag by it would reshape.
    pub fn check_displacement(
        &self,
        points: &[PointId],
        direction: Vec2,
        max_distance: f64,
    ) -> Result<Edit<Vec2>, DecompError> {
        for p in points {
            self.check_point(*p)?;
        }
        let len = direction.norm();
        if !(len.is_finite() && len > 0.0) {
            return Err(DecompError::degenerate("zero displacement direction"));
        }
        let u = direction / len;
        let moving: BTreeSet<PointId> = points.iter().copied().collect();
        let vel = |p: PointId| if moving.contains(&p) { u } else { Vec2::zeros() };
        let tol = self.tolerance();
        let mut limit = max_distance.max(0.0);

        for (_, seg) in self.segments.iter() {
            let [a, b] = seg.vtxs;
            let (va, vb) = (vel(a), vel(b));
            for (q, pt) in self.points.iter() {
                if q == a || q == b {
                    continue;
                }
                let vq = vel(q);
                if va == vq && vb == vq {
                    continue;
                }
                if let Some(t) = first_segment_contact(pt.xy, self.xy(a), self.xy(b), va - vq, vb - vq, tol) {
                    limit = limit.min(t);
                }
            }
        }
        for p in &moving {
            for (q, pt) in self.points.iter() {
                if moving.contains(&q) {
                    continue;
                }
                if let Some(t) = first_point_contact(self.xy(*p) - pt.xy, u, tol) {
                    limit = limit.min(t);
                }
            }
        }
        tracing::trace!(limit, moving = moving.len(), "displacement clamped");
        let change = PolygonChange::Shape(self.polygons_around(&moving));
        Ok(Edit::new(u * limit, vec![change]))
    }

    /// Translate `points` by `displacement` without validation.
    pub fn move_points(&mut self, points: &[PointId], displacement: Vec2) -> Result<Edit<()>, DecompError> {
        for p in points {
            self.check_point(*p)?;
        }
        let moving: BTreeSet<PointId> = points.iter().copied().collect();
        for p in &moving {
            self.points[*p].xy += displacement;
        }
        let change = PolygonChange::Shape(self.polygons_around(&moving));
        Ok(Edit::new((), vec![change]))
    }

    /// Polygons owning the free points of `pts` or bordering their segments.
    fn polygons_around(&self, pts: &BTreeSet<PointId>) -> Vec<PolygonId> {
        let mut polys = BTreeSet::new();
        for p in pts {
            let point = &self.points[*p];
            polys.extend(point.poly);
            for (s, _) in &point.segments {
                polys.extend(self.side_polygons(*s));
            }
        }
        polys.into_iter().collect()
    }
}
