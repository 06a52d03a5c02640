//! Tolerance-aware 2D predicates used by the decomposition.
//!
//! Purpose
//! - Angle ordering of segment directions around a point.
//! - Point/segment projection and colocation under an absolute tolerance.
//! - Horizontal ray crossing (point location) and segment/segment crossing.
//! - First-contact times for linearly moving configurations (drag clamping).
//!
//! Conventions
//! - All coordinates are `Vec2 = nalgebra::Vector2<f64>`.
//! - Angles are measured counterclockwise from +x in `[0, 2π)`.
//! - Tolerances are absolute distances in coordinate units; `ANGLE_EPS` is the
//!   only fixed constant and guards exact direction ties.

use nalgebra::Vector2;
use std::f64::consts::TAU;

pub type Vec2 = Vector2<f64>;

/// Two directions closer than this (radians) are treated as coincident.
pub const ANGLE_EPS: f64 = 1e-10;

/// z-component of `a × b`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Direction angle in `[0, 2π)`.
#[inline]
pub fn angle_of(v: Vec2) -> f64 {
    let a = v.y.atan2(v.x);
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Counterclockwise rotation needed to go from angle `from` to angle `to`, in `[0, 2π)`.
#[inline]
pub fn ccw_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(TAU);
    if d >= TAU {
        0.0
    } else {
        d
    }
}

#[inline]
pub fn colocated(a: Vec2, b: Vec2, tol: f64) -> bool {
    (a - b).norm() <= tol
}

/// Closest point of segment `[a, b]` to `xy`.
///
/// Returns `(t, dist)` with `t ∈ [0, 1]` the parameter of the closest point and
/// `dist` the distance to it. A zero-length segment projects onto `a`.
pub fn project_to_segment(xy: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 == 0.0 {
        return (0.0, (xy - a).norm());
    }
    let t = ((xy - a).dot(&d) / len2).clamp(0.0, 1.0);
    let foot = a + d * t;
    (t, (xy - foot).norm())
}

#[inline]
pub fn point_segment_distance(xy: Vec2, a: Vec2, b: Vec2) -> f64 {
    project_to_segment(xy, a, b).1
}

/// Does the half-line `{xy + s·(1,0) : s > 0}` cross the segment `[a, b]`?
///
/// Half-open in y: an endpoint counts only when the other endpoint lies strictly
/// below it, so a ray through a shared vertex of two boundary edges is counted once.
/// Horizontal segments never cross.
pub fn crosses_x_ray(a: Vec2, b: Vec2, xy: Vec2) -> bool {
    if (a.y > xy.y) == (b.y > xy.y) {
        return false;
    }
    let t = (xy.y - a.y) / (b.y - a.y);
    let x_isec = a.x + t * (b.x - a.x);
    x_isec > xy.x
}

/// Proper crossing of `[p0, p1]` and `[q0, q1]`.
///
/// Returns the parameters `(t, u)` of the crossing along each segment, both in
/// the open interval `(0, 1)`. Parallel (including collinear) pairs return `None`.
pub fn segment_intersection(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<(f64, f64)> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = cross(r, s);
    let scale = r.norm() * s.norm();
    if scale == 0.0 || denom.abs() <= ANGLE_EPS * scale {
        return None;
    }
    let qp = q0 - p0;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    if t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0 {
        Some((t, u))
    } else {
        None
    }
}

/// Signed area of a closed polyline given as a sequence of `(start, end)` edges.
/// Positive for counterclockwise loops; an edge walked in both directions cancels.
pub fn signed_area<I>(edges: I) -> f64
where
    I: IntoIterator<Item = (Vec2, Vec2)>,
{
    0.5 * edges.into_iter().map(|(p, q)| cross(p, q)).sum::<f64>()
}

/// Real roots of `a t² + b t + c = 0`, ascending. Degrades to the linear case.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= 1e-14 * scale {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    // Numerically stable pair.
    let q = -0.5 * (b + b.signum() * sq);
    let mut roots = if q == 0.0 {
        vec![0.0]
    } else {
        vec![q / a, c / q]
    };
    roots.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    roots
}

/// First `t ≥ 0` at which the moving offset `rel + t·v` has length `radius`,
/// entering from outside. `None` if it starts inside or never gets that close.
pub fn first_point_contact(rel: Vec2, v: Vec2, radius: f64) -> Option<f64> {
    let c = rel.norm_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    quadratic_roots(v.norm_squared(), 2.0 * rel.dot(&v), c)
        .into_iter()
        .find(|t| *t >= 0.0)
}

/// First `t ≥ 0` at which the static point `q` comes within `tol` of the segment
/// `[a + t·va, b + t·vb]`.
///
/// Velocities are relative to `q`. The segment endpoints must move with parallel
/// velocities (rigid translation or one end fixed), which keeps the band
/// equation quadratic. Pairs that already lie within `tol` return `None`.
pub fn first_segment_contact(q: Vec2, a: Vec2, b: Vec2, va: Vec2, vb: Vec2, tol: f64) -> Option<f64> {
    if point_segment_distance(q, a, b) <= tol {
        return None;
    }
    let mut best: Option<f64> = None;
    let mut keep = |t: f64| {
        best = Some(best.map_or(t, |b: f64| b.min(t)));
    };
    // End caps.
    if va != Vec2::zeros() {
        if let Some(t) = first_point_contact(a - q, va, tol) {
            keep(t);
        }
    }
    if vb != Vec2::zeros() {
        if let Some(t) = first_point_contact(b - q, vb, tol) {
            keep(t);
        }
    }
    // Side band: cross(d(t), w(t))² = tol²·|d(t)|², d = b - a, w = q - a.
    let d0 = b - a;
    let dv = vb - va;
    let w0 = q - a;
    let c0 = cross(d0, w0);
    let c1 = cross(dv, w0) - cross(d0, va);
    let tol2 = tol * tol;
    let qa = c1 * c1 - tol2 * dv.norm_squared();
    let qb = 2.0 * c0 * c1 - 2.0 * tol2 * d0.dot(&dv);
    let qc = c0 * c0 - tol2 * d0.norm_squared();
    for t in quadratic_roots(qa, qb, qc) {
        if t < 0.0 {
            continue;
        }
        let d = d0 + dv * t;
        let len2 = d.norm_squared();
        if len2 == 0.0 {
            continue;
        }
        let s = (w0 - va * t).dot(&d) / len2;
        if (0.0..=1.0).contains(&s) {
            keep(t);
            break;
        }
    }
    best
}
