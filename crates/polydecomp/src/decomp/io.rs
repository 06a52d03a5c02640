//! Node-set exchange format.
//!
//! Points are coordinate pairs, segments pairs of point indices, polygons lists
//! of signed segment indices. A segment traversed out → in (its left side) is
//! written as `i`, traversed in → out as `!i`, i.e. `-i - 1`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::{DecompCfg, HalfEdge, Side};
use super::Decomposition;
use crate::arena::{PointId, PolygonId, SegmentId, WireId};
use crate::error::DecompError;
use crate::geometry::Vec2;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonDesc {
    /// Outer boundary, counterclockwise; empty for the unbounded polygon.
    pub outer: Vec<i64>,
    #[serde(default)]
    pub holes: Vec<Vec<i64>>,
    #[serde(default)]
    pub free_points: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSet {
    pub points: Vec<[f64; 2]>,
    pub segments: Vec<[usize; 2]>,
    #[serde(default)]
    pub polygons: Vec<PolygonDesc>,
}

fn encode(index: usize, side: Side) -> i64 {
    match side {
        Side::Left => index as i64,
        Side::Right => !(index as i64),
    }
}

/// Does wire `w` consist of exactly the half-edges in `described`?
fn same_cycle(d: &Decomposition, w: WireId, mut described: Vec<HalfEdge>) -> Result<bool, DecompError> {
    let mut derived = d.wire_half_edges(w)?;
    described.sort();
    derived.sort();
    Ok(described == derived)
}

fn decode(signed: i64) -> (usize, Side) {
    if signed >= 0 {
        (signed as usize, Side::Left)
    } else {
        ((!signed) as usize, Side::Right)
    }
}

impl Decomposition {
    /// Dump points, segments and polygons with the dense indices of `make_indices`.
    /// The outer polygon comes first.
    pub fn export(&self) -> NodeSet {
        let idx = self.make_indices();
        let points = self.points.values().map(|p| [p.xy.x, p.xy.y]).collect();
        let segments = self
            .segments
            .values()
            .map(|s| [idx.points[&s.vtxs[0]], idx.points[&s.vtxs[1]]])
            .collect();
        let signed_cycle = |w: WireId| -> Vec<i64> {
            self.wires[w]
                .start
                .map(|start| self.cycle_from(start))
                .unwrap_or_default()
                .into_iter()
                .map(|h| encode(idx.segments[&h.seg], h.side))
                .collect()
        };
        let polygons = self
            .polygons
            .values()
            .map(|p| PolygonDesc {
                outer: signed_cycle(p.outer_wire),
                holes: self.wires[p.outer_wire].childs.iter().map(|h| signed_cycle(*h)).collect(),
                free_points: p.free_points.iter().map(|fp| idx.points[fp]).collect(),
            })
            .collect();
        NodeSet {
            points,
            segments,
            polygons,
        }
    }

    /// Rebuild a decomposition from a node set.
    ///
    /// Topology is derived from the segments; the polygon descriptions are then
    /// matched against the derived polygons. Returns the polygon id for every
    /// description, in order.
    pub fn import(nodes: &NodeSet, cfg: DecompCfg) -> Result<(Decomposition, Vec<PolygonId>), DecompError> {
        let mut d = Decomposition::with_cfg(cfg);
        let outer = d.outer_polygon();
        let mut pts: Vec<PointId> = Vec::with_capacity(nodes.points.len());
        for xy in &nodes.points {
            pts.push(d.add_free_point(Vec2::new(xy[0], xy[1]), outer)?);
        }
        let point_at = |i: usize| {
            pts.get(i)
                .copied()
                .ok_or_else(|| DecompError::degenerate(format!("point index {i} out of range")))
        };
        let mut segs: Vec<SegmentId> = Vec::with_capacity(nodes.segments.len());
        for [a, b] in &nodes.segments {
            let s = d.new_segment(point_at(*a)?, point_at(*b)?)?.value;
            // Keep the stored orientation even when the segment already existed.
            if d.segments[s].vtxs[0] != point_at(*a)? {
                d.flip_segment(s);
            }
            segs.push(s);
        }

        let half_edges = |signed: &[i64]| -> Result<Vec<HalfEdge>, DecompError> {
            signed
                .iter()
                .map(|code| {
                    let (si, side) = decode(*code);
                    segs.get(si).map(|s| HalfEdge::new(*s, side)).ok_or_else(|| {
                        DecompError::degenerate(format!("segment index {si} out of range"))
                    })
                })
                .collect()
        };

        let mut ids = Vec::with_capacity(nodes.polygons.len());
        for (i, desc) in nodes.polygons.iter().enumerate() {
            let mismatch = |what: &str| {
                DecompError::inconsistent(format!("polygon description {i}: {what} does not match"))
            };
            let described = half_edges(&desc.outer)?;
            let poly = match described.first() {
                None => outer,
                Some(first) => {
                    let w = d.wire_of(*first);
                    let poly = d.wires[w].polygon;
                    if d.polygons[poly].outer_wire != w || !same_cycle(&d, w, described.clone())? {
                        return Err(mismatch("outer boundary"));
                    }
                    poly
                }
            };

            let holes = d.holes(poly)?;
            if holes.len() != desc.holes.len() {
                return Err(mismatch("hole count"));
            }
            let mut matched = BTreeSet::new();
            for hole in &desc.holes {
                let described = half_edges(hole)?;
                let w = described.first().map(|h| d.wire_of(*h)).ok_or_else(|| mismatch("empty hole"))?;
                if !holes.contains(&w) || !matched.insert(w) || !same_cycle(&d, w, described)? {
                    return Err(mismatch("hole"));
                }
            }

            let mut free = desc
                .free_points
                .iter()
                .map(|fp| point_at(*fp))
                .collect::<Result<Vec<PointId>, _>>()?;
            free.sort();
            if !free.iter().eq(d.polygons[poly].free_points.iter()) {
                return Err(mismatch("free point set"));
            }
            ids.push(poly);
        }
        tracing::debug!(
            points = pts.len(),
            segments = segs.len(),
            polygons = d.polygons.len(),
            "node set imported"
        );
        Ok((d, ids))
    }
}
