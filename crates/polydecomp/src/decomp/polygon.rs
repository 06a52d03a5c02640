//! Polygon queries: nesting depth, nested polygons, boundary vertices and an
//! interior sample point.

use super::types::HalfEdge;
use super::Decomposition;
use crate::arena::{PolygonId, WireId};
use crate::error::DecompError;
use crate::geometry::Vec2;

impl Decomposition {
    /// Wire hops from the outer wire of `poly` to the root. The outer polygon has
    /// depth 0, a polygon floating in it depth 2.
    pub fn depth(&self, poly: PolygonId) -> Result<usize, DecompError> {
        let mut w = self.check_polygon(poly)?.outer_wire;
        let mut depth = 0;
        while let Some(parent) = self.wires[w].parent {
            w = parent;
            depth += 1;
        }
        Ok(depth)
    }

    /// Hole wires of `poly`.
    pub fn holes(&self, poly: PolygonId) -> Result<Vec<WireId>, DecompError> {
        let outer = self.check_polygon(poly)?.outer_wire;
        Ok(self.wires[outer].childs.iter().copied().collect())
    }

    /// `poly` followed by every polygon nested inside its holes, depth first in
    /// ascending wire order.
    pub fn polygon_childs(&self, poly: PolygonId) -> Result<Vec<PolygonId>, DecompError> {
        self.check_polygon(poly)?;
        let mut out = Vec::new();
        let mut stack = vec![poly];
        while let Some(p) = stack.pop() {
            out.push(p);
            let outer = self.polygons[p].outer_wire;
            let mut nested: Vec<PolygonId> = self.wires[outer]
                .childs
                .iter()
                .flat_map(|hole| self.wires[*hole].childs.iter())
                .map(|face| self.wires[*face].polygon)
                .collect();
            nested.reverse();
            stack.extend(nested);
        }
        Ok(out)
    }

    /// Coordinates of the outer boundary of `poly` in traversal order
    /// (counterclockwise). Empty for the outer polygon.
    pub fn polygon_vertices(&self, poly: PolygonId) -> Result<Vec<Vec2>, DecompError> {
        let outer = self.check_polygon(poly)?.outer_wire;
        Ok(self
            .wire_half_edges(outer)?
            .into_iter()
            .map(|h| self.xy(self.start_point(h)))
            .collect())
    }

    /// A point strictly inside `poly`, off every boundary, if one can be found
    /// next to one of its outer half-edges.
    pub(crate) fn interior_point(&self, poly: PolygonId) -> Option<Vec2> {
        let outer = self.polygons[poly].outer_wire;
        let cycle: Vec<HalfEdge> = self.wires[outer].start.map(|s| self.cycle_from(s))?;
        let tol = self.tolerance();
        for h in &cycle {
            let a = self.xy(self.start_point(*h));
            let b = self.xy(self.end_point(*h));
            let d = b - a;
            let len = d.norm();
            if len <= tol {
                continue;
            }
            let normal = Vec2::new(-d.y, d.x) / len;
            for scale in [0.5, 0.1, 0.01] {
                let xy = a + d * 0.5 + normal * (tol * scale).min(len * 0.25);
                if self.find_polygon(xy) == poly {
                    return Some(xy);
                }
            }
        }
        None
    }
}
