//! Boolean overlay of two decompositions and the correspondence maps back to
//! both inputs.

use std::collections::BTreeMap;

use super::types::{IN_VTX, OUT_VTX};
use super::Decomposition;
use crate::arena::{PointId, PolygonId, SegmentId};
use crate::error::DecompError;
use crate::geometry::point_segment_distance;

/// For every entity of an overlay result, the entity of one input it came from.
///
/// Keyed by result id; `None` where the input has no counterpart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityMaps {
    pub points: BTreeMap<PointId, Option<PointId>>,
    pub segments: BTreeMap<SegmentId, Option<SegmentId>>,
    pub polygons: BTreeMap<PolygonId, Option<PolygonId>>,
}

fn images<K: Copy + Ord, V: Copy + PartialEq>(map: &BTreeMap<K, Option<V>>, orig: V) -> Vec<K> {
    map.iter()
        .filter(|(_, v)| **v == Some(orig))
        .map(|(k, _)| *k)
        .collect()
}

impl EntityMaps {
    /// Result points that came from input point `orig`.
    pub fn images_of_point(&self, orig: PointId) -> Vec<PointId> {
        images(&self.points, orig)
    }

    /// Result segments lying on input segment `orig`.
    pub fn images_of_segment(&self, orig: SegmentId) -> Vec<SegmentId> {
        images(&self.segments, orig)
    }

    /// Result polygons covering parts of input polygon `orig`.
    pub fn images_of_polygon(&self, orig: PolygonId) -> Vec<PolygonId> {
        images(&self.polygons, orig)
    }
}

#[derive(Clone, Debug)]
pub struct Overlay {
    pub decomp: Decomposition,
    /// Result → `self` of the `intersection` call.
    pub maps_a: EntityMaps,
    /// Result → `other` of the `intersection` call.
    pub maps_b: EntityMaps,
}

impl Decomposition {
    /// Overlay `other` onto a copy of `self`.
    ///
    /// Every segment of `other` is inserted as a line and every free point as a
    /// point, so the result refines both inputs. `self` is untouched;
    /// the result uses the tolerance of `self`. On error the copy is
    /// dropped.
    pub fn intersection(&self, other: &Decomposition) -> Result<Overlay, DecompError> {
        let mut decomp = self.clone();
        for seg in other.segments.values() {
            decomp.insert_line(other.xy(seg.vtxs[OUT_VTX]), other.xy(seg.vtxs[IN_VTX]))?;
        }
        for pt in other.points.values().filter(|p| p.is_free()) {
            decomp.add_point(pt.xy)?;
        }
        let maps_a = decomp.correspondence(self);
        let maps_b = decomp.correspondence(other);
        tracing::debug!(
            points = decomp.points.len(),
            segments = decomp.segments.len(),
            polygons = decomp.polygons.len(),
            "overlay built"
        );
        Ok(Overlay {
            decomp,
            maps_a,
            maps_b,
        })
    }

    /// Map every entity of `self` to the entity of `orig` it lies on.
    fn correspondence(&self, orig: &Decomposition) -> EntityMaps {
        let tol = self.tolerance();
        let points = self
            .points
            .iter()
            .map(|(id, p)| {
                let hit = orig
                    .points
                    .iter()
                    .map(|(oid, op)| (oid, (op.xy - p.xy).norm()))
                    .filter(|(_, d)| *d <= tol)
                    .min_by(|x, y| x.1.partial_cmp(&y.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(oid, _)| oid);
                (id, hit)
            })
            .collect();

        let segments = self
            .segments
            .iter()
            .map(|(id, s)| {
                let (a, b) = (self.xy(s.vtxs[OUT_VTX]), self.xy(s.vtxs[IN_VTX]));
                let hit = orig.segments.iter().find_map(|(oid, os)| {
                    let (oa, ob) = (orig.xy(os.vtxs[OUT_VTX]), orig.xy(os.vtxs[IN_VTX]));
                    let on = point_segment_distance(a, oa, ob) <= tol && point_segment_distance(b, oa, ob) <= tol;
                    on.then_some(oid)
                });
                (id, hit)
            })
            .collect();

        let polygons = self
            .polygons
            .keys()
            .map(|id| {
                let hit = if id == self.outer_polygon {
                    Some(orig.outer_polygon)
                } else {
                    self.interior_point(id).map(|xy| orig.find_polygon(xy))
                };
                (id, hit)
            })
            .collect();

        EntityMaps {
            points,
            segments,
            polygons,
        }
    }
}
