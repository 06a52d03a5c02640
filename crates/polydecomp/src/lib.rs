//! Planar subdivision engine.
//!
//! A `Decomposition` partitions the plane into points, straight segments,
//! boundary loops (wires) and polygons, and keeps that partition consistent
//! under incremental edits: adding and deleting points and lines, dragging
//! points, and overlaying two decompositions.
//!
//! API Policy
//! - Every mutating call returns an `Edit` carrying the polygon changes it
//!   caused; there is no hidden "last change" state to poll.
//! - Handles (`PointId`, …) stay valid until their entity is deleted and are
//!   never reused.
//! - Errors are `DecompError`; failed edits leave the decomposition unchanged.

pub mod arena;
pub mod decomp;
pub mod error;
pub mod geometry;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use arena::{PointId, PolygonId, SegmentId, WireId};
pub use decomp::{DecompCfg, Decomposition, Edit, PolygonChange, Snap};
pub use error::DecompError;
pub use geometry::Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::arena::{IdMap, PointId, PolygonId, SegmentId, WireId};
    pub use crate::decomp::{
        DecompCfg, Decomposition, Edit, EntityMaps, HalfEdge, Indices, NodeSet, Overlay,
        PolygonChange, PolygonDesc, Side, Snap,
    };
    pub use crate::error::DecompError;
    pub use crate::geometry::Vec2;
}
