//! # `brush_brep`
//!
//! Boundary representation for **brushes**: convex solids defined as the
//! intersection of half-space planes, the building blocks of classic
//! brush-based level editors.
//!
//! ## What is this?
//!
//! A brush stores nothing but an ordered list of face planes; everything
//! else is derived. This crate rebuilds the derived state on demand:
//! per-face boundary polygons (*windings*) via plane clipping, a repaired
//! face-adjacency graph, and deduplicated vertex/edge/centroid caches ready
//! for selection picking and wireframe rendering. Degenerate input (an
//! unbounded solid, too few contributing faces) is never an error: the
//! brush simply renders and selects as empty while staying editable.
//!
//! ## Quick Start
//!
//! ```rust
//! use brush_brep::{Brush, Plane};
//! use glam::DVec3;
//!
//! // A unit cube from its six bounding planes
//! let mut brush = Brush::cuboid(DVec3::ZERO, DVec3::ONE, "common/caulk")?;
//!
//! assert_eq!(brush.contributing_face_count(), 6);
//! assert_eq!(brush.unique_vertex_points().len(), 8);
//! assert_eq!(brush.edge_indices().len(), 12);
//! assert!(brush.is_bounded());
//!
//! // Slice the solid in half; the old +X face stops contributing
//! brush.chop_with_plane(Plane::new(DVec3::X, 0.5), "common/cut")?;
//!
//! assert_eq!(brush.contributing_face_count(), 6);
//! assert!((brush.local_aabb().maxs.x - 0.5).abs() < 1e-9);
//! # Ok::<(), brush_brep::BrushError>(())
//! ```
//!
//! ## Key Features
//!
//! - **Winding construction**: each face clips an oversized seed square
//!   against every sibling plane, recording which neighbor produced each
//!   edge
//! - **Graph repair**: four cleanup passes collapse micro-edges, relink
//!   two-vertex faces, and drop unreciprocated adjacency claims
//! - **Merged caches**: unique vertices, edge midpoints, `u32` wireframe
//!   index pairs, and per-face centroids, deterministic across rebuilds
//! - **Lazy evaluation**: mutations only mark the brush dirty; any reader
//!   triggers exactly one rebuild
//! - **Pending transforms**: drag previews compose into one rigid matrix,
//!   applied from the saved planes each frame until frozen or reverted
//!
//! ## When to Use
//!
//! - Brush-based level editors and their selection/wireframe layers
//! - Map compilers that need bounded face polygons from plane soups
//! - CSG carve pipelines built on plane-defined convex cells
//!
//! ## When NOT to Use
//!
//! - Non-convex solids (split them into multiple brushes first)
//! - Exact arithmetic (everything here is `f64` with epsilon tolerance)
//! - General polygon meshes that are not defined by bounding planes
//!
//! ## Algorithm
//!
//! Rebuilds follow the classic editor pipeline: seed an oversized square on
//! each plane, clip it by every sibling half-space, repair the adjacency
//! graph the clipping recorded, then walk vertex and edge orbits to collapse
//! per-face incidences into unique caches. The Euler relation
//! `V + F - E == 2` cross-checks every rebuild; a mismatch is logged and
//! counted, never fatal.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod brush;
mod connectivity;
mod face;
mod plane;
mod proximity;
mod selection;
mod winding;

pub use brush::{Aabb, Brush, BrushError, DEFAULT_WORLD_EXTENT, MAX_BRUSH_FACES};
pub use connectivity::{DEGENERATE_EDGE_EPSILON, GraphDefect};
pub use face::{Face, TextureProjection};
pub use plane::{ON_EPSILON, PLANE_DIST_EPSILON, PLANE_NORMAL_EPSILON, Plane, PlaneSide};
pub use proximity::{EdgeFaces, EdgeIndices, FaceVertexId, MergedGeometry};
pub use selection::{BrushEvent, SelectableEdge, SelectableVertex, SelectionMirror};
pub use winding::{FaceIdx, Winding, WindingVertex};

/// Re-export glam types for convenience
pub mod math {
    pub use glam::{DMat3, DMat4, DVec3};
}
