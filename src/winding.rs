//! Windings: the cyclic convex polygons bounding brush faces.
//!
//! A winding starts life as an oversized square lying on its face's plane
//! ([`Winding::infinite`]) and is cut down by every sibling plane of the
//! brush ([`Winding::clip`]). Each vertex records which neighboring face
//! shares the edge *starting* at that vertex, so the finished set of
//! windings doubles as the brush's adjacency graph.
//!
//! ## Open edges
//!
//! Seed-square vertices carry `adjacent = None`. If any `None` survives the
//! full clip pass, that edge was never cut by a sibling and the region is
//! open to infinity; the brush is unbounded and therefore degenerate.

use glam::DVec3;
use itertools::Itertools;

use crate::plane::{ON_EPSILON, Plane, PlaneSide};

/// Index of a face within its owning brush.
///
/// Faces live in a contiguous array owned by the brush; adjacency is encoded
/// as indices into that array, never as references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceIdx(pub usize);

/// One corner of a winding plus the neighbor across the edge it starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindingVertex {
    /// Corner position.
    pub position: DVec3,

    /// Face sharing the edge from this vertex to the next, or `None` for a
    /// seed-square edge no sibling plane has cut yet.
    pub adjacent: Option<FaceIdx>,
}

impl WindingVertex {
    /// Vertex bordering a known sibling face.
    #[inline]
    #[must_use]
    pub const fn new(position: DVec3, adjacent: FaceIdx) -> Self {
        Self {
            position,
            adjacent: Some(adjacent),
        }
    }

    /// Seed-square vertex with no neighbor yet.
    #[inline]
    #[must_use]
    pub const fn open(position: DVec3) -> Self {
        Self {
            position,
            adjacent: None,
        }
    }
}

/// An ordered, cyclic sequence of vertices forming one convex polygon.
///
/// Vertex `i` starts the edge `(i, i+1 mod len)`. A winding with fewer than
/// 3 vertices is empty for rendering purposes; see [`Winding::clip`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Winding {
    pub vertices: Vec<WindingVertex>,
}

impl Winding {
    /// The empty winding.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_vertices(vertices: Vec<WindingVertex>) -> Self {
        Self { vertices }
    }

    /// A conservative square on `plane`, `radius` units out from the plane's
    /// closest point to the origin.
    ///
    /// `radius` must exceed the maximum world coordinate so that every real
    /// brush edge is produced by clipping, never by the seed itself. Wound
    /// counter-clockwise viewed from the front of the plane; all four
    /// adjacency slots start open.
    #[must_use]
    pub fn infinite(plane: &Plane, radius: f64) -> Self {
        let (u, v) = plane_basis(plane.normal);
        let center = plane.reference_point();

        let corners = [
            center - u * radius - v * radius,
            center + u * radius - v * radius,
            center + u * radius + v * radius,
            center - u * radius + v * radius,
        ];

        Self {
            vertices: corners.map(WindingVertex::open).to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Cyclic successor of vertex slot `i`.
    #[inline]
    #[must_use]
    pub fn next_index(&self, i: usize) -> usize {
        if i + 1 == self.vertices.len() { 0 } else { i + 1 }
    }

    /// Cyclic predecessor of vertex slot `i` (debug-asserts a non-empty
    /// winding; an empty one has no slot to wrap to).
    #[inline]
    #[must_use]
    pub fn prev_index(&self, i: usize) -> usize {
        debug_assert!(!self.vertices.is_empty());
        if i == 0 { self.vertices.len() - 1 } else { i - 1 }
    }

    /// Slot of the vertex whose edge borders `face`, if any.
    #[must_use]
    pub fn find_adjacent(&self, face: FaceIdx) -> Option<usize> {
        self.vertices.iter().position(|v| v.adjacent == Some(face))
    }

    /// Iterate the winding's edges as cyclic vertex pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&WindingVertex, &WindingVertex)> {
        self.vertices.iter().circular_tuple_windows()
    }

    /// True if any edge still carries the seed-square sentinel.
    #[must_use]
    pub fn has_open_edge(&self) -> bool {
        self.vertices.iter().any(|v| v.adjacent.is_none())
    }

    /// Arithmetic mean of the vertex positions.
    ///
    /// Good enough as a face handle for selection hit-testing; windings are
    /// convex so the mean always lies inside.
    #[must_use]
    pub fn centroid(&self) -> DVec3 {
        debug_assert!(!self.vertices.is_empty());
        let sum: DVec3 = self.vertices.iter().map(|v| v.position).sum();
        #[expect(clippy::cast_precision_loss)]
        let count = self.vertices.len() as f64;
        sum / count
    }

    /// Cut the winding by `plane`, keeping the front side.
    ///
    /// Vertices on the back are dropped; an interpolated vertex is inserted
    /// at every front/back edge crossing. A crossing that *exits* through
    /// the plane starts an edge running along it, so that vertex records
    /// `adjacent` (the clipping face); a crossing that *re-enters* continues
    /// the original edge and keeps its adjacency. Windings entirely in
    /// front (or on) come back unchanged; entirely behind, or reduced below
    /// 3 vertices, come back empty.
    #[must_use]
    pub fn clip(&self, plane: &Plane, adjacent: FaceIdx) -> Self {
        let sides: Vec<PlaneSide> = self
            .vertices
            .iter()
            .map(|v| plane.classify(v.position, ON_EPSILON))
            .collect();

        let front = sides.iter().filter(|&&s| s == PlaneSide::Front).count();
        let back = sides.iter().filter(|&&s| s == PlaneSide::Back).count();

        if back == 0 {
            return self.clone();
        }
        if front == 0 {
            return Self::new();
        }

        let mut clipped = Vec::with_capacity(self.vertices.len() + 2);

        for (i, vertex) in self.vertices.iter().enumerate() {
            let side = sides[i];
            let next = self.next_index(i);
            let next_side = sides[next];

            if side != PlaneSide::Back {
                clipped.push(*vertex);
                if side == PlaneSide::On {
                    continue;
                }
            }

            if (side == PlaneSide::Front && next_side == PlaneSide::Back)
                || (side == PlaneSide::Back && next_side == PlaneSide::Front)
            {
                let a = vertex.position;
                let b = self.vertices[next].position;
                let da = plane.signed_distance(a);
                let db = plane.signed_distance(b);
                let mid = a + (b - a) * (da / (da - db));

                // Exiting edges run along the clip plane from here on;
                // re-entering edges resume the original neighbor.
                let crossing_adjacent = if side == PlaneSide::Front {
                    Some(adjacent)
                } else {
                    vertex.adjacent
                };

                clipped.push(WindingVertex {
                    position: mid,
                    adjacent: crossing_adjacent,
                });
            }
        }

        if clipped.len() < 3 {
            return Self::new();
        }

        Self { vertices: clipped }
    }
}

/// Orthonormal basis `(u, v)` spanning the plane with normal `n`, chosen so
/// `u × v = n`.
fn plane_basis(normal: DVec3) -> (DVec3, DVec3) {
    let arbitrary = if normal.x.abs() < 0.9 {
        DVec3::X
    } else {
        DVec3::Y
    };

    let u = normal.cross(arbitrary).normalize();
    let v = normal.cross(u).normalize();

    (u, v)
}
