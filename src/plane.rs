//! Brush plane primitives.
//!
//! A plane is stored as a unit normal plus the signed distance from the
//! origin: the plane is `{ x : n·x = d }` and the brush interior relative to
//! the plane is `{ x : n·x ≤ d }` (normals point out of the solid). All
//! comparisons are epsilon-tolerant; the kernel never does exact arithmetic.

use glam::{DMat4, DVec3};

/// Distance tolerance for point-vs-plane classification, in world units.
///
/// Vertices within this band of a plane count as lying on it during winding
/// clipping and coplanarity checks.
pub const ON_EPSILON: f64 = 1e-6;

/// Component tolerance when comparing two plane normals for equality.
pub const PLANE_NORMAL_EPSILON: f64 = 1e-5;

/// Distance tolerance when comparing two plane offsets for equality.
pub const PLANE_DIST_EPSILON: f64 = 1e-4;

/// Which side of a plane a point falls on.
///
/// `Front` is the positive half (along the normal), `Back` the negative
/// half. Winding clipping keeps `Front` and `On` vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneSide {
    /// Positive side: `n·x > d + ε`.
    Front,

    /// On the plane within tolerance: `|n·x - d| ≤ ε`.
    On,

    /// Negative side: `n·x < d - ε`.
    Back,
}

/// An oriented plane: `n · x = d` with unit normal `n`.
///
/// The normal points away from the solid a brush face bounds, so the face's
/// interior half-space is `n·x ≤ d`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: DVec3,
    /// Signed distance from the origin to the plane along the normal.
    pub dist: f64,
}

impl Plane {
    /// Create a plane, normalizing the input normal vector.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    #[must_use]
    pub fn new(normal: DVec3, dist: f64) -> Self {
        let len = normal.length();
        assert!(len > ON_EPSILON, "Normal vector must be non-zero");
        Self {
            normal: normal / len,
            dist: dist / len,
        }
    }

    /// Create from an already-normalized normal (debug-asserts unit length).
    #[must_use]
    pub fn new_normalized(normal: DVec3, dist: f64) -> Self {
        debug_assert!((normal.length() - 1.0).abs() < ON_EPSILON * 100.0);
        Self { normal, dist }
    }

    /// Try to create, returning `None` if the normal is (near) zero.
    #[must_use]
    pub fn try_new(normal: DVec3, dist: f64) -> Option<Self> {
        let len = normal.length();
        (len >= ON_EPSILON).then(|| Self {
            normal: normal / len,
            dist: dist / len,
        })
    }

    /// Plane through three points wound counter-clockwise when viewed from
    /// the front (exterior) side.
    ///
    /// Returns `None` if the points are collinear within tolerance.
    #[must_use]
    pub fn from_points(p0: DVec3, p1: DVec3, p2: DVec3) -> Option<Self> {
        let normal = (p1 - p0).cross(p2 - p0);
        let len = normal.length();
        if len < ON_EPSILON {
            return None;
        }
        let normal = normal / len;
        Some(Self {
            normal,
            dist: normal.dot(p0),
        })
    }

    /// Signed distance: positive = front, zero = on plane, negative = back.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.dist
    }

    /// Classify a point as `Front`, `On`, or `Back` of the plane.
    #[must_use]
    pub fn classify(&self, point: DVec3, epsilon: f64) -> PlaneSide {
        let d = self.signed_distance(point);
        if d > epsilon {
            PlaneSide::Front
        } else if d < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    /// The same plane with its orientation reversed.
    ///
    /// Clipping a winding against a sibling face always uses the flipped
    /// sibling plane, since the kept region is the brush interior relative
    /// to that sibling.
    #[inline]
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            dist: -self.dist,
        }
    }

    /// The point on the plane closest to the origin.
    #[inline]
    #[must_use]
    pub fn reference_point(&self) -> DVec3 {
        self.normal * self.dist
    }

    /// Apply a rigid transform (rotation + translation) to the plane.
    ///
    /// The normal is rotated by the upper 3×3 block and the distance is
    /// recovered from a transformed reference point. Not valid for matrices
    /// with scale or shear.
    #[must_use]
    pub fn transformed_rigid(&self, matrix: &DMat4) -> Self {
        let normal = matrix.transform_vector3(self.normal);
        let point = matrix.transform_point3(self.reference_point());
        Self {
            normal,
            dist: normal.dot(point),
        }
    }

    /// Whether the stored equation still describes a usable plane.
    ///
    /// Verbatim-imported face lists can carry zero or denormalized normals;
    /// such faces are skipped during winding construction rather than
    /// rejected at load time.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.normal.is_finite()
            && self.dist.is_finite()
            && (self.normal.length_squared() - 1.0).abs() < 1e-3
    }

    /// Epsilon equality: normals match componentwise and distances match.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.normal.abs_diff_eq(other.normal, PLANE_NORMAL_EPSILON)
            && (self.dist - other.dist).abs() < PLANE_DIST_EPSILON
    }

    /// Whether `other` is `self` flipped: coincident boundary, opposite
    /// orientation.
    #[must_use]
    pub fn is_opposing(&self, other: &Self) -> bool {
        self.approx_eq(&other.flipped())
    }
}
