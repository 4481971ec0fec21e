//! Brush faces: one bounding plane plus its computed winding.
//!
//! A face stores two copies of its plane equation: the *working* plane that
//! windings are built from, and the *saved* plane holding the pre-transform
//! state while a move or rotation is pending. Freezing a transform copies
//! working over saved; reverting copies saved over working.
//!
//! The shader name, texture projection, and detail flag ride along untouched
//! for the editor and map writer; the kernel never interprets them.

use glam::{DMat3, DMat4, DVec3};

use crate::plane::Plane;
use crate::winding::{FaceIdx, Winding};

/// Texture-space projection for a face, opaque to the kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureProjection(pub DMat3);

impl Default for TextureProjection {
    fn default() -> Self {
        Self(DMat3::IDENTITY)
    }
}

/// One bounding plane of a brush and everything that hangs off it.
#[derive(Clone, Debug)]
pub struct Face {
    plane: Plane,
    saved_plane: Plane,
    shader: String,
    projection: TextureProjection,
    detail: bool,
    winding: Winding,
}

impl Face {
    /// Face from a plane equation with an empty winding.
    #[must_use]
    pub fn new(plane: Plane, shader: impl Into<String>) -> Self {
        Self {
            plane,
            saved_plane: plane,
            shader: shader.into(),
            projection: TextureProjection::default(),
            detail: false,
            winding: Winding::new(),
        }
    }

    /// Face through three points wound counter-clockwise viewed from the
    /// exterior. `None` if the points are collinear.
    #[must_use]
    pub fn from_points(p0: DVec3, p1: DVec3, p2: DVec3, shader: impl Into<String>) -> Option<Self> {
        Plane::from_points(p0, p1, p2).map(|plane| Self::new(plane, shader))
    }

    #[inline]
    #[must_use]
    pub const fn plane(&self) -> &Plane {
        &self.plane
    }

    #[inline]
    #[must_use]
    pub const fn saved_plane(&self) -> &Plane {
        &self.saved_plane
    }

    #[inline]
    #[must_use]
    pub const fn winding(&self) -> &Winding {
        &self.winding
    }

    #[inline]
    #[must_use]
    pub fn shader(&self) -> &str {
        &self.shader
    }

    #[inline]
    #[must_use]
    pub const fn projection(&self) -> &TextureProjection {
        &self.projection
    }

    #[inline]
    #[must_use]
    pub const fn detail(&self) -> bool {
        self.detail
    }

    /// True iff the face is part of the solid's boundary: its winding kept
    /// at least 3 vertices after clipping.
    #[inline]
    #[must_use]
    pub fn contributes(&self) -> bool {
        self.winding.len() >= 3
    }

    /// Shader changes never move geometry, so they are safe without a
    /// rebuild.
    pub fn set_shader(&mut self, shader: impl Into<String>) {
        self.shader = shader.into();
    }

    pub fn set_projection(&mut self, projection: TextureProjection) {
        self.projection = projection;
    }

    pub const fn set_detail(&mut self, detail: bool) {
        self.detail = detail;
    }

    pub(crate) const fn set_plane(&mut self, plane: Plane) {
        self.plane = plane;
        self.saved_plane = plane;
    }

    /// Recompute the working plane as the saved plane under `matrix`.
    ///
    /// Always starts from the saved state, so re-applying the same pending
    /// transform across repeated evaluations cannot compound.
    pub(crate) fn apply_transform(&mut self, matrix: &DMat4) {
        self.plane = self.saved_plane.transformed_rigid(matrix);
    }

    /// Bake the working plane as the new saved state.
    pub(crate) const fn freeze_plane(&mut self) {
        self.saved_plane = self.plane;
    }

    /// Throw away the working plane and restore the saved state.
    pub(crate) const fn revert_plane(&mut self) {
        self.plane = self.saved_plane;
    }

    pub(crate) const fn winding_mut(&mut self) -> &mut Winding {
        &mut self.winding
    }

    pub(crate) fn clear_winding(&mut self) {
        self.winding.clear();
    }

    pub(crate) fn set_winding(&mut self, winding: Winding) {
        self.winding = winding;
    }

    /// Build this face's boundary polygon by clipping an oversized seed
    /// square against every sibling plane.
    ///
    /// `winners` marks faces whose planes are valid and survived the
    /// duplicate-plane tie-break; losers neither receive windings nor clip
    /// anyone else. Coincident and exactly opposing sibling planes are
    /// skipped (the former are settled by the tie-break, the latter leave
    /// the winding unchanged by construction). Clipping always uses the
    /// flipped sibling plane: the kept side is the brush interior.
    #[must_use]
    pub(crate) fn build_winding(
        &self,
        self_idx: FaceIdx,
        faces: &[Self],
        winners: &[bool],
        world_extent: f64,
    ) -> Winding {
        let mut winding = Winding::infinite(&self.plane, world_extent + 1.0);

        for (j, sibling) in faces.iter().enumerate() {
            if j == self_idx.0 || !winners[j] {
                continue;
            }

            let sibling_plane = sibling.plane();
            if self.plane.approx_eq(sibling_plane) || self.plane.is_opposing(sibling_plane) {
                continue;
            }

            winding = winding.clip(&sibling_plane.flipped(), FaceIdx(j));
            if winding.is_empty() {
                break;
            }
        }

        winding
    }

    /// Re-derive the plane from three well-spread winding vertices snapped
    /// to a grid of spacing `snap`.
    ///
    /// Returns `None` when the face has no winding or the snapped points
    /// collapse into a line; callers keep the old plane in that case.
    #[must_use]
    pub(crate) fn snapped_plane(&self, snap: f64) -> Option<Plane> {
        if !self.contributes() {
            return None;
        }

        let len = self.winding.len();
        let pick = |i: usize| snap_point(self.winding.vertices[i].position, snap);

        Plane::from_points(pick(0), pick(len / 3), pick(2 * len / 3))
    }
}

/// Snap each coordinate to the nearest multiple of `snap`.
#[inline]
fn snap_point(p: DVec3, snap: f64) -> DVec3 {
    (p / snap).round() * snap
}
