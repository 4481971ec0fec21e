//! # Brush: a convex solid as an intersection of half-spaces
//!
//! A brush owns an ordered list of [`Face`]s and derives everything else
//! from their planes: per-face boundary polygons (windings), the local
//! bounding box, and the deduplicated vertex/edge/centroid caches that
//! selection and wireframe rendering consume.
//!
//! ## Build pipeline
//!
//! Derived state is rebuilt wholesale by [`Brush::evaluate_brep`] whenever
//! a reader finds the brush dirty:
//!
//! 1. **Windings** - each face clips an oversized seed square against every
//!    sibling plane, folding vertices into the running bounding box.
//!    Invalid planes and duplicate-plane losers get empty windings and clip
//!    nobody.
//! 2. **Boundedness** - any surviving seed-square edge, or no usable
//!    plane at all, means the solid is open to infinity.
//! 3. **Connectivity repair** - the four passes in [`crate::connectivity`].
//! 4. **Degeneracy gate** - unbounded, fewer than 4 contributing faces, or
//!    an odd winding-vertex total clears every derived cache; the brush
//!    stays editable but renders and selects as empty.
//! 5. **Proximity merge** - unique vertex/edge caches, wireframe indices,
//!    per-face centroids, and the Euler cross-check `V + F - E == 2`
//!    (failure is logged and counted, never fatal).
//!
//! ## Dirty states
//!
//! | State              | Meaning                                  |
//! |--------------------|------------------------------------------|
//! | `Clean`            | Derived caches match the face planes     |
//! | `PlanesDirty`      | A plane was added, removed, or edited    |
//! | `TransformPending` | A rigid transform awaits freeze/revert   |
//!
//! A pending transform is always total: working planes are recomputed from
//! the saved planes each evaluation, so repeated evaluation never
//! double-applies a drag in progress.
//!
//! Callers must not hold winding-vertex indices, redirect slots, or cache
//! positions across any mutation: every rebuild reassigns them.

use std::cmp::Ordering;

use glam::{DMat4, DVec3};

use crate::connectivity::{self, GraphDefect};
use crate::face::{Face, TextureProjection};
use crate::plane::Plane;
use crate::proximity::{self, EdgeFaces, EdgeIndices, MergedGeometry};
use crate::selection::BrushEvent;
use crate::winding::{FaceIdx, Winding};

/// Hard cap on faces per brush. Adds past this fail with
/// [`BrushError::TooManyFaces`] and leave the brush unmodified.
pub const MAX_BRUSH_FACES: usize = 1024;

/// Default half-extent of the editable world, in world units.
///
/// Seed squares are built one unit larger, so every coordinate a bounded
/// brush can reach is strictly inside the seed.
pub const DEFAULT_WORLD_EXTENT: f64 = 65536.0;

/// Errors from brush mutation operations.
///
/// Geometry failures discovered during evaluation (unbounded solids,
/// degenerate windings) are not errors: the brush drops into an empty,
/// still-editable state instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushError {
    /// The brush already has [`MAX_BRUSH_FACES`] faces.
    TooManyFaces,

    /// Three construction points are collinear, or a normal is zero.
    DegeneratePlane,

    /// The face index does not name a face of this brush.
    NoSuchFace { face: FaceIdx },
}

impl std::fmt::Display for BrushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyFaces => {
                write!(f, "Brush already has the maximum of {MAX_BRUSH_FACES} faces")
            }
            Self::DegeneratePlane => {
                write!(f, "Points are collinear and define no plane")
            }
            Self::NoSuchFace { face } => {
                write!(f, "No face {face:?} in this brush")
            }
        }
    }
}

impl std::error::Error for BrushError {}

/// Axis-aligned bounding box over a brush's winding vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub mins: DVec3,
    pub maxs: DVec3,
}

impl Aabb {
    /// The empty box: folds as the identity, reports invalid.
    pub const EMPTY: Self = Self {
        mins: DVec3::INFINITY,
        maxs: DVec3::NEG_INFINITY,
    };

    /// Grow to include `point`.
    pub fn fold(&mut self, point: DVec3) {
        self.mins = self.mins.min(point);
        self.maxs = self.maxs.max(point);
    }

    /// False until at least one point has been folded in.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.mins.x <= self.maxs.x && self.mins.y <= self.maxs.y && self.mins.z <= self.maxs.z
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.mins + self.maxs) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.maxs - self.mins
    }
}

/// Where the brush sits between mutation and evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BrushState {
    Clean,
    PlanesDirty,
    TransformPending,
}

/// A convex solid defined by the intersection of its face half-spaces.
#[derive(Clone, Debug)]
pub struct Brush {
    faces: Vec<Face>,
    world_extent: f64,
    state: BrushState,
    pending_transform: DMat4,
    events: Vec<BrushEvent>,

    // Derived caches, valid only in the Clean state
    aabb: Aabb,
    bounded: bool,
    face_centroid_points: Vec<DVec3>,
    merged: MergedGeometry,
    euler_mismatches: u64,
}

impl Brush {
    /// Empty brush with the default world extent.
    #[must_use]
    pub fn new() -> Self {
        Self::with_world_extent(DEFAULT_WORLD_EXTENT)
    }

    /// Empty brush for a world of the given half-extent.
    ///
    /// # Panics
    /// Panics if `world_extent` is not strictly positive.
    #[must_use]
    pub fn with_world_extent(world_extent: f64) -> Self {
        assert!(world_extent > 0.0, "world extent must be positive");
        Self {
            faces: Vec::new(),
            world_extent,
            state: BrushState::PlanesDirty,
            pending_transform: DMat4::IDENTITY,
            events: Vec::new(),
            aabb: Aabb::EMPTY,
            bounded: false,
            face_centroid_points: Vec::new(),
            merged: MergedGeometry::default(),
            euler_mismatches: 0,
        }
    }

    /// Axis-aligned box brush from opposite corners.
    ///
    /// # Errors
    /// [`BrushError::DegeneratePlane`] if the box has zero extent on any
    /// axis.
    pub fn cuboid(mins: DVec3, maxs: DVec3, shader: &str) -> Result<Self, BrushError> {
        if !(mins.x < maxs.x && mins.y < maxs.y && mins.z < maxs.z) {
            return Err(BrushError::DegeneratePlane);
        }

        let mut brush = Self::new();
        let sides = [
            (DVec3::X, maxs.x),
            (DVec3::NEG_X, -mins.x),
            (DVec3::Y, maxs.y),
            (DVec3::NEG_Y, -mins.y),
            (DVec3::Z, maxs.z),
            (DVec3::NEG_Z, -mins.z),
        ];
        for (normal, dist) in sides {
            brush.chop_with_plane(Plane::new_normalized(normal, dist), shader)?;
        }
        Ok(brush)
    }

    // FACE LIST MUTATION

    /// Append a face.
    ///
    /// # Errors
    /// [`BrushError::TooManyFaces`] past [`MAX_BRUSH_FACES`]; the brush is
    /// left unmodified.
    pub fn add_face(&mut self, face: Face) -> Result<FaceIdx, BrushError> {
        if self.faces.len() >= MAX_BRUSH_FACES {
            return Err(BrushError::TooManyFaces);
        }
        let idx = FaceIdx(self.faces.len());
        self.faces.push(face);
        self.mark_planes_changed();
        Ok(idx)
    }

    /// Append a face through three counter-clockwise points, carrying a
    /// shader name and texture projection.
    ///
    /// # Errors
    /// [`BrushError::DegeneratePlane`] on collinear points;
    /// [`BrushError::TooManyFaces`] past the cap.
    pub fn add_plane(
        &mut self,
        p0: DVec3,
        p1: DVec3,
        p2: DVec3,
        shader: &str,
        projection: TextureProjection,
    ) -> Result<FaceIdx, BrushError> {
        let mut face = Face::from_points(p0, p1, p2, shader).ok_or(BrushError::DegeneratePlane)?;
        face.set_projection(projection);
        self.add_face(face)
    }

    /// Append a face for an already-normalized plane equation (the clipper
    /// tool's entry point).
    ///
    /// # Errors
    /// [`BrushError::TooManyFaces`] past the cap.
    pub fn chop_with_plane(&mut self, plane: Plane, shader: &str) -> Result<FaceIdx, BrushError> {
        self.add_face(Face::new(plane, shader))
    }

    /// Remove and return a face. Later faces shift down one index.
    pub fn erase_face(&mut self, idx: FaceIdx) -> Option<Face> {
        if idx.0 >= self.faces.len() {
            return None;
        }
        let face = self.faces.remove(idx.0);
        self.events.push(BrushEvent::FaceErased(idx));
        self.mark_planes_changed();
        Some(face)
    }

    /// Drop every face that did not contribute to the last evaluation.
    /// Returns how many were removed.
    pub fn remove_empty_faces(&mut self) -> usize {
        self.evaluate_brep();
        let before = self.faces.len();
        self.faces.retain(Face::contributes);
        let removed = before - self.faces.len();
        if removed > 0 {
            self.mark_planes_changed();
        }
        removed
    }

    /// Replace a face's plane equation.
    ///
    /// # Errors
    /// [`BrushError::NoSuchFace`] for an out-of-range index.
    pub fn set_face_plane(&mut self, idx: FaceIdx, plane: Plane) -> Result<(), BrushError> {
        let face = self
            .faces
            .get_mut(idx.0)
            .ok_or(BrushError::NoSuchFace { face: idx })?;
        face.set_plane(plane);
        self.mark_planes_changed();
        Ok(())
    }

    /// Replace a face's plane through three counter-clockwise points.
    ///
    /// # Errors
    /// [`BrushError::NoSuchFace`] or [`BrushError::DegeneratePlane`].
    pub fn set_face_plane_points(
        &mut self,
        idx: FaceIdx,
        p0: DVec3,
        p1: DVec3,
        p2: DVec3,
    ) -> Result<(), BrushError> {
        let plane = Plane::from_points(p0, p1, p2).ok_or(BrushError::DegeneratePlane)?;
        self.set_face_plane(idx, plane)
    }

    /// Rename a face's shader without touching geometry.
    ///
    /// # Errors
    /// [`BrushError::NoSuchFace`] for an out-of-range index.
    pub fn set_face_shader(&mut self, idx: FaceIdx, shader: &str) -> Result<(), BrushError> {
        let face = self
            .faces
            .get_mut(idx.0)
            .ok_or(BrushError::NoSuchFace { face: idx })?;
        face.set_shader(shader);
        Ok(())
    }

    /// Flag every face as structural or detail.
    pub fn set_detail(&mut self, detail: bool) {
        for face in &mut self.faces {
            face.set_detail(detail);
        }
    }

    /// Mark the face planes changed, forcing the next reader to rebuild.
    ///
    /// Called internally by every geometric mutation; public for bulk
    /// imports that write faces wholesale.
    pub fn mark_planes_changed(&mut self) {
        // A pending transform already forces a rebuild and must keep its
        // matrix, so only a clean brush steps to PlanesDirty.
        if self.state == BrushState::Clean {
            self.state = BrushState::PlanesDirty;
        }
        self.events.push(BrushEvent::PlanesChanged);
    }

    // TRANSFORMS

    /// Queue a rigid transform (rotation + translation) on top of any
    /// already pending one.
    ///
    /// Working planes are recomputed from the saved planes at evaluation
    /// time; nothing is baked until [`Brush::freeze_transform`].
    pub fn transform(&mut self, matrix: &DMat4) {
        self.pending_transform = *matrix * self.pending_transform;
        self.state = BrushState::TransformPending;
        self.events.push(BrushEvent::TransformQueued);
    }

    /// Bake the pending transform into the saved plane equations.
    ///
    /// Gated on the matrix rather than the dirty state: an evaluation
    /// between the last drag step and the mouse-up leaves the brush clean
    /// with the transform still pending.
    pub fn freeze_transform(&mut self) {
        if self.pending_transform == DMat4::IDENTITY {
            return;
        }
        let matrix = self.pending_transform;
        for face in &mut self.faces {
            face.apply_transform(&matrix);
            face.freeze_plane();
        }
        self.pending_transform = DMat4::IDENTITY;
        self.state = BrushState::PlanesDirty;
        self.events.push(BrushEvent::PlanesChanged);
    }

    /// Discard the pending transform and restore the saved planes.
    pub fn revert_transform(&mut self) {
        if self.pending_transform == DMat4::IDENTITY {
            return;
        }
        for face in &mut self.faces {
            face.revert_plane();
        }
        self.pending_transform = DMat4::IDENTITY;
        self.state = BrushState::PlanesDirty;
        self.events.push(BrushEvent::PlanesChanged);
    }

    /// Snap face planes to a grid of spacing `snap` by re-deriving each
    /// plane from snapped winding vertices.
    ///
    /// A pending transform is frozen first: the snap rewrites the saved
    /// plane equations from the windings the caller sees, which already
    /// include the drag. Faces whose snapped vertices collapse keep their
    /// old plane.
    pub fn snap_to_grid(&mut self, snap: f64) {
        if snap <= 0.0 {
            return;
        }
        // A drag left pending here would be applied a second time by the
        // next freeze, on top of the snapped equations.
        if self.pending_transform != DMat4::IDENTITY {
            self.freeze_transform();
        }
        self.evaluate_brep();

        let mut changed = false;
        for face in &mut self.faces {
            if let Some(plane) = face.snapped_plane(snap) {
                face.set_plane(plane);
                changed = true;
            }
        }
        if changed {
            self.mark_planes_changed();
        }
    }

    // EVALUATION

    /// Rebuild derived state if anything changed since the last call.
    ///
    /// Safe to call at any time; a clean brush returns immediately. All
    /// derived-state accessors call this implicitly.
    pub fn evaluate_brep(&mut self) {
        match self.state {
            BrushState::Clean => {}
            BrushState::PlanesDirty => {
                self.build_brep();
                self.state = BrushState::Clean;
            }
            BrushState::TransformPending => {
                let matrix = self.pending_transform;
                for face in &mut self.faces {
                    face.apply_transform(&matrix);
                }
                self.build_brep();
                self.state = BrushState::Clean;
            }
        }
    }

    fn build_brep(&mut self) {
        self.build_windings();

        // With no usable plane nothing is ever clipped and the region is
        // all of space, which the open-edge scan alone cannot see.
        let unconstrained = self.faces.iter().all(|face| !face.plane().is_valid());
        let unbounded = unconstrained
            || self
                .faces
                .iter()
                .any(|face| face.winding().has_open_edge());
        self.bounded = !unbounded;

        if !unbounded {
            connectivity::clean(&mut self.faces);
        }

        let contributing = self.faces.iter().filter(|f| f.contributes()).count();
        let total_winding_vertices: usize =
            self.faces.iter().map(|f| f.winding().len()).sum();

        if unbounded || contributing < 4 || total_winding_vertices % 2 != 0 {
            log::debug!(
                "brush degenerate: unbounded={unbounded}, contributing={contributing}, \
                 winding vertices={total_winding_vertices}; clearing caches"
            );
            self.clear_derived();
        } else {
            self.merged = proximity::merge(&self.faces);
            self.face_centroid_points = self
                .faces
                .iter()
                .filter(|f| f.contributes())
                .map(|f| f.winding().centroid())
                .collect();

            let vertices = self.merged.unique_vertex_points.len();
            let edges = self.merged.unique_edge_points.len();
            if vertices + contributing != edges + 2 {
                self.euler_mismatches += 1;
                log::warn!(
                    "brush failed Euler check: V={vertices}, F={contributing}, E={edges} \
                     (mismatch #{}); rendering best-effort data",
                    self.euler_mismatches
                );
            }
            log::debug!(
                "brush rebuilt: {contributing} contributing faces, {vertices} vertices, \
                 {edges} edges"
            );
        }

        self.events.push(BrushEvent::BRepRebuilt);
    }

    /// Step 1 of the pipeline: windings plus the bounding box fold.
    fn build_windings(&mut self) {
        self.aabb = Aabb::EMPTY;
        let winners = plane_winners(&self.faces);

        let windings: Vec<Winding> = (0..self.faces.len())
            .map(|i| {
                if winners[i] {
                    self.faces[i].build_winding(
                        FaceIdx(i),
                        &self.faces,
                        &winners,
                        self.world_extent,
                    )
                } else {
                    Winding::new()
                }
            })
            .collect();

        for (face, winding) in self.faces.iter_mut().zip(windings) {
            for vertex in &winding.vertices {
                self.aabb.fold(vertex.position);
            }
            face.set_winding(winding);
        }
    }

    /// The degeneracy gate: the brush stays editable but renders empty.
    fn clear_derived(&mut self) {
        for face in &mut self.faces {
            face.clear_winding();
        }
        self.aabb = Aabb::EMPTY;
        self.face_centroid_points.clear();
        self.merged.clear();
    }

    // DERIVED-STATE ACCESSORS (all evaluate lazily)

    /// Bounding box over all winding vertices; invalid while the brush is
    /// degenerate or empty.
    pub fn local_aabb(&mut self) -> Aabb {
        self.evaluate_brep();
        self.aabb
    }

    /// False if the last evaluation found a winding edge open to infinity,
    /// or if no face carried a usable plane at all (a brush with no faces,
    /// or only degenerate ones, constrains nothing).
    pub fn is_bounded(&mut self) -> bool {
        self.evaluate_brep();
        self.bounded
    }

    /// One position per physical vertex of the solid.
    pub fn unique_vertex_points(&mut self) -> &[DVec3] {
        self.evaluate_brep();
        &self.merged.unique_vertex_points
    }

    /// One midpoint per physical edge of the solid.
    pub fn unique_edge_points(&mut self) -> &[DVec3] {
        self.evaluate_brep();
        &self.merged.unique_edge_points
    }

    /// Wireframe line list: per unique edge, endpoint slots into
    /// [`Brush::unique_vertex_points`].
    pub fn edge_indices(&mut self) -> &[EdgeIndices] {
        self.evaluate_brep();
        &self.merged.edge_indices
    }

    /// Per unique edge, the pair of faces meeting there.
    pub fn edge_faces(&mut self) -> &[EdgeFaces] {
        self.evaluate_brep();
        &self.merged.edge_faces
    }

    /// Per face-vertex id, its unique-vertex slot.
    pub fn vertex_redirects(&mut self) -> &[u32] {
        self.evaluate_brep();
        &self.merged.vertex_redirects
    }

    /// Per face-vertex id, its unique-edge slot.
    pub fn edge_redirects(&mut self) -> &[u32] {
        self.evaluate_brep();
        &self.merged.edge_redirects
    }

    /// Centroids of contributing faces, in face order.
    pub fn face_centroid_points(&mut self) -> &[DVec3] {
        self.evaluate_brep();
        &self.face_centroid_points
    }

    pub fn has_contributing_faces(&mut self) -> bool {
        self.contributing_face_count() > 0
    }

    pub fn contributing_face_count(&mut self) -> usize {
        self.evaluate_brep();
        self.faces.iter().filter(|f| f.contributes()).count()
    }

    /// Iterate faces with their indices. Evaluates first so windings are
    /// current.
    pub fn faces(&mut self) -> impl Iterator<Item = (FaceIdx, &Face)> {
        self.evaluate_brep();
        self.faces
            .iter()
            .enumerate()
            .map(|(i, face)| (FaceIdx(i), face))
    }

    /// A face with its winding current.
    pub fn face(&mut self, idx: FaceIdx) -> Option<&Face> {
        self.evaluate_brep();
        self.faces.get(idx.0)
    }

    /// Mutable face access for non-geometric edits (shader, projection,
    /// detail flag). Geometric edits go through the `set_face_*` methods so
    /// the brush is re-marked dirty.
    pub fn face_mut(&mut self, idx: FaceIdx) -> Option<&mut Face> {
        self.evaluate_brep();
        self.faces.get_mut(idx.0)
    }

    /// A face's working plane, readable without forcing an evaluation
    /// (planes are inputs, not derived state).
    #[must_use]
    pub fn face_plane(&self, idx: FaceIdx) -> Option<&Plane> {
        self.faces.get(idx.0).map(Face::plane)
    }

    /// Number of faces in the list, contributing or not.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Times the Euler cross-check has failed over this brush's lifetime.
    /// More than the odd blip indicates a real construction defect.
    #[must_use]
    pub const fn euler_mismatch_count(&self) -> u64 {
        self.euler_mismatches
    }

    /// Hand out (and clear) the queued change events.
    pub fn drain_events(&mut self) -> Vec<BrushEvent> {
        std::mem::take(&mut self.events)
    }

    // DIAGNOSTICS

    /// Audit the adjacency graph and Euler relation after an evaluation.
    ///
    /// A degenerate brush (caches cleared) trivially passes since nothing
    /// remains to audit; poll [`Brush::has_contributing_faces`] for that
    /// condition instead.
    ///
    /// # Errors
    /// The first [`GraphDefect`] found, in face order.
    pub fn validate_graph(&mut self) -> Result<(), GraphDefect> {
        self.evaluate_brep();
        connectivity::validate_windings(&self.faces)?;

        let contributing = self.faces.iter().filter(|f| f.contributes()).count();
        if contributing == 0 {
            return Ok(());
        }

        let vertices = self.merged.unique_vertex_points.len();
        let edges = self.merged.unique_edge_points.len();
        if vertices + contributing != edges + 2 {
            return Err(GraphDefect::EulerMismatch {
                vertices,
                edges,
                faces: contributing,
            });
        }
        Ok(())
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide which faces' planes survive the duplicate-plane tie-break.
///
/// Among numerically equal planes the larger signed distance wins; exact
/// ties go to the lowest face index. Losers and invalid planes get no
/// winding and never clip a sibling.
fn plane_winners(faces: &[Face]) -> Vec<bool> {
    let mut winners = vec![false; faces.len()];

    for i in 0..faces.len() {
        let plane = faces[i].plane();
        if !plane.is_valid() {
            continue;
        }

        let mut wins = true;
        for (j, other) in faces.iter().enumerate() {
            if j == i || !other.plane().is_valid() {
                continue;
            }
            if plane.approx_eq(other.plane()) {
                match other.plane().dist.partial_cmp(&plane.dist) {
                    Some(Ordering::Greater) => {
                        wins = false;
                        break;
                    }
                    Some(Ordering::Equal) if j < i => {
                        wins = false;
                        break;
                    }
                    _ => {}
                }
            }
        }
        winners[i] = wins;
    }

    winners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Brush {
        Brush::cuboid(DVec3::ZERO, DVec3::ONE, "test/caulk").unwrap()
    }

    #[test]
    fn test_unit_cube_brep() {
        let mut brush = unit_cube();

        assert_eq!(brush.contributing_face_count(), 6);
        assert_eq!(brush.unique_vertex_points().len(), 8);
        assert_eq!(brush.unique_edge_points().len(), 12);
        assert_eq!(brush.edge_indices().len(), 12);
        assert_eq!(brush.face_centroid_points().len(), 6);
        assert!(brush.is_bounded());
        assert_eq!(brush.euler_mismatch_count(), 0);
        assert!(brush.validate_graph().is_ok());

        let aabb = brush.local_aabb();
        assert!(aabb.is_valid());
        assert!((aabb.mins - DVec3::ZERO).length() < 1e-6);
        assert!((aabb.maxs - DVec3::ONE).length() < 1e-6);
    }

    #[test]
    fn test_windings_lie_on_plane_and_inside_siblings() {
        let mut brush = unit_cube();
        // An oblique chop so not everything is axis-aligned
        brush
            .chop_with_plane(
                Plane::new(DVec3::new(1.0, 1.0, 1.0), 1.3),
                "test/cut",
            )
            .unwrap();
        brush.evaluate_brep();

        let planes: Vec<Plane> = (0..brush.face_count())
            .map(|i| *brush.face_plane(FaceIdx(i)).unwrap())
            .collect();

        for (idx, face) in brush.faces() {
            if !face.contributes() {
                continue;
            }
            for vertex in &face.winding().vertices {
                assert!(
                    face.plane().signed_distance(vertex.position).abs() < 1e-5,
                    "winding vertex off its plane"
                );
                for (j, plane) in planes.iter().enumerate() {
                    if j != idx.0 {
                        assert!(
                            plane.signed_distance(vertex.position) < 1e-5,
                            "winding vertex outside sibling half-space"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut brush = unit_cube();
        brush.evaluate_brep();

        let vertices: Vec<DVec3> = brush.unique_vertex_points().to_vec();
        let edges: Vec<DVec3> = brush.unique_edge_points().to_vec();
        let indices: Vec<EdgeIndices> = brush.edge_indices().to_vec();
        let centroids: Vec<DVec3> = brush.face_centroid_points().to_vec();

        // Force a full rebuild with unchanged planes
        brush.mark_planes_changed();
        brush.evaluate_brep();

        assert_eq!(brush.unique_vertex_points(), vertices.as_slice());
        assert_eq!(brush.unique_edge_points(), edges.as_slice());
        assert_eq!(brush.edge_indices(), indices.as_slice());
        assert_eq!(brush.face_centroid_points(), centroids.as_slice());
    }

    #[test]
    fn test_duplicate_plane_does_not_add_contribution() {
        let mut brush = unit_cube();

        // Exactly coincident with the +X face: tie goes to the earlier face
        brush
            .chop_with_plane(Plane::new(DVec3::X, 1.0), "test/dup")
            .unwrap();
        assert_eq!(brush.contributing_face_count(), 6);
        assert!(!brush.face(FaceIdx(6)).unwrap().contributes());

        // Epsilon-equal but slightly tighter: the newcomer wins the
        // tie-break instead, still exactly one of the pair contributes
        brush
            .chop_with_plane(Plane::new(DVec3::X, 1.0 + 5e-5), "test/dup2")
            .unwrap();
        assert_eq!(brush.contributing_face_count(), 6);
    }

    #[test]
    fn test_degenerate_plane_face_is_skipped() {
        let mut brush = unit_cube();

        // Hand-built planes bypass the constructor's length check; the
        // build skips them instead of seeding NaN windings
        let garbage = Plane {
            normal: DVec3::ZERO,
            dist: 0.0,
        };
        let idx = brush.add_face(Face::new(garbage, "test/import")).unwrap();

        assert_eq!(brush.contributing_face_count(), 6);
        assert!(!brush.face(idx).unwrap().contributes());
        assert!(brush.is_bounded());
        assert!(brush.validate_graph().is_ok());
    }

    #[test]
    fn test_single_plane_is_unbounded_and_empty() {
        let mut brush = Brush::new();
        brush
            .chop_with_plane(Plane::new(DVec3::Z, 0.0), "test/open")
            .unwrap();
        brush.evaluate_brep();

        assert!(!brush.is_bounded());
        assert!(!brush.has_contributing_faces());
        assert!(brush.unique_vertex_points().is_empty());
        assert!(brush.unique_edge_points().is_empty());
        assert!(brush.edge_indices().is_empty());
        assert!(brush.face_centroid_points().is_empty());
        assert!(!brush.local_aabb().is_valid());
        // Still editable: boxing it in recovers a solid
        assert_eq!(brush.face_count(), 1);
    }

    #[test]
    fn test_unconstrained_brush_is_unbounded() {
        let mut brush = Brush::new();
        assert!(!brush.is_bounded());
        assert!(!brush.has_contributing_faces());
        assert!(!brush.local_aabb().is_valid());

        // A lone degenerate plane clips nothing away either
        let garbage = Plane {
            normal: DVec3::ZERO,
            dist: 0.0,
        };
        brush.add_face(Face::new(garbage, "test/import")).unwrap();
        assert!(!brush.is_bounded());
    }

    #[test]
    fn test_plane_outside_solid_does_not_contribute() {
        let mut brush = unit_cube();
        let idx = brush
            .chop_with_plane(Plane::new(DVec3::X, 2.0), "test/far")
            .unwrap();

        assert_eq!(brush.contributing_face_count(), 6);
        assert!(!brush.face(idx).unwrap().contributes());
        assert!(brush.validate_graph().is_ok());
    }

    #[test]
    fn test_chop_slices_cube() {
        let mut brush = unit_cube();
        let idx = brush
            .chop_with_plane(Plane::new(DVec3::X, 0.5), "test/slice")
            .unwrap();

        // The old +X face at x=1 is now redundant; the slice contributes
        assert_eq!(brush.face_count(), 7);
        assert_eq!(brush.contributing_face_count(), 6);

        let winding = brush.face(idx).unwrap().winding().clone();
        assert_eq!(winding.len(), 4);
        for vertex in &winding.vertices {
            assert!((vertex.position.x - 0.5).abs() < 1e-6);
        }

        let aabb = brush.local_aabb();
        assert!((aabb.maxs.x - 0.5).abs() < 1e-6);
        assert!((aabb.maxs.y - 1.0).abs() < 1e-6);
        assert!(brush.validate_graph().is_ok());
    }

    #[test]
    fn test_transform_revert_and_freeze() {
        let mut brush = unit_cube();
        let shift = DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0));

        brush.transform(&shift);
        let moved = brush.local_aabb();
        assert!((moved.mins.x - 10.0).abs() < 1e-6);
        assert!((moved.maxs.x - 11.0).abs() < 1e-6);

        // Evaluating twice must not double-apply the pending transform
        brush.transform(&DMat4::IDENTITY);
        assert!((brush.local_aabb().mins.x - 10.0).abs() < 1e-6);

        brush.revert_transform();
        assert!((brush.local_aabb().mins.x - 0.0).abs() < 1e-6);

        brush.transform(&shift);
        brush.freeze_transform();
        let frozen = brush.local_aabb();
        assert!((frozen.mins.x - 10.0).abs() < 1e-6);
        // Baked: the saved plane moved too, so reverting changes nothing
        brush.revert_transform();
        assert!((brush.local_aabb().mins.x - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_snap_during_pending_transform_bakes_drag_once() {
        let mut brush = unit_cube();
        brush.transform(&DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0)));
        // A frame render evaluates mid-drag
        assert!((brush.local_aabb().mins.x - 10.0).abs() < 1e-6);

        brush.snap_to_grid(0.25);
        brush.freeze_transform();

        // One drag of +10, not two
        let aabb = brush.local_aabb();
        assert!((aabb.mins.x - 10.0).abs() < 1e-9);
        assert!((aabb.maxs.x - 11.0).abs() < 1e-9);

        // The snap committed the drag, so there is nothing left to revert
        brush.revert_transform();
        assert!((brush.local_aabb().mins.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_snap_to_grid_squares_up_planes() {
        let mut brush = Brush::cuboid(
            DVec3::new(0.1, -0.02, 0.03),
            DVec3::new(0.97, 1.02, 0.95),
            "test/rough",
        )
        .unwrap();

        brush.snap_to_grid(0.25);

        let aabb = brush.local_aabb();
        assert!((aabb.mins - DVec3::new(0.0, 0.0, 0.0)).length() < 1e-9);
        assert!((aabb.maxs - DVec3::new(1.0, 1.0, 1.0)).length() < 1e-9);
        assert!(brush.validate_graph().is_ok());
    }

    #[test]
    fn test_face_count_cap() {
        let mut brush = Brush::new();
        for i in 0..MAX_BRUSH_FACES {
            #[expect(clippy::cast_precision_loss)]
            let dist = 1.0 + i as f64;
            brush
                .chop_with_plane(Plane::new(DVec3::X, dist), "test/fill")
                .unwrap();
        }

        let overflow = brush.chop_with_plane(Plane::new(DVec3::Y, 0.0), "test/over");
        assert_eq!(overflow, Err(BrushError::TooManyFaces));
        assert_eq!(brush.face_count(), MAX_BRUSH_FACES);
    }

    #[test]
    fn test_add_plane_rejects_collinear_points() {
        let mut brush = Brush::new();
        let result = brush.add_plane(
            DVec3::ZERO,
            DVec3::X,
            DVec3::X * 3.0,
            "test/bad",
            TextureProjection::default(),
        );
        assert_eq!(result, Err(BrushError::DegeneratePlane));
        assert_eq!(brush.face_count(), 0);
    }

    #[test]
    fn test_erase_face_opens_the_solid() {
        let mut brush = unit_cube();
        let face = brush.erase_face(FaceIdx(0)).unwrap();
        assert_eq!(face.shader(), "test/caulk");
        assert_eq!(brush.face_count(), 5);

        // Five half-spaces leave the solid open
        assert!(!brush.is_bounded());
        assert!(!brush.has_contributing_faces());
    }

    #[test]
    fn test_remove_empty_faces_drops_redundant_plane() {
        let mut brush = unit_cube();
        brush
            .chop_with_plane(Plane::new(DVec3::X, 2.0), "test/far")
            .unwrap();

        assert_eq!(brush.remove_empty_faces(), 1);
        assert_eq!(brush.face_count(), 6);
        assert_eq!(brush.contributing_face_count(), 6);
    }

    #[test]
    fn test_events_trace_the_lifecycle() {
        let mut brush = unit_cube();
        let events = brush.drain_events();
        assert_eq!(events.len(), 6);
        assert!(events.iter().all(|e| *e == BrushEvent::PlanesChanged));

        brush.evaluate_brep();
        assert_eq!(brush.drain_events(), vec![BrushEvent::BRepRebuilt]);

        // Clean evaluation emits nothing
        brush.evaluate_brep();
        assert!(brush.drain_events().is_empty());

        brush.transform(&DMat4::from_translation(DVec3::X));
        brush.evaluate_brep();
        assert_eq!(
            brush.drain_events(),
            vec![BrushEvent::TransformQueued, BrushEvent::BRepRebuilt]
        );

        brush.erase_face(FaceIdx(5));
        let events = brush.drain_events();
        assert_eq!(
            events,
            vec![
                BrushEvent::FaceErased(FaceIdx(5)),
                BrushEvent::PlanesChanged
            ]
        );
    }

    #[test]
    fn test_face_centroids_are_face_centers() {
        let mut brush = unit_cube();
        let centroids = brush.face_centroid_points().to_vec();
        assert_eq!(centroids.len(), 6);

        for center in [
            DVec3::new(1.0, 0.5, 0.5),
            DVec3::new(0.0, 0.5, 0.5),
            DVec3::new(0.5, 1.0, 0.5),
            DVec3::new(0.5, 0.0, 0.5),
            DVec3::new(0.5, 0.5, 1.0),
            DVec3::new(0.5, 0.5, 0.0),
        ] {
            assert!(
                centroids.iter().any(|c| (*c - center).length() < 1e-9),
                "missing centroid {center}"
            );
        }
    }

    #[test]
    fn test_tetrahedron_euler() {
        let mut brush = Brush::new();
        let diagonal = DVec3::ONE.normalize();
        for (normal, dist) in [
            (DVec3::NEG_X, 0.0),
            (DVec3::NEG_Y, 0.0),
            (DVec3::NEG_Z, 0.0),
            (diagonal, diagonal.x),
        ] {
            brush
                .chop_with_plane(Plane::new(normal, dist), "test/tetra")
                .unwrap();
        }

        assert_eq!(brush.contributing_face_count(), 4);
        assert_eq!(brush.unique_vertex_points().len(), 4);
        assert_eq!(brush.unique_edge_points().len(), 6);
        assert!(brush.validate_graph().is_ok());
    }

    #[test]
    fn test_plane_winners_tie_break() {
        let faces = vec![
            Face::new(Plane::new(DVec3::X, 1.0), "a"),
            Face::new(Plane::new(DVec3::X, 1.0), "b"),
            Face::new(Plane::new(DVec3::X, 1.0 + 5e-5), "c"),
            Face::new(Plane::new(DVec3::Y, 1.0), "d"),
        ];
        let winners = plane_winners(&faces);

        // Face 2 has the largest distance among the equal trio; face 3 is
        // unrelated and wins by default
        assert_eq!(winners, vec![false, false, true, true]);
    }
}
