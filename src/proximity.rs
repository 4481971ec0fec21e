//! Merging coincident face-vertices into unique vertices and edges.
//!
//! After clipping, every physical vertex of the brush exists once per face
//! touching it, and every physical edge exists once in each of its two
//! faces' windings. Selection and wireframe rendering want each exactly
//! once. This module collapses the (face, vertex-slot) incidences into
//! unique slots using the adjacency graph:
//!
//! - `next_edge` of a face-vertex hops across the shared edge to the
//!   neighbor's reciprocal entry (which sits at the edge's *other*
//!   endpoint).
//! - `next_vertex` composes that hop with the winding successor, landing on
//!   the neighbor's entry at the *same* physical vertex.
//!
//! Repeating `next_vertex` walks face by face around one physical vertex;
//! repeating `next_edge` alternates between an edge's two sides. Both orbit
//! structures are equivalence rings, collapsed here with a disjoint-set
//! forest over dense face-vertex ids. Ring representatives are assigned in
//! first-seen scan order, so the outputs are deterministic and a rebuild of
//! the same windings reproduces them exactly.

#![allow(clippy::cast_possible_truncation)]

use glam::DVec3;

use crate::face::Face;
use crate::winding::FaceIdx;

/// One incidence of a physical vertex on one face's winding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceVertexId {
    pub face: FaceIdx,
    pub vertex: usize,
}

/// Endpoints of one unique edge as slots into the unique vertex array.
///
/// Ready for line-list rendering: two entries per edge, `u32` as render
/// index buffers expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeIndices {
    pub first: u32,
    pub second: u32,
}

/// The two faces bounding one unique edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeFaces {
    pub first: FaceIdx,
    pub second: FaceIdx,
}

/// Deduplicated geometry caches produced by [`merge`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedGeometry {
    /// One position per physical vertex.
    pub unique_vertex_points: Vec<DVec3>,
    /// One midpoint per physical edge (the selection handle for edges).
    pub unique_edge_points: Vec<DVec3>,
    /// Per face-vertex id: its slot in `unique_vertex_points`.
    pub vertex_redirects: Vec<u32>,
    /// Per face-vertex id: its edge's slot in `unique_edge_points`.
    pub edge_redirects: Vec<u32>,
    /// Per unique edge: endpoint slots into `unique_vertex_points`.
    pub edge_indices: Vec<EdgeIndices>,
    /// Per unique edge: the bounding face pair.
    pub edge_faces: Vec<EdgeFaces>,
}

impl MergedGeometry {
    pub(crate) fn clear(&mut self) {
        self.unique_vertex_points.clear();
        self.unique_edge_points.clear();
        self.vertex_redirects.clear();
        self.edge_redirects.clear();
        self.edge_indices.clear();
        self.edge_faces.clear();
    }
}

/// Disjoint-set forest over dense ids, path-halving finds and union by
/// rank.
#[derive(Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            rank: vec![0; len],
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] as usize != x {
            let grandparent = self.parent[self.parent[x] as usize];
            self.parent[x] = grandparent;
            x = grandparent as usize;
        }
        x
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return;
        }
        match self.rank[a].cmp(&self.rank[b]) {
            std::cmp::Ordering::Less => self.parent[a] = b as u32,
            std::cmp::Ordering::Greater => self.parent[b] = a as u32,
            std::cmp::Ordering::Equal => {
                self.parent[b] = a as u32;
                self.rank[a] += 1;
            }
        }
    }
}

/// The reciprocal face-vertex across the edge starting at `fv`.
///
/// Lands at the edge's other endpoint on the neighboring face. `None` only
/// on graphs the verify pass did not finish repairing.
fn next_edge(faces: &[Face], fv: FaceVertexId) -> Option<FaceVertexId> {
    let winding = faces.get(fv.face.0)?.winding();
    let FaceIdx(neighbor) = winding.vertices.get(fv.vertex)?.adjacent?;
    let slot = faces.get(neighbor)?.winding().find_adjacent(fv.face)?;
    Some(FaceVertexId {
        face: FaceIdx(neighbor),
        vertex: slot,
    })
}

/// The neighboring face's entry at the same physical vertex as `fv`.
fn next_vertex(faces: &[Face], fv: FaceVertexId) -> Option<FaceVertexId> {
    let hop = next_edge(faces, fv)?;
    let winding = faces.get(hop.face.0)?.winding();
    Some(FaceVertexId {
        face: hop.face,
        vertex: winding.next_index(hop.vertex),
    })
}

/// Collapse coincident face-vertices into unique vertex and edge caches.
///
/// Expects cleaned, reciprocal windings (every edge present once from each
/// side). Face-vertices whose hops fail stay in singleton classes rather
/// than aborting the merge; the caller's Euler check reports the damage.
pub(crate) fn merge(faces: &[Face]) -> MergedGeometry {
    let mut face_base = Vec::with_capacity(faces.len());
    let mut total = 0_usize;
    for face in faces {
        face_base.push(total);
        total += face.winding().len();
    }

    let id_of = |fv: FaceVertexId| face_base[fv.face.0] + fv.vertex;

    let mut vertex_sets = DisjointSet::new(total);
    let mut edge_sets = DisjointSet::new(total);

    for (i, face) in faces.iter().enumerate() {
        for slot in 0..face.winding().len() {
            let fv = FaceVertexId {
                face: FaceIdx(i),
                vertex: slot,
            };
            if let Some(other) = next_edge(faces, fv) {
                edge_sets.union(id_of(fv), id_of(other));
            }
            if let Some(other) = next_vertex(faces, fv) {
                vertex_sets.union(id_of(fv), id_of(other));
            }
        }
    }

    let mut merged = MergedGeometry {
        vertex_redirects: vec![0; total],
        edge_redirects: vec![0; total],
        ..MergedGeometry::default()
    };

    // First-seen slot per class, scanning ids in order: deterministic
    // output, independent of union order.
    let mut vertex_slots: Vec<Option<u32>> = vec![None; total];
    for (i, face) in faces.iter().enumerate() {
        for slot in 0..face.winding().len() {
            let id = face_base[i] + slot;
            let root = vertex_sets.find(id);
            let unique = match vertex_slots[root] {
                Some(existing) => existing,
                None => {
                    let fresh = merged.unique_vertex_points.len() as u32;
                    merged
                        .unique_vertex_points
                        .push(face.winding().vertices[slot].position);
                    vertex_slots[root] = Some(fresh);
                    fresh
                }
            };
            merged.vertex_redirects[id] = unique;
        }
    }

    let mut edge_slots: Vec<Option<u32>> = vec![None; total];
    for (i, face) in faces.iter().enumerate() {
        let winding = face.winding();
        for slot in 0..winding.len() {
            let id = face_base[i] + slot;
            let root = edge_sets.find(id);
            let unique = match edge_slots[root] {
                Some(existing) => existing,
                None => {
                    let next_slot = winding.next_index(slot);
                    let a = winding.vertices[slot].position;
                    let b = winding.vertices[next_slot].position;

                    let fresh = merged.unique_edge_points.len() as u32;
                    merged.unique_edge_points.push((a + b) * 0.5);
                    merged.edge_indices.push(EdgeIndices {
                        first: merged.vertex_redirects[id],
                        second: merged.vertex_redirects[face_base[i] + next_slot],
                    });
                    merged.edge_faces.push(EdgeFaces {
                        first: FaceIdx(i),
                        // Verified graphs always name a neighbor here
                        second: winding.vertices[slot].adjacent.unwrap_or(FaceIdx(i)),
                    });
                    edge_slots[root] = Some(fresh);
                    fresh
                }
            };
            merged.edge_redirects[id] = unique;
        }
    }

    merged
}
