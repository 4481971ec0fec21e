//! Adjacency-graph repair passes.
//!
//! Clipping produces windings whose adjacency entries are mostly right but
//! can carry numerical debris: zero-length edges where several planes meet
//! near one point, faces touching the brush only along a line, split edges
//! pointing at the same neighbor twice, and one-sided references. The four
//! passes here run in a fixed order after every winding rebuild, each
//! assuming the previous pass's guarantees:
//!
//! 1. [`remove_degenerate_edges`]
//! 2. [`remove_degenerate_faces`]
//! 3. [`remove_duplicate_edges`]
//! 4. [`verify_graph`]
//!
//! All passes mutate windings in place across the whole face slice; they
//! repair what they can and drop what they cannot, never erroring. The
//! separate [`validate_windings`] check reports defects without mutating.

use rustc_hash::FxHashMap;

use crate::face::Face;
use crate::winding::FaceIdx;

/// Edges shorter than this (world units) are collapsed to a point.
///
/// Kept slightly looser than the clipping epsilon so crossing points that
/// nearly coincide after two almost-tangent clips still merge.
pub const DEGENERATE_EDGE_EPSILON: f64 = 1e-5;

/// A defect found while auditing the adjacency graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphDefect {
    /// A winding edge still carries the seed-square sentinel.
    OpenEdge { face: FaceIdx },
    /// A winding edge names its own face as the neighbor.
    SelfAdjacency { face: FaceIdx },
    /// A face pair's shared edge is not referenced exactly once from each
    /// side.
    MissingReciprocal {
        face: FaceIdx,
        neighbor: FaceIdx,
        count: usize,
    },
    /// Winding sizes cannot pair into edges.
    OddWindingTotal { total: usize },
    /// `V + F - E == 2` failed on the merged caches.
    EulerMismatch {
        vertices: usize,
        edges: usize,
        faces: usize,
    },
}

impl std::fmt::Display for GraphDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenEdge { face } => {
                write!(f, "Face {face:?} has an edge open to infinity")
            }
            Self::SelfAdjacency { face } => {
                write!(f, "Face {face:?} lists itself as an edge neighbor")
            }
            Self::MissingReciprocal {
                face,
                neighbor,
                count,
            } => {
                write!(
                    f,
                    "Edge between {face:?} and {neighbor:?} referenced {count} times (expected 2)"
                )
            }
            Self::OddWindingTotal { total } => {
                write!(f, "Total winding vertex count {total} is odd")
            }
            Self::EulerMismatch {
                vertices,
                edges,
                faces,
            } => {
                write!(
                    f,
                    "Euler mismatch: V={vertices}, E={edges}, F={faces}, V+F-E={}",
                    vertices + faces - edges
                )
            }
        }
    }
}

impl std::error::Error for GraphDefect {}

/// Run all four repair passes in their required order.
pub(crate) fn clean(faces: &mut [Face]) {
    remove_degenerate_edges(faces);
    remove_degenerate_faces(faces);
    remove_duplicate_edges(faces);
    verify_graph(faces);
}

/// Collapse edges shorter than [`DEGENERATE_EDGE_EPSILON`].
///
/// The later endpoint is deleted and its outgoing adjacency moves onto the
/// earlier one; the neighbor across the collapsed edge loses its reciprocal
/// entry (found by searching its winding for a reference back to this
/// face).
pub(crate) fn remove_degenerate_edges(faces: &mut [Face]) {
    let tolerance_sq = DEGENERATE_EDGE_EPSILON * DEGENERATE_EDGE_EPSILON;
    let mut removed = 0_usize;

    for i in 0..faces.len() {
        let mut v = 0;
        while v < faces[i].winding().len() {
            let winding = faces[i].winding();
            let next = winding.next_index(v);
            let a = winding.vertices[v].position;
            let b = winding.vertices[next].position;

            if (b - a).length_squared() >= tolerance_sq {
                v += 1;
                continue;
            }

            // Drop the neighbor's entry for the collapsed edge first.
            if let Some(FaceIdx(n)) = winding.vertices[v].adjacent
                && n != i
                && n < faces.len()
                && let Some(slot) = faces[n].winding().find_adjacent(FaceIdx(i))
            {
                faces[n].winding_mut().vertices.remove(slot);
            }

            let following = faces[i].winding().vertices[next].adjacent;
            let winding = faces[i].winding_mut();
            winding.vertices[v].adjacent = following;
            winding.vertices.remove(next);
            removed += 1;
        }
    }

    log::trace!("connectivity: removed {removed} degenerate edges");
}

/// Clear faces whose windings shrank to exactly 2 vertices.
///
/// Such a face touches the brush along a single line; its two neighbors are
/// relinked directly to each other before the winding is cleared.
pub(crate) fn remove_degenerate_faces(faces: &mut [Face]) {
    let mut removed = 0_usize;

    for i in 0..faces.len() {
        if faces[i].winding().len() != 2 {
            continue;
        }

        let first = faces[i].winding().vertices[0].adjacent;
        let second = faces[i].winding().vertices[1].adjacent;

        relink(faces, first, FaceIdx(i), second);
        relink(faces, second, FaceIdx(i), first);

        faces[i].clear_winding();
        removed += 1;
    }

    log::trace!("connectivity: cleared {removed} degenerate faces");
}

/// In `target`'s winding, rewrite the entry referencing `from` to reference
/// `to` instead.
fn relink(faces: &mut [Face], target: Option<FaceIdx>, from: FaceIdx, to: Option<FaceIdx>) {
    if let Some(FaceIdx(n)) = target
        && n != from.0
        && n < faces.len()
        && let Some(slot) = faces[n].winding().find_adjacent(from)
    {
        faces[n].winding_mut().vertices[slot].adjacent = to;
    }
}

/// Collapse the vertex between two consecutive edges that reference the
/// same neighbor.
pub(crate) fn remove_duplicate_edges(faces: &mut [Face]) {
    let mut removed = 0_usize;

    for face in faces.iter_mut() {
        let winding = face.winding_mut();
        let mut v = 0;
        while v < winding.len() {
            let next = winding.next_index(v);
            if winding.vertices[v].adjacent == winding.vertices[next].adjacent {
                winding.vertices.remove(next);
                removed += 1;
            } else {
                v += 1;
            }
        }
    }

    log::trace!("connectivity: collapsed {removed} duplicate edges");
}

/// Drop winding edges whose adjacency is missing, self-referential, or not
/// reciprocated by the neighbor.
///
/// After this pass every surviving edge appears in exactly two windings,
/// once from each side, which the proximity merger relies on for its ring
/// hops.
pub(crate) fn verify_graph(faces: &mut [Face]) {
    let mut dropped = 0_usize;

    for i in 0..faces.len() {
        let mut v = 0;
        while v < faces[i].winding().len() {
            let reciprocated = match faces[i].winding().vertices[v].adjacent {
                Some(FaceIdx(n)) if n != i && n < faces.len() => {
                    faces[n].winding().find_adjacent(FaceIdx(i)).is_some()
                }
                _ => false,
            };

            if reciprocated {
                v += 1;
            } else {
                faces[i].winding_mut().vertices.remove(v);
                dropped += 1;
            }
        }
    }

    log::trace!("connectivity: dropped {dropped} unreciprocated edges");
}

/// Audit the adjacency graph without mutating it.
///
/// Checks every winding edge is closed, points at another face, and is
/// matched one-for-one by that face; also checks the winding total can pair
/// into edges. Returns the first defect in face order.
pub(crate) fn validate_windings(faces: &[Face]) -> Result<(), GraphDefect> {
    let mut pair_counts: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut total = 0_usize;

    for (i, face) in faces.iter().enumerate() {
        total += face.winding().len();
        for vertex in &face.winding().vertices {
            match vertex.adjacent {
                None => return Err(GraphDefect::OpenEdge { face: FaceIdx(i) }),
                Some(FaceIdx(n)) if n == i => {
                    return Err(GraphDefect::SelfAdjacency { face: FaceIdx(i) });
                }
                Some(FaceIdx(n)) => {
                    *pair_counts.entry(ordered_pair(i, n)).or_insert(0) += 1;
                }
            }
        }
    }

    if total % 2 != 0 {
        return Err(GraphDefect::OddWindingTotal { total });
    }

    // Deterministic first-defect order: re-scan faces instead of iterating
    // the map.
    for (i, face) in faces.iter().enumerate() {
        for vertex in &face.winding().vertices {
            if let Some(FaceIdx(n)) = vertex.adjacent {
                let count = pair_counts.get(&ordered_pair(i, n)).copied().unwrap_or(0);
                if count != 2 {
                    return Err(GraphDefect::MissingReciprocal {
                        face: FaceIdx(i),
                        neighbor: FaceIdx(n),
                        count,
                    });
                }
            }
        }
    }

    Ok(())
}

#[inline]
const fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}
