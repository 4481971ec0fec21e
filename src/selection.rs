//! Selection mirrors: stable pick targets over rebuilt caches.
//!
//! Every rebuild reassigns vertex and edge cache slots wholesale, so
//! selection state must never outlive an evaluation. The mirror drains the
//! brush's event queue once per frame and re-instances its pickable
//! vertices and edges only when a rebuild actually happened.

#![allow(clippy::cast_possible_truncation)]

use glam::DVec3;

use crate::brush::Brush;
use crate::proximity::EdgeFaces;
use crate::winding::FaceIdx;

/// Change notifications a brush queues for interested layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushEvent {
    /// A face plane was added, removed, or edited.
    PlanesChanged,

    /// A rigid transform was queued but not yet frozen or reverted.
    TransformQueued,

    /// Derived caches were rebuilt; every id and cache slot is reassigned.
    BRepRebuilt,

    /// The face at this index was removed; later faces shifted down one.
    FaceErased(FaceIdx),
}

/// A pickable vertex of the solid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectableVertex {
    pub position: DVec3,

    /// Slot in the brush's unique-vertex cache as of the last sync.
    pub id: u32,
}

/// A pickable edge of the solid, tested against its midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectableEdge {
    pub midpoint: DVec3,

    /// The two faces meeting at this edge.
    pub faces: EdgeFaces,

    /// Slot in the brush's unique-edge cache as of the last sync.
    pub id: u32,
}

/// Mirrors a brush's merged caches into pickable instances.
#[derive(Clone, Debug, Default)]
pub struct SelectionMirror {
    vertices: Vec<SelectableVertex>,
    edges: Vec<SelectableEdge>,
}

impl SelectionMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the brush, drain its events, and refresh the mirrored
    /// instances if a rebuild happened. Returns the drained events so
    /// callers can layer their own bookkeeping on top.
    pub fn sync(&mut self, brush: &mut Brush) -> Vec<BrushEvent> {
        brush.evaluate_brep();
        let events = brush.drain_events();
        if events.contains(&BrushEvent::BRepRebuilt) {
            self.rebuild(brush);
        }
        events
    }

    fn rebuild(&mut self, brush: &mut Brush) {
        self.vertices.clear();
        self.edges.clear();

        for (id, &position) in brush.unique_vertex_points().iter().enumerate() {
            self.vertices.push(SelectableVertex {
                position,
                id: id as u32,
            });
        }

        let midpoints: Vec<DVec3> = brush.unique_edge_points().to_vec();
        for (id, (&faces, midpoint)) in brush.edge_faces().iter().zip(midpoints).enumerate() {
            self.edges.push(SelectableEdge {
                midpoint,
                faces,
                id: id as u32,
            });
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[SelectableVertex] {
        &self.vertices
    }

    #[must_use]
    pub fn edges(&self) -> &[SelectableEdge] {
        &self.edges
    }
}
