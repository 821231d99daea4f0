use super::handles::iterators::*;
use super::handles::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct FaceEntry<F> {
    pub(super) adjacent_edge: Option<FixedDirectedEdgeHandle>,
    pub(super) data: F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct VertexEntry<V> {
    pub(super) data: V,
    pub(super) out_edge: Option<FixedDirectedEdgeHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct EdgeEntry {
    pub entries: [HalfEdgeEntry; 2],
}

impl EdgeEntry {
    pub(super) fn new(normalized: HalfEdgeEntry, not_normalized: HalfEdgeEntry) -> Self {
        EdgeEntry {
            entries: [normalized, not_normalized],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct HalfEdgeEntry {
    pub next: FixedDirectedEdgeHandle,
    pub prev: FixedDirectedEdgeHandle,
    pub face: FixedFaceHandle,
    pub origin: FixedVertexHandle,
}

/// A finalized doubly connected edge list.
///
/// Every half edge has an origin, a face and next / prev pointers. Instances are only
/// created by [DcelBuilder::finalize](super::DcelBuilder::finalize) which refuses to emit
/// a list with missing pointers.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct Dcel<V, F> {
    pub(super) vertices: Vec<VertexEntry<V>>,
    pub(super) faces: Vec<FaceEntry<F>>,
    pub(super) edges: Vec<EdgeEntry>,
}

impl<V, F> Dcel<V, F> {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_directed_edges(&self) -> usize {
        self.edges.len() * 2
    }

    pub fn num_undirected_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, handle: FixedVertexHandle) -> VertexHandle<V, F> {
        DynamicHandleImpl::new(self, handle)
    }

    pub fn vertex_out_edge(&self, handle: FixedVertexHandle) -> Option<FixedDirectedEdgeHandle> {
        self.vertices[handle.index()].out_edge
    }

    pub fn directed_edge(&self, handle: FixedDirectedEdgeHandle) -> DirectedEdgeHandle<V, F> {
        DirectedEdgeHandle::new(self, handle)
    }

    pub fn undirected_edge(
        &self,
        handle: FixedUndirectedEdgeHandle,
    ) -> UndirectedEdgeHandle<V, F> {
        UndirectedEdgeHandle::new(self, handle)
    }

    pub fn outer_face(&self) -> FaceHandle<V, F> {
        self.face(super::dcel_operations::OUTER_FACE_HANDLE)
    }

    pub(super) fn half_edge(&self, handle: FixedDirectedEdgeHandle) -> &HalfEdgeEntry {
        &self.edges[handle.as_undirected().index()].entries[handle.normalize_index()]
    }

    pub(super) fn half_edge_mut(&mut self, handle: FixedDirectedEdgeHandle) -> &mut HalfEdgeEntry {
        &mut self.edges[handle.as_undirected().index()].entries[handle.normalize_index()]
    }

    pub fn face(&self, handle: FixedFaceHandle) -> FaceHandle<V, F> {
        DynamicHandleImpl::new(self, handle)
    }

    pub fn face_data(&self, handle: FixedFaceHandle) -> &F {
        &self.faces[handle.index()].data
    }

    pub fn face_adjacent_edge(&self, handle: FixedFaceHandle) -> Option<FixedDirectedEdgeHandle> {
        self.faces[handle.index()].adjacent_edge
    }

    pub fn vertex_data(&self, handle: FixedVertexHandle) -> &V {
        &self.vertices[handle.index()].data
    }

    pub fn directed_edges(&self) -> DirectedEdgeIterator<V, F> {
        DirectedEdgeIterator::new(self)
    }

    pub fn undirected_edges(&self) -> UndirectedEdgeIterator<V, F> {
        UndirectedEdgeIterator::new(self)
    }

    pub fn fixed_undirected_edges(&self) -> FixedUndirectedEdgeIterator {
        FixedUndirectedEdgeIterator::new(self.num_undirected_edges())
    }

    pub fn vertices(&self) -> VertexIterator<V, F> {
        VertexIterator::new(self)
    }

    pub fn faces(&self) -> FaceIterator<V, F> {
        FaceIterator::new(self)
    }

    #[cfg(any(test, fuzzing))]
    pub fn sanity_check(&self) {
        for (index, face) in self.faces.iter().enumerate() {
            if let Some(edge) = face.adjacent_edge {
                assert_eq!(
                    self.directed_edge(edge).face().fix(),
                    FixedFaceHandle::new(index)
                );
            }
        }
        for (index, vertex) in self.vertices.iter().enumerate() {
            let out_edge = vertex.out_edge.expect("Vertex without out edge");
            assert_eq!(
                self.directed_edge(out_edge).from().fix(),
                FixedVertexHandle::new(index)
            );
        }

        for edge in self.directed_edges() {
            assert_eq!(edge, edge.next().prev());
            assert_eq!(edge, edge.prev().next());
            assert_eq!(edge, edge.rev().rev());
            assert_ne!(edge.from(), edge.to());
            assert_eq!(edge.face(), edge.next().face());
            assert_eq!(edge.to(), edge.next().from());
        }
    }
}
