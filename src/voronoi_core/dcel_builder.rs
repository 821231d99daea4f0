use super::dcel::{Dcel, EdgeEntry, FaceEntry, HalfEdgeEntry, VertexEntry};
use super::handles::*;
use super::VoronoiError;

const FINALIZE: &str = "edge list finalization";

#[derive(Clone, Copy, Debug)]
struct PendingHalfEdge {
    face: FixedFaceHandle,
    origin: Option<FixedVertexHandle>,
    next: Option<FixedDirectedEdgeHandle>,
}

/// An edge list under construction.
///
/// The sweep creates half edges long before their end points are known. A builder
/// allows half edges with missing origins and successors. [DcelBuilder::finalize] checks
/// that every pointer has been set and converts the builder into a [Dcel].
#[derive(Clone, Debug)]
pub struct DcelBuilder<V, F> {
    vertices: Vec<V>,
    faces: Vec<F>,
    edges: Vec<[PendingHalfEdge; 2]>,
}

impl<V, F> DcelBuilder<V, F> {
    /// Creates a builder that only contains the outer face.
    pub fn new(outer_face_data: F) -> Self {
        Self {
            vertices: Vec::new(),
            faces: vec![outer_face_data],
            edges: Vec::new(),
        }
    }

    pub fn add_face(&mut self, data: F) -> FixedFaceHandle {
        self.faces.push(data);
        FixedFaceHandle::new(self.faces.len() - 1)
    }

    pub fn add_vertex(&mut self, data: V) -> FixedVertexHandle {
        self.vertices.push(data);
        FixedVertexHandle::new(self.vertices.len() - 1)
    }

    /// Creates a new undirected edge separating two faces.
    ///
    /// Returns the normalized half edge which lies in `face`. Its twin lies in `twin_face`.
    pub fn add_edge(
        &mut self,
        face: FixedFaceHandle,
        twin_face: FixedFaceHandle,
    ) -> FixedDirectedEdgeHandle {
        let pending = |face| PendingHalfEdge {
            face,
            origin: None,
            next: None,
        };
        self.edges.push([pending(face), pending(twin_face)]);
        FixedDirectedEdgeHandle::new_normalized(self.edges.len() - 1)
    }

    fn half_edge(&self, edge: FixedDirectedEdgeHandle) -> &PendingHalfEdge {
        &self.edges[edge.as_undirected().index()][edge.normalize_index()]
    }

    fn half_edge_mut(&mut self, edge: FixedDirectedEdgeHandle) -> &mut PendingHalfEdge {
        &mut self.edges[edge.as_undirected().index()][edge.normalize_index()]
    }

    pub fn set_origin(&mut self, edge: FixedDirectedEdgeHandle, origin: FixedVertexHandle) {
        self.half_edge_mut(edge).origin = Some(origin);
    }

    pub fn origin(&self, edge: FixedDirectedEdgeHandle) -> Option<FixedVertexHandle> {
        self.half_edge(edge).origin
    }

    pub fn face(&self, edge: FixedDirectedEdgeHandle) -> FixedFaceHandle {
        self.half_edge(edge).face
    }

    #[cfg(test)]
    pub fn next(&self, edge: FixedDirectedEdgeHandle) -> Option<FixedDirectedEdgeHandle> {
        self.half_edge(edge).next
    }

    /// Makes `next` the successor of `prev` along their common face.
    pub fn connect(&mut self, prev: FixedDirectedEdgeHandle, next: FixedDirectedEdgeHandle) {
        self.half_edge_mut(prev).next = Some(next);
    }

    pub fn face_data(&self, face: FixedFaceHandle) -> &F {
        &self.faces[face.index()]
    }

    pub fn vertex_data(&self, vertex: FixedVertexHandle) -> &V {
        &self.vertices[vertex.index()]
    }

    pub fn vertex_data_iter(&self) -> impl Iterator<Item = &V> {
        self.vertices.iter()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_undirected_edges(&self) -> usize {
        self.edges.len()
    }

    /// Checks all pointers and converts this builder into a [Dcel].
    ///
    /// Fails if any half edge misses its origin or successor, if two half edges share a
    /// successor, if consecutive half edges don't meet in a common vertex or if a face's
    /// boundary is not a single closed cycle.
    pub fn finalize(self) -> Result<Dcel<V, F>, VoronoiError> {
        let num_directed = self.edges.len() * 2;
        let directed = |index: usize| FixedDirectedEdgeHandle::new(index);

        let mut origins = Vec::with_capacity(num_directed);
        let mut nexts = Vec::with_capacity(num_directed);
        for index in 0..num_directed {
            let half_edge = self.half_edge(directed(index));
            let origin = half_edge.origin.ok_or_else(|| {
                VoronoiError::invariant(FINALIZE, format!("half edge {} has no origin", index))
            })?;
            let next = half_edge.next.ok_or_else(|| {
                VoronoiError::invariant(FINALIZE, format!("half edge {} has no successor", index))
            })?;
            origins.push(origin);
            nexts.push(next);
        }

        let mut prevs: Vec<Option<FixedDirectedEdgeHandle>> = vec![None; num_directed];
        for (index, next) in nexts.iter().enumerate() {
            if let Some(other) = prevs[next.index()] {
                return Err(VoronoiError::invariant(
                    FINALIZE,
                    format!(
                        "half edges {} and {} share the successor {}",
                        other.index(),
                        index,
                        next.index()
                    ),
                ));
            }
            prevs[next.index()] = Some(directed(index));

            let to = origins[directed(index).rev().index()];
            if to != origins[next.index()] {
                return Err(VoronoiError::invariant(
                    FINALIZE,
                    format!(
                        "half edge {} ends at vertex {} but its successor {} starts at vertex {}",
                        index,
                        to.index(),
                        next.index(),
                        origins[next.index()].index()
                    ),
                ));
            }
            if self.half_edge(directed(index)).face != self.half_edge(*next).face {
                return Err(VoronoiError::invariant(
                    FINALIZE,
                    format!(
                        "half edge {} and its successor {} lie in different faces",
                        index,
                        next.index()
                    ),
                ));
            }
        }

        // Every half edge has exactly one successor, no successor is shared and there are
        // as many half edges as successors. Thus every half edge has a predecessor.
        let edges = self
            .edges
            .iter()
            .enumerate()
            .map(|(index, [normalized, not_normalized])| {
                let entry = |half_edge: &PendingHalfEdge, handle: FixedDirectedEdgeHandle| {
                    HalfEdgeEntry {
                        next: nexts[handle.index()],
                        prev: prevs[handle.index()].unwrap_or(handle),
                        face: half_edge.face,
                        origin: origins[handle.index()],
                    }
                };
                let handle = FixedDirectedEdgeHandle::new_normalized(index);
                EdgeEntry::new(entry(normalized, handle), entry(not_normalized, handle.rev()))
            })
            .collect::<Vec<_>>();

        let mut vertices = self
            .vertices
            .into_iter()
            .map(|data| VertexEntry {
                data,
                out_edge: None,
            })
            .collect::<Vec<_>>();
        let mut faces = self
            .faces
            .into_iter()
            .map(|data| FaceEntry {
                data,
                adjacent_edge: None,
            })
            .collect::<Vec<_>>();

        for index in 0..num_directed {
            let handle = directed(index);
            let half_edge =
                &edges[handle.as_undirected().index()].entries[handle.normalize_index()];
            vertices[half_edge.origin.index()]
                .out_edge
                .get_or_insert(handle);
            faces[half_edge.face.index()]
                .adjacent_edge
                .get_or_insert(handle);
        }

        if let Some(index) = vertices.iter().position(|vertex| vertex.out_edge.is_none()) {
            return Err(VoronoiError::invariant(
                FINALIZE,
                format!("vertex {} has no adjacent edge", index),
            ));
        }
        if num_directed > 0 {
            if let Some(index) = faces.iter().position(|face| face.adjacent_edge.is_none()) {
                return Err(VoronoiError::invariant(
                    FINALIZE,
                    format!("face {} has no adjacent edge", index),
                ));
            }
        }

        let dcel = Dcel {
            vertices,
            faces,
            edges,
        };
        check_face_cycles(&dcel)?;
        Ok(dcel)
    }
}

/// Walks around every face and checks that all half edges are part of exactly one
/// face cycle.
fn check_face_cycles<V, F>(dcel: &Dcel<V, F>) -> Result<(), VoronoiError> {
    let mut visited = vec![false; dcel.num_directed_edges()];
    for face in dcel.faces() {
        let Some(start) = face.adjacent_edge() else {
            continue;
        };
        let mut current = start;
        loop {
            if visited[current.index()] {
                return Err(VoronoiError::invariant(
                    FINALIZE,
                    format!("the cycle of face {} is not closed", face.index()),
                ));
            }
            visited[current.index()] = true;
            current = current.next();
            if current == start {
                break;
            }
        }
    }

    if let Some(index) = visited.iter().position(|visited| !visited) {
        let edge = dcel.directed_edge(FixedDirectedEdgeHandle::new(index));
        return Err(VoronoiError::invariant(
            FINALIZE,
            format!(
                "half edge {} is not part of the boundary cycle of face {}",
                index,
                edge.face().index()
            ),
        ));
    }
    Ok(())
}
