use super::handle_defs::*;
use super::iterators::{FaceEdgeIterator, OutEdgeIterator};
use super::*;
use crate::{HasPosition, Point2};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

// Debug implementations
impl<'a, V, F> Debug for VertexHandle<'a, V, F> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(f, "VertexHandle({:?})", self.handle.index())
    }
}

impl<'a, V, F> Debug for DirectedEdgeHandle<'a, V, F> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(
            f,
            "DirectedEdgeHandle - id: {:?} ({:?} -> {:?})",
            self.handle.index(),
            self.from().fix(),
            self.to().fix()
        )
    }
}

impl<'a, V, F> Debug for UndirectedEdgeHandle<'a, V, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> ::std::fmt::Result {
        let [v0, v1] = self.vertices();
        write!(
            f,
            "UndirectedEdgeHandle - id: {:?} ({:?} <-> {:?})",
            self.handle.index(),
            v0.fix(),
            v1.fix(),
        )
    }
}

impl<'a, V, F> Debug for FaceHandle<'a, V, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> ::std::fmt::Result {
        if self.is_outer() {
            write!(f, "OuterFace")
        } else {
            write!(f, "FaceHandle({:?})", self.handle.index())
        }
    }
}

impl FixedDirectedEdgeHandle {
    #[inline]
    pub(crate) fn new_normalized(index: usize) -> Self {
        Self::new(index << 1)
    }

    /// Returns if this edge is the normalized edge of a directed edge pair.
    ///
    /// For every directed edge pair, one edge is marked as the normalized edge. This information
    /// is used to hook up a directed edge handle with its correct half edge storage.
    #[inline]
    pub(crate) fn is_normalized(self) -> bool {
        // Use the last bit to store if this edge is normalized
        self.index() & 0x1 == 0x0
    }

    #[inline]
    pub(crate) fn normalize_index(self) -> usize {
        self.index() & 0x1
    }

    /// Returns this edge with its direction reversed.
    ///
    /// If this edge points from `v0` to `v1`, the returned edge would point from `v1` to `v0`.
    /// Calling `rev` twice will always return the original edge.
    #[inline]
    pub fn rev(self) -> Self {
        // Flip the last bit
        Self::new(self.index() ^ 0x1)
    }

    /// Converts this directed edge handle into an undirected edge handle.
    #[inline]
    pub fn as_undirected(self) -> FixedUndirectedEdgeHandle {
        FixedHandleImpl::new(self.index() >> 1)
    }
}

impl FixedUndirectedEdgeHandle {
    /// Returns the normalized directed edge of this undirected edge.
    #[inline]
    pub fn as_directed(&self) -> FixedDirectedEdgeHandle {
        FixedDirectedEdgeHandle::new_normalized(self.index())
    }

    pub(crate) fn normalized(&self) -> FixedDirectedEdgeHandle {
        self.as_directed()
    }

    pub(crate) fn not_normalized(&self) -> FixedDirectedEdgeHandle {
        self.as_directed().rev()
    }
}

impl FixedFaceHandle {
    /// Returns `true` if this face is the single outer face.
    #[inline]
    pub fn is_outer(&self) -> bool {
        *self == super::super::dcel_operations::OUTER_FACE_HANDLE
    }
}

impl<'a, V, F, Type: Copy> Clone for DynamicHandleImpl<'a, V, F, Type> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V, F, Type: Copy> Copy for DynamicHandleImpl<'a, V, F, Type> {}

impl<'a, V, F, Type: PartialEq> PartialEq for DynamicHandleImpl<'a, V, F, Type> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<'a, V, F, Type: Eq> Eq for DynamicHandleImpl<'a, V, F, Type> {}

impl<'a, V, F, Type: Hash> Hash for DynamicHandleImpl<'a, V, F, Type> {
    fn hash<HA: Hasher>(&self, state: &mut HA) {
        self.handle.hash(state);
    }
}

impl<'a, V, F, Type: Ord> Ord for DynamicHandleImpl<'a, V, F, Type> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.handle.cmp(&other.handle)
    }
}

impl<'a, V, F, Type: PartialOrd> PartialOrd for DynamicHandleImpl<'a, V, F, Type> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.handle.partial_cmp(&other.handle)
    }
}

impl<'a, V, F, Type: Copy + Default> DynamicHandleImpl<'a, V, F, Type> {
    /// Converts this dynamic handle to its fixed variant.
    ///
    /// *See also the [handles module](crate::handles)*
    pub fn fix(&self) -> FixedHandleImpl<Type> {
        self.handle
    }

    /// Returns the internal index of this element.
    ///
    /// Indices of the same handle type are unique and lie in the interval
    /// `0` .. `number_of_elements`.
    pub fn index(&self) -> usize {
        self.handle.index()
    }
}

impl<'a, V, F> VertexHandle<'a, V, F> {
    /// Returns the data associated with this vertex.
    pub fn data(&self) -> &'a V {
        self.dcel.vertex_data(self.handle)
    }

    /// Returns an outgoing edge of this vertex.
    ///
    /// Returns `None` for a vertex without any adjacent edge.
    pub fn out_edge(&self) -> Option<DirectedEdgeHandle<'a, V, F>> {
        self.dcel
            .vertex_out_edge(self.handle)
            .map(|handle| self.dcel.directed_edge(handle))
    }

    /// Returns all directed edges going out of this vertex.
    pub fn out_edges(&self) -> impl Iterator<Item = DirectedEdgeHandle<'a, V, F>> {
        self.out_edge().into_iter().flat_map(OutEdgeIterator::new)
    }

    /// Returns the number of edges adjacent to this vertex.
    pub fn degree(&self) -> usize {
        self.out_edges().count()
    }
}

impl<'a, V: HasPosition, F> VertexHandle<'a, V, F> {
    /// Returns the vertex position.
    pub fn position(&self) -> Point2<V::Scalar> {
        self.data().position()
    }
}

impl<'a, V, F> DirectedEdgeHandle<'a, V, F> {
    /// Returns the edge's origin vertex.
    pub fn from(&self) -> VertexHandle<'a, V, F> {
        let entry = self.dcel.half_edge(self.handle);
        self.dcel.vertex(entry.origin)
    }

    /// Returns the edge's destination vertex.
    pub fn to(&self) -> VertexHandle<'a, V, F> {
        self.rev().from()
    }

    /// Returns this edge in reversed direction.
    #[inline]
    pub fn rev(&self) -> Self {
        self.dcel.directed_edge(self.handle.rev())
    }

    /// Returns the edge that follows this edge along the boundary of its face.
    pub fn next(&self) -> DirectedEdgeHandle<'a, V, F> {
        let entry = self.dcel.half_edge(self.handle);
        self.dcel.directed_edge(entry.next)
    }

    /// Returns the edge that precedes this edge along the boundary of its face.
    pub fn prev(&self) -> DirectedEdgeHandle<'a, V, F> {
        let entry = self.dcel.half_edge(self.handle);
        self.dcel.directed_edge(entry.prev)
    }

    /// Returns the face located to the left of this edge.
    pub fn face(&self) -> FaceHandle<'a, V, F> {
        let entry = self.dcel.half_edge(self.handle);
        self.dcel.face(entry.face)
    }

    /// Converts this directed edge into an undirected edge handle.
    pub fn as_undirected(&self) -> UndirectedEdgeHandle<'a, V, F> {
        self.dcel.undirected_edge(self.handle.as_undirected())
    }

    /// Returns the start and end vertex of this edge.
    pub fn vertices(&self) -> [VertexHandle<'a, V, F>; 2] {
        [self.from(), self.to()]
    }
}

impl<'a, V: HasPosition, F> DirectedEdgeHandle<'a, V, F> {
    /// Returns the start and end position of this edge.
    pub fn positions(&self) -> [Point2<V::Scalar>; 2] {
        [self.from().position(), self.to().position()]
    }

    /// Returns the squared length of this edge.
    pub fn length_2(&self) -> V::Scalar {
        let [from, to] = self.positions();
        from.distance_2(to)
    }
}

impl<'a, V, F> UndirectedEdgeHandle<'a, V, F> {
    /// Returns the normalized directed edge of this undirected edge.
    pub fn as_directed(&self) -> DirectedEdgeHandle<'a, V, F> {
        self.dcel.directed_edge(self.handle.as_directed())
    }

    /// Returns both directed edges of this undirected edge.
    pub fn directed_edges(&self) -> [DirectedEdgeHandle<'a, V, F>; 2] {
        let edge = self.as_directed();
        [edge, edge.rev()]
    }

    /// Returns the end vertices of this edge.
    pub fn vertices(&self) -> [VertexHandle<'a, V, F>; 2] {
        self.as_directed().vertices()
    }
}

impl<'a, V: HasPosition, F> UndirectedEdgeHandle<'a, V, F> {
    /// Returns the end positions of this edge.
    pub fn positions(&self) -> [Point2<V::Scalar>; 2] {
        self.as_directed().positions()
    }

    /// Returns the squared length of this edge.
    pub fn length_2(&self) -> V::Scalar {
        self.as_directed().length_2()
    }
}

impl<'a, V, F> FaceHandle<'a, V, F> {
    /// Returns the data associated with this face.
    pub fn data(&self) -> &'a F {
        self.dcel.face_data(self.handle)
    }

    /// Returns `true` if this handle refers to the single outer face.
    pub fn is_outer(&self) -> bool {
        self.handle.is_outer()
    }

    /// Returns an edge of this face's boundary.
    pub fn adjacent_edge(&self) -> Option<DirectedEdgeHandle<'a, V, F>> {
        self.dcel
            .face_adjacent_edge(self.handle)
            .map(|handle| self.dcel.directed_edge(handle))
    }

    /// Returns all edges of this face's boundary.
    ///
    /// The edges of an inner face are returned in counterclockwise order, the edges of the
    /// outer face in clockwise order.
    pub fn edges(&self) -> impl Iterator<Item = DirectedEdgeHandle<'a, V, F>> {
        self.adjacent_edge()
            .into_iter()
            .flat_map(FaceEdgeIterator::new)
    }
}
