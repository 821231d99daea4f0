//! Iterators over the elements of a Voronoi diagram.
use core::marker::PhantomData;

use super::handle_defs::{DcelElementType, DynamicHandleImpl, FixedHandleImpl};
use super::{DirectedEdgeHandle, DirectedEdgeTag, FaceTag, UndirectedEdgeTag, VertexTag};
use crate::voronoi_core::Dcel;

pub struct FixedHandleIterator<Type> {
    range: std::ops::Range<usize>,
    ty: PhantomData<Type>,
}

impl<Type: Default> FixedHandleIterator<Type> {
    pub(crate) fn new(to: usize) -> Self {
        Self {
            range: 0..to,
            ty: Default::default(),
        }
    }
}

impl<Type: Default> Iterator for FixedHandleIterator<Type> {
    type Item = FixedHandleImpl<Type>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(FixedHandleImpl::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

pub struct DynamicHandleIterator<'a, V, F, Type> {
    fixed_iterator: FixedHandleIterator<Type>,
    dcel: &'a Dcel<V, F>,
}

impl<'a, V, F, Type> DynamicHandleIterator<'a, V, F, Type>
where
    Type: DcelElementType,
{
    pub(crate) fn new(dcel: &'a Dcel<V, F>) -> Self {
        DynamicHandleIterator {
            fixed_iterator: FixedHandleIterator::new(Type::num_elements(dcel)),
            dcel,
        }
    }
}

impl<'a, V, F, Type> Iterator for DynamicHandleIterator<'a, V, F, Type>
where
    Type: DcelElementType,
{
    type Item = DynamicHandleImpl<'a, V, F, Type>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fixed_iterator
            .next()
            .map(|handle| DynamicHandleImpl::new(self.dcel, handle))
    }
}

/// An iterator over all vertices.
pub type VertexIterator<'a, V, F> = DynamicHandleIterator<'a, V, F, VertexTag>;
/// An iterator over all directed edges.
pub type DirectedEdgeIterator<'a, V, F> = DynamicHandleIterator<'a, V, F, DirectedEdgeTag>;
/// An iterator over all undirected edges.
pub type UndirectedEdgeIterator<'a, V, F> = DynamicHandleIterator<'a, V, F, UndirectedEdgeTag>;
/// An iterator over all fixed undirected edge handles.
pub type FixedUndirectedEdgeIterator = FixedHandleIterator<UndirectedEdgeTag>;
/// An iterator over all faces, including the outer face.
pub type FaceIterator<'a, V, F> = DynamicHandleIterator<'a, V, F, FaceTag>;

pub trait NextBackFn {
    fn next<V, F>(edge_handle: DirectedEdgeHandle<V, F>) -> DirectedEdgeHandle<V, F>;

    fn next_back<V, F>(edge_handle: DirectedEdgeHandle<V, F>) -> DirectedEdgeHandle<V, F>;
}

/// Walks along the boundary of a face.
pub struct FaceEdgesFn;

impl NextBackFn for FaceEdgesFn {
    fn next<V, F>(edge_handle: DirectedEdgeHandle<V, F>) -> DirectedEdgeHandle<V, F> {
        edge_handle.next()
    }

    fn next_back<V, F>(edge_handle: DirectedEdgeHandle<V, F>) -> DirectedEdgeHandle<V, F> {
        edge_handle.prev()
    }
}

/// Rotates around the origin of an edge.
pub struct OutEdgesFn;

impl NextBackFn for OutEdgesFn {
    fn next<V, F>(edge_handle: DirectedEdgeHandle<V, F>) -> DirectedEdgeHandle<V, F> {
        edge_handle.rev().next()
    }

    fn next_back<V, F>(edge_handle: DirectedEdgeHandle<V, F>) -> DirectedEdgeHandle<V, F> {
        edge_handle.prev().rev()
    }
}

/// Iterates over a closed ring of directed edges, e.g. the boundary of a Voronoi cell.
pub struct CircularIterator<'a, V, F, NB> {
    current_handle: DirectedEdgeHandle<'a, V, F>,
    final_handle: DirectedEdgeHandle<'a, V, F>,
    iteration_finished: bool,
    next_back_fn: PhantomData<NB>,
}

impl<'a, V, F, NB: NextBackFn> CircularIterator<'a, V, F, NB> {
    pub(crate) fn new(start_edge: DirectedEdgeHandle<'a, V, F>) -> Self {
        CircularIterator {
            current_handle: start_edge,
            final_handle: start_edge,
            iteration_finished: false,
            next_back_fn: Default::default(),
        }
    }
}

impl<'a, V, F, NB: NextBackFn> Iterator for CircularIterator<'a, V, F, NB> {
    type Item = DirectedEdgeHandle<'a, V, F>;

    fn next(&mut self) -> Option<DirectedEdgeHandle<'a, V, F>> {
        if self.iteration_finished {
            return None;
        }
        let result = self.current_handle;
        self.current_handle = NB::next(self.current_handle);
        if self.current_handle == self.final_handle {
            self.iteration_finished = true;
        }
        Some(result)
    }
}

impl<'a, V, F, NB: NextBackFn> DoubleEndedIterator for CircularIterator<'a, V, F, NB> {
    fn next_back(&mut self) -> Option<DirectedEdgeHandle<'a, V, F>> {
        if self.iteration_finished {
            return None;
        }
        self.final_handle = NB::next_back(self.final_handle);
        if self.current_handle == self.final_handle {
            self.iteration_finished = true;
        }
        Some(self.final_handle)
    }
}

/// Iterates over the boundary edges of a face in counterclockwise order.
pub type FaceEdgeIterator<'a, V, F> = CircularIterator<'a, V, F, FaceEdgesFn>;

/// Iterates over all edges starting at a vertex.
pub type OutEdgeIterator<'a, V, F> = CircularIterator<'a, V, F, OutEdgesFn>;
