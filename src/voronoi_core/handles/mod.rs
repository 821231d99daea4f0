//! Handle types used for navigating a Voronoi diagram.
//!
//! # Fixed and dynamic handles
//!
//! A *fixed handle* is a plain index into one of the diagram's element lists. It is `Copy`
//! and does not borrow the diagram. A *dynamic handle* additionally keeps a reference to
//! the diagram and allows to explore the element's neighborhood, e.g. by calling
//! [DirectedEdgeHandle::next], [DirectedEdgeHandle::rev] or [FaceHandle::edges].
//!
//! Use `fix()` to convert a dynamic handle into a fixed handle and
//! [VoronoiDiagram::directed_edge](crate::VoronoiDiagram::directed_edge) and its siblings for
//! the other direction.
//!
//! # Half edge conventions
//!
//! Every undirected edge consists of two directed edges (half edges) pointing in opposite
//! directions. A half edge's face always lies on its left side. Consequently, the edges of
//! any bounded face are ordered counterclockwise and the edges of the outer face are ordered
//! clockwise.
mod handle_defs;
mod handle_impls;
pub mod iterators;

pub use handle_defs::{
    DirectedEdgeTag, DynamicHandleImpl, FaceTag, FixedHandleImpl, UndirectedEdgeTag, VertexTag,
};

pub(crate) use handle_defs::new_fixed_face_handle;

use crate::voronoi_core::dcel_operations;
use crate::{FaceData, VertexData};

/// Refers to the single outer face that lies outside of the bounding box.
pub const OUTER_FACE: FixedFaceHandle = dcel_operations::OUTER_FACE_HANDLE;

/// Fixed handle to a vertex.
///
/// *See also the [handles](crate::handles) module.*
pub type FixedVertexHandle = FixedHandleImpl<VertexTag>;

/// Fixed handle to a directed edge.
///
/// *See also the [handles](crate::handles) module.*
pub type FixedDirectedEdgeHandle = FixedHandleImpl<DirectedEdgeTag>;

/// Fixed handle to an undirected edge.
///
/// *See also the [handles](crate::handles) module.*
pub type FixedUndirectedEdgeHandle = FixedHandleImpl<UndirectedEdgeTag>;

/// Fixed handle to a face.
///
/// *See also the [handles](crate::handles) module.*
pub type FixedFaceHandle = FixedHandleImpl<FaceTag>;

/// Handle to a directed edge (half edge) of a Voronoi diagram.
///
/// Use [next()](#method.next), [prev()](#method.prev), [rev()](#method.rev) to access
/// any adjacent edge and [face()](#method.face), [from()](#method.from()) and [to()](#method.to())
/// to access the adjacent face and vertices.
pub type DirectedEdgeHandle<'a, V = VertexData, F = FaceData> =
    DynamicHandleImpl<'a, V, F, DirectedEdgeTag>;

/// Handle to an undirected edge of a Voronoi diagram.
pub type UndirectedEdgeHandle<'a, V = VertexData, F = FaceData> =
    DynamicHandleImpl<'a, V, F, UndirectedEdgeTag>;

/// Handle to a vertex of a Voronoi diagram.
///
/// Vertices are either Voronoi vertices (centers of empty circles through three or more
/// sites) or boundary vertices created where the diagram is clipped by its bounding box.
pub type VertexHandle<'a, V = VertexData, F = FaceData> = DynamicHandleImpl<'a, V, F, VertexTag>;

/// Handle to a face of a Voronoi diagram.
///
/// Every distinct site owns exactly one face, its Voronoi cell. Additionally, there is
/// a single [outer face](OUTER_FACE) surrounding the bounding box.
pub type FaceHandle<'a, V = VertexData, F = FaceData> = DynamicHandleImpl<'a, V, F, FaceTag>;
