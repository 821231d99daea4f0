use std::convert::TryInto;

use super::super::Dcel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub trait DcelElementType: Sized + Default {
    fn num_elements<V, F>(dcel: &Dcel<V, F>) -> usize;
}

/// Internal type definition that is only exposed for documentation purposes.
///
/// Rust will currently not generate documentation for type definitions depending
/// `pub(crate)` types, see [#32077](https://github.com/rust-lang/rust/issues/32077).
///
/// Do not use these types. Their removal will not be considered a breaking change.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct FixedHandleImpl<Type> {
    index: u32,
    ty: Type,
}

impl<Type> std::fmt::Debug for FixedHandleImpl<Type> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedHandle")
            .field("index", &self.index)
            .finish()
    }
}

pub const fn new_fixed_face_handle(index: usize) -> FixedHandleImpl<FaceTag> {
    FixedHandleImpl {
        index: index as u32,
        ty: FaceTag,
    }
}

impl<Type: Default> FixedHandleImpl<Type> {
    pub(crate) fn new(index: usize) -> Self {
        Self::new_internal(
            index
                .try_into()
                .expect("Index too big - at most 2^32 elements supported"),
        )
    }

    /// Returns the internal index of this element.
    ///
    /// Indices of the same element type are consecutive and start at zero.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    fn new_internal(index: u32) -> Self {
        Self {
            index,
            ty: Type::default(),
        }
    }
}

/// Internal type definition that is only exposed for documentation purposes.
///
/// Rust will currently not generate documentation for type definitions depending
/// `pub(crate)` types, see [#32077](https://github.com/rust-lang/rust/issues/32077).
///
/// Do not use these types. Their removal will not be considered a breaking change.
pub struct DynamicHandleImpl<'a, V, F, Type> {
    pub(super) dcel: &'a Dcel<V, F>,
    pub(super) handle: FixedHandleImpl<Type>,
}

impl<'a, V, F, Type: Default> DynamicHandleImpl<'a, V, F, Type> {
    #[inline]
    pub(crate) fn new(dcel: &'a Dcel<V, F>, handle: FixedHandleImpl<Type>) -> Self {
        Self { dcel, handle }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct VertexTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct DirectedEdgeTag;
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct UndirectedEdgeTag;
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct FaceTag;

impl DcelElementType for VertexTag {
    fn num_elements<V, F>(dcel: &Dcel<V, F>) -> usize {
        dcel.num_vertices()
    }
}

impl DcelElementType for DirectedEdgeTag {
    fn num_elements<V, F>(dcel: &Dcel<V, F>) -> usize {
        dcel.num_directed_edges()
    }
}

impl DcelElementType for UndirectedEdgeTag {
    fn num_elements<V, F>(dcel: &Dcel<V, F>) -> usize {
        dcel.num_undirected_edges()
    }
}

impl DcelElementType for FaceTag {
    fn num_elements<V, F>(dcel: &Dcel<V, F>) -> usize {
        dcel.num_faces()
    }
}
