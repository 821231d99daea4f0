use super::handles::FixedFaceHandle;
use crate::{Circle, HasPosition, Point2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Describes how a vertex of a Voronoi diagram was created.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum VertexKind {
    /// A Voronoi vertex, created by a circle event.
    ///
    /// `circle` is the empty circle through the sites whose cells meet at this vertex.
    Voronoi { circle: Circle },
    /// A vertex on the bounding box, either a corner or the point where a Voronoi edge
    /// leaves the box.
    Boundary,
}

/// The data stored for every vertex of a Voronoi diagram.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct VertexData {
    pub(crate) position: Point2<f64>,
    pub(crate) kind: VertexKind,
}

impl VertexData {
    pub(crate) fn voronoi(circle: Circle) -> Self {
        Self {
            position: circle.center,
            kind: VertexKind::Voronoi { circle },
        }
    }

    pub(crate) fn boundary(position: Point2<f64>) -> Self {
        Self {
            position,
            kind: VertexKind::Boundary,
        }
    }

    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    /// Returns the empty circle of a Voronoi vertex or `None` for boundary vertices.
    pub fn circle(&self) -> Option<Circle> {
        match self.kind {
            VertexKind::Voronoi { circle } => Some(circle),
            VertexKind::Boundary => None,
        }
    }

    pub fn is_voronoi_vertex(&self) -> bool {
        matches!(self.kind, VertexKind::Voronoi { .. })
    }
}

impl HasPosition for VertexData {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// The data stored for every face of a Voronoi diagram.
///
/// Every face except the outer face is the cell of exactly one site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct FaceData {
    pub(crate) site: Option<usize>,
}

impl FaceData {
    /// Returns the index of the face's site or `None` for the outer face.
    pub fn site(&self) -> Option<usize> {
        self.site
    }
}

/// The cell of an input site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum Cell {
    /// The site owns this face of the diagram.
    Region(FixedFaceHandle),
    /// The site shares its position with the earlier site `of` and has no cell of its own.
    Duplicate { of: usize },
}

impl Cell {
    /// Returns the cell's face or `None` for duplicate sites.
    pub fn face(&self) -> Option<FixedFaceHandle> {
        match self {
            Cell::Region(face) => Some(*face),
            Cell::Duplicate { .. } => None,
        }
    }
}

/// Counters collected while a diagram is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct SweepStatistics {
    /// Number of processed site events. Duplicate sites are not counted.
    pub site_events: usize,
    /// Number of processed circle events.
    pub circle_events: usize,
    /// Number of circle events that were invalidated before being processed.
    pub false_alarms: usize,
    /// Number of sites sharing their position with an earlier site.
    pub duplicate_sites: usize,
    /// Number of zero length edges removed after the sweep.
    pub zero_length_merges: usize,
    /// Number of bounding boxes tried until all unbounded edges could be attached.
    pub box_attempts: usize,
}
