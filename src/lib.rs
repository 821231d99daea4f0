//! # Fortune Voronoi
//!
//! Voronoi diagrams of two dimensional point sets, built with Fortune's sweep line
//! algorithm.
//!
//! A horizontal sweep line moves from top to bottom over the sites. Above it, the diagram
//! is already final. The *beach line*, a sequence of parabolic arcs, separates the final
//! part from the part that may still change. The arcs' breakpoints trace the diagram's
//! edges and arcs vanish at the diagram's vertices.
//!
//! # Features
//!  * `O(n log n)` construction of the Voronoi diagram of `n` sites
//!  * Supports `f32` and `f64` site coordinates or any type implementing [HasPosition]
//!  * Handles degenerate inputs: duplicate, collinear and co-circular sites, as well as
//!    several topmost sites on the same height
//!  * Unbounded cells are clipped by a configurable [BoundingBox]
//!  * The diagram is stored as a doubly connected edge list that can be traversed
//!    with [handles]
//!  * Optional `serde` support
//!
//! # Example
//!
//! ```
//! use fortune_voronoi::{Point2, VoronoiDiagram, VoronoiError};
//!
//! # fn main() -> Result<(), VoronoiError> {
//! let sites = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(1.0, 1.0),
//! ];
//! let diagram = VoronoiDiagram::new(&sites)?;
//!
//! // The four co-circular sites create a single vertex of degree 4
//! assert_eq!(diagram.num_vertices(), 1);
//! assert_eq!(diagram.vertices().next().unwrap().degree(), 4);
//!
//! for site in 0..sites.len() {
//!     println!("Cell {}: {:?}", site, diagram.cell_polygon(site));
//! }
//! diagram.validate()?;
//! # Ok(()) }
//! ```
//!
//! # Logging
//!
//! The crate emits [tracing](https://docs.rs/tracing) events: sweep summaries on the `debug`
//! level and individual events on the `trace` level. Nothing is printed unless a
//! subscriber is installed.

#![forbid(unsafe_code)]

mod point;
mod voronoi_core;
mod voronoi_diagram;

#[cfg(test)]
mod test_utilities;

pub use point::{HasPosition, Point2, VoronoiNum};

pub use voronoi_core::math::{
    validate_coordinate, validate_site, Circle, InsertionError, MAX_ALLOWED_VALUE,
    MIN_ALLOWED_VALUE,
};

pub use voronoi_core::{
    BoundingBox, BoxSide, Cell, FaceData, LineSideInfo, SweepStatistics, VertexData, VertexKind,
    VoronoiError,
};

pub use voronoi_diagram::{VoronoiDiagram, VoronoiOptions};

pub use voronoi_core::handles;
