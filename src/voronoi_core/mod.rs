mod beach_line;
mod bounding_box;
mod circle_event;
mod dcel;
mod dcel_builder;
mod dcel_operations;
mod degenerate;
mod elements;
mod error;
mod event_queue;
pub mod handles;
mod line_side_info;
mod site_event;
mod sweep;
mod sweep_tree;

pub(crate) mod math;

pub use bounding_box::{BoundingBox, BoxSide};
pub use dcel::Dcel;
pub use elements::{Cell, FaceData, SweepStatistics, VertexData, VertexKind};
pub use error::VoronoiError;
pub use line_side_info::LineSideInfo;

pub(crate) use bounding_box::attach_to_bounding_box;
pub(crate) use degenerate::merge_zero_length_edges;
pub(crate) use sweep::{Sweep, SweepResult};
