use thiserror::Error;

use super::math::InsertionError;

/// Errors that abort the construction of a [VoronoiDiagram](crate::VoronoiDiagram).
///
/// No partially constructed diagram is ever returned alongside an error.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum VoronoiError {
    /// A site's position cannot be used, see [InsertionError].
    #[error("invalid site position: {0}")]
    Insertion(#[from] InsertionError),

    /// The sweep or the edge list reached an inconsistent state.
    ///
    /// `event` names the step that detected the problem, e.g. the circle event and its
    /// beach line triple.
    #[error("invariant violated at {event}: {detail}")]
    InvariantViolation { event: String, detail: String },

    /// The unbounded edges could not be attached to the bounding box, even after
    /// enlarging it `attempts` times.
    #[error("failed to attach unbounded edges to the bounding box after {attempts} attempts")]
    BoundingBoxAttachment { attempts: usize },
}

impl VoronoiError {
    pub(crate) fn invariant(event: impl Into<String>, detail: impl Into<String>) -> Self {
        VoronoiError::InvariantViolation {
            event: event.into(),
            detail: detail.into(),
        }
    }
}
