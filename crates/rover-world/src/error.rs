//! Error types for the `rover-world` crate.

use rover_types::{DimensionId, EntityHandle};

/// Errors that can occur while building or editing a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A dimension was not registered.
    #[error("dimension not found: {0}")]
    DimensionNotFound(DimensionId),

    /// A dimension id was registered twice.
    #[error("duplicate dimension id: {0}")]
    DuplicateDimension(DimensionId),

    /// An entity handle does not exist.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityHandle),

    /// World bounds are inconsistent (e.g. `min_y >= max_y`).
    #[error("invalid world bounds: {reason}")]
    InvalidBounds {
        /// Explanation of what is wrong with the bounds.
        reason: String,
    },
}
