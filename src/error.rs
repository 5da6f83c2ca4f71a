use thiserror::Error;

use crate::cell::Owner;
use crate::grid::Position;

/// Errors raised while setting up or running a generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// The grid cannot hold the center block and the four carver seeds.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal logic error, the grid refused a mutation.
    #[error("invariant violated at {position:?}: {reason}")]
    Invariant {
        position: Position,
        reason: &'static str,
    },

    #[error("failed to spawn thread: {0}")]
    Spawn(String),

    #[error("carver {0:?} panicked")]
    CarverPanicked(Owner),

    #[error("step coordinator panicked")]
    CoordinatorPanicked,
}

pub type Result<T, E = MazeError> = std::result::Result<T, E>;
