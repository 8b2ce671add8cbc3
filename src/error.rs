//! Error types for sluice.

use thiserror::Error;

use crate::caps::Caps;

/// Result type alias using sluice's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by stage business logic.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Main error type for sluice operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Declared capabilities of two endpoints do not fit together.
    ///
    /// Raised before any wiring changes, so the caller may retry with a
    /// compatible pairing.
    #[error("type mismatch: {produced} cannot flow into a consumer accepting {accepted}")]
    TypeMismatch {
        /// Caps declared by the producing side.
        produced: Caps,
        /// Caps declared by the consuming side.
        accepted: Caps,
    },

    /// Upstream pause was engaged while it was already engaged.
    #[error("upstream is already paused")]
    DoublePause,

    /// Switching was requested where it is not possible.
    #[error("invalid switch state: {0}")]
    InvalidSwitchState(String),

    /// A stage was re-entered while one of its own hooks was running.
    #[error("stage {0} is busy")]
    StageBusy(String),

    /// A producer endpoint outlived the coordinator it belongs to.
    #[error("coordinator has been dropped")]
    Detached,

    /// A chain was built without any stages.
    #[error("a chain needs at least one stage")]
    EmptyChain,

    /// Failure raised by a stage while processing.
    #[error("stage failed: {0}")]
    Stage(#[source] BoxError),
}

impl Error {
    /// Wrap an arbitrary stage failure.
    pub fn stage<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Stage(err.into())
    }

    /// Check if this is a [`Error::TypeMismatch`].
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
