//! Force feedback for actuators that are either on or off
//!
//! A GameCube controller has one rumble motor and no intensity control. This
//! crate answers the standard effect lifecycle (download, start, stop,
//! destroy, device commands, status queries) and collapses whatever was asked
//! for into that single bit.
//!
//! The engine holds at most one effect. Timed effects are ended by an
//! [`EffectTimer`] that the host pumps through
//! [`RumbleEffectEngine::poll_timer`].

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod constants;
pub mod effects;
pub mod engine;
pub mod state;
pub mod timer;

pub use constants::*;
pub use effects::*;
pub use engine::{ForceFeedbackTarget, RumbleEffectEngine, RumbleLink};
pub use state::*;
pub use timer::{EffectTimer, TimerTick};

use thiserror::Error;

/// Rejection codes of the effect API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FfbError {
    #[error("effect type or operation not supported")]
    Unsupported,

    #[error("invalid parameter")]
    InvalidParam,

    #[error("invalid download id {0}")]
    InvalidDownloadId(u32),

    #[error("device is paused")]
    DevicePaused,

    /// No free effect slot.
    #[error("out of effect storage")]
    OutOfMemory,

    #[error("target does not provide the rumble interface")]
    NoInterface,

    #[error("actuator write failed: {0}")]
    Device(String),
}

pub type FfbResult<T> = Result<T, FfbError>;
