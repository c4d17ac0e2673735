//! # Motion Ramp Controller
//!
//! The ramp controller converts a joint target angle into a sequence of pulse width commands,
//! spread evenly over the demanded duration at a fixed step cadence, so that a servo never
//! jumps between positions.
//!
//! The controller is the sole owner of the [`ChannelState`], the record of the last pulse
//! written to each channel. Every ramp starts from that pulse, which keeps consecutive moves
//! continuous. A ramp that fails or is cancelled part way leaves the state at the last pulse
//! that was actually written.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod channel_state;
mod params;
mod pulse;
mod state;
mod ticker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use channel_state::*;
pub use params::*;
pub use pulse::*;
pub use state::*;
pub use ticker::*;

use crate::servo_ctrl::{Channel, ServoError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lowest angle a joint can be commanded to.
///
/// Units: degrees
pub const MIN_ANGLE_DEG: f64 = 0.0;

/// Highest angle a joint can be commanded to.
///
/// Units: degrees
pub const MAX_ANGLE_DEG: f64 = 180.0;

/// Pulse changes of this size or smaller are written directly rather than ramped.
///
/// Units: microseconds
pub const DIRECT_WRITE_THRESHOLD_US: i32 = 1;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during RampCtrl operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RampError {
    #[error("Invalid angle \"{0}\", angles must be numbers between 0 and 180 degrees")]
    InvalidAngle(String),

    #[error("Actuation of {channel} failed: {source}")]
    ActuationFailure {
        channel: Channel,
        source: ServoError,
    },

    #[error("Motion cancelled")]
    Cancelled,

    #[error("Invalid ramp parameters: {0}")]
    InvalidParams(String),
}
