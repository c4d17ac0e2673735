//! # Gait Sequencer
//!
//! The gait sequencer moves several joints together. A [`GaitStep`] is a set of joint targets
//! that is dispatched as one logical tick, and a [`GaitMacro`] is a fixed, named list of steps
//! making up one unit of motion (one step forward, one increment of rotation).
//!
//! Macros are plain data held in a [`GaitLibrary`]. The built-in library can be replaced by one
//! loaded from a gait file without touching the sequencing logic.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod library;
mod params;
mod state;
mod step;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use library::*;
pub use params::*;
pub use state::*;
pub use step::*;

use crate::{ramp_ctrl::RampError, servo_ctrl::{JointError, JointId}};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the macro moving the walker one unit forward.
pub const FORWARD_STEP: &str = "forward-step";

/// Name of the macro rotating the walker one increment anticlockwise.
pub const ROTATE_STEP: &str = "rotate-step";

/// Name of the macro rotating the walker one increment clockwise.
pub const ROTATE_STEP_CW: &str = "rotate-step-cw";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during GaitSeq operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaitError {
    #[error("Invalid angles demanded for {0:?}")]
    InvalidAngles(Vec<JointId>),

    #[error("Could not move {joint}: {source}")]
    Actuation {
        joint: JointId,
        source: RampError,
    },

    #[error("Motion cancelled")]
    Cancelled,

    #[error("No gait macro named \"{0}\"")]
    UnknownMacro(String),

    #[error("Macro \"{name}\" failed on repetition {repetition}, step {step}: {source}")]
    MacroFailed {
        name: String,
        repetition: usize,
        step: usize,
        source: Box<GaitError>,
    },

    #[error("Invalid gait definition: {0}")]
    InvalidGait(String),

    #[error(transparent)]
    Joint(#[from] JointError),
}

impl GaitError {
    /// Whether the error was caused by a cancellation request rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        match self {
            GaitError::Cancelled => true,
            GaitError::MacroFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
