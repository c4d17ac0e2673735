//! # Trajectory Planner
//!
//! The trajectory planner turns a list of polar waypoints into gait macro invocations.
//!
//! Each waypoint is a `(distance, heading)` pair giving a position relative to the walker's
//! starting point. Waypoints are converted into cartesian coordinates and walked in order, the
//! planner keeping a running reference point which starts at the origin. For each leg of the
//! trajectory the walker first turns towards the next waypoint, using whole rotate steps, then
//! walks the whole number of units separating it from the waypoint using forward steps. Turning
//! and walking are never mixed.
//!
//! Planning is pure: [`TrajPlanner::plan`] computes the macro counts for every leg without moving
//! anything, and [`TrajPlanner::run_trajectory`] executes them on a gait sequencer.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod planner;
mod waypoint;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use planner::*;
pub use waypoint::*;

use std::path::PathBuf;

use crate::gait::GaitError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of decimal places distances and angles are rounded to before being truncated into step
/// counts.
pub const SNAP_DECIMALS: i32 = 6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trajectory planning and execution.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("The trajectory needs at least two waypoints")]
    EmptyTrajectory,

    #[error("Waypoint {index} is invalid: {reason}")]
    InvalidWaypoint {
        index: usize,
        reason: String,
    },

    #[error("Invalid trajectory parameters: {0}")]
    InvalidParams(String),

    #[error("Could not read trajectory file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Could not parse trajectory file: {0}")]
    DeserialiseError(#[from] serde_json::Error),

    #[error("Trajectory execution failed: {0}")]
    Gait(#[from] GaitError),
}

impl TrajError {
    /// Whether the error was caused by a cancellation request rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        match self {
            TrajError::Gait(e) => e.is_cancelled(),
            _ => false,
        }
    }
}
