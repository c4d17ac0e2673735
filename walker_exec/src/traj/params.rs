//! Parameters structure for TrajPlanner

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::TrajError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory planner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrajParams {

    /// Rotation achieved by one rotate step.
    ///
    /// Units: degrees
    pub rot_deg_per_step: f64,

    /// If true the planner tracks the heading the walker has turned to and only rotates by the
    /// difference between it and the heading of the next leg. If false every leg's heading is
    /// treated as a rotation from the current pose.
    pub relative_heading: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajParams {
    pub fn validate(&self) -> Result<(), TrajError> {
        if !(self.rot_deg_per_step.is_finite() && self.rot_deg_per_step > 0.0) {
            return Err(TrajError::InvalidParams(format!(
                "rot_deg_per_step must be positive, found {}", self.rot_deg_per_step
            )))
        }

        Ok(())
    }
}

impl Default for TrajParams {
    fn default() -> Self {
        Self {
            rot_deg_per_step: 10.0,
            relative_heading: false,
        }
    }
}
