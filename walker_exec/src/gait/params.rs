//! Parameters structure for GaitSeq

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the gait sequencer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GaitParams {

    /// Duration of each joint move inside a macro step.
    ///
    /// Units: seconds
    pub step_duration_s: f64,

    /// Pause inserted between two joints while returning home.
    ///
    /// Units: seconds
    pub home_settle_s: f64,

    /// Optional gait file, relative to the params directory, replacing the built-in macros.
    pub gait_file: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GaitParams {
    fn default() -> Self {
        Self {
            step_duration_s: 0.3,
            home_settle_s: 0.2,
            gait_file: None,
        }
    }
}
