//! Parameters structure for RampCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::RampError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the motion ramp controller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RampParams {

    /// Time between two consecutive pulse writes of a ramp.
    ///
    /// Units: seconds
    pub step_delay_s: f64,

    /// Duration of a joint move when none is given by the caller.
    ///
    /// Units: seconds
    pub default_duration_s: f64,

    /// Pulse width commanding 0 degrees.
    ///
    /// Units: microseconds
    pub pulse_min_us: u16,

    /// Pulse width commanding 180 degrees.
    ///
    /// Units: microseconds
    pub pulse_max_us: u16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RampParams {
    fn default() -> Self {
        Self {
            step_delay_s: 0.02,
            default_duration_s: 0.5,
            pulse_min_us: 1000,
            pulse_max_us: 2000,
        }
    }
}

impl RampParams {
    /// The pulse a channel is assumed to hold before it is first commanded.
    pub fn neutral_pulse_us(&self) -> u16 {
        ((self.pulse_min_us as u32 + self.pulse_max_us as u32) / 2) as u16
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), RampError> {
        if !(self.step_delay_s.is_finite() && self.step_delay_s > 0.0) {
            return Err(RampError::InvalidParams(format!(
                "step delay must be positive, found {}", self.step_delay_s
            )))
        }
        if !self.default_duration_s.is_finite() {
            return Err(RampError::InvalidParams(format!(
                "default duration must be finite, found {}", self.default_duration_s
            )))
        }
        if self.pulse_min_us >= self.pulse_max_us {
            return Err(RampError::InvalidParams(format!(
                "pulse range [{}, {}] is empty", self.pulse_min_us, self.pulse_max_us
            )))
        }

        Ok(())
    }
}
