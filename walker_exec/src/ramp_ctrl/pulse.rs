//! Conversions between joint angles and pulse widths

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::{clamp, lin_map};

use super::{RampError, RampParams, MAX_ANGLE_DEG, MIN_ANGLE_DEG};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check an angle is a usable joint target.
pub fn validate_angle(angle_deg: f64) -> Result<f64, RampError> {
    if angle_deg.is_finite() && angle_deg >= MIN_ANGLE_DEG && angle_deg <= MAX_ANGLE_DEG {
        Ok(angle_deg)
    }
    else {
        Err(RampError::InvalidAngle(angle_deg.to_string()))
    }
}

/// Parse a textual angle, as typed by an operator, into a valid joint target.
pub fn parse_angle(input: &str) -> Result<f64, RampError> {
    let angle_deg: f64 = input
        .trim()
        .parse()
        .map_err(|_| RampError::InvalidAngle(input.to_string()))?;

    validate_angle(angle_deg).map_err(|_| RampError::InvalidAngle(input.to_string()))
}

/// Convert a joint angle into the pulse width commanding it.
///
/// The result is truncated towards the minimum pulse. The angle must already have been
/// validated, out of range values are clamped.
pub fn pulse_from_angle(angle_deg: f64, params: &RampParams) -> u16 {
    let angle_deg = clamp(angle_deg, MIN_ANGLE_DEG, MAX_ANGLE_DEG);

    let pulse = lin_map(
        (MIN_ANGLE_DEG, MAX_ANGLE_DEG),
        (params.pulse_min_us as f64, params.pulse_max_us as f64),
        angle_deg
    );

    clamp(pulse.floor() as u16, params.pulse_min_us, params.pulse_max_us)
}

/// Convert a pulse width back into the joint angle it commands.
pub fn angle_from_pulse(pulse_us: u16, params: &RampParams) -> f64 {
    lin_map(
        (params.pulse_min_us as f64, params.pulse_max_us as f64),
        (MIN_ANGLE_DEG, MAX_ANGLE_DEG),
        clamp(pulse_us, params.pulse_min_us, params.pulse_max_us) as f64
    )
}
