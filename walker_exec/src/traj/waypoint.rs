//! Polar waypoints and trajectory files

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::TrajError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A target position given as a distance and heading from the walker's starting point.
///
/// Serialised as a `[distance, heading_deg]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Waypoint {
    /// Units: walker steps
    pub distance: f64,

    /// Angle anticlockwise from the walker's initial forward direction.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(distance: f64, heading_deg: f64) -> Self {
        Self { distance, heading_deg }
    }

    /// Position of the waypoint on the plane, x along the initial forward direction.
    pub fn to_cartesian(&self) -> Vector2<f64> {
        let heading_rad = self.heading_deg.to_radians();
        Vector2::new(
            self.distance * heading_rad.cos(),
            self.distance * heading_rad.sin()
        )
    }

    /// Check the waypoint can be planned, giving the reason if not.
    pub fn validate(&self) -> Result<(), String> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(format!("distance must be a positive number, found {}", self.distance))
        }
        if !self.heading_deg.is_finite() {
            return Err(format!("heading must be a number, found {}", self.heading_deg))
        }

        Ok(())
    }
}

impl From<(f64, f64)> for Waypoint {
    fn from((distance, heading_deg): (f64, f64)) -> Self {
        Self::new(distance, heading_deg)
    }
}

impl From<Waypoint> for (f64, f64) {
    fn from(wp: Waypoint) -> Self {
        (wp.distance, wp.heading_deg)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a trajectory from a JSON file holding an array of `[distance, heading_deg]` pairs.
pub fn load_trajectory<P: AsRef<Path>>(path: P) -> Result<Vec<Waypoint>, TrajError> {
    let contents = std::fs::read_to_string(path.as_ref())
        .map_err(|e| TrajError::FileLoadError(path.as_ref().to_path_buf(), e))?;

    parse_trajectory(&contents)
}

/// Parse a trajectory from a JSON string.
pub fn parse_trajectory(contents: &str) -> Result<Vec<Waypoint>, TrajError> {
    Ok(serde_json::from_str(contents)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_cartesian() {
        let p = Waypoint::new(50.0, 90.0).to_cartesian();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);

        let p = Waypoint::new(2.0, 180.0).to_cartesian();
        assert!((p.x + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_trajectory() {
        let traj = parse_trajectory("[[0, 0], [50.0, 90], [12.5, -45]]").unwrap();
        assert_eq!(traj, vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(50.0, 90.0),
            Waypoint::new(12.5, -45.0),
        ]);

        assert_eq!(serde_json::to_string(&traj[1]).unwrap(), "[50.0,90.0]");
        assert!(matches!(parse_trajectory("[[1, 2, 3]]"), Err(TrajError::DeserialiseError(_))));
    }

    #[test]
    fn test_validate() {
        assert!(Waypoint::new(10.0, 370.0).validate().is_ok());
        assert!(Waypoint::new(-1.0, 0.0).validate().is_err());
        assert!(Waypoint::new(1.0, f64::NAN).validate().is_err());
    }
}
