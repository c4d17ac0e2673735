//! # Walker library.
//!
//! Motion stack of the eight servo quadruped walker. Data flows one way through the modules:
//!
//! ```text
//! traj (waypoints) -> gait (macros, steps) -> ramp_ctrl (paced pulses) -> servo_ctrl (hardware)
//! ```

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Servo control - drivers for the servo hardware and the joint to channel map
pub mod servo_ctrl;

/// Ramp control - moves a single channel smoothly to a target angle
pub mod ramp_ctrl;

/// Gait sequencer - synchronised multi-joint steps and named gait macros
pub mod gait;

/// Trajectory planner - converts polar waypoints into rotate and forward steps
pub mod traj;

/// Operator notifications
pub mod notifier;

/// Worker thread owning the motion stack
pub mod worker;

/// Executable parameters
pub mod params;
