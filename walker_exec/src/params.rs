//! # Walker Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;

use crate::{
    gait::GaitParams,
    ramp_ctrl::RampParams,
    servo_ctrl::{Channel, JointError, JointMap},
    traj::TrajParams,
};
use util::logger::{parse_level, LevelFilter, LogConfig};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the walker executable, loaded from `walker_exec.toml`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WalkerExecParams {

    /// Which servo driver to use
    pub driver: DriverParams,

    /// Channel driving each joint, keyed by joint name. The harness wiring is used if not given.
    pub joints: Option<HashMap<String, Channel>>,

    pub ramp: RampParams,

    pub gait: GaitParams,

    pub traj: TrajParams,

    pub log: LogParams,
}

/// Logging levels, by name.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogParams {
    /// Level written to the session log file
    pub file_level: String,

    /// Level echoed to the terminal
    pub stdout_level: String,

    /// Per module overrides, e.g. `"walker_lib::ramp_ctrl" = "debug"`
    pub targets: HashMap<String, String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Servo driver selection.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverParams {
    /// No hardware, pulses are only logged
    Sim,

    /// Software PWM on the Raspberry Pi's GPIO pins, channels are BCM pin numbers
    RpiGpio,

    /// PCA9685 board on the Raspberry Pi's I2C bus, channels are board outputs
    Pca9685 {
        #[serde(default = "default_i2c_bus")]
        i2c_bus: u8,

        #[serde(default = "default_i2c_address")]
        address: u8,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid joint map: {0}")]
    JointMap(#[from] JointError),

    #[error("Unknown log level \"{0}\"")]
    UnknownLogLevel(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WalkerExecParams {
    /// Build the joint to channel map.
    pub fn joint_map(&self) -> Result<JointMap, ParamsError> {
        match &self.joints {
            Some(table) => Ok(JointMap::from_names(table)?),
            None => Ok(JointMap::default()),
        }
    }
}

impl LogParams {
    pub fn to_log_config(&self) -> Result<LogConfig, ParamsError> {
        let level = |name: &str| {
            parse_level(name).ok_or_else(|| ParamsError::UnknownLogLevel(name.to_string()))
        };

        let mut target_levels = Vec::new();
        for (target, name) in self.targets.iter() {
            target_levels.push((target.clone(), level(name.as_str())?));
        }
        target_levels.sort();

        Ok(LogConfig {
            min_level: level(self.file_level.as_str())?,
            stdout_level: level(self.stdout_level.as_str())?,
            target_levels,
        })
    }
}

impl Default for LogParams {
    fn default() -> Self {
        Self {
            file_level: "trace".into(),
            stdout_level: "info".into(),
            targets: HashMap::new(),
        }
    }
}

impl Default for DriverParams {
    fn default() -> Self {
        DriverParams::Sim
    }
}

fn default_i2c_bus() -> u8 {
    1
}

fn default_i2c_address() -> u8 {
    0x40
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::JointId;

    #[test]
    fn test_empty_params() {
        let params: WalkerExecParams = util::params::from_str("").unwrap();

        assert_eq!(params.driver, DriverParams::Sim);
        assert_eq!(params.ramp, RampParams::default());
        assert_eq!(params.joint_map().unwrap(), JointMap::default());

        let log = params.log.to_log_config().unwrap();
        assert_eq!(log.min_level, LevelFilter::Trace);
        assert_eq!(log.stdout_level, LevelFilter::Info);
    }

    #[test]
    fn test_full_params() {
        let params: WalkerExecParams = util::params::from_str(r#"
            [driver]
            kind = "pca9685"
            address = 0x41

            [joints]
            shoulder_1 = 0
            shoulder_2 = 1
            shoulder_3 = 2
            shoulder_4 = 3
            elbow_1 = 8
            elbow_2 = 9
            elbow_3 = 10
            elbow_4 = 11

            [ramp]
            step_delay_s = 0.01

            [gait]
            gait_file = "gaits.toml"

            [traj]
            rot_deg_per_step = 15.0

            [log]
            stdout_level = "debug"
            targets = { "walker_lib::ramp_ctrl" = "info" }
        "#).unwrap();

        assert_eq!(params.driver, DriverParams::Pca9685 { i2c_bus: 1, address: 0x41 });
        assert_eq!(params.joint_map().unwrap().channel(JointId::Elbow1), Channel(8));
        assert_eq!(params.ramp.step_delay_s, 0.01);
        assert_eq!(params.ramp.pulse_max_us, 2000);
        assert_eq!(params.gait.gait_file.as_deref(), Some("gaits.toml"));
        assert_eq!(params.traj.rot_deg_per_step, 15.0);
        assert!(!params.traj.relative_heading);

        let log = params.log.to_log_config().unwrap();
        assert_eq!(log.stdout_level, LevelFilter::Debug);
        assert_eq!(log.target_levels, vec![("walker_lib::ramp_ctrl".to_string(), LevelFilter::Info)]);
    }

    #[test]
    fn test_shipped_params() {
        let params: WalkerExecParams =
            util::params::from_str(include_str!("../../params/walker_exec.toml")).unwrap();

        assert_eq!(params.driver, DriverParams::Sim);
        assert_eq!(params.joint_map().unwrap(), JointMap::default());
        assert_eq!(params.ramp, RampParams::default());
        assert_eq!(params.gait.gait_file.as_deref(), Some("gaits.toml"));
        assert!(params.log.to_log_config().is_ok());
    }

    #[test]
    fn test_bad_log_level() {
        let log = LogParams {
            stdout_level: "loud".into(),
            ..LogParams::default()
        };
        assert!(matches!(log.to_log_config(), Err(ParamsError::UnknownLogLevel(_))));
    }
}
