//! Built-in gait tables and gait file loading
//!
//! Legs are numbered anticlockwise from the front left when seen from above. Shoulders of legs 1
//! and 4 swing forwards with increasing angle, those of legs 2 and 3 are mounted mirrored and
//! swing forwards with decreasing angle. Elbows stand at 90 degrees and lift the foot when
//! lowered towards 60.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

use super::{GaitError, GaitMacro, GaitStep, FORWARD_STEP, ROTATE_STEP, ROTATE_STEP_CW};
use crate::{ramp_ctrl::validate_angle, servo_ctrl::JointId};
use JointId::*;

// ---------------------------------------------------------------------------
// GAIT TABLES
// ---------------------------------------------------------------------------

type StepTable = &'static [(JointId, f64)];

/// Neutral standing pose.
pub const HOME_STANCE: StepTable = &[
    (Shoulder1, 20.0),
    (Shoulder2, 130.0),
    (Shoulder3, 170.0),
    (Shoulder4, 20.0),
    (Elbow1, 90.0),
    (Elbow2, 90.0),
    (Elbow3, 90.0),
    (Elbow4, 90.0),
];

/// One unit of forward translation.
///
/// Creep gait: each leg in turn (1, 3, 2, 4) is lifted, swung forward by 30 degrees and planted,
/// then all shoulders return to the stance together, pushing the body forward.
const FORWARD_STEP_TABLE: &[StepTable] = &[
    &[(Elbow1, 60.0)],
    &[(Shoulder1, 50.0)],
    &[(Elbow1, 90.0)],
    &[(Elbow3, 60.0)],
    &[(Shoulder3, 140.0)],
    &[(Elbow3, 90.0)],
    &[(Elbow2, 60.0)],
    &[(Shoulder2, 100.0)],
    &[(Elbow2, 90.0)],
    &[(Elbow4, 60.0)],
    &[(Shoulder4, 50.0)],
    &[(Elbow4, 90.0)],
    &[(Shoulder1, 20.0), (Shoulder2, 130.0), (Shoulder3, 170.0), (Shoulder4, 20.0)],
];

/// One increment of anticlockwise rotation.
///
/// Each leg in turn is lifted, swung 10 degrees around the body and planted, then all shoulders
/// return to the stance together, turning the body.
const ROTATE_STEP_TABLE: &[StepTable] = &[
    &[(Elbow1, 60.0)],
    &[(Shoulder1, 30.0)],
    &[(Elbow1, 90.0)],
    &[(Elbow2, 60.0)],
    &[(Shoulder2, 140.0)],
    &[(Elbow2, 90.0)],
    &[(Elbow3, 60.0)],
    &[(Shoulder3, 160.0)],
    &[(Elbow3, 90.0)],
    &[(Elbow4, 60.0)],
    &[(Shoulder4, 10.0)],
    &[(Elbow4, 90.0)],
    &[(Shoulder1, 20.0), (Shoulder2, 130.0), (Shoulder3, 170.0), (Shoulder4, 20.0)],
];

/// One increment of clockwise rotation, the mirror of [`ROTATE_STEP_TABLE`].
const ROTATE_STEP_CW_TABLE: &[StepTable] = &[
    &[(Elbow1, 60.0)],
    &[(Shoulder1, 10.0)],
    &[(Elbow1, 90.0)],
    &[(Elbow2, 60.0)],
    &[(Shoulder2, 120.0)],
    &[(Elbow2, 90.0)],
    &[(Elbow3, 60.0)],
    &[(Shoulder3, 180.0)],
    &[(Elbow3, 90.0)],
    &[(Elbow4, 60.0)],
    &[(Shoulder4, 30.0)],
    &[(Elbow4, 90.0)],
    &[(Shoulder1, 20.0), (Shoulder2, 130.0), (Shoulder3, 170.0), (Shoulder4, 20.0)],
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The set of gait macros and the home stance available to the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct GaitLibrary {
    home: GaitStep,
    macros: BTreeMap<String, GaitMacro>,
}

/// Gait file layout.
///
/// ```toml
/// home = [{ joint = "shoulder_1", angle_deg = 20.0 }, ...]
///
/// [[macros]]
/// name = "forward-step"
///
/// [[macros.steps]]
/// targets = [{ joint = "elbow_1", angle_deg = 60.0 }]
/// ```
#[derive(Debug, Deserialize)]
struct GaitFile {
    #[serde(default)]
    home: Option<Vec<TargetDef>>,

    #[serde(default)]
    macros: Vec<MacroDef>,
}

#[derive(Debug, Deserialize)]
struct MacroDef {
    name: String,
    steps: Vec<StepDef>,
}

#[derive(Debug, Deserialize)]
struct StepDef {
    targets: Vec<TargetDef>,
}

#[derive(Debug, Deserialize)]
struct TargetDef {
    joint: String,
    angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GaitLibrary {
    /// The built-in gaits.
    pub fn builtin() -> Self {
        let mut macros = BTreeMap::new();

        for (name, table) in [
            (FORWARD_STEP, FORWARD_STEP_TABLE),
            (ROTATE_STEP, ROTATE_STEP_TABLE),
            (ROTATE_STEP_CW, ROTATE_STEP_CW_TABLE),
        ].iter() {
            macros.insert(name.to_string(), GaitMacro::from_table(name, table));
        }

        Self {
            home: GaitStep::from_targets(HOME_STANCE),
            macros,
        }
    }

    /// Load a gait file on top of the built-in gaits.
    ///
    /// Macros in the file replace built-in macros of the same name, other built-ins are kept.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GaitError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GaitError::InvalidGait(format!("cannot read {:?}: {}", path.as_ref(), e))
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parse a gait file's contents on top of the built-in gaits.
    pub fn from_toml_str(contents: &str) -> Result<Self, GaitError> {
        let file: GaitFile = util::params::from_str(contents)
            .map_err(|e| GaitError::InvalidGait(e.to_string()))?;

        let mut lib = Self::builtin();

        if let Some(home) = file.home {
            lib.home = parse_step(&home)?;
        }

        for def in file.macros {
            if def.steps.is_empty() {
                return Err(GaitError::InvalidGait(format!("macro \"{}\" has no steps", def.name)))
            }

            let steps = def.steps
                .iter()
                .map(|s| parse_step(&s.targets))
                .collect::<Result<Vec<_>, _>>()?;

            lib.macros.insert(def.name.clone(), GaitMacro { name: def.name, steps });
        }

        lib.validate()?;

        Ok(lib)
    }

    /// Check every angle in the library is a valid joint target.
    pub fn validate(&self) -> Result<(), GaitError> {
        let steps = std::iter::once(&self.home)
            .chain(self.macros.values().flat_map(|m| m.steps.iter()));

        for step in steps {
            for (joint, angle_deg) in step.targets() {
                validate_angle(*angle_deg).map_err(|_| GaitError::InvalidGait(format!(
                    "angle {} for {} is outside 0 to 180 degrees", angle_deg, joint
                )))?;
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GaitMacro> {
        self.macros.get(name)
    }

    pub fn home(&self) -> &GaitStep {
        &self.home
    }

    /// Names of all macros in the library.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(|k| k.as_str())
    }
}

impl Default for GaitLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_step(targets: &[TargetDef]) -> Result<GaitStep, GaitError> {
    let mut step = GaitStep::new();

    for t in targets {
        step.set(t.joint.parse()?, t.angle_deg);
    }

    Ok(step)
}
