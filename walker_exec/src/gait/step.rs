//! Gait step definition

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::servo_ctrl::JointId;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One synchronised multi-joint move.
///
/// Each joint appears at most once, joints are issued in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GaitStep {
    targets: Vec<(JointId, f64)>,
}

/// A named, ordered list of gait steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaitMacro {
    pub name: String,
    pub steps: Vec<GaitStep>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GaitStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a step from a table of targets.
    pub fn from_targets(targets: &[(JointId, f64)]) -> Self {
        let mut step = Self::new();
        for (joint, angle_deg) in targets.iter() {
            step.set(*joint, *angle_deg);
        }
        step
    }

    /// Add a target to the step, replacing any previous target for the same joint.
    pub fn set(&mut self, joint: JointId, angle_deg: f64) {
        match self.targets.iter_mut().find(|(j, _)| *j == joint) {
            Some(t) => t.1 = angle_deg,
            None => self.targets.push((joint, angle_deg)),
        }
    }

    /// Builder form of [`GaitStep::set`].
    pub fn with(mut self, joint: JointId, angle_deg: f64) -> Self {
        self.set(joint, angle_deg);
        self
    }

    pub fn targets(&self) -> &[(JointId, f64)] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

impl GaitMacro {
    /// Build a macro from a static table of steps.
    pub fn from_table(name: &str, table: &[&[(JointId, f64)]]) -> Self {
        Self {
            name: name.to_string(),
            steps: table.iter().map(|s| GaitStep::from_targets(s)).collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use JointId::*;

    #[test]
    fn test_step_replaces_joint() {
        let step = GaitStep::new()
            .with(Elbow1, 60.0)
            .with(Shoulder1, 50.0)
            .with(Elbow1, 90.0);

        assert_eq!(step.targets(), &[(Elbow1, 90.0), (Shoulder1, 50.0)]);
        assert_eq!(step.len(), 2);
    }

    #[test]
    fn test_macro_from_table() {
        let m = GaitMacro::from_table("wave", &[&[(Elbow1, 30.0)], &[(Elbow1, 90.0)]]);
        assert_eq!(m.steps.len(), 2);
        assert_eq!(m.steps[1].targets(), &[(Elbow1, 90.0)]);
    }
}
