//! Implementations for the GaitSeq state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::sync::Arc;

// Internal
use super::{GaitError, GaitLibrary, GaitParams, GaitStep, FORWARD_STEP, ROTATE_STEP, ROTATE_STEP_CW};
use crate::{
    notifier::{Notifier, TITLE_ANGLES_UPDATED, TITLE_HOME, TITLE_INVALID_ANGLE},
    ramp_ctrl::{angle_from_pulse, parse_angle, CancelToken, RampCtrl, RampError, Ticker},
    servo_ctrl::{JointId, JointMap, ServoDriver},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gait sequencer.
///
/// Owns the ramp controller, and through it the servo driver and channel state, so that all joint
/// motion is issued from a single place.
pub struct GaitSeq<D, T> {
    ramp: RampCtrl<D, T>,
    joints: JointMap,
    library: GaitLibrary,
    params: GaitParams,
    notifier: Arc<dyn Notifier + Send + Sync>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D, T> GaitSeq<D, T>
where
    D: ServoDriver,
    T: Ticker
{
    pub fn new(
        ramp: RampCtrl<D, T>,
        joints: JointMap,
        library: GaitLibrary,
        params: GaitParams,
        notifier: Arc<dyn Notifier + Send + Sync>
    ) -> Result<Self, GaitError> {
        library.validate()?;

        Ok(Self {
            ramp,
            joints,
            library,
            params,
            notifier,
        })
    }

    /// Move every joint of the step to its target, each over `duration_s`.
    ///
    /// Joints are issued in order. An invalid angle only skips its own joint, the rest of the step
    /// is still issued and the step then fails with [`GaitError::InvalidAngles`]. A failed write
    /// stops the step immediately, joints already moved keep their new position.
    pub fn execute_step(&mut self, step: &GaitStep, duration_s: f64) -> Result<(), GaitError> {
        self.ramp.check_cancel().map_err(|_| GaitError::Cancelled)?;

        let mut invalid = Vec::new();

        for (joint, angle_deg) in step.targets() {
            match self.move_joint(*joint, *angle_deg, duration_s) {
                Ok(()) => (),
                Err(RampError::InvalidAngle(input)) => {
                    self.notifier.error(
                        TITLE_INVALID_ANGLE,
                        &format!("{} cannot be moved to {}, angles must be between 0 and 180", joint, input)
                    );
                    invalid.push(*joint);
                },
                Err(e) => return Err(Self::joint_error(*joint, e)),
            }
        }

        if invalid.is_empty() {
            Ok(())
        }
        else {
            Err(GaitError::InvalidAngles(invalid))
        }
    }

    /// Run the named macro `repeats` times.
    ///
    /// The first failing step fails the whole macro, no further steps or repetitions are run.
    pub fn run_macro(&mut self, name: &str, repeats: usize) -> Result<(), GaitError> {
        let gait = self.library
            .get(name)
            .cloned()
            .ok_or_else(|| GaitError::UnknownMacro(name.to_string()))?;

        debug!("Running {} x{} ({} steps each)", name, repeats, gait.steps.len());

        let duration_s = self.params.step_duration_s;

        for repetition in 0..repeats {
            for (step_idx, step) in gait.steps.iter().enumerate() {
                self.execute_step(step, duration_s).map_err(|e| match e {
                    GaitError::Cancelled => GaitError::Cancelled,
                    e => {
                        warn!("{} failed on repetition {} step {}: {}", name, repetition, step_idx, e);
                        GaitError::MacroFailed {
                            name: name.to_string(),
                            repetition,
                            step: step_idx,
                            source: Box::new(e),
                        }
                    }
                })?;
            }
        }

        Ok(())
    }

    /// Move forward by `repeats` units.
    pub fn forward_step(&mut self, repeats: usize) -> Result<(), GaitError> {
        self.run_macro(FORWARD_STEP, repeats)
    }

    /// Rotate anticlockwise by `repeats` increments.
    pub fn rotate_step(&mut self, repeats: usize) -> Result<(), GaitError> {
        self.run_macro(ROTATE_STEP, repeats)
    }

    /// Rotate clockwise by `repeats` increments.
    pub fn rotate_step_cw(&mut self, repeats: usize) -> Result<(), GaitError> {
        self.run_macro(ROTATE_STEP_CW, repeats)
    }

    /// Rotate by a signed number of increments, positive being anticlockwise.
    pub fn rotate(&mut self, count: i64) -> Result<(), GaitError> {
        let repeats = count.unsigned_abs() as usize;

        if count >= 0 {
            self.rotate_step(repeats)
        }
        else {
            self.rotate_step_cw(repeats)
        }
    }

    /// Return every joint to the home stance.
    ///
    /// The prior pose is unknown so joints are moved one at a time over the default duration, with
    /// a settle pause between each.
    pub fn home(&mut self) -> Result<(), GaitError> {
        let home = self.library.home().clone();
        let duration_s = self.ramp.params().default_duration_s;

        for (i, (joint, angle_deg)) in home.targets().iter().enumerate() {
            if i > 0 {
                self.ramp
                    .settle(self.params.home_settle_s)
                    .map_err(|_| GaitError::Cancelled)?;
            }

            self.move_joint(*joint, *angle_deg, duration_s)
                .map_err(|e| Self::joint_error(*joint, e))?;
        }

        self.notifier.info(TITLE_HOME, "All joints returned to the home stance");

        Ok(())
    }

    /// Apply angles typed by an operator.
    ///
    /// Every input which is not a number between 0 and 180 is reported and its joint left where it
    /// is. The valid inputs are issued together as one step over the default duration.
    pub fn set_joints(&mut self, inputs: &[(JointId, &str)]) -> Result<(), GaitError> {
        let mut step = GaitStep::new();
        let mut invalid = Vec::new();

        for (joint, input) in inputs {
            match parse_angle(input) {
                Ok(angle_deg) => step.set(*joint, angle_deg),
                Err(e) => {
                    self.notifier.error(TITLE_INVALID_ANGLE, &format!("{}: {}", joint, e));
                    invalid.push(*joint);
                }
            }
        }

        let duration_s = self.ramp.params().default_duration_s;

        match self.execute_step(&step, duration_s) {
            Ok(()) => (),
            Err(GaitError::InvalidAngles(mut more)) => invalid.append(&mut more),
            Err(e) => return Err(e),
        }

        if invalid.is_empty() {
            info!("Set {} joints", step.len());
            self.notifier.info(TITLE_ANGLES_UPDATED, &format!("{} joints updated", step.len()));
            Ok(())
        }
        else {
            Err(GaitError::InvalidAngles(invalid))
        }
    }

    /// Angle last commanded to the joint, or `None` if it hasn't been moved since startup.
    pub fn joint_angle(&self, joint: JointId) -> Option<f64> {
        let channel = self.joints.channel(joint);
        let state = self.ramp.state();

        if state.is_commanded(channel) {
            Some(angle_from_pulse(state.get(channel), self.ramp.params()))
        }
        else {
            None
        }
    }

    pub fn ramp(&self) -> &RampCtrl<D, T> {
        &self.ramp
    }

    pub fn joints(&self) -> &JointMap {
        &self.joints
    }

    pub fn library(&self) -> &GaitLibrary {
        &self.library
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier + Send + Sync> {
        &self.notifier
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.ramp.cancel_token()
    }

    fn move_joint(&mut self, joint: JointId, angle_deg: f64, duration_s: f64) -> Result<(), RampError> {
        let channel = self.joints.channel(joint);
        self.ramp.ramp_to(channel, angle_deg, duration_s).map(|_| ())
    }

    fn joint_error(joint: JointId, e: RampError) -> GaitError {
        match e {
            RampError::Cancelled => GaitError::Cancelled,
            RampError::InvalidAngle(_) => GaitError::InvalidAngles(vec![joint]),
            e => GaitError::Actuation { joint, source: e },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        notifier::RecordingNotifier,
        ramp_ctrl::{pulse_from_angle, RampParams, RecordingTicker},
        servo_ctrl::{mock::MockDriver, Channel, ServoError},
    };
    use std::time::Duration;
    use JointId::*;

    type TestSeq = GaitSeq<MockDriver, RecordingTicker>;

    fn seq_with(driver: MockDriver, ticker: RecordingTicker, token: CancelToken) -> (TestSeq, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let ramp = RampCtrl::new(driver, ticker, RampParams::default())
            .unwrap()
            .with_cancel_token(token);

        let seq = GaitSeq::new(
            ramp,
            JointMap::default(),
            GaitLibrary::builtin(),
            GaitParams::default(),
            Arc::new(notifier.clone())
        ).unwrap();

        (seq, notifier)
    }

    fn seq(driver: MockDriver) -> (TestSeq, RecordingNotifier) {
        seq_with(driver, RecordingTicker::new(), CancelToken::new())
    }

    fn ch(joint: JointId) -> Channel {
        JointMap::default().channel(joint)
    }

    fn pulse(angle_deg: f64) -> u16 {
        pulse_from_angle(angle_deg, &RampParams::default())
    }

    #[test]
    fn test_execute_step() {
        let driver = MockDriver::new();
        let (mut seq, _) = seq(driver.clone());

        let step = GaitStep::new().with(Elbow1, 60.0).with(Shoulder1, 50.0);
        seq.execute_step(&step, 0.1).unwrap();

        // Joints are issued in order, the first finishing before the second starts
        let writes = driver.writes();
        let last_elbow = writes.iter().rposition(|(c, _)| *c == ch(Elbow1)).unwrap();
        let first_shoulder = writes.iter().position(|(c, _)| *c == ch(Shoulder1)).unwrap();
        assert!(last_elbow < first_shoulder);

        assert_eq!(*driver.writes_to(ch(Elbow1)).last().unwrap(), pulse(60.0));
        assert_eq!(*driver.writes_to(ch(Shoulder1)).last().unwrap(), pulse(50.0));
    }

    #[test]
    fn test_execute_step_invalid_angle_skips_joint() {
        let driver = MockDriver::new();
        let (mut seq, notifier) = seq(driver.clone());

        let step = GaitStep::new().with(Elbow1, 200.0).with(Elbow2, 45.0);

        assert_eq!(seq.execute_step(&step, 0.1), Err(GaitError::InvalidAngles(vec![Elbow1])));
        assert!(driver.writes_to(ch(Elbow1)).is_empty());
        assert_eq!(*driver.writes_to(ch(Elbow2)).last().unwrap(), pulse(45.0));
        assert_eq!(notifier.errors(), vec![TITLE_INVALID_ANGLE.to_string()]);
    }

    #[test]
    fn test_set_joints_rejects_bad_input() {
        let driver = MockDriver::new();
        let (mut seq, notifier) = seq(driver.clone());

        let res = seq.set_joints(&[(Elbow1, "200"), (Elbow2, "abc"), (Shoulder1, "45")]);

        assert_eq!(res, Err(GaitError::InvalidAngles(vec![Elbow1, Elbow2])));
        assert_eq!(notifier.errors(), vec![TITLE_INVALID_ANGLE.to_string(); 2]);
        assert!(notifier.infos().is_empty());

        // Rejected joints are untouched
        assert!(driver.writes_to(ch(Elbow1)).is_empty());
        assert!(driver.writes_to(ch(Elbow2)).is_empty());
        assert_eq!(seq.joint_angle(Elbow1), None);
        assert_eq!(seq.joint_angle(Elbow2), None);

        // The valid joint still moved
        let angle = seq.joint_angle(Shoulder1).unwrap();
        assert!((angle - 45.0).abs() < 0.2);
    }

    #[test]
    fn test_set_joints_all_valid() {
        let driver = MockDriver::new();
        let (mut seq, notifier) = seq(driver.clone());

        seq.set_joints(&[(Elbow3, " 120 "), (Shoulder4, "0")]).unwrap();

        assert_eq!(notifier.infos(), vec![TITLE_ANGLES_UPDATED.to_string()]);
        assert!(notifier.errors().is_empty());
        assert_eq!(seq.ramp().state().get(ch(Elbow3)), pulse(120.0));
        assert_eq!(seq.ramp().state().get(ch(Shoulder4)), 1000);
    }

    #[test]
    fn test_forward_step_returns_to_stance() {
        let driver = MockDriver::new();
        let (mut seq, _) = seq(driver.clone());

        seq.forward_step(2).unwrap();

        let state = seq.ramp().state();
        for (joint, angle_deg) in GaitLibrary::builtin().home().targets() {
            assert_eq!(state.get(ch(*joint)), pulse(*angle_deg), "{}", joint);
        }

        // Each leg was lifted twice
        let lifts = driver.writes_to(ch(Elbow3)).iter().filter(|p| **p == pulse(60.0)).count();
        assert_eq!(lifts, 2);
    }

    #[test]
    fn test_rotate_direction() {
        let driver = MockDriver::new();
        let (mut seq, _) = seq(driver.clone());

        seq.rotate(1).unwrap();
        assert!(driver.writes_to(ch(Shoulder1)).contains(&pulse(30.0)));
        assert!(!driver.writes_to(ch(Shoulder1)).contains(&pulse(10.0)));

        driver.clear();
        seq.rotate(-1).unwrap();
        assert!(driver.writes_to(ch(Shoulder1)).contains(&pulse(10.0)));
        assert!(!driver.writes_to(ch(Shoulder1)).contains(&pulse(30.0)));

        driver.clear();
        seq.rotate(0).unwrap();
        assert!(driver.writes().is_empty());
    }

    #[test]
    fn test_macro_failure_stops_macro() {
        // Fourth write fails, part way through lifting the first leg
        let driver = MockDriver::failing_from(3);
        let (mut seq, _) = seq(driver.clone());

        let res = seq.forward_step(3);

        match res {
            Err(GaitError::MacroFailed { name, repetition, step, source }) => {
                assert_eq!(name, FORWARD_STEP);
                assert_eq!((repetition, step), (0, 0));
                assert!(matches!(
                    *source,
                    GaitError::Actuation {
                        joint: Elbow1,
                        source: RampError::ActuationFailure { source: ServoError::Fault(_), .. }
                    }
                ));
            },
            r => panic!("Expected macro failure, got {:?}", r),
        }

        assert_eq!(driver.writes().len(), 3);
        assert!(driver.writes_to(ch(Shoulder1)).is_empty());
    }

    #[test]
    fn test_unknown_macro() {
        let (mut seq, _) = seq(MockDriver::new());
        assert_eq!(seq.run_macro("moonwalk", 1), Err(GaitError::UnknownMacro("moonwalk".into())));
    }

    #[test]
    fn test_cancel_macro() {
        let driver = MockDriver::new();
        let token = CancelToken::new();
        let (mut seq, _) = seq_with(
            driver.clone(),
            RecordingTicker::cancelling_after(20, token.clone()),
            token.clone()
        );

        let res = seq.forward_step(5);
        assert_eq!(res, Err(GaitError::Cancelled));
        assert!(res.unwrap_err().is_cancelled());
        assert_eq!(driver.writes().len(), 20);

        // Nothing further is issued while the token is raised
        assert_eq!(seq.home(), Err(GaitError::Cancelled));
        assert_eq!(driver.writes().len(), 20);
    }

    #[test]
    fn test_home() {
        let driver = MockDriver::new();
        let ticker = RecordingTicker::new();
        let (mut seq, notifier) = seq_with(driver.clone(), ticker.clone(), CancelToken::new());

        seq.home().unwrap();

        for (joint, angle_deg) in GaitLibrary::builtin().home().targets() {
            assert_eq!(seq.ramp().state().get(ch(*joint)), pulse(*angle_deg));
        }

        // One settle between each pair of joints
        let settles = ticker.waits().iter().filter(|w| **w == Duration::from_millis(200)).count();
        assert_eq!(settles, 7);

        assert_eq!(notifier.infos(), vec![TITLE_HOME.to_string()]);
    }
}
