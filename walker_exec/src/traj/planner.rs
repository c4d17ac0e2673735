//! Trajectory planning and execution

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{TrajError, TrajParams, Waypoint, SNAP_DECIMALS};
use crate::{
    gait::GaitSeq,
    notifier::{TITLE_EMPTY_TRAJECTORY, TITLE_TRAJECTORY_COMPLETE},
    ramp_ctrl::Ticker,
    servo_ctrl::ServoDriver,
};
use util::maths::{snap, wrap_deg_180};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts waypoints into gait macro counts.
#[derive(Debug, Clone)]
pub struct TrajPlanner {
    params: TrajParams,
}

/// The motion needed to reach one waypoint from the previous reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegPlan {
    /// Index of the waypoint this leg ends at.
    pub index: usize,

    /// Displacement from the previous reference point.
    pub displacement: Vector2<f64>,

    /// Units: degrees
    pub rot_deg: f64,

    /// Number of rotate steps, positive anticlockwise.
    pub rotate_steps: i64,

    /// Number of forward steps.
    pub forward_steps: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajPlanner {
    pub fn new(params: TrajParams) -> Result<Self, TrajError> {
        params.validate()?;

        Ok(Self { params })
    }

    pub fn params(&self) -> &TrajParams {
        &self.params
    }

    /// Compute the rotate and forward step counts for every leg of the trajectory.
    ///
    /// The first waypoint only marks the start of the trajectory, the reference point always
    /// starts at the origin. Legs with no displacement are planned with zero steps.
    pub fn plan(&self, waypoints: &[Waypoint]) -> Result<Vec<LegPlan>, TrajError> {
        self.plan_with(waypoints, &self.params)
    }

    /// Plan a trajectory with parameters other than the planner's own.
    pub fn plan_with(
        &self,
        waypoints: &[Waypoint],
        params: &TrajParams
    ) -> Result<Vec<LegPlan>, TrajError> {
        params.validate()?;

        if waypoints.len() < 2 {
            return Err(TrajError::EmptyTrajectory)
        }

        for (index, wp) in waypoints.iter().enumerate() {
            wp.validate().map_err(|reason| TrajError::InvalidWaypoint { index, reason })?;
        }

        let mut reference = Vector2::<f64>::zeros();
        let mut heading_deg = 0.0;
        let mut legs = Vec::with_capacity(waypoints.len() - 1);

        for (index, wp) in waypoints.iter().enumerate().skip(1) {
            let target = wp.to_cartesian();
            let displacement = target - reference;

            let dist = snap(displacement.norm(), SNAP_DECIMALS);

            let (rot_deg, rotate_steps) = if dist == 0.0 {
                (0.0, 0)
            }
            else {
                let mut rot_deg = snap(
                    displacement.y.atan2(displacement.x).to_degrees(),
                    SNAP_DECIMALS
                );

                if params.relative_heading {
                    rot_deg = wrap_deg_180(rot_deg - heading_deg);
                }

                let steps = snap(rot_deg / params.rot_deg_per_step, SNAP_DECIMALS).trunc();

                (rot_deg, steps as i64)
            };

            heading_deg += rotate_steps as f64 * params.rot_deg_per_step;

            let leg = LegPlan {
                index,
                displacement,
                rot_deg,
                rotate_steps,
                forward_steps: dist.floor() as u64,
            };

            debug!(
                "Leg to waypoint {}: rotate {:.1} deg ({} steps), forward {} steps",
                index, leg.rot_deg, leg.rotate_steps, leg.forward_steps
            );

            legs.push(leg);
            reference = target;
        }

        Ok(legs)
    }

    /// Plan and execute a trajectory.
    ///
    /// For each leg all rotation is completed before any forward steps are taken. After each leg
    /// `progress` is called with the leg and the total number of legs. The first failing leg stops
    /// the trajectory.
    pub fn run_trajectory<D, T, F>(
        &self,
        seq: &mut GaitSeq<D, T>,
        waypoints: &[Waypoint],
        progress: F
    ) -> Result<Vec<LegPlan>, TrajError>
    where
        D: ServoDriver,
        T: Ticker,
        F: FnMut(&LegPlan, usize)
    {
        self.run_trajectory_with(seq, waypoints, &self.params, progress)
    }

    /// Execute a trajectory with parameters other than the planner's own, for example a different
    /// number of degrees per rotate step after loading an alternative gait.
    pub fn run_trajectory_with<D, T, F>(
        &self,
        seq: &mut GaitSeq<D, T>,
        waypoints: &[Waypoint],
        params: &TrajParams,
        mut progress: F
    ) -> Result<Vec<LegPlan>, TrajError>
    where
        D: ServoDriver,
        T: Ticker,
        F: FnMut(&LegPlan, usize)
    {
        let legs = match self.plan_with(waypoints, params) {
            Ok(l) => l,
            Err(TrajError::EmptyTrajectory) => {
                seq.notifier().error(
                    TITLE_EMPTY_TRAJECTORY,
                    "The trajectory has no displacement to execute, add at least two waypoints"
                );
                return Err(TrajError::EmptyTrajectory)
            },
            Err(e) => return Err(e),
        };

        info!("Executing trajectory of {} legs", legs.len());

        for leg in legs.iter() {
            let res = seq
                .rotate(leg.rotate_steps)
                .and_then(|_| seq.forward_step(leg.forward_steps as usize));

            if let Err(e) = res {
                if !e.is_cancelled() {
                    warn!("Trajectory stopped on the leg to waypoint {}: {}", leg.index, e);
                }
                return Err(e.into())
            }

            progress(leg, legs.len());
        }

        seq.notifier().info(
            TITLE_TRAJECTORY_COMPLETE,
            &format!("Reached the last of {} waypoints", waypoints.len())
        );

        Ok(legs)
    }
}
