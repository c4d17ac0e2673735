//! Implementations for the RampCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{
    pulse_from_angle, validate_angle,
    CancelToken, ChannelState, RampError, RampParams, Ticker,
    DIRECT_WRITE_THRESHOLD_US,
};
use crate::servo_ctrl::{Channel, ServoDriver};
use util::{maths::clamp, time::seconds_to_duration};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on `duration / step_delay` before rounding up to the next whole step.
const STEP_COUNT_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion ramp controller.
///
/// Owns the servo driver, the timing source and the per-channel pulse state.
pub struct RampCtrl<D, T> {
    driver: D,
    ticker: T,
    params: RampParams,
    state: ChannelState,
    cancel: CancelToken,
}

/// Summary of one completed ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampReport {
    pub channel: Channel,

    /// Pulse held by the channel before the ramp.
    pub start_pulse_us: u16,

    /// Pulse held by the channel after the ramp, always the exact target.
    pub final_pulse_us: u16,

    /// Number of pulse writes issued, including any corrective write.
    pub num_writes: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D, T> RampCtrl<D, T>
where
    D: ServoDriver,
    T: Ticker
{
    /// Create a new controller with every channel at the neutral pulse.
    pub fn new(driver: D, ticker: T, params: RampParams) -> Result<Self, RampError> {
        params.validate()?;

        Ok(Self {
            driver,
            ticker,
            state: ChannelState::new(params.neutral_pulse_us()),
            params,
            cancel: CancelToken::new(),
        })
    }

    /// Use an externally created cancellation token, so that it can be shared with other parts
    /// of the stack before the controller is built.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ramp a channel to the given angle over `duration_s`, using the configured step delay.
    pub fn ramp_to(
        &mut self,
        channel: Channel,
        angle_deg: f64,
        duration_s: f64
    ) -> Result<RampReport, RampError> {
        self.ramp_to_paced(channel, angle_deg, duration_s, self.params.step_delay_s)
    }

    /// Ramp a channel to the given angle over the configured default duration.
    pub fn ramp_to_default(
        &mut self,
        channel: Channel,
        angle_deg: f64
    ) -> Result<RampReport, RampError> {
        self.ramp_to(channel, angle_deg, self.params.default_duration_s)
    }

    /// Ramp a channel to the given angle over `duration_s` with a step delay of `step_delay_s`.
    ///
    /// The angle is validated before anything is written. The ramp is made of
    /// `max(1, ceil(duration_s / step_delay_s))` evenly spaced writes, each followed by a wait of
    /// one step, plus one corrective write if rounding left the channel short of the target.
    ///
    /// Moves of one microsecond or less, and moves with no duration, are written directly
    /// followed by a single wait.
    pub fn ramp_to_paced(
        &mut self,
        channel: Channel,
        angle_deg: f64,
        duration_s: f64,
        step_delay_s: f64
    ) -> Result<RampReport, RampError> {

        let angle_deg = validate_angle(angle_deg)?;

        if !(step_delay_s.is_finite() && step_delay_s > 0.0) {
            return Err(RampError::InvalidParams(format!(
                "step delay must be positive, found {}", step_delay_s
            )))
        }

        let target = pulse_from_angle(angle_deg, &self.params);
        let start = self.state.get(channel);
        let delta = target as i32 - start as i32;
        let step_delay = seconds_to_duration(step_delay_s);

        let mut report = RampReport {
            channel,
            start_pulse_us: start,
            final_pulse_us: start,
            num_writes: 0,
        };

        // ---- DIRECT WRITE ----

        if delta.abs() <= DIRECT_WRITE_THRESHOLD_US || !(duration_s > 0.0) {
            if delta != 0 {
                self.write(channel, target)?;
                report.num_writes += 1;
            }
            self.ticker.wait(step_delay);

            report.final_pulse_us = self.state.get(channel);

            trace!(
                "{} direct {} -> {} us ({} writes)",
                channel, start, target, report.num_writes
            );

            return Ok(report)
        }

        // ---- RAMP ----

        let num_steps = ((duration_s / step_delay_s) - STEP_COUNT_EPSILON)
            .ceil()
            .max(1.0) as usize;
        let increment = delta as f64 / num_steps as f64;

        debug!(
            "{} ramp {} -> {} us over {} steps of {:.1} us",
            channel, start, target, num_steps, increment
        );

        let mut position = start as f64;
        let mut last = start;

        for _ in 0..num_steps {
            position += increment;

            let pulse = clamp(
                position.round(),
                self.params.pulse_min_us as f64,
                self.params.pulse_max_us as f64
            ) as u16;

            self.write(channel, pulse)?;
            report.num_writes += 1;
            last = pulse;

            self.ticker.wait(step_delay);
        }

        // Rounding may leave the channel a microsecond off the exact target
        if last != target {
            trace!("{} correcting {} -> {} us", channel, last, target);

            self.write(channel, target)?;
            report.num_writes += 1;

            self.ticker.wait(step_delay);
        }

        report.final_pulse_us = self.state.get(channel);

        Ok(report)
    }

    /// Hold still for the given time, giving servos a chance to settle.
    pub fn settle(&mut self, duration_s: f64) -> Result<(), RampError> {
        self.check_cancel()?;
        self.ticker.wait(seconds_to_duration(duration_s));
        Ok(())
    }

    /// Return an error if cancellation has been requested.
    pub fn check_cancel(&self) -> Result<(), RampError> {
        if self.cancel.is_cancelled() {
            Err(RampError::Cancelled)
        }
        else {
            Ok(())
        }
    }

    /// Token which can be used from another thread to cancel motions of this controller.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn params(&self) -> &RampParams {
        &self.params
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Write a single pulse, recording it in the channel state only if the driver accepted it.
    ///
    /// Cancellation is checked before the write so that a cancelled motion never issues another
    /// command.
    fn write(&mut self, channel: Channel, pulse_us: u16) -> Result<(), RampError> {
        self.check_cancel()?;

        trace!("{} <- {} us", channel, pulse_us);

        match self.driver.set_pulse_width(channel, pulse_us) {
            Ok(()) => {
                self.state.record(channel, pulse_us);
                Ok(())
            },
            Err(e) => {
                warn!(
                    "Write of {} us to {} failed, channel left at {} us: {}",
                    pulse_us, channel, self.state.get(channel), e
                );
                Err(RampError::ActuationFailure { channel, source: e })
            }
        }
    }
}
