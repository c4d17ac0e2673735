//! Simulated servo driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::collections::BTreeMap;

use super::{Channel, ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A driver with no hardware behind it, used when running off target.
///
/// Every write is logged and the last pulse of each channel is kept so it can be reported.
#[derive(Debug, Default)]
pub struct SimDriver {
    pulses_us: BTreeMap<Channel, u16>,
    num_writes: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last pulse written to the channel, if any.
    pub fn pulse_us(&self, channel: Channel) -> Option<u16> {
        self.pulses_us.get(&channel).copied()
    }

    /// Total number of writes accepted by the driver.
    pub fn num_writes(&self) -> usize {
        self.num_writes
    }
}

impl ServoDriver for SimDriver {
    fn set_pulse_width(&mut self, channel: Channel, width_us: u16) -> Result<(), ServoError> {
        trace!("[sim] {} <- {} us", channel, width_us);

        self.pulses_us.insert(channel, width_us);
        self.num_writes += 1;

        Ok(())
    }
}
