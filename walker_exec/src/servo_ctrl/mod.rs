//! # Servo Controller Module
//!
//! This module provides a unified servo control interface which can abstract over different types
//! of servo driver boards, along with the fixed mapping from the walker's joints onto the output
//! channels of the driver.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// [`ServoDriver`] implementation using the Raspberry Pi's GPIO software PWM.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub mod rpi_gpio;

/// Joint identifiers and the joint to channel map.
mod joint;

/// Simulated driver which only logs the demanded pulses.
mod sim;

#[cfg(test)]
pub(crate) mod mock;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

pub use joint::*;
pub use sim::SimDriver;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
///
/// Writes are synchronous, once the call returns the driver has accepted the new pulse width.
pub trait ServoDriver {

    /// Set the pulse width of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to command
    /// - `width_us` - The width of the pulse in microseconds
    fn set_pulse_width(&mut self, channel: Channel, width_us: u16) -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A physical output channel of the servo driver.
///
/// The meaning of the number depends on the driver: a BCM GPIO pin for the Raspberry Pi driver,
/// an output index for the PCA9685.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct Channel(pub u8);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Channel {0} is not available on this driver")]
    InvalidChannel(Channel),

    #[error("Pulse width of {0} us cannot be produced by this driver")]
    InvalidPulseWidth(u16),

    #[error("Driver fault: {0}")]
    Fault(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

impl<D> ServoDriver for Box<D>
where
    D: ServoDriver + ?Sized
{
    fn set_pulse_width(&mut self, channel: Channel, width_us: u16) -> Result<(), ServoError> {
        (**self).set_pulse_width(channel, width_us)
    }
}
