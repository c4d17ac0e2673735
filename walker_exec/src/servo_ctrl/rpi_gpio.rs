//! [`ServoDriver`] implementation for the Raspberry Pi GPIO header
//!
//! Uses rppal's software PWM so any BCM pin can drive a servo.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use rppal::gpio::{Gpio, OutputPin};
use std::{collections::HashMap, time::Duration};

use super::{Channel, JointMap, ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Servo PWM period (50 Hz).
const PWM_PERIOD: Duration = Duration::from_millis(20);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Servo driver using the GPIO pins of the Raspberry Pi directly.
pub struct RpiGpioDriver {
    pins: HashMap<Channel, OutputPin>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RpiGpioDriver {
    /// Claim the output pins for every joint in the map.
    pub fn new(joints: &JointMap) -> Result<Self, ServoError> {
        let gpio = Gpio::new().map_err(|e| ServoError::Gpio(e.to_string()))?;

        let mut pins = HashMap::new();
        for (joint, channel) in joints.iter() {
            let pin = gpio
                .get(channel.0)
                .map_err(|e| ServoError::Gpio(e.to_string()))?
                .into_output();
            debug!("Claimed GPIO {} for {}", channel.0, joint);
            pins.insert(channel, pin);
        }

        Ok(Self { pins })
    }
}

impl ServoDriver for RpiGpioDriver {
    fn set_pulse_width(&mut self, channel: Channel, width_us: u16) -> Result<(), ServoError> {
        let pin = self
            .pins
            .get_mut(&channel)
            .ok_or(ServoError::InvalidChannel(channel))?;

        pin.set_pwm(PWM_PERIOD, Duration::from_micros(width_us as u64))
            .map_err(|e| ServoError::Gpio(e.to_string()))
    }
}
