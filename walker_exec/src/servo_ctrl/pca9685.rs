//! [`ServoDriver`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use pwm_pca9685::{Channel as PcaChannel, Pca9685};
use embedded_hal::blocking::i2c::{Write, WriteRead};

use super::{Channel, ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of counts in one PWM period.
const MAX_PWM: u32 = 4096;

/// Servo PWM period at 50 Hz.
const PERIOD_US: u32 = 20_000;

/// Prescale value giving a 50 Hz output from the 25 MHz internal oscillator.
///
/// `round(25 MHz / (4096 * 50 Hz)) - 1`
const PRESCALE_50HZ: u8 = 121;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create and configure a PCA9685 board for driving servos.
pub fn init_pca9685<I2C, E>(i2c: I2C, address: u8) -> Result<Pca9685<I2C>, ServoError>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    let mut pca = Pca9685::new(i2c, address).map_err(map_err)?;
    pca.set_prescale(PRESCALE_50HZ).map_err(map_err)?;
    pca.enable().map_err(map_err)?;

    Ok(pca)
}

/// Convert a pulse width into the number of PWM counts the output is high for.
pub fn pulse_to_counts(width_us: u16) -> Result<u16, ServoError> {
    let counts = (width_us as u32 * MAX_PWM) / PERIOD_US;

    // A full-on output needs the special bit, which is never a valid servo pulse
    if counts >= MAX_PWM {
        return Err(ServoError::InvalidPulseWidth(width_us))
    }

    Ok(counts as u16)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    fn set_pulse_width(
        &mut self,
        channel: Channel,
        width_us: u16
    ) -> Result<(), ServoError> {

        let pca_channel = to_pca_channel(channel)?;
        let off = pulse_to_counts(width_us)?;

        self.set_channel_on_off(pca_channel, 0, off).map_err(map_err)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn map_err<E>(e: pwm_pca9685::Error<E>) -> ServoError {
    match e {
        pwm_pca9685::Error::I2C(_) => ServoError::I2c,
        pwm_pca9685::Error::InvalidInputData => ServoError::Fault("invalid input data".into())
    }
}

fn to_pca_channel(channel: Channel) -> Result<PcaChannel, ServoError> {
    Ok(match channel.0 {
        0 => PcaChannel::C0,
        1 => PcaChannel::C1,
        2 => PcaChannel::C2,
        3 => PcaChannel::C3,
        4 => PcaChannel::C4,
        5 => PcaChannel::C5,
        6 => PcaChannel::C6,
        7 => PcaChannel::C7,
        8 => PcaChannel::C8,
        9 => PcaChannel::C9,
        10 => PcaChannel::C10,
        11 => PcaChannel::C11,
        12 => PcaChannel::C12,
        13 => PcaChannel::C13,
        14 => PcaChannel::C14,
        15 => PcaChannel::C15,
        _ => return Err(ServoError::InvalidChannel(channel))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pulse_to_counts() {
        assert_eq!(pulse_to_counts(1000), Ok(204));
        assert_eq!(pulse_to_counts(1500), Ok(307));
        assert_eq!(pulse_to_counts(2000), Ok(409));
        assert_eq!(pulse_to_counts(20_000), Err(ServoError::InvalidPulseWidth(20_000)));
    }

    #[test]
    fn test_channel_range() {
        assert!(to_pca_channel(Channel(15)).is_ok());
        assert_eq!(
            to_pca_channel(Channel(16)).err(),
            Some(ServoError::InvalidChannel(Channel(16)))
        );
    }
}
