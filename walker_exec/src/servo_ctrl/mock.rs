//! Recording driver used by the unit tests

use std::sync::{Arc, Mutex};

use super::{Channel, ServoDriver, ServoError};

/// Records every write so tests can inspect them after the driver has been moved into a
/// controller, optionally failing from a given write onwards.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockDriver {
    writes: Arc<Mutex<Vec<(Channel, u16)>>>,
    attempts: Arc<Mutex<usize>>,
    fail_from: Option<usize>,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Driver whose `n`th write attempt (zero based) and all following attempts fail.
    pub(crate) fn failing_from(n: usize) -> Self {
        Self {
            fail_from: Some(n),
            ..Self::default()
        }
    }

    pub(crate) fn writes(&self) -> Vec<(Channel, u16)> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn writes_to(&self, channel: Channel) -> Vec<u16> {
        self.writes()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, p)| p)
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.writes.lock().unwrap().clear();
    }
}

impl ServoDriver for MockDriver {
    fn set_pulse_width(&mut self, channel: Channel, width_us: u16) -> Result<(), ServoError> {
        let mut attempts = self.attempts.lock().unwrap();
        let n = *attempts;
        *attempts += 1;

        match self.fail_from {
            Some(f) if n >= f => Err(ServoError::Fault(format!("injected fault on write {}", n))),
            _ => {
                self.writes.lock().unwrap().push((channel, width_us));
                Ok(())
            }
        }
    }
}
