//! Last commanded pulse of every channel

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::BTreeMap;

use crate::servo_ctrl::Channel;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The last pulse width written to each channel.
///
/// Channels that have never been written are reported at the neutral mid-range pulse. The state
/// lives in memory only, a restart brings every channel back to neutral.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelState {
    neutral_us: u16,
    pulses_us: BTreeMap<Channel, u16>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChannelState {
    pub fn new(neutral_us: u16) -> Self {
        Self {
            neutral_us,
            pulses_us: BTreeMap::new(),
        }
    }

    /// Last pulse written to the channel, or the neutral pulse if none was.
    pub fn get(&self, channel: Channel) -> u16 {
        self.pulses_us.get(&channel).copied().unwrap_or(self.neutral_us)
    }

    /// Whether the channel has been written since startup.
    pub fn is_commanded(&self, channel: Channel) -> bool {
        self.pulses_us.contains_key(&channel)
    }

    /// Record a pulse that has been accepted by the driver.
    pub(crate) fn record(&mut self, channel: Channel, pulse_us: u16) {
        self.pulses_us.insert(channel, pulse_us);
    }

    /// Iterate over all commanded channels and their pulses.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, u16)> + '_ {
        self.pulses_us.iter().map(|(c, p)| (*c, *p))
    }
}
