//! Joint identifiers and the joint to channel map

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

use super::Channel;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of joints on the walker (4 shoulders, 4 elbows).
pub const NUM_JOINTS: usize = 8;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all joints on the walker.
///
/// Legs are numbered 1 to 4, each leg has one shoulder and one elbow.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub enum JointId {
    #[serde(rename = "shoulder_1")]
    Shoulder1,
    #[serde(rename = "shoulder_2")]
    Shoulder2,
    #[serde(rename = "shoulder_3")]
    Shoulder3,
    #[serde(rename = "shoulder_4")]
    Shoulder4,
    #[serde(rename = "elbow_1")]
    Elbow1,
    #[serde(rename = "elbow_2")]
    Elbow2,
    #[serde(rename = "elbow_3")]
    Elbow3,
    #[serde(rename = "elbow_4")]
    Elbow4,
}

/// Errors relating to joint identification and mapping.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum JointError {
    #[error("Unknown joint name \"{0}\"")]
    UnknownJoint(String),

    #[error("No channel is assigned to joint {0}")]
    MissingJoint(JointId),

    #[error("Channel {channel} is assigned to both {first} and {second}")]
    DuplicateChannel {
        channel: Channel,
        first: JointId,
        second: JointId,
    },
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Static mapping from every joint onto its physical output channel.
///
/// The map is complete (every joint has a channel) and injective (no two joints share a channel),
/// these properties are checked on construction and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct JointMap {
    channels: [Channel; NUM_JOINTS],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointId {
    /// All joints, shoulders first.
    pub const ALL: [JointId; NUM_JOINTS] = [
        JointId::Shoulder1,
        JointId::Shoulder2,
        JointId::Shoulder3,
        JointId::Shoulder4,
        JointId::Elbow1,
        JointId::Elbow2,
        JointId::Elbow3,
        JointId::Elbow4,
    ];

    /// Index of the joint into per-joint arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The name of the joint as used in parameter and gait files.
    pub fn name(self) -> &'static str {
        match self {
            JointId::Shoulder1 => "shoulder_1",
            JointId::Shoulder2 => "shoulder_2",
            JointId::Shoulder3 => "shoulder_3",
            JointId::Shoulder4 => "shoulder_4",
            JointId::Elbow1 => "elbow_1",
            JointId::Elbow2 => "elbow_2",
            JointId::Elbow3 => "elbow_3",
            JointId::Elbow4 => "elbow_4",
        }
    }

    /// Leg number (1 to 4) the joint belongs to.
    pub fn leg(self) -> u8 {
        (self.index() % 4) as u8 + 1
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JointId {
    type Err = JointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        JointId::ALL
            .iter()
            .copied()
            .find(|j| j.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| JointError::UnknownJoint(s.to_string()))
    }
}

impl JointMap {
    /// Build a map from a per-joint table of channels.
    pub fn from_table(table: &HashMap<JointId, Channel>) -> Result<Self, JointError> {
        let mut channels = [Channel(0); NUM_JOINTS];

        for joint in JointId::ALL.iter() {
            channels[joint.index()] = *table
                .get(joint)
                .ok_or(JointError::MissingJoint(*joint))?;
        }

        // Check no channel is driven by two joints
        for (i, first) in JointId::ALL.iter().enumerate() {
            for second in JointId::ALL.iter().skip(i + 1) {
                if channels[first.index()] == channels[second.index()] {
                    return Err(JointError::DuplicateChannel {
                        channel: channels[first.index()],
                        first: *first,
                        second: *second,
                    });
                }
            }
        }

        Ok(Self { channels })
    }

    /// Build a map from a table keyed by joint name, as found in parameter files.
    pub fn from_names(table: &HashMap<String, Channel>) -> Result<Self, JointError> {
        let mut by_id = HashMap::new();
        for (name, channel) in table.iter() {
            by_id.insert(name.parse::<JointId>()?, *channel);
        }

        Self::from_table(&by_id)
    }

    /// Get the channel driving the given joint.
    pub fn channel(&self, joint: JointId) -> Channel {
        self.channels[joint.index()]
    }

    /// Iterate over all `(joint, channel)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, Channel)> + '_ {
        JointId::ALL.iter().map(move |j| (*j, self.channels[j.index()]))
    }
}

impl Default for JointMap {
    /// The wiring of the walker's harness onto the Raspberry Pi's BCM GPIO pins.
    fn default() -> Self {
        Self {
            channels: [
                Channel(4),
                Channel(17),
                Channel(27),
                Channel(22),
                Channel(18),
                Channel(23),
                Channel(24),
                Channel(25),
            ],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_joint_names() {
        for j in JointId::ALL.iter() {
            assert_eq!(j.name().parse::<JointId>(), Ok(*j));
        }
        assert_eq!("Elbow_3".parse::<JointId>(), Ok(JointId::Elbow3));
        assert!(matches!("knee_1".parse::<JointId>(), Err(JointError::UnknownJoint(_))));
        assert_eq!(JointId::Shoulder3.leg(), 3);
        assert_eq!(JointId::Elbow4.leg(), 4);
    }

    #[test]
    fn test_default_map() {
        let map = JointMap::default();
        assert_eq!(map.channel(JointId::Shoulder1), Channel(4));
        assert_eq!(map.channel(JointId::Elbow4), Channel(25));

        // Rebuilding from its own table gives the same map
        let table: HashMap<_, _> = map.iter().collect();
        assert_eq!(JointMap::from_table(&table), Ok(map));
    }

    #[test]
    fn test_map_validation() {
        let mut table: HashMap<_, _> = JointMap::default().iter().collect();

        table.insert(JointId::Elbow2, Channel(4));
        assert_eq!(
            JointMap::from_table(&table),
            Err(JointError::DuplicateChannel {
                channel: Channel(4),
                first: JointId::Shoulder1,
                second: JointId::Elbow2
            })
        );

        table.remove(&JointId::Elbow2);
        assert_eq!(
            JointMap::from_table(&table),
            Err(JointError::MissingJoint(JointId::Elbow2))
        );
    }

    #[test]
    fn test_joint_map_toml() {
        let mut table: HashMap<String, Channel> = util::params::from_str(
            "shoulder_1 = 0\nshoulder_2 = 1\nshoulder_3 = 2\nshoulder_4 = 3\n\
             elbow_1 = 4\nelbow_2 = 5\nelbow_3 = 6\nelbow_4 = 7"
        ).unwrap();
        let map = JointMap::from_names(&table).unwrap();
        assert_eq!(map.channel(JointId::Elbow1), Channel(4));

        table.insert("wrist_1".into(), Channel(9));
        assert_eq!(
            JointMap::from_names(&table),
            Err(JointError::UnknownJoint("wrist_1".into()))
        );
    }
}
