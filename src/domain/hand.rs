// Hand identity, the WebXR joint catalogue and per-frame joint snapshots.

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const BOTH: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Slot used for per-hand arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Number of tracked joints per hand.
pub const JOINT_COUNT: usize = 25;

/// The joints reported by an XR hand input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbMetacarpal,
    ThumbPhalanxProximal,
    ThumbPhalanxDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexPhalanxProximal,
    IndexPhalanxIntermediate,
    IndexPhalanxDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddlePhalanxProximal,
    MiddlePhalanxIntermediate,
    MiddlePhalanxDistal,
    MiddleTip,
    RingMetacarpal,
    RingPhalanxProximal,
    RingPhalanxIntermediate,
    RingPhalanxDistal,
    RingTip,
    PinkyMetacarpal,
    PinkyPhalanxProximal,
    PinkyPhalanxIntermediate,
    PinkyPhalanxDistal,
    PinkyTip,
}

impl HandJoint {
    pub const ALL: [HandJoint; JOINT_COUNT] = [
        Self::Wrist,
        Self::ThumbMetacarpal,
        Self::ThumbPhalanxProximal,
        Self::ThumbPhalanxDistal,
        Self::ThumbTip,
        Self::IndexMetacarpal,
        Self::IndexPhalanxProximal,
        Self::IndexPhalanxIntermediate,
        Self::IndexPhalanxDistal,
        Self::IndexTip,
        Self::MiddleMetacarpal,
        Self::MiddlePhalanxProximal,
        Self::MiddlePhalanxIntermediate,
        Self::MiddlePhalanxDistal,
        Self::MiddleTip,
        Self::RingMetacarpal,
        Self::RingPhalanxProximal,
        Self::RingPhalanxIntermediate,
        Self::RingPhalanxDistal,
        Self::RingTip,
        Self::PinkyMetacarpal,
        Self::PinkyPhalanxProximal,
        Self::PinkyPhalanxIntermediate,
        Self::PinkyPhalanxDistal,
        Self::PinkyTip,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Joint name as used by the XR input layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbMetacarpal => "thumb-metacarpal",
            Self::ThumbPhalanxProximal => "thumb-phalanx-proximal",
            Self::ThumbPhalanxDistal => "thumb-phalanx-distal",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMetacarpal => "index-finger-metacarpal",
            Self::IndexPhalanxProximal => "index-finger-phalanx-proximal",
            Self::IndexPhalanxIntermediate => "index-finger-phalanx-intermediate",
            Self::IndexPhalanxDistal => "index-finger-phalanx-distal",
            Self::IndexTip => "index-finger-tip",
            Self::MiddleMetacarpal => "middle-finger-metacarpal",
            Self::MiddlePhalanxProximal => "middle-finger-phalanx-proximal",
            Self::MiddlePhalanxIntermediate => "middle-finger-phalanx-intermediate",
            Self::MiddlePhalanxDistal => "middle-finger-phalanx-distal",
            Self::MiddleTip => "middle-finger-tip",
            Self::RingMetacarpal => "ring-finger-metacarpal",
            Self::RingPhalanxProximal => "ring-finger-phalanx-proximal",
            Self::RingPhalanxIntermediate => "ring-finger-phalanx-intermediate",
            Self::RingPhalanxDistal => "ring-finger-phalanx-distal",
            Self::RingTip => "ring-finger-tip",
            Self::PinkyMetacarpal => "pinky-finger-metacarpal",
            Self::PinkyPhalanxProximal => "pinky-finger-phalanx-proximal",
            Self::PinkyPhalanxIntermediate => "pinky-finger-phalanx-intermediate",
            Self::PinkyPhalanxDistal => "pinky-finger-phalanx-distal",
            Self::PinkyTip => "pinky-finger-tip",
        }
    }

    pub fn from_name(name: &str) -> Option<HandJoint> {
        Self::ALL.into_iter().find(|joint| joint.as_str() == name)
    }
}

/// World-space joint positions for one hand on one frame.
///
/// Joints the input layer did not report stay absent; consumers must treat
/// an absent joint as "unknown", never as the origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointSnapshot {
    positions: [Option<Vec3>; JOINT_COUNT],
}

impl JointSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, joint: HandJoint, position: Vec3) -> Self {
        self.insert(joint, position);
        self
    }

    pub fn insert(&mut self, joint: HandJoint, position: Vec3) {
        self.positions[joint.index()] = Some(position);
    }

    pub fn remove(&mut self, joint: HandJoint) -> Option<Vec3> {
        self.positions[joint.index()].take()
    }

    pub fn get(&self, joint: HandJoint) -> Option<Vec3> {
        self.positions[joint.index()]
    }

    pub fn len(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
