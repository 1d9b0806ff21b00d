// Static hand-pose classification from a single frame of joint positions.

use crate::domain::hand::{HandJoint, JointSnapshot};
use crate::domain::tuning::GestureTuning;
use glam::Vec3;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Index and pinky extended, middle and ring folded.
    RockHorns,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RockHorns => "rock-horns",
        }
    }
}

/// A gesture transition. `active` is true on entry and false on exit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub gesture: GestureKind,
    pub active: bool,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerState {
    Extended,
    Folded,
    /// Ratio sits inside the dead zone between the thresholds.
    Undetermined,
}

impl FingerState {
    pub fn from_ratio(ratio: f32, tuning: &GestureTuning) -> Self {
        if ratio > tuning.extended_threshold {
            Self::Extended
        } else if ratio < tuning.folded_threshold {
            Self::Folded
        } else {
            Self::Undetermined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    fn metacarpal(&self) -> HandJoint {
        match self {
            Self::Index => HandJoint::IndexMetacarpal,
            Self::Middle => HandJoint::MiddleMetacarpal,
            Self::Ring => HandJoint::RingMetacarpal,
            Self::Pinky => HandJoint::PinkyMetacarpal,
        }
    }

    fn tip(&self) -> HandJoint {
        match self {
            Self::Index => HandJoint::IndexTip,
            Self::Middle => HandJoint::MiddleTip,
            Self::Ring => HandJoint::RingTip,
            Self::Pinky => HandJoint::PinkyTip,
        }
    }
}

/// Metacarpal-to-tip distance over wrist-to-metacarpal distance.
///
/// Returns `None` when the reference length is zero or the ratio is not finite.
pub fn finger_extension(wrist: Vec3, metacarpal: Vec3, tip: Vec3) -> Option<f32> {
    let metacarpal_length = wrist.distance(metacarpal);
    if metacarpal_length <= 0.0 {
        return None;
    }
    let ratio = metacarpal.distance(tip) / metacarpal_length;
    ratio.is_finite().then_some(ratio)
}

/// Extension ratio for one finger, or `None` if any joint it needs is missing.
pub fn finger_ratio(snapshot: &JointSnapshot, finger: Finger) -> Option<f32> {
    let wrist = snapshot.get(HandJoint::Wrist)?;
    let metacarpal = snapshot.get(finger.metacarpal())?;
    let tip = snapshot.get(finger.tip())?;
    finger_extension(wrist, metacarpal, tip)
}

pub fn detect_rock_horns(snapshot: &JointSnapshot, tuning: &GestureTuning) -> bool {
    let state = |finger| finger_ratio(snapshot, finger).map(|r| FingerState::from_ratio(r, tuning));

    // Each finger is judged on this frame alone; nothing carries over between frames.
    matches!(
        (
            state(Finger::Index),
            state(Finger::Pinky),
            state(Finger::Middle),
            state(Finger::Ring),
        ),
        (
            Some(FingerState::Extended),
            Some(FingerState::Extended),
            Some(FingerState::Folded),
            Some(FingerState::Folded),
        )
    )
}

pub fn classify(kind: GestureKind, snapshot: &JointSnapshot, tuning: &GestureTuning) -> bool {
    match kind {
        GestureKind::RockHorns => detect_rock_horns(snapshot, tuning),
    }
}
