use glam::{Quat, Vec3};

use crate::domain::hand::{HandJoint, JointSnapshot};
use crate::domain::ports::{BodyType, PhysicsBody};

pub(crate) const RATIO_EXTENDED: f32 = 0.9;
pub(crate) const RATIO_FOLDED: f32 = 0.2;

// Builds a full hand whose four finger ratios come out exactly as given.
// Metacarpals sit one meter from the wrist on distinct axes and each tip is
// offset along +X, so every distance is exact in f32.
pub(crate) fn hand_with_ratios(index: f32, middle: f32, ring: f32, pinky: f32) -> JointSnapshot {
    let fingers = [
        (HandJoint::IndexMetacarpal, HandJoint::IndexTip, Vec3::Y, index),
        (HandJoint::MiddleMetacarpal, HandJoint::MiddleTip, Vec3::Z, middle),
        (HandJoint::RingMetacarpal, HandJoint::RingTip, Vec3::NEG_Y, ring),
        (HandJoint::PinkyMetacarpal, HandJoint::PinkyTip, Vec3::NEG_Z, pinky),
    ];

    let mut snapshot = JointSnapshot::new()
        .with(HandJoint::Wrist, Vec3::ZERO)
        .with(HandJoint::ThumbTip, Vec3::new(-0.5, 0.5, 0.0));
    for (metacarpal, tip, axis, ratio) in fingers {
        snapshot.insert(metacarpal, axis);
        snapshot.insert(tip, axis + Vec3::new(ratio, 0.0, 0.0));
    }
    snapshot
}

pub(crate) fn rock_horns() -> JointSnapshot {
    hand_with_ratios(RATIO_EXTENDED, RATIO_FOLDED, RATIO_FOLDED, RATIO_EXTENDED)
}

pub(crate) fn open_hand() -> JointSnapshot {
    hand_with_ratios(RATIO_EXTENDED, RATIO_EXTENDED, RATIO_EXTENDED, RATIO_EXTENDED)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BodyCall {
    BodyType(BodyType),
    Translation(Vec3),
    Rotation(Quat),
    LinearVelocity(Vec3),
    AngularVelocity(Vec3),
}

// Physics body fake that records every mutation in call order.
#[derive(Debug, Default)]
pub(crate) struct RecordingBody {
    pub calls: Vec<BodyCall>,
}

impl RecordingBody {
    pub(crate) fn body_type_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BodyCall::BodyType(_)))
            .count()
    }

    pub(crate) fn velocity_calls(&self) -> Vec<&BodyCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, BodyCall::LinearVelocity(_) | BodyCall::AngularVelocity(_)))
            .collect()
    }
}

impl PhysicsBody for RecordingBody {
    fn set_body_type(&mut self, body_type: BodyType) {
        self.calls.push(BodyCall::BodyType(body_type));
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.calls.push(BodyCall::Translation(translation));
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.calls.push(BodyCall::Rotation(rotation));
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.calls.push(BodyCall::LinearVelocity(velocity));
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.calls.push(BodyCall::AngularVelocity(velocity));
    }
}
