// Domain-level simulation body and its snapshot type.

use crate::domain::ports::{BodyType, PhysicsBody};
use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub translation: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub body_type: BodyType,
}

/// In-memory rigid body standing in for the physics engine's ball.
#[derive(Debug, Clone)]
pub struct SimBody {
    pub body_type: BodyType,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,

    // Set by the ball system each step; not part of the port.
    pub on_floor: bool,
}

impl SimBody {
    pub fn dynamic_at(translation: Vec3) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            translation,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            on_floor: false,
        }
    }
}

impl PhysicsBody for SimBody {
    fn set_body_type(&mut self, body_type: BodyType) {
        if body_type == BodyType::KinematicPositionBased {
            // Kinematic bodies are moved by pose writes only.
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
        self.body_type = body_type;
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }
}

impl From<&SimBody> for BodySnapshot {
    fn from(body: &SimBody) -> Self {
        Self {
            translation: body.translation,
            rotation: body.rotation,
            linear_velocity: body.linear_velocity,
            body_type: body.body_type,
        }
    }
}
