use glam::{Quat, Vec3};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    /// Pose is written by external code every frame; the simulation does not move it.
    KinematicPositionBased,
    /// Pose and velocity evolve under the simulation.
    Dynamic,
}

// Port for the physics engine's rigid body, limited to the mutations the grab controller needs.
pub trait PhysicsBody {
    fn set_body_type(&mut self, body_type: BodyType);
    fn set_translation(&mut self, translation: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
}
