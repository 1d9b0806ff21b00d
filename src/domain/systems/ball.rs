use crate::domain::ports::BodyType;
use crate::domain::state::SimBody;
use glam::{Quat, Vec3};
use tracing::trace;

#[derive(Debug, Clone, Copy)]
pub struct BallConfig {
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity: Vec3,

    pub floor_y: f32,
    // Walls sit at +/- half_size on X and Z and stop at wall_height.
    pub half_size: f32,
    pub wall_height: f32,
}

// Fixed colliders (walls, floor) carry zero restitution; contacts average the two.
const FIXED_RESTITUTION: f32 = 0.0;

// Rebounds slower than this (plus one step of gravity) settle instead of micro-bouncing.
const REST_SPEED: f32 = 0.05;

pub fn tick_ball(body: &mut SimBody, dt: f32, cfg: BallConfig) {
    // Kinematic bodies are posed by the grab controller.
    if body.body_type != BodyType::Dynamic || dt <= 0.0 {
        return;
    }

    // Integrate velocity.
    body.linear_velocity += cfg.gravity * dt;
    body.linear_velocity *= 1.0 / (1.0 + dt * cfg.linear_damping);
    body.angular_velocity *= 1.0 / (1.0 + dt * cfg.angular_damping);

    // Integrate pose.
    let before = body.translation;
    body.translation += body.linear_velocity * dt;
    let spin = Quat::from_scaled_axis(body.angular_velocity * dt);
    body.rotation = (spin * body.rotation).normalize();

    resolve_contacts(body, before, dt, cfg);
}

fn resolve_contacts(body: &mut SimBody, before: Vec3, dt: f32, cfg: BallConfig) {
    let restitution = (cfg.restitution + FIXED_RESTITUTION) / 2.0;
    let floor = cfg.floor_y + cfg.radius;
    let wall = cfg.half_size - cfg.radius;
    let rest_speed = REST_SPEED + cfg.gravity.length() * dt;

    body.on_floor = false;
    if body.translation.y <= floor {
        body.translation.y = floor;
        if body.linear_velocity.y < 0.0 {
            let rebound = -body.linear_velocity.y * restitution;
            body.linear_velocity.y = if rebound < rest_speed { 0.0 } else { rebound };
        }
        body.on_floor = body.linear_velocity.y == 0.0;
    }

    if body.on_floor {
        // Floor friction slows rolling and sliding.
        let keep = (1.0 - cfg.friction * dt).max(0.0);
        body.linear_velocity.x *= keep;
        body.linear_velocity.z *= keep;
    }

    // A ball clearing the top of the walls leaves the room.
    if body.translation.y - cfg.radius >= cfg.floor_y + cfg.wall_height {
        return;
    }

    for axis in [0usize, 2] {
        let position = body.translation[axis];
        // Only a ball crossing from inside hits a wall; one that left over the top stays out.
        if position.abs() > wall && before[axis].abs() <= wall {
            body.translation[axis] = wall.copysign(position);
            let velocity = body.linear_velocity[axis];
            if velocity.signum() == position.signum() {
                body.linear_velocity[axis] = -velocity * restitution;
                trace!(axis, velocity, "ball hit wall");
            }
        }
    }
}
