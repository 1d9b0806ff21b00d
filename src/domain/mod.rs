// Domain layer: hand poses, gesture rules, grab control and the ball simulation.

pub mod appearance;
pub mod gesture;
pub mod grab;
pub mod hand;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tracker;
pub mod tuning;

#[cfg(test)]
pub(crate) mod test_support;

pub use gesture::{GestureEvent, GestureKind};
pub use grab::{GrabController, GrabMode, HandleDelta, HandlePose, ReleaseOutcome};
pub use hand::{HandJoint, Handedness, JointSnapshot};
pub use ports::{BodyType, PhysicsBody};
pub use state::{BodySnapshot, SimBody};
pub use tracker::{GestureTracker, SubscriptionId};
