//! Path Motion Library.
//! Kubische Kurven, Pfade mit Bogenlängen-Parametrisierung und Pfad-Follower.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{Scene, Simulation, SimulationReport};
pub use core::{
    BezierNode, BezierPath, CardinalPath, CubicSpline, EditablePath, Location, Path, SegmentKind,
};
pub use core::{
    EntityId, FollowerHost, PathAccess, PathFollower, PathPhysicsFollower, PhysicsParams,
};
pub use core::{RigidTransform, Space, TransformProvider};
pub use shared::EngineOptions;
