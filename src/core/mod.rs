//! Kurven- und Pfad-Kern: Segmente, Pfade, Transformationen, Follower.

pub mod bezier_path;
pub mod cardinal_path;
pub mod cubic_spline;
pub mod follower;
/// Pfad-Datenmodell
///
/// - Path: Segment-Kette mit kumulierter Länge und Wasserzeichen
/// - Node: einzelnes Segment (Kurve + kumulierte Länge)
/// - Location: Segment-Index + Kurvenparameter
pub mod path;
pub mod physics;
pub mod transform;

pub use bezier_path::{BezierNode, BezierPath};
pub use cardinal_path::CardinalPath;
pub use cubic_spline::{CubicSpline, LengthSample};
pub use follower::{EntityId, FollowerHost, PathAccess, PathFollower};
pub use path::{EditablePath, Location, Node, Path, SegmentKind, MIN_NODE_COUNT};
pub use physics::{clamp_to_path_ends, step_motion, MotionState, PathPhysicsFollower, PhysicsParams};
pub use transform::{RigidTransform, Space, TransformProvider};
