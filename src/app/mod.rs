//! Application-Layer: Entity-Szene und Headless-Simulation.

pub mod scene;
pub mod simulation;

pub use scene::Scene;
pub use simulation::{Simulation, SimulationReport};
