//! Geteilte Hilfen ohne Abhängigkeit zu Pfad-Typen: Numerik und Optionen.

pub mod math;
pub mod options;

pub use options::EngineOptions;
pub use options::{CARDINAL_TENSION, PHYSICS_FIXED_DELTA_TIME};
