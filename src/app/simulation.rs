//! Headless Fixed-Step-Simulation: ein Physik-Follower auf einem Pfad.

use glam::{Quat, Vec3};

use super::scene::Scene;
use crate::core::{
    CardinalPath, EditablePath, EntityId, PathPhysicsFollower, PhysicsParams, RigidTransform,
};
use crate::shared::EngineOptions;

/// Anzahl Nodes des Demo-Rings.
const DEMO_RING_NODES: usize = 8;
/// Radius des Demo-Rings (Pfad-Koordinaten).
const DEMO_RING_RADIUS: f32 = 20.0;
/// Log-Intervall in Ticks.
const PROGRESS_INTERVAL: u32 = 50;

/// Ergebnis eines Simulationslaufs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationReport {
    pub ticks: u32,
    pub distance: f32,
    pub speed: f32,
    pub position: Vec3,
}

/// Treibt einen `PathPhysicsFollower` mit festem Zeitschritt durch eine Szene.
#[derive(Debug)]
pub struct Simulation {
    scene: Scene,
    follower: PathPhysicsFollower,
    track: EntityId,
    fixed_delta_time: f32,
    tick: u32,
}

impl Simulation {
    /// Baut eine Simulation aus vorhandener Szene und Follower.
    ///
    /// Gibt `None` zurück, wenn der Pfad nicht zugewiesen werden kann.
    pub fn new(
        mut scene: Scene,
        mut follower: PathPhysicsFollower,
        track: EntityId,
        fixed_delta_time: f32,
    ) -> Option<Self> {
        if !follower.set_path(Some(track), &mut scene) {
            return None;
        }
        Some(Self {
            scene,
            follower,
            track,
            fixed_delta_time,
            tick: 0,
        })
    }

    /// Demo-Szene: Cardinal-Ring in der XZ-Ebene, leicht gedreht und versetzt,
    /// plus ein Agent mit konstanter Kraft.
    pub fn demo(options: &EngineOptions) -> Option<Self> {
        let options = options.clone().sanitized();

        let positions: Vec<Vec3> = (0..DEMO_RING_NODES)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / DEMO_RING_NODES as f32;
                Vec3::new(angle.sin(), 0.0, angle.cos()) * DEMO_RING_RADIUS
            })
            .collect();
        let mut ring = CardinalPath::from_positions(&positions, options.circular, options.tension)?;
        ring.path_mut().set_world_scale(options.world_scale);
        ring.path_mut().set_local_length_error(options.length_error);

        let mut scene = Scene::new();
        let track = scene.spawn(
            None,
            RigidTransform::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(0.25)),
        );
        scene.attach_path(track, ring);
        let agent = scene.spawn(None, RigidTransform::IDENTITY);

        let mut follower = PathPhysicsFollower::new(agent, PhysicsParams::from(&options));
        follower.set_force(Vec3::from_array(options.simulation_force));

        log::debug!(
            "Demo-Szene: {} Nodes, geschlossen: {}, Spannung {:.2}",
            DEMO_RING_NODES,
            options.circular,
            options.tension
        );
        Self::new(scene, follower, track, options.fixed_delta_time)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn follower(&self) -> &PathPhysicsFollower {
        &self.follower
    }

    pub fn follower_mut(&mut self) -> &mut PathPhysicsFollower {
        &mut self.follower
    }

    pub fn track(&self) -> EntityId {
        self.track
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Ein Fixed-Tick.
    pub fn step(&mut self) -> bool {
        let advanced = self
            .follower
            .fixed_update(self.fixed_delta_time, &mut self.scene);
        self.tick += 1;
        advanced
    }

    /// Führt `ticks` Schritte aus und meldet den Endzustand.
    pub fn run(&mut self, ticks: u32) -> SimulationReport {
        for _ in 0..ticks {
            self.step();
            if self.tick % PROGRESS_INTERVAL == 0 {
                log::debug!(
                    "Tick {}: Distanz {:.2}, Geschwindigkeit {:.2}",
                    self.tick,
                    self.follower.distance(),
                    self.follower.speed()
                );
            }
        }
        self.report()
    }

    pub fn report(&self) -> SimulationReport {
        let agent = self.follower.follower().agent();
        SimulationReport {
            ticks: self.tick,
            distance: self.follower.distance(),
            speed: self.follower.speed(),
            position: self.scene.position(agent).unwrap_or_default(),
        }
    }
}
