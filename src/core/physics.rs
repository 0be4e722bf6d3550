//! Eindimensionale Längsdynamik entlang der Pfad-Tangente.
//!
//! `step_motion` ist eine reine Funktion; `PathPhysicsFollower` ruft sie pro
//! Fixed-Tick mit der aktuellen Welt-Tangente auf und schreibt die neue Distanz
//! in seinen `PathFollower`.

use glam::Vec3;

use super::follower::{EntityId, FollowerHost, PathFollower};
use crate::shared::math::decelerate;
use crate::shared::options::{
    EngineOptions, PHYSICS_DRAG, PHYSICS_FRICTION_COEFFICIENT, PHYSICS_MAX_SPEED,
};

/// Physik-Parameter (alle ≥ 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Anteil von Quergeschwindigkeit bzw. Anpressdruck, der bremst
    pub friction_coefficient: f32,
    /// Konstanter Widerstand (Einheiten/s²)
    pub drag: f32,
    /// Betragsgrenze der Geschwindigkeit
    pub max_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            friction_coefficient: PHYSICS_FRICTION_COEFFICIENT,
            drag: PHYSICS_DRAG,
            max_speed: PHYSICS_MAX_SPEED,
        }
    }
}

impl PhysicsParams {
    /// Klemmt negative Werte auf 0.
    pub fn sanitized(self) -> Self {
        Self {
            friction_coefficient: self.friction_coefficient.max(0.0),
            drag: self.drag.max(0.0),
            max_speed: self.max_speed.max(0.0),
        }
    }
}

impl From<&EngineOptions> for PhysicsParams {
    fn from(options: &EngineOptions) -> Self {
        Self {
            friction_coefficient: options.friction_coefficient,
            drag: options.drag,
            max_speed: options.max_speed,
        }
        .sanitized()
    }
}

/// Zustand der Längsbewegung.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    /// Distanz ab Pfadstart (Welteinheiten)
    pub distance: f32,
    /// Vorzeichenbehaftete Geschwindigkeit entlang der Tangente
    pub speed: f32,
    /// Weltgeschwindigkeit des letzten Ticks
    pub velocity: Vec3,
    /// `false` bis zum ersten Tick nach (Re-)Aktivierung
    pub initialized: bool,
}

/// Ein Fixed-Tick der Längsdynamik.
///
/// `tangent` ist die normierte Welt-Tangente an der aktuellen Position,
/// `force` die angreifende Weltkraft (pro Masseneinheit).
pub fn step_motion(
    state: MotionState,
    tangent: Vec3,
    params: PhysicsParams,
    force: Vec3,
    delta_time: f32,
) -> MotionState {
    // (a) Letzte Geschwindigkeit auf die neue Tangente projizieren
    let (along, lateral) = if state.initialized {
        let along = state.velocity.dot(tangent);
        let lateral = (state.velocity - along * tangent).length();
        (along, lateral)
    } else {
        (state.speed, 0.0)
    };

    // (b) Querkomponente bremst die Längskomponente
    let mut speed = decelerate(along, lateral * params.friction_coefficient);

    // (c) Kraft in Schub und Anpressdruck zerlegen
    let thrust = force.dot(tangent);
    let pressure = (force - thrust * tangent).length();

    // (d) Schub integrieren, dann Widerstand gegen die Fahrtrichtung
    speed += thrust * delta_time;
    let resistance = (params.drag + pressure * params.friction_coefficient) * delta_time;
    speed = decelerate(speed, resistance);

    // (e)
    speed = speed.clamp(-params.max_speed, params.max_speed);

    // (f)
    MotionState {
        distance: state.distance + speed * delta_time,
        speed,
        velocity: tangent * speed,
        initialized: true,
    }
}

/// Klemmt die Distanz auf `[0, length]` eines offenen Pfads.
///
/// Am Ende wird die Geschwindigkeit verworfen, die weiter hinaus zeigt.
pub fn clamp_to_path_ends(state: MotionState, length: f32) -> MotionState {
    let length = length.max(0.0);
    let blocked = (state.distance >= length && state.speed > 0.0)
        || (state.distance <= 0.0 && state.speed < 0.0);
    let distance = state.distance.clamp(0.0, length);
    if blocked {
        MotionState {
            distance,
            speed: 0.0,
            velocity: Vec3::ZERO,
            ..state
        }
    } else {
        MotionState { distance, ..state }
    }
}

/// Follower mit Längsdynamik.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPhysicsFollower {
    follower: PathFollower,
    params: PhysicsParams,
    state: MotionState,
    force: Vec3,
    enabled: bool,
}

impl PathPhysicsFollower {
    pub fn new(agent: EntityId, params: PhysicsParams) -> Self {
        Self {
            follower: PathFollower::new(agent),
            params: params.sanitized(),
            state: MotionState::default(),
            force: Vec3::ZERO,
            enabled: true,
        }
    }

    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    pub fn params(&self) -> PhysicsParams {
        self.params
    }

    pub fn set_params(&mut self, params: PhysicsParams) {
        self.params = params.sanitized();
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn speed(&self) -> f32 {
        self.state.speed
    }

    /// Setzt die Geschwindigkeit (wirkt ab dem nächsten Tick entlang der Tangente).
    pub fn set_speed(&mut self, speed: f32) {
        self.state.speed = speed;
        self.state.initialized = false;
    }

    pub fn distance(&self) -> f32 {
        self.follower.distance()
    }

    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Angreifende Weltkraft für die folgenden Ticks.
    pub fn set_force(&mut self, force: Vec3) {
        self.force = force;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Deaktivieren stoppt den Agenten und verwirft die Geschwindigkeitshistorie.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.state.speed = 0.0;
            self.state.velocity = Vec3::ZERO;
            self.state.initialized = false;
        }
    }

    pub fn set_path(&mut self, path: Option<EntityId>, host: &mut dyn FollowerHost) -> bool {
        self.follower.set_path(path, host)
    }

    pub fn set_distance(&mut self, distance: f32, host: &mut dyn FollowerHost) {
        self.follower.set_distance(distance, host);
    }

    /// Ein Physik-Tick. Gibt `false` zurück, wenn deaktiviert oder ohne Pfad.
    pub fn fixed_update(&mut self, delta_time: f32, host: &mut dyn FollowerHost) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(tangent) = self.follower.world_tangent(host) else {
            return false;
        };

        let state = MotionState {
            distance: self.follower.distance(),
            ..self.state
        };
        let mut next = step_motion(state, tangent, self.params, self.force, delta_time);
        if let Some(length) = self.follower.open_world_length(host) {
            next = clamp_to_path_ends(next, length);
        }
        self.state = next;
        self.follower.set_distance(self.state.distance, host);
        true
    }
}
