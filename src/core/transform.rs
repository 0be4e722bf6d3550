//! Abbildung zwischen Pfad-Koordinaten und Weltkoordinaten.
//!
//! Die Welttransformation gehört dem Host (Szene, Engine). Der Pfad kennt nur
//! das schmale `TransformProvider`-Interface und ersetzt die Objektskalierung
//! durch seine eigene `world_scale`. Alle Funktionen hier sind rein:
//! Ergebnis = f(Transform, world_scale, Eingabe).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Schnittstelle zur Welttransformation des Pfad-Besitzers.
pub trait TransformProvider {
    /// Weltposition des Pfad-Ursprungs.
    fn position(&self) -> Vec3;

    /// Weltrotation des Pfads.
    fn rotation(&self) -> Quat;

    /// Dreht eine lokale Richtung in den Weltraum (ohne Skalierung).
    fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation() * direction
    }

    /// Dreht eine Weltrichtung in den lokalen Raum (ohne Skalierung).
    fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation().inverse() * direction
    }
}

/// Starre Transformation (Position + Rotation) als einfacher Wert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidTransform {
    /// Keine Verschiebung, keine Drehung.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Reine Verschiebung.
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TransformProvider for RigidTransform {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }
}

/// Bezugsraum von Parametern und Rückgabewerten einer Pfad-Abfrage.
#[derive(Clone, Copy)]
pub enum Space<'a> {
    /// Pfad-Koordinaten (keine Transformation, keine Skalierung)
    Local,
    /// Weltkoordinaten über die Transformation des Pfad-Besitzers
    World(&'a dyn TransformProvider),
}

impl std::fmt::Debug for Space<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Space::Local => f.write_str("Local"),
            Space::World(t) => write!(f, "World({:?}, {:?})", t.position(), t.rotation()),
        }
    }
}

/// Vorzeichen der Weltskalierung (`0.0` zählt als positiv).
fn scale_sign(world_scale: f32) -> f32 {
    if world_scale < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Lokaler Punkt → Weltpunkt.
pub fn transform_point(transform: &dyn TransformProvider, world_scale: f32, point: Vec3) -> Vec3 {
    transform.transform_direction(world_scale * point) + transform.position()
}

/// Lokaler Vektor → Weltvektor (Länge skaliert mit `world_scale`).
pub fn transform_vector(transform: &dyn TransformProvider, world_scale: f32, vector: Vec3) -> Vec3 {
    transform.transform_direction(world_scale * vector)
}

/// Lokale Richtung → Weltrichtung (Länge bleibt erhalten).
pub fn transform_direction(
    transform: &dyn TransformProvider,
    world_scale: f32,
    direction: Vec3,
) -> Vec3 {
    transform.transform_direction(scale_sign(world_scale) * direction)
}

/// Lokale Rotation → Weltrotation. Negative Skalierung invertiert die lokale Rotation.
pub fn transform_rotation(transform: &dyn TransformProvider, world_scale: f32, rotation: Quat) -> Quat {
    if world_scale >= 0.0 {
        transform.rotation() * rotation
    } else {
        transform.rotation() * rotation.inverse()
    }
}

/// Weltpunkt → lokaler Punkt.
pub fn inverse_transform_point(
    transform: &dyn TransformProvider,
    world_scale: f32,
    point: Vec3,
) -> Vec3 {
    transform.inverse_transform_direction(point - transform.position()) / world_scale
}

/// Weltvektor → lokaler Vektor.
pub fn inverse_transform_vector(
    transform: &dyn TransformProvider,
    world_scale: f32,
    vector: Vec3,
) -> Vec3 {
    transform.inverse_transform_direction(vector) / world_scale
}

/// Weltrichtung → lokale Richtung (Länge bleibt erhalten).
pub fn inverse_transform_direction(
    transform: &dyn TransformProvider,
    world_scale: f32,
    direction: Vec3,
) -> Vec3 {
    transform.inverse_transform_direction(direction) * scale_sign(world_scale)
}

/// Weltrotation → lokale Rotation.
pub fn inverse_transform_rotation(
    transform: &dyn TransformProvider,
    world_scale: f32,
    rotation: Quat,
) -> Quat {
    let local = transform.rotation().inverse() * rotation;
    if world_scale >= 0.0 {
        local
    } else {
        local.inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn rotated() -> RigidTransform {
        RigidTransform::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2))
    }

    #[test]
    fn test_identitaet_skaliert_nur() {
        let t = RigidTransform::IDENTITY;
        assert_eq!(transform_point(&t, 2.0, Vec3::ONE), Vec3::splat(2.0));
        assert_eq!(transform_vector(&t, 2.0, Vec3::X), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(transform_direction(&t, 2.0, Vec3::X), Vec3::X);
    }

    #[test]
    fn test_punkt_round_trip() {
        let t = rotated();
        for &scale in &[1.0f32, 3.5, -2.0] {
            let p = Vec3::new(1.0, 2.0, 3.0);
            let world = transform_point(&t, scale, p);
            let back = inverse_transform_point(&t, scale, world);
            assert!((back - p).length() < 1e-4, "scale {}", scale);
        }
    }

    #[test]
    fn test_richtung_behaelt_laenge_und_spiegelt() {
        let t = rotated();
        let d = Vec3::new(0.0, 0.0, 1.0);
        let positive = transform_direction(&t, 5.0, d);
        let negative = transform_direction(&t, -5.0, d);
        assert!((positive.length() - 1.0).abs() < 1e-5);
        assert!((positive + negative).length() < 1e-5);
        let back = inverse_transform_direction(&t, -5.0, negative);
        assert!((back - d).length() < 1e-5);
    }

    #[test]
    fn test_vektor_round_trip() {
        let t = rotated();
        let v = Vec3::new(-1.0, 0.5, 2.0);
        let world = transform_vector(&t, -3.0, v);
        assert!((world.length() - 3.0 * v.length()).abs() < 1e-4);
        let back = inverse_transform_vector(&t, -3.0, world);
        assert!((back - v).length() < 1e-4);
    }

    #[test]
    fn test_rotation_round_trip_und_vorzeichen() {
        let t = rotated();
        let local = Quat::from_rotation_x(0.3);

        let world = transform_rotation(&t, 1.0, local);
        assert!(inverse_transform_rotation(&t, 1.0, world).abs_diff_eq(local, 1e-5));

        let mirrored = transform_rotation(&t, -1.0, local);
        assert!(mirrored.abs_diff_eq(t.rotation * local.inverse(), 1e-5));
        assert!(inverse_transform_rotation(&t, -1.0, mirrored).abs_diff_eq(local, 1e-5));
    }
}
