//! Minimale Entity-Szene: Transformationen, Eltern-Verweise und Pfade.
//!
//! Transformationen sind Weltwerte; Eltern-Verweise dienen nur der
//! Hierarchie-Abfrage (`is_same_or_descendant`).

use std::collections::HashMap;

use glam::Vec3;

use crate::core::{EditablePath, EntityId, FollowerHost, PathAccess, RigidTransform};

/// Entity-Speicher, der Followern Pfade und Agent-Positionen bereitstellt.
#[derive(Default)]
pub struct Scene {
    next_id: EntityId,
    transforms: HashMap<EntityId, RigidTransform>,
    parents: HashMap<EntityId, EntityId>,
    paths: HashMap<EntityId, Box<dyn EditablePath>>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.transforms.len())
            .field("paths", &self.paths.len())
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legt eine Entity an. Ein unbekannter Parent wird ignoriert.
    pub fn spawn(&mut self, parent: Option<EntityId>, transform: RigidTransform) -> EntityId {
        self.next_id += 1;
        let id = self.next_id;
        self.transforms.insert(id, transform);

        if let Some(parent) = parent {
            if self.transforms.contains_key(&parent) {
                self.parents.insert(id, parent);
            } else {
                log::warn!("Parent {} existiert nicht, Entity {} ohne Parent", parent, id);
            }
        }
        id
    }

    /// Entfernt eine Entity samt Pfad. Kinder verlieren ihren Parent-Verweis.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.transforms.remove(&id).is_none() {
            return false;
        }
        self.paths.remove(&id);
        self.parents.remove(&id);
        self.parents.retain(|_, parent| *parent != id);
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.transforms.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.parents.get(&id).copied()
    }

    pub fn transform(&self, id: EntityId) -> Option<&RigidTransform> {
        self.transforms.get(&id)
    }

    /// Setzt die Welttransformation einer Entity.
    pub fn set_transform(&mut self, id: EntityId, transform: RigidTransform) -> bool {
        let Some(slot) = self.transforms.get_mut(&id) else {
            return false;
        };
        *slot = transform;
        true
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.transforms.get(&id).map(|t| t.position)
    }

    /// Hängt einen Pfad an eine Entity (ersetzt einen vorhandenen).
    pub fn attach_path(&mut self, id: EntityId, path: impl EditablePath + 'static) -> bool {
        if !self.transforms.contains_key(&id) {
            log::warn!("Pfad nicht angehängt: Entity {} existiert nicht", id);
            return false;
        }
        self.paths.insert(id, Box::new(path));
        true
    }

    pub fn path(&self, id: EntityId) -> Option<&dyn EditablePath> {
        match self.paths.get(&id) {
            Some(path) => Some(path.as_ref()),
            None => None,
        }
    }

    pub fn editable_path_mut(&mut self, id: EntityId) -> Option<&mut (dyn EditablePath + 'static)> {
        self.paths.get_mut(&id).map(|path| path.as_mut())
    }
}

impl FollowerHost for Scene {
    fn path_mut(&mut self, path_id: EntityId) -> Option<PathAccess<'_>> {
        let transform = self.transforms.get(&path_id)?;
        let path = self.paths.get_mut(&path_id)?.path_mut();
        Some(PathAccess { path, transform })
    }

    fn is_same_or_descendant(&self, candidate: EntityId, ancestor: EntityId) -> bool {
        let mut current = candidate;
        // Obergrenze schützt vor zyklischen Eltern-Verweisen
        for _ in 0..=self.parents.len() {
            if current == ancestor {
                return true;
            }
            match self.parents.get(&current) {
                Some(&parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    fn set_agent_position(&mut self, agent: EntityId, position: Vec3) {
        match self.transforms.get_mut(&agent) {
            Some(transform) => transform.position = position,
            None => log::warn!("Agent {} existiert nicht, Position verworfen", agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BezierPath, CardinalPath};

    #[test]
    fn test_spawn_und_hierarchie() {
        let mut scene = Scene::new();
        let root = scene.spawn(None, RigidTransform::IDENTITY);
        let child = scene.spawn(Some(root), RigidTransform::IDENTITY);
        let grandchild = scene.spawn(Some(child), RigidTransform::IDENTITY);
        let other = scene.spawn(None, RigidTransform::IDENTITY);

        assert_eq!(scene.entity_count(), 4);
        assert_eq!(scene.parent(grandchild), Some(child));
        assert!(scene.is_same_or_descendant(grandchild, root));
        assert!(scene.is_same_or_descendant(root, root));
        assert!(!scene.is_same_or_descendant(root, grandchild));
        assert!(!scene.is_same_or_descendant(other, root));
    }

    #[test]
    fn test_unbekannter_parent_ignoriert() {
        let mut scene = Scene::new();
        let id = scene.spawn(Some(42), RigidTransform::IDENTITY);
        assert_eq!(scene.parent(id), None);
    }

    #[test]
    fn test_despawn_loest_kinder() {
        let mut scene = Scene::new();
        let root = scene.spawn(None, RigidTransform::IDENTITY);
        let child = scene.spawn(Some(root), RigidTransform::IDENTITY);
        scene.attach_path(root, BezierPath::new());

        assert!(scene.despawn(root));
        assert!(!scene.despawn(root));
        assert_eq!(scene.parent(child), None);
        assert!(scene.path(root).is_none());
    }

    #[test]
    fn test_pfad_zugriff_mit_transform() {
        let mut scene = Scene::new();
        let track = scene.spawn(None, RigidTransform::from_translation(Vec3::new(0.0, 3.0, 0.0)));
        assert!(scene.attach_path(track, CardinalPath::new()));
        assert!(!scene.attach_path(99, CardinalPath::new()));

        let access = scene.path_mut(track).expect("Pfad vorhanden");
        assert_eq!(access.transform.position(), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(access.path.node_count(), 2);

        if let Some(path) = scene.editable_path_mut(track) {
            path.insert_node(2);
        }
        assert_eq!(scene.path(track).map(|p| p.node_count()), Some(3));
    }

    #[test]
    fn test_agent_position_schreiben() {
        let mut scene = Scene::new();
        let agent = scene.spawn(None, RigidTransform::IDENTITY);
        scene.set_agent_position(agent, Vec3::ONE);
        assert_eq!(scene.position(agent), Some(Vec3::ONE));

        // Unbekannter Agent: kein Effekt
        scene.set_agent_position(77, Vec3::ONE);
        assert!(!scene.contains(77));
    }
}
