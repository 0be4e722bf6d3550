//! Agent folgt einem Pfad über die zurückgelegte Distanz.
//!
//! Der Follower kennt Pfad und Agent nur über Entity-IDs. Auflösung, Hierarchie
//! und das Schreiben der Position übernimmt der Host (`FollowerHost`).

use glam::Vec3;

use super::path::{Location, Path};
use super::transform::{Space, TransformProvider};

/// Stabile ID einer Host-Entity (Pfad-Besitzer oder Agent).
pub type EntityId = u64;

/// Mutabler Zugriff auf einen Pfad samt Welttransformation seines Besitzers.
pub struct PathAccess<'a> {
    pub path: &'a mut Path,
    pub transform: &'a dyn TransformProvider,
}

/// Vom Host bereitgestellte Dienste.
pub trait FollowerHost {
    /// Pfad der Entity `path_id`, falls vorhanden.
    fn path_mut(&mut self, path_id: EntityId) -> Option<PathAccess<'_>>;

    /// `true` wenn `candidate` gleich `ancestor` ist oder unterhalb davon hängt.
    fn is_same_or_descendant(&self, candidate: EntityId, ancestor: EntityId) -> bool;

    /// Schreibt die Weltposition des Agenten.
    fn set_agent_position(&mut self, agent: EntityId, position: Vec3);
}

/// Positioniert einen Agenten über die Distanz (Welteinheiten) ab Pfadstart.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    agent: EntityId,
    path: Option<EntityId>,
    distance: f32,
    /// Letzte aufgelöste Location; ihr Index dient als Suchhinweis
    location: Location,
}

impl PathFollower {
    pub fn new(agent: EntityId) -> Self {
        Self {
            agent,
            path: None,
            distance: 0.0,
            location: Location::default(),
        }
    }

    pub fn agent(&self) -> EntityId {
        self.agent
    }

    pub fn path(&self) -> Option<EntityId> {
        self.path
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Weist einen Pfad zu und positioniert den Agenten neu.
    ///
    /// Abgelehnt (`false`), wenn der Pfad am Agenten selbst oder an einem seiner
    /// Kinder hängt.
    pub fn set_path(&mut self, path: Option<EntityId>, host: &mut dyn FollowerHost) -> bool {
        if let Some(path_id) = path {
            if host.is_same_or_descendant(path_id, self.agent) {
                log::error!(
                    "Pfad {} gehört zu Agent {} oder einem seiner Kinder, Zuweisung abgelehnt",
                    path_id,
                    self.agent
                );
                return false;
            }
        }

        self.path = path;
        self.location = Location::default();
        self.update(host);
        true
    }

    /// Setzt die Distanz und positioniert den Agenten neu.
    pub fn set_distance(&mut self, distance: f32, host: &mut dyn FollowerHost) {
        self.distance = distance;
        self.update(host);
    }

    /// Löst die Location zur aktuellen Distanz auf und schreibt die Weltposition.
    ///
    /// Gibt die geschriebene Position zurück (`None` ohne auflösbaren Pfad).
    pub fn update(&mut self, host: &mut dyn FollowerHost) -> Option<Vec3> {
        let path_id = self.path?;
        let Some(PathAccess { path, transform }) = host.path_mut(path_id) else {
            log::warn!("Pfad {} nicht gefunden", path_id);
            return None;
        };

        let space = Space::World(transform);
        self.location = path.location_by_length(self.distance, Some(self.location.index), space);
        let point = path.point(self.location, space);

        host.set_agent_position(self.agent, point);
        Some(point)
    }

    /// Welt-Tangente an der aktuellen Location.
    pub fn world_tangent(&self, host: &mut dyn FollowerHost) -> Option<Vec3> {
        let access = host.path_mut(self.path?)?;
        Some(access.path.tangent(self.location, Space::World(access.transform)))
    }

    /// Weltlänge des zugewiesenen Pfads, `None` ohne Pfad oder wenn geschlossen.
    pub fn open_world_length(&self, host: &mut dyn FollowerHost) -> Option<f32> {
        let PathAccess { path, .. } = host.path_mut(self.path?)?;
        (!path.circular()).then(|| path.length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::RigidTransform;
    use crate::core::{BezierPath, EditablePath};
    use std::collections::HashMap;

    /// Minimaler Host: eine Pfad-Entity (1), Agenten schreiben in eine Map.
    struct TestHost {
        path: BezierPath,
        transform: RigidTransform,
        parents: HashMap<EntityId, EntityId>,
        positions: HashMap<EntityId, Vec3>,
    }

    const PATH_ID: EntityId = 1;
    const AGENT_ID: EntityId = 2;

    impl TestHost {
        fn new() -> Self {
            let mut path = BezierPath::new();
            path.insert_node(2);
            Self {
                path,
                transform: RigidTransform::from_translation(Vec3::new(100.0, 0.0, 0.0)),
                parents: HashMap::new(),
                positions: HashMap::new(),
            }
        }
    }

    impl FollowerHost for TestHost {
        fn path_mut(&mut self, path_id: EntityId) -> Option<PathAccess<'_>> {
            (path_id == PATH_ID).then(|| PathAccess {
                path: self.path.path_mut(),
                transform: &self.transform,
            })
        }

        fn is_same_or_descendant(&self, candidate: EntityId, ancestor: EntityId) -> bool {
            let mut current = Some(candidate);
            while let Some(id) = current {
                if id == ancestor {
                    return true;
                }
                current = self.parents.get(&id).copied();
            }
            false
        }

        fn set_agent_position(&mut self, agent: EntityId, position: Vec3) {
            self.positions.insert(agent, position);
        }
    }

    #[test]
    fn test_distanz_setzt_weltposition() {
        let mut host = TestHost::new();
        let mut follower = PathFollower::new(AGENT_ID);
        assert!(follower.set_path(Some(PATH_ID), &mut host));
        assert_eq!(host.positions.get(&AGENT_ID), Some(&Vec3::new(100.0, 0.0, 0.0)));

        follower.set_distance(15.0, &mut host);
        let position = host.positions.get(&AGENT_ID).copied().unwrap_or_default();
        assert!((position - Vec3::new(100.0, 0.0, 15.0)).length() < 1e-3);
        assert_eq!(follower.location().index, 1);
    }

    #[test]
    fn test_distanz_ausserhalb_geklemmt() {
        let mut host = TestHost::new();
        let mut follower = PathFollower::new(AGENT_ID);
        follower.set_path(Some(PATH_ID), &mut host);

        follower.set_distance(500.0, &mut host);
        let position = host.positions.get(&AGENT_ID).copied().unwrap_or_default();
        assert!((position - Vec3::new(100.0, 0.0, 20.0)).length() < 1e-3);
        // Distanz selbst bleibt unverändert
        assert_eq!(follower.distance(), 500.0);
    }

    #[test]
    fn test_eigener_pfad_abgelehnt() {
        let mut host = TestHost::new();
        let mut follower = PathFollower::new(PATH_ID);
        assert!(!follower.set_path(Some(PATH_ID), &mut host));
        assert_eq!(follower.path(), None);
    }

    #[test]
    fn test_pfad_eines_kindes_abgelehnt() {
        let mut host = TestHost::new();
        host.parents.insert(PATH_ID, AGENT_ID);
        let mut follower = PathFollower::new(AGENT_ID);
        assert!(!follower.set_path(Some(PATH_ID), &mut host));
        assert!(host.positions.is_empty());
    }

    #[test]
    fn test_ohne_pfad_keine_position() {
        let mut host = TestHost::new();
        let mut follower = PathFollower::new(AGENT_ID);
        follower.set_distance(3.0, &mut host);
        assert!(host.positions.is_empty());
        assert_eq!(follower.world_tangent(&mut host), None);

        // Unbekannter Pfad
        assert!(follower.set_path(Some(99), &mut host));
        assert_eq!(follower.update(&mut host), None);
    }

    #[test]
    fn test_welt_tangente() {
        let mut host = TestHost::new();
        host.transform = RigidTransform::new(
            Vec3::ZERO,
            glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let mut follower = PathFollower::new(AGENT_ID);
        follower.set_path(Some(PATH_ID), &mut host);
        follower.set_distance(5.0, &mut host);

        let tangent = follower.world_tangent(&mut host).unwrap_or_default();
        // +Z um 90° um Y gedreht → +X
        assert!((tangent - Vec3::X).length() < 1e-4);
    }
}
