//! Bézier-Pfad: Nodes mit Position und zwei Tangenten.
//!
//! Segment `i` verläuft von Node `i` nach Node `i + 1` mit den Kontrollpunkten
//! `position + forward_tangent` (Start) und `position + back_tangent` (Ende).
//! Jeder Setter aktualisiert nur die betroffenen Segmente.

use glam::Vec3;

use super::path::{wrap_index, EditablePath, Path, SegmentKind, MIN_NODE_COUNT};
use super::transform::Space;

/// Abstand der Nodes nach `reset` (Pfad-Koordinaten, entlang +Z).
const RESET_NODE_DISTANCE: f32 = 10.0;

/// Stützpunkt eines Bézier-Pfads.
///
/// Ungebrochene Nodes halten beide Tangenten kollinear und entgegengesetzt;
/// die Beträge bleiben unabhängig.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BezierNode {
    position: Vec3,
    forward_tangent: Vec3,
    back_tangent: Vec3,
    broken: bool,
}

impl BezierNode {
    /// Übernimmt die Tangenten unverändert, auch bei `broken == false`.
    /// Erst die Setter richten die Gegenseite aus.
    pub fn new(position: Vec3, forward_tangent: Vec3, back_tangent: Vec3, broken: bool) -> Self {
        Self {
            position,
            forward_tangent,
            back_tangent,
            broken,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward_tangent(&self) -> Vec3 {
        self.forward_tangent
    }

    pub fn back_tangent(&self) -> Vec3 {
        self.back_tangent
    }

    /// `true` = Knick erlaubt, Tangenten unabhängig.
    pub fn broken(&self) -> bool {
        self.broken
    }

    pub fn forward_control_point(&self) -> Vec3 {
        self.position + self.forward_tangent
    }

    pub fn back_control_point(&self) -> Vec3 {
        self.position + self.back_tangent
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_forward_tangent(&mut self, tangent: Vec3) {
        self.forward_tangent = tangent;
        if !self.broken {
            self.align_back_to_forward();
        }
    }

    pub fn set_back_tangent(&mut self, tangent: Vec3) {
        self.back_tangent = tangent;
        if !self.broken {
            self.align_forward_to_back();
        }
    }

    pub fn set_forward_control_point(&mut self, point: Vec3) {
        self.set_forward_tangent(point - self.position);
    }

    pub fn set_back_control_point(&mut self, point: Vec3) {
        self.set_back_tangent(point - self.position);
    }

    /// Beim Schließen des Knicks folgt die hintere Tangente der vorderen.
    pub fn set_broken(&mut self, broken: bool) {
        self.broken = broken;
        if !broken {
            self.align_back_to_forward();
        }
    }

    fn align_back_to_forward(&mut self) {
        let direction = self.forward_tangent.normalize_or_zero();
        if direction != Vec3::ZERO {
            self.back_tangent = -direction * self.back_tangent.length();
        }
    }

    fn align_forward_to_back(&mut self) {
        let direction = self.back_tangent.normalize_or_zero();
        if direction != Vec3::ZERO {
            self.forward_tangent = -direction * self.forward_tangent.length();
        }
    }
}

/// Pfad aus kubischen Bézier-Segmenten.
#[derive(Debug, Clone)]
pub struct BezierPath {
    path: Path,
    nodes: Vec<BezierNode>,
}

impl Default for BezierPath {
    fn default() -> Self {
        Self::new()
    }
}

impl BezierPath {
    /// Erstellt einen offenen Pfad mit zwei Nodes (Gerade entlang +Z).
    pub fn new() -> Self {
        let mut bezier = Self {
            path: Path::default(),
            nodes: Vec::new(),
        };
        bezier.reset();
        bezier
    }

    /// Erstellt einen offenen Pfad aus mindestens zwei Nodes (Pfad-Koordinaten).
    ///
    /// Gibt `None` zurück, wenn zu wenige Nodes übergeben werden.
    pub fn from_nodes(nodes: &[BezierNode]) -> Option<Self> {
        if nodes.len() < MIN_NODE_COUNT {
            log::warn!(
                "Bézier-Pfad benötigt mindestens {} Nodes, erhalten: {}",
                MIN_NODE_COUNT,
                nodes.len()
            );
            return None;
        }

        let mut bezier = Self {
            path: Path::default(),
            nodes: Vec::with_capacity(nodes.len()),
        };
        for (i, node) in nodes.iter().enumerate() {
            bezier.path.insert_segment(i);
            bezier.nodes.push(*node);
        }
        for i in 0..nodes.len() {
            bezier.update_segment(i as isize);
        }
        Some(bezier)
    }

    /// Alle Nodes in Pfad-Koordinaten.
    pub fn nodes(&self) -> &[BezierNode] {
        &self.nodes
    }

    /// Node `index` in Pfad-Koordinaten.
    pub fn node(&self, index: usize) -> Option<&BezierNode> {
        self.nodes.get(index)
    }

    // ── Segment-Pflege ──────────────────────────────────────────

    /// Überträgt die Kontrollpunkte von Node `i` und `i + 1` (zyklisch) ins Segment.
    fn update_segment(&mut self, segment_index: isize) {
        let count = self.nodes.len();
        if count == 0 {
            return;
        }
        let i = wrap_index(segment_index, count);
        let j = wrap_index(segment_index + 1, count);
        let n0 = self.nodes[i];
        let n1 = self.nodes[j];

        self.path.set_local_segment(
            i,
            [
                n0.position,
                n0.forward_control_point(),
                n1.back_control_point(),
                n1.position,
            ],
            SegmentKind::Bezier,
        );
    }

    /// Aktualisiert das ausgehende Segment von `node_index`.
    fn update_outgoing(&mut self, node_index: usize) {
        if self.path.circular() || node_index + 1 < self.nodes.len() {
            self.update_segment(node_index as isize);
        }
    }

    /// Aktualisiert das eingehende Segment von `node_index`.
    fn update_incoming(&mut self, node_index: usize) {
        if self.path.circular() || node_index > 0 {
            self.update_segment(node_index as isize - 1);
        }
    }

    fn update_around(&mut self, node_index: usize) {
        self.update_outgoing(node_index);
        self.update_incoming(node_index);
    }

    // ── Einfügen ────────────────────────────────────────────────

    /// Fügt einen Node mit expliziten Daten ein; die Tangenten werden wie
    /// übergeben gespeichert.
    pub fn insert_node_with(
        &mut self,
        node_index: usize,
        position: Vec3,
        forward_tangent: Vec3,
        back_tangent: Vec3,
        broken: bool,
        space: Space<'_>,
    ) {
        let position = self.path.point_from_space(position, space);
        let forward_tangent = self.path.vector_from_space(forward_tangent, space);
        let back_tangent = self.path.vector_from_space(back_tangent, space);

        let node_index = node_index.min(self.nodes.len());
        self.path.insert_segment(node_index);
        self.nodes.insert(
            node_index,
            BezierNode::new(position, forward_tangent, back_tangent, broken),
        );
        self.update_around(node_index);
    }

    // ── Node-Daten ──────────────────────────────────────────────

    pub fn node_position(&self, node_index: usize, space: Space<'_>) -> Option<Vec3> {
        let node = self.nodes.get(node_index)?;
        Some(self.path.point_to_space(node.position, space))
    }

    /// Setzt die Node-Position. Gibt `false` zurück, wenn der Node nicht existiert.
    pub fn set_node_position(&mut self, node_index: usize, position: Vec3, space: Space<'_>) -> bool {
        let position = self.path.point_from_space(position, space);
        let Some(node) = self.nodes.get_mut(node_index) else {
            return false;
        };
        node.set_position(position);
        self.update_around(node_index);
        true
    }

    pub fn node_forward_tangent(&self, node_index: usize, space: Space<'_>) -> Option<Vec3> {
        let node = self.nodes.get(node_index)?;
        Some(self.path.vector_to_space(node.forward_tangent, space))
    }

    pub fn set_node_forward_tangent(
        &mut self,
        node_index: usize,
        tangent: Vec3,
        space: Space<'_>,
    ) -> bool {
        let tangent = self.path.vector_from_space(tangent, space);
        let Some(node) = self.nodes.get_mut(node_index) else {
            return false;
        };
        node.set_forward_tangent(tangent);
        let broken = node.broken;
        self.after_forward_edit(node_index, broken);
        true
    }

    pub fn node_back_tangent(&self, node_index: usize, space: Space<'_>) -> Option<Vec3> {
        let node = self.nodes.get(node_index)?;
        Some(self.path.vector_to_space(node.back_tangent, space))
    }

    pub fn set_node_back_tangent(&mut self, node_index: usize, tangent: Vec3, space: Space<'_>) -> bool {
        let tangent = self.path.vector_from_space(tangent, space);
        let Some(node) = self.nodes.get_mut(node_index) else {
            return false;
        };
        node.set_back_tangent(tangent);
        let broken = node.broken;
        self.after_back_edit(node_index, broken);
        true
    }

    pub fn node_forward_control_point(&self, node_index: usize, space: Space<'_>) -> Option<Vec3> {
        let node = self.nodes.get(node_index)?;
        Some(self.path.point_to_space(node.forward_control_point(), space))
    }

    pub fn set_node_forward_control_point(
        &mut self,
        node_index: usize,
        point: Vec3,
        space: Space<'_>,
    ) -> bool {
        let point = self.path.point_from_space(point, space);
        let Some(node) = self.nodes.get_mut(node_index) else {
            return false;
        };
        node.set_forward_control_point(point);
        let broken = node.broken;
        self.after_forward_edit(node_index, broken);
        true
    }

    pub fn node_back_control_point(&self, node_index: usize, space: Space<'_>) -> Option<Vec3> {
        let node = self.nodes.get(node_index)?;
        Some(self.path.point_to_space(node.back_control_point(), space))
    }

    pub fn set_node_back_control_point(
        &mut self,
        node_index: usize,
        point: Vec3,
        space: Space<'_>,
    ) -> bool {
        let point = self.path.point_from_space(point, space);
        let Some(node) = self.nodes.get_mut(node_index) else {
            return false;
        };
        node.set_back_control_point(point);
        let broken = node.broken;
        self.after_back_edit(node_index, broken);
        true
    }

    pub fn is_node_broken(&self, node_index: usize) -> Option<bool> {
        self.nodes.get(node_index).map(|n| n.broken)
    }

    pub fn set_node_broken(&mut self, node_index: usize, broken: bool) -> bool {
        let Some(node) = self.nodes.get_mut(node_index) else {
            return false;
        };
        node.set_broken(broken);
        if !broken {
            self.update_around(node_index);
        }
        true
    }

    /// Vordere Tangente geändert: ausgehendes Segment immer, eingehendes nur
    /// wenn die hintere Tangente mitgezogen wurde.
    fn after_forward_edit(&mut self, node_index: usize, broken: bool) {
        self.update_outgoing(node_index);
        if !broken {
            self.update_incoming(node_index);
        }
    }

    fn after_back_edit(&mut self, node_index: usize, broken: bool) {
        self.update_incoming(node_index);
        if !broken {
            self.update_outgoing(node_index);
        }
    }
}

impl EditablePath for BezierPath {
    fn path(&self) -> &Path {
        &self.path
    }

    fn path_mut(&mut self) -> &mut Path {
        &mut self.path
    }

    /// Innen bzw. bei geschlossenen Pfaden: Teilung des vorherigen Segments bei
    /// t = 0.5. An den Enden: Extrapolation entlang der End-Tangente.
    fn insert_node(&mut self, node_index: usize) {
        let count = self.nodes.len();
        let node_index = node_index.min(count);
        let circular = self.path.circular();

        let (position, forward_tangent, back_tangent) =
            if circular || (node_index > 0 && node_index < count) {
                let previous = wrap_index(node_index as isize - 1, count);
                let next = wrap_index(node_index as isize, count);
                let Some(segment) = self.path.segment(previous) else {
                    return;
                };
                let position = segment.spline().point(0.5);
                let tangent = segment.spline().tangent(0.5);
                (
                    position,
                    tangent * self.nodes[next].back_tangent.length(),
                    -tangent * self.nodes[previous].forward_tangent.length(),
                )
            } else if node_index == 0 {
                let first = self.nodes[0];
                let reach = first.position.distance(self.nodes[1].position);
                let position = first.position + reach * first.back_tangent.normalize_or_zero();
                (position, -first.back_tangent, first.back_tangent)
            } else {
                let last = self.nodes[count - 1];
                let reach = last.position.distance(self.nodes[count - 2].position);
                let position = last.position + reach * last.forward_tangent.normalize_or_zero();
                (position, last.forward_tangent, -last.forward_tangent)
            };

        self.insert_node_with(
            node_index,
            position,
            forward_tangent,
            back_tangent,
            false,
            Space::Local,
        );
    }

    fn remove_node(&mut self, node_index: usize) -> bool {
        if self.nodes.len() <= MIN_NODE_COUNT {
            log::warn!(
                "Node {} nicht entfernt: Pfad benötigt mindestens {} Nodes",
                node_index,
                MIN_NODE_COUNT
            );
            return false;
        }
        if node_index >= self.nodes.len() {
            log::warn!(
                "Node {} nicht entfernt: nur {} Nodes vorhanden",
                node_index,
                self.nodes.len()
            );
            return false;
        }

        self.nodes.remove(node_index);
        self.path.remove_segment(node_index);
        self.update_incoming(node_index);
        true
    }

    fn set_circular(&mut self, circular: bool) {
        if self.path.set_circular_flag(circular) && circular {
            self.update_segment(self.nodes.len() as isize - 1);
        }
    }

    fn reset(&mut self) {
        self.path.reset_base();
        self.nodes.clear();

        let handle = Vec3::new(0.0, 0.0, RESET_NODE_DISTANCE / 3.0);
        let ends = [Vec3::ZERO, Vec3::new(0.0, 0.0, RESET_NODE_DISTANCE)];
        for (i, position) in ends.into_iter().enumerate() {
            self.path.insert_segment(i);
            self.nodes.push(BezierNode::new(position, handle, -handle, false));
        }
        self.update_segment(0);
    }
}
