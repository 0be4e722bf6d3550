//! Cardinal-Pfad: Kurve läuft durch alle Node-Positionen.
//!
//! Segment `i` nutzt die Nodes `i − 1 … i + 2`. An offenen Enden ersetzen
//! gespiegelte Phantom-Punkte (`2·p0 − p1`) die fehlenden Nachbarn.

use glam::Vec3;

use super::path::{wrap_index, EditablePath, Path, SegmentKind, MIN_NODE_COUNT};
use super::transform::Space;
use crate::shared::options::CARDINAL_TENSION;

const RESET_NODE_DISTANCE: f32 = 10.0;

/// Pfad aus Cardinal-Segmenten mit gemeinsamer Spannung.
#[derive(Debug, Clone)]
pub struct CardinalPath {
    path: Path,
    positions: Vec<Vec3>,
    tension: f32,
}

impl Default for CardinalPath {
    fn default() -> Self {
        Self::new()
    }
}

impl CardinalPath {
    /// Offener Pfad mit zwei Nodes entlang +Z.
    pub fn new() -> Self {
        let mut cardinal = Self {
            path: Path::default(),
            positions: Vec::new(),
            tension: CARDINAL_TENSION,
        };
        cardinal.reset();
        cardinal
    }

    /// Erstellt einen Pfad durch `positions` (Pfad-Koordinaten).
    ///
    /// Gibt `None` zurück, wenn weniger als zwei Positionen übergeben werden.
    pub fn from_positions(positions: &[Vec3], circular: bool, tension: f32) -> Option<Self> {
        if positions.len() < MIN_NODE_COUNT {
            log::warn!(
                "Cardinal-Pfad benötigt mindestens {} Nodes, erhalten: {}",
                MIN_NODE_COUNT,
                positions.len()
            );
            return None;
        }

        let mut cardinal = Self {
            path: Path::default(),
            positions: positions.to_vec(),
            tension: tension.clamp(0.0, 1.0),
        };
        for i in 0..positions.len() {
            cardinal.path.insert_segment(i);
        }
        cardinal.path.set_circular_flag(circular);
        cardinal.update_all_segments();
        Some(cardinal)
    }

    /// Node-Positionen in Pfad-Koordinaten.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    /// Setzt die Spannung (geklemmt auf `[0, 1]`) und baut alle Segmente neu.
    pub fn set_tension(&mut self, tension: f32) {
        let tension = tension.clamp(0.0, 1.0);
        if tension == self.tension {
            return;
        }
        self.tension = tension;
        self.update_all_segments();
    }

    // ── Segment-Pflege ──────────────────────────────────────────

    /// Position von Node `index`; außerhalb offener Pfade ein Phantom-Punkt.
    fn control_point(&self, index: isize) -> Vec3 {
        let count = self.positions.len();
        if self.path.circular() || (0..count as isize).contains(&index) {
            return self.positions[wrap_index(index, count)];
        }
        if index < 0 {
            2.0 * self.positions[0] - self.positions[1]
        } else {
            2.0 * self.positions[count - 1] - self.positions[count - 2]
        }
    }

    fn update_segment(&mut self, segment_index: isize) {
        let count = self.positions.len();
        if count < MIN_NODE_COUNT {
            return;
        }
        let i = if self.path.circular() {
            wrap_index(segment_index, count)
        } else if (0..count as isize - 1).contains(&segment_index) {
            segment_index as usize
        } else {
            return;
        };

        let base = i as isize;
        let points = [
            self.control_point(base - 1),
            self.control_point(base),
            self.control_point(base + 1),
            self.control_point(base + 2),
        ];
        self.path.set_local_segment(
            i,
            points,
            SegmentKind::Cardinal {
                tension: self.tension,
            },
        );
    }

    /// Segmente, deren Kontrollpunkte Node `node_index` enthalten.
    fn update_around(&mut self, node_index: usize) {
        let node_index = node_index as isize;
        for segment_index in node_index - 2..=node_index + 1 {
            self.update_segment(segment_index);
        }
    }

    fn update_all_segments(&mut self) {
        for i in 0..self.positions.len() {
            self.update_segment(i as isize);
        }
    }

    // ── Nodes ───────────────────────────────────────────────────

    /// Fügt einen Node an expliziter Position ein.
    pub fn insert_node_at(&mut self, node_index: usize, position: Vec3, space: Space<'_>) {
        let position = self.path.point_from_space(position, space);
        let node_index = node_index.min(self.positions.len());
        self.path.insert_segment(node_index);
        self.positions.insert(node_index, position);
        self.update_around(node_index);
    }

    pub fn node_position(&self, node_index: usize, space: Space<'_>) -> Option<Vec3> {
        let position = *self.positions.get(node_index)?;
        Some(self.path.point_to_space(position, space))
    }

    /// Setzt eine Node-Position. Gibt `false` zurück, wenn der Node nicht existiert.
    pub fn set_node_position(&mut self, node_index: usize, position: Vec3, space: Space<'_>) -> bool {
        let position = self.path.point_from_space(position, space);
        let Some(slot) = self.positions.get_mut(node_index) else {
            return false;
        };
        *slot = position;
        self.update_around(node_index);
        true
    }
}

impl EditablePath for CardinalPath {
    fn path(&self) -> &Path {
        &self.path
    }

    fn path_mut(&mut self) -> &mut Path {
        &mut self.path
    }

    /// Innen bzw. geschlossen: Mittelpunkt des vorherigen Segments.
    /// An den Enden: gespiegelter Nachbar.
    fn insert_node(&mut self, node_index: usize) {
        let count = self.positions.len();
        let node_index = node_index.min(count);

        let position = if self.path.circular() || (node_index > 0 && node_index < count) {
            let previous = wrap_index(node_index as isize - 1, count);
            match self.path.segment(previous) {
                Some(segment) => segment.spline().point(0.5),
                None => return,
            }
        } else if node_index == 0 {
            self.control_point(-1)
        } else {
            self.control_point(count as isize)
        };

        self.insert_node_at(node_index, position, Space::Local);
    }

    fn remove_node(&mut self, node_index: usize) -> bool {
        if self.positions.len() <= MIN_NODE_COUNT {
            log::warn!(
                "Node {} nicht entfernt: Pfad benötigt mindestens {} Nodes",
                node_index,
                MIN_NODE_COUNT
            );
            return false;
        }
        if node_index >= self.positions.len() {
            log::warn!(
                "Node {} nicht entfernt: nur {} Nodes vorhanden",
                node_index,
                self.positions.len()
            );
            return false;
        }

        self.positions.remove(node_index);
        self.path.remove_segment(node_index);
        // Nach dem Entfernen rückt Node `i + 1` auf `i`
        self.update_around(node_index);
        true
    }

    fn set_circular(&mut self, circular: bool) {
        if !self.path.set_circular_flag(circular) {
            return;
        }
        let last = self.positions.len() as isize - 1;
        self.update_segment(0);
        self.update_segment(last - 1);
        self.update_segment(last);
    }

    fn reset(&mut self) {
        self.path.reset_base();
        self.positions.clear();
        self.tension = CARDINAL_TENSION;

        for (i, position) in [Vec3::ZERO, Vec3::new(0.0, 0.0, RESET_NODE_DISTANCE)]
            .into_iter()
            .enumerate()
        {
            self.path.insert_segment(i);
            self.positions.push(position);
        }
        self.update_segment(0);
    }
}
