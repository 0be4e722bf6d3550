//! Pfad: geordnete Kette kubischer Segmente mit kumulierter Bogenlänge.
//!
//! Der Pfad besitzt seine Segmente exklusiv. Die Speicherung enthält immer auch
//! das schließende Segment (letzter → erster Node); bei offenen Pfaden bleibt es
//! ungenutzt. Kumulierte Längen werden über ein Index-Wasserzeichen
//! (`first_invalid_path_length_index`) inkrementell nachgeführt: alles unterhalb
//! des Wasserzeichens gilt als gültig, jede Mutation senkt es auf den frühesten
//! betroffenen Segment-Index.

use glam::{Quat, Vec3};

use super::cubic_spline::{CubicSpline, DEFAULT_LENGTH_ERROR, MAX_LENGTH_ERROR, MIN_LENGTH_ERROR};
use super::transform::{self, Space, TransformProvider};
use crate::shared::math::{clamp_signed_magnitude, MILLION, ONE_MILLIONTH};

/// Mindestanzahl Nodes eines Pfads (ein nutzbares Segment).
pub const MIN_NODE_COUNT: usize = 2;

/// Obergrenze der Sehnen pro Segment bei der Nächster-Punkt-Suche.
const MAX_CLOSEST_SEGMENTS: usize = 1_000_000;

/// Segment eines Pfads: Kurve plus kumulierte Länge bis zum Segmentende.
#[derive(Debug, Clone, Default)]
pub struct Node {
    spline: CubicSpline,
    /// Bogenlänge vom Pfadstart bis zum Ende dieses Segments
    path_length: f32,
}

impl Node {
    /// Kurve des Segments.
    pub fn spline(&self) -> &CubicSpline {
        &self.spline
    }

    /// Kumulierte Länge (nur gültig unterhalb des Wasserzeichens).
    pub fn path_length(&self) -> f32 {
        self.path_length
    }
}

/// Position auf dem Pfad: Segment-Index und lokaler Kurvenparameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    /// Segment-Index
    pub index: usize,
    /// Kurvenparameter t ∈ [0, 1]
    pub t: f32,
}

impl Location {
    pub fn new(index: usize, t: f32) -> Self {
        Self { index, t }
    }
}

/// Konstruktionsart eines Segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    /// Vier Bézier-Kontrollpunkte
    Bezier,
    /// Cardinal-Spline durch die beiden inneren Punkte
    Cardinal { tension: f32 },
}

/// Gemeinsame Schnittstelle der editierbaren Pfad-Varianten.
pub trait EditablePath {
    /// Read-only Zugriff auf die Segment-Kette.
    fn path(&self) -> &Path;

    /// Mutabler Zugriff (Abfragen füllen Caches).
    fn path_mut(&mut self) -> &mut Path;

    /// Anzahl Nodes.
    fn node_count(&self) -> usize {
        self.path().node_count()
    }

    /// Fügt einen Node ein und initialisiert ihn aus seinen Nachbarn.
    fn insert_node(&mut self, node_index: usize);

    /// Entfernt einen Node. Schlägt fehl (`false`), wenn weniger als
    /// `MIN_NODE_COUNT` Nodes übrig blieben.
    fn remove_node(&mut self, node_index: usize) -> bool;

    /// Öffnet oder schließt den Pfad.
    fn set_circular(&mut self, circular: bool);

    /// Setzt den Pfad auf seinen Ausgangszustand zurück.
    fn reset(&mut self);
}

/// Index modulo `count` (auch für negative Indizes).
pub(crate) fn wrap_index(index: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    index.rem_euclid(count as isize) as usize
}

/// Geordnete Segment-Kette mit Weltskalierung und Längen-Wasserzeichen.
#[derive(Debug, Clone)]
pub struct Path {
    segments: Vec<Node>,
    world_scale: f32,
    circular: bool,
    local_length_error: f32,
    first_invalid_path_length_index: usize,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            segments: Vec::with_capacity(8),
            world_scale: 1.0,
            circular: false,
            local_length_error: DEFAULT_LENGTH_ERROR,
            first_invalid_path_length_index: 0,
        }
    }
}

impl Path {
    // ── Basisdaten ──────────────────────────────────────────────

    /// Setzt Skalierung, Geschlossenheit und Längenfehler zurück und leert die Kette.
    pub(crate) fn reset_base(&mut self) {
        *self = Self::default();
    }

    /// Weltskalierung (nie 0, Vorzeichen signifikant).
    pub fn world_scale(&self) -> f32 {
        self.world_scale
    }

    /// Setzt die Weltskalierung; der Betrag wird auf `[1e-6, 1e6]` geklemmt.
    pub fn set_world_scale(&mut self, value: f32) {
        self.world_scale = clamp_signed_magnitude(value, ONE_MILLIONTH, MILLION);
    }

    /// Betrag der Weltskalierung.
    pub fn abs_world_scale(&self) -> f32 {
        self.world_scale.abs()
    }

    /// `true` wenn das schließende Segment genutzt wird.
    pub fn circular(&self) -> bool {
        self.circular
    }

    /// Setzt nur das Flag; die Variante pflegt das schließende Segment.
    /// Gibt `true` zurück, wenn sich der Wert geändert hat.
    pub(crate) fn set_circular_flag(&mut self, circular: bool) -> bool {
        if self.circular == circular {
            return false;
        }
        self.circular = circular;
        true
    }

    /// Längenfehler in Pfad-Koordinaten.
    pub fn local_length_error(&self) -> f32 {
        self.local_length_error
    }

    /// Setzt den lokalen Längenfehler für alle Segmente und invalidiert alle Längen.
    pub fn set_local_length_error(&mut self, value: f32) {
        let value = value.clamp(MIN_LENGTH_ERROR, MAX_LENGTH_ERROR);
        if value == self.local_length_error {
            return;
        }
        self.local_length_error = value;
        for node in &mut self.segments {
            node.spline.set_length_error(value);
        }
        self.first_invalid_path_length_index = 0;
    }

    /// Längenfehler in Welteinheiten.
    pub fn length_error(&self) -> f32 {
        self.local_length_error * self.abs_world_scale()
    }

    /// Setzt den Längenfehler in Welteinheiten.
    pub fn set_length_error(&mut self, value: f32) {
        self.set_local_length_error(value / self.abs_world_scale());
    }

    /// Anzahl Nodes (= Anzahl gespeicherter Segmente).
    pub fn node_count(&self) -> usize {
        self.segments.len()
    }

    /// Anzahl nutzbarer Segmente: offen `n − 1`, geschlossen `n`.
    pub fn segment_count(&self) -> usize {
        if self.circular {
            self.segments.len()
        } else {
            self.segments.len().saturating_sub(1)
        }
    }

    /// Segment `index` (inklusive ungenutztem Schluss-Segment).
    pub fn segment(&self, index: usize) -> Option<&Node> {
        self.segments.get(index)
    }

    /// Niedrigster Segment-Index mit ungültiger kumulierter Länge.
    pub fn first_invalid_path_length_index(&self) -> usize {
        self.first_invalid_path_length_index
    }

    /// `true` wenn alle kumulierten Längen gültig sind.
    pub fn is_samples_valid(&self) -> bool {
        self.first_invalid_path_length_index >= self.segment_count()
    }

    /// Senkt das Wasserzeichen auf `segment_index`.
    fn mark_dirty_from(&mut self, segment_index: usize) {
        if self.first_invalid_path_length_index > segment_index {
            self.first_invalid_path_length_index = segment_index;
        }
    }

    // ── Struktur ────────────────────────────────────────────────

    /// Fügt ein leeres Segment mit dem Längenfehler des Pfads ein.
    pub(crate) fn insert_segment(&mut self, index: usize) {
        let mut node = Node::default();
        node.spline.set_length_error(self.local_length_error);
        let index = index.min(self.segments.len());
        self.segments.insert(index, node);
        self.mark_dirty_from(index);
    }

    /// Entfernt das Segment `index` (außerhalb: kein Effekt).
    pub(crate) fn remove_segment(&mut self, index: usize) {
        if index >= self.segments.len() {
            return;
        }
        self.segments.remove(index);
        self.mark_dirty_from(index);
    }

    /// Setzt die Kurve eines Segments und senkt das Wasserzeichen.
    pub(crate) fn set_local_segment(
        &mut self,
        segment_index: usize,
        control_points: [Vec3; 4],
        kind: SegmentKind,
    ) {
        let Some(node) = self.segments.get_mut(segment_index) else {
            log::warn!(
                "Segment {} existiert nicht ({} Segmente)",
                segment_index,
                self.segments.len()
            );
            return;
        };

        let [p0, p1, p2, p3] = control_points;
        match kind {
            SegmentKind::Bezier => node.spline.set_bezier_curve(p0, p1, p2, p3),
            SegmentKind::Cardinal { tension } => {
                node.spline.set_cardinal_curve(p0, p1, p2, p3, tension)
            }
        }
        self.mark_dirty_from(segment_index);
    }

    // ── Längen-Cache ────────────────────────────────────────────

    /// Führt die kumulierten Längen vom Wasserzeichen bis `segment_index` nach.
    ///
    /// Wiederholte Aufrufe mit gleichem oder kleinerem Index kosten O(1).
    pub fn validate_path_length(&mut self, segment_index: usize) {
        let Some(last) = self.segments.len().checked_sub(1) else {
            return;
        };
        let end = segment_index.min(last);

        while self.first_invalid_path_length_index <= end {
            let i = self.first_invalid_path_length_index;
            let previous = if i == 0 {
                0.0
            } else {
                self.segments[i - 1].path_length
            };
            let node = &mut self.segments[i];
            node.path_length = previous + node.spline.length();
            self.first_invalid_path_length_index += 1;
        }
    }

    /// Tastet alle nutzbaren Segmente ab.
    pub fn validate_samples(&mut self) {
        if let Some(last) = self.segment_count().checked_sub(1) {
            self.validate_path_length(last);
        }
    }

    /// Verwirft alle Abtastungen und kumulierten Längen.
    pub fn invalidate_samples(&mut self) {
        for node in &mut self.segments {
            node.spline.invalidate_samples();
        }
        self.first_invalid_path_length_index = 0;
    }

    /// Gesamtlänge in Pfad-Koordinaten.
    pub fn local_length(&mut self) -> f32 {
        let Some(last) = self.segment_count().checked_sub(1) else {
            return 0.0;
        };
        self.validate_path_length(last);
        self.segments[last].path_length
    }

    /// Gesamtlänge in Welteinheiten.
    pub fn length(&mut self) -> f32 {
        self.local_length() * self.abs_world_scale()
    }

    // ── Transformationen ────────────────────────────────────────

    pub fn transform_point(&self, t: &dyn TransformProvider, point: Vec3) -> Vec3 {
        transform::transform_point(t, self.world_scale, point)
    }

    pub fn transform_vector(&self, t: &dyn TransformProvider, vector: Vec3) -> Vec3 {
        transform::transform_vector(t, self.world_scale, vector)
    }

    pub fn transform_direction(&self, t: &dyn TransformProvider, direction: Vec3) -> Vec3 {
        transform::transform_direction(t, self.world_scale, direction)
    }

    pub fn transform_rotation(&self, t: &dyn TransformProvider, rotation: Quat) -> Quat {
        transform::transform_rotation(t, self.world_scale, rotation)
    }

    pub fn inverse_transform_point(&self, t: &dyn TransformProvider, point: Vec3) -> Vec3 {
        transform::inverse_transform_point(t, self.world_scale, point)
    }

    pub fn inverse_transform_vector(&self, t: &dyn TransformProvider, vector: Vec3) -> Vec3 {
        transform::inverse_transform_vector(t, self.world_scale, vector)
    }

    pub fn inverse_transform_direction(&self, t: &dyn TransformProvider, direction: Vec3) -> Vec3 {
        transform::inverse_transform_direction(t, self.world_scale, direction)
    }

    pub fn inverse_transform_rotation(&self, t: &dyn TransformProvider, rotation: Quat) -> Quat {
        transform::inverse_transform_rotation(t, self.world_scale, rotation)
    }

    /// Lokaler Punkt → Punkt im gewünschten Raum.
    pub(crate) fn point_to_space(&self, point: Vec3, space: Space<'_>) -> Vec3 {
        match space {
            Space::Local => point,
            Space::World(t) => self.transform_point(t, point),
        }
    }

    /// Punkt im gewünschten Raum → lokaler Punkt.
    pub(crate) fn point_from_space(&self, point: Vec3, space: Space<'_>) -> Vec3 {
        match space {
            Space::Local => point,
            Space::World(t) => self.inverse_transform_point(t, point),
        }
    }

    /// Lokaler Vektor → Vektor im gewünschten Raum.
    pub(crate) fn vector_to_space(&self, vector: Vec3, space: Space<'_>) -> Vec3 {
        match space {
            Space::Local => vector,
            Space::World(t) => self.transform_vector(t, vector),
        }
    }

    /// Vektor im gewünschten Raum → lokaler Vektor.
    pub(crate) fn vector_from_space(&self, vector: Vec3, space: Space<'_>) -> Vec3 {
        match space {
            Space::Local => vector,
            Space::World(t) => self.inverse_transform_vector(t, vector),
        }
    }

    // ── Abfragen ────────────────────────────────────────────────

    /// Klemmt eine Location auf nutzbare Segmente und t ∈ [0, 1].
    pub fn clamp_location(&self, location: Location) -> Location {
        let last = self.segment_count().saturating_sub(1);
        Location::new(location.index.min(last), location.t.clamp(0.0, 1.0))
    }

    fn segment_at(&self, location: Location) -> Option<(&Node, f32)> {
        let location = self.clamp_location(location);
        self.segments.get(location.index).map(|n| (n, location.t))
    }

    /// Punkt an `location`.
    pub fn point(&self, location: Location, space: Space<'_>) -> Vec3 {
        let point = self
            .segment_at(location)
            .map_or(Vec3::ZERO, |(n, t)| n.spline.point(t));
        self.point_to_space(point, space)
    }

    /// Erste Ableitung an `location`.
    pub fn derivative(&self, location: Location, space: Space<'_>) -> Vec3 {
        let derivative = self
            .segment_at(location)
            .map_or(Vec3::ZERO, |(n, t)| n.spline.derivative(t));
        self.vector_to_space(derivative, space)
    }

    /// Zweite Ableitung an `location`.
    pub fn second_derivative(&self, location: Location, space: Space<'_>) -> Vec3 {
        let second = self
            .segment_at(location)
            .map_or(Vec3::ZERO, |(n, t)| n.spline.second_derivative(t));
        self.vector_to_space(second, space)
    }

    /// Einheits-Tangente an `location` (`Vec3::ZERO` wenn nicht bestimmbar).
    pub fn tangent(&self, location: Location, space: Space<'_>) -> Vec3 {
        let tangent = self
            .segment_at(location)
            .map_or(Vec3::ZERO, |(n, t)| n.spline.tangent(t));
        match space {
            Space::Local => tangent,
            Space::World(t) => self.transform_direction(t, tangent),
        }
    }

    /// Bogenlänge vom Pfadstart bis `location`.
    pub fn length_at(&mut self, location: Location, space: Space<'_>) -> f32 {
        if self.segment_count() == 0 {
            return 0.0;
        }
        let location = self.clamp_location(location);
        self.validate_path_length(location.index);

        let mut length = self.segments[location.index].spline.length_at(location.t);
        if location.index > 0 {
            length += self.segments[location.index - 1].path_length;
        }

        match space {
            Space::Local => length,
            Space::World(_) => length * self.abs_world_scale(),
        }
    }

    /// Location zur Bogenlänge `length` ab Pfadstart.
    ///
    /// Geschlossene Pfade wickeln die Länge in `[0, Gesamtlänge)` ein (negative
    /// Werte erlaubt), offene Pfade klemmen auf die Endpunkte. `hint` ist der
    /// vorgeschlagene Start-Segment-Index der Suche; ohne gültigen Hinweis wird
    /// proportional geschätzt. Bei monoton wachsender Länge (Agent fährt
    /// vorwärts) ist die Suche damit praktisch O(1).
    pub fn location_by_length(
        &mut self,
        length: f32,
        hint: Option<usize>,
        space: Space<'_>,
    ) -> Location {
        let Some(last) = self.segment_count().checked_sub(1) else {
            return Location::default();
        };
        self.validate_path_length(last);
        let total = self.segments[last].path_length;

        let mut length = match space {
            Space::Local => length,
            Space::World(_) => length / self.abs_world_scale(),
        };

        if self.circular {
            if total <= 0.0 || !length.is_finite() {
                return Location::default();
            }
            length = length.rem_euclid(total);
            if length >= total {
                length = 0.0;
            }
        } else {
            if length.is_nan() || length <= 0.0 {
                return Location::default();
            }
            if length >= total {
                return Location::new(last, 1.0);
            }
        }

        let mut index = match hint {
            Some(hint) if hint <= last => hint,
            _ => ((length / total * last as f32) as usize).min(last),
        };

        if self.segments[index].path_length > length {
            // Rückwärts bis zum Segment, dessen Vorgänger vor `length` endet
            loop {
                if index == 0 {
                    let t = self.segments[0].spline.location_by_length(length);
                    return Location::new(0, t);
                }
                index -= 1;
                if self.segments[index].path_length <= length {
                    break;
                }
            }
            let offset = length - self.segments[index].path_length;
            let t = self.segments[index + 1].spline.location_by_length(offset);
            Location::new(index + 1, t)
        } else {
            // Vorwärts bis zum ersten Segment, das `length` erreicht
            while index < last {
                index += 1;
                if self.segments[index].path_length >= length {
                    break;
                }
            }
            if index == 0 {
                let t = self.segments[0].spline.location_by_length(length);
                return Location::new(0, t);
            }
            let offset = length - self.segments[index - 1].path_length;
            let t = self.segments[index].spline.location_by_length(offset);
            Location::new(index, t)
        }
    }

    /// Location des Pfadpunkts mit geringstem Abstand zu `point`.
    ///
    /// `step_length` ist die Sehnenlänge der Abtastung (im Raum von `space`).
    pub fn closest_location(&mut self, point: Vec3, step_length: f32, space: Space<'_>) -> Location {
        let (point, step_length) = match space {
            Space::Local => (point, step_length),
            Space::World(_) => (
                self.point_from_space(point, space),
                step_length / self.abs_world_scale(),
            ),
        };
        let step_length = step_length.max(MIN_LENGTH_ERROR);

        let mut best = Location::default();
        let mut best_sqr = f32::MAX;

        for i in 0..self.segment_count() {
            let spline = &mut self.segments[i].spline;
            let chords = (spline.length() / step_length).ceil();
            let chords = if chords.is_finite() {
                (chords as usize).clamp(1, MAX_CLOSEST_SEGMENTS)
            } else {
                1
            };

            let t = spline.closest_location(point, chords);
            let sqr = (spline.point(t) - point).length_squared();
            if sqr < best_sqr {
                best_sqr = sqr;
                best = Location::new(i, t);
            }
        }

        best
    }
}

#[cfg(test)]
mod tests;
