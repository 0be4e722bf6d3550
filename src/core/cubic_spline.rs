//! Ein einzelnes kubisches Kurvensegment in Potenzbasis mit Bogenlängen-Tabelle.
//!
//! Die Kurve wird als `f0 + f1·t + f2·t² + f3·t³` (t ∈ [0, 1]) gespeichert.
//! Die Längen-Tabelle wird lazy aufgebaut und bei jeder Änderung der
//! Koeffizienten oder des Längenfehlers verworfen.

use glam::Vec3;

use crate::shared::math::closest_point_on_segment_factor;

/// Kleinster erlaubter Längenfehler.
pub const MIN_LENGTH_ERROR: f32 = 0.001;
/// Größter erlaubter Längenfehler.
pub const MAX_LENGTH_ERROR: f32 = 1000.0;
/// Standard-Längenfehler neuer Segmente.
pub const DEFAULT_LENGTH_ERROR: f32 = 0.01;

/// Mindestanzahl Sehnen für Längenschätzung und Abtastung.
const MIN_SEGMENTS: usize = 6;
/// Obergrenze der Abtast-Sehnen (schützt vor winzigen Längenfehlern).
const MAX_SEGMENTS: usize = 1_000_000;
/// Sehnen pro (Länge / Längenfehler).
const SEGMENTS_FACTOR: f32 = 0.2;

/// Schrittweite der Differenzen-Schätzung für degenerierte Tangenten.
const TANGENT_PROBE: f32 = 0.02;
/// Schwelle für einseitige Differenzen an den Kurvenenden.
const TANGENT_EDGE: f32 = 0.020001;

/// Stützstelle der Längenfunktion: Parameter `t` und Bogenlänge bis `t`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LengthSample {
    pub t: f32,
    pub length: f32,
}

/// Kubisches Segment mit gecachter Bogenlängen-Parametrisierung.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Koeffizienten für t⁰..t³
    f0: Vec3,
    f1: Vec3,
    f2: Vec3,
    f3: Vec3,
    /// Erlaubte Abweichung der stückweise linearen Längenfunktion
    length_error: f32,
    /// Monotone Tabelle (t, Länge); leer = ungültig
    samples: Vec<LengthSample>,
}

impl Default for CubicSpline {
    fn default() -> Self {
        Self {
            f0: Vec3::ZERO,
            f1: Vec3::ZERO,
            f2: Vec3::ZERO,
            f3: Vec3::ZERO,
            length_error: DEFAULT_LENGTH_ERROR,
            samples: Vec::new(),
        }
    }
}

impl CubicSpline {
    /// Erstellt ein Segment aus vier Bézier-Kontrollpunkten.
    pub fn bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut spline = Self::default();
        spline.set_bezier_curve(p0, p1, p2, p3);
        spline
    }

    /// Erstellt ein Cardinal-Segment von `p1` nach `p2`.
    pub fn cardinal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, tension: f32) -> Self {
        let mut spline = Self::default();
        spline.set_cardinal_curve(p0, p1, p2, p3, tension);
        spline
    }

    /// Setzt die Kurve aus Bézier-Kontrollpunkten.
    ///
    /// Bernstein → Potenzbasis:
    /// ```text
    /// f0 = p0
    /// f1 = 3·(p1 − p0)
    /// f2 = 3·p0 − 6·p1 + 3·p2
    /// f3 = −p0 + 3·p1 − 3·p2 + p3
    /// ```
    pub fn set_bezier_curve(&mut self, p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) {
        self.f0 = p0;
        self.f1 = 3.0 * (p1 - p0);
        self.f2 = 3.0 * p0 - 6.0 * p1 + 3.0 * p2;
        self.f3 = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        self.samples.clear();
    }

    /// Setzt die Kurve als Cardinal-Spline von `p1` nach `p2`.
    ///
    /// `p0` und `p3` liefern die Tangenten, skaliert mit `tension`
    /// (0.5 = Catmull-Rom).
    pub fn set_cardinal_curve(&mut self, p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, tension: f32) {
        let s = tension;
        self.f0 = p1;
        self.f1 = s * (p2 - p0);
        self.f2 = 2.0 * s * p0 + (s - 3.0) * p1 + (3.0 - 2.0 * s) * p2 - s * p3;
        self.f3 = -s * p0 + (2.0 - s) * p1 + (s - 2.0) * p2 + s * p3;
        self.samples.clear();
    }

    /// Punkt auf der Kurve.
    pub fn point(&self, t: f32) -> Vec3 {
        self.f0 + t * (self.f1 + t * (self.f2 + t * self.f3))
    }

    /// Erste Ableitung nach `t`.
    pub fn derivative(&self, t: f32) -> Vec3 {
        self.f1 + t * (2.0 * self.f2 + 3.0 * t * self.f3)
    }

    /// Zweite Ableitung nach `t`.
    pub fn second_derivative(&self, t: f32) -> Vec3 {
        2.0 * self.f2 + 6.0 * t * self.f3
    }

    /// Einheits-Tangente. `Vec3::ZERO` wenn keine Richtung bestimmbar ist.
    ///
    /// Bei exakt verschwindender Ableitung wird aus benachbarten Ableitungen
    /// geschätzt (an den Enden einseitig extrapoliert).
    pub fn tangent(&self, t: f32) -> Vec3 {
        let tangent = self.derivative(t).normalize_or_zero();
        if tangent != Vec3::ZERO {
            return tangent;
        }

        let estimate = if t < TANGENT_EDGE {
            self.derivative(t + TANGENT_PROBE) * 2.0 - self.derivative(t + 2.0 * TANGENT_PROBE)
        } else if t > 1.0 - TANGENT_EDGE {
            self.derivative(t - TANGENT_PROBE) * 2.0 - self.derivative(t - 2.0 * TANGENT_PROBE)
        } else {
            self.derivative(t - TANGENT_PROBE) + self.derivative(t + TANGENT_PROBE)
        };
        estimate.normalize_or_zero()
    }

    /// Aktueller Längenfehler.
    pub fn length_error(&self) -> f32 {
        self.length_error
    }

    /// Setzt den Längenfehler (geklemmt) und verwirft die Abtastung.
    pub fn set_length_error(&mut self, value: f32) {
        self.length_error = value.clamp(MIN_LENGTH_ERROR, MAX_LENGTH_ERROR);
        self.samples.clear();
    }

    /// `true` wenn die Längen-Tabelle aufgebaut ist.
    pub fn is_samples_valid(&self) -> bool {
        !self.samples.is_empty()
    }

    /// Verwirft die Längen-Tabelle.
    pub fn invalidate_samples(&mut self) {
        self.samples.clear();
    }

    /// Read-only Zugriff auf die Längen-Tabelle (leer wenn ungültig).
    pub fn samples(&self) -> &[LengthSample] {
        &self.samples
    }

    /// Baut die Längen-Tabelle auf, falls nötig.
    ///
    /// 1. Grobe Längenschätzung über `MIN_SEGMENTS` Sehnen.
    /// 2. Sehnenanzahl proportional zu Länge / Längenfehler.
    /// 3. Gieriges Ausdünnen: ein Steigungsband `[min_slope, max_slope]` sammelt
    ///    alle Geraden, die jeden bisherigen Punkt innerhalb des Längenfehlers
    ///    treffen. Erst wenn das Band kollabiert, wird eine Stützstelle gesetzt.
    pub fn validate_samples(&mut self) {
        if self.is_samples_valid() {
            return;
        }

        let mut last_point = self.f0;
        let mut estimate = 0.0f32;
        for i in 1..=MIN_SEGMENTS {
            let current = self.point(i as f32 / MIN_SEGMENTS as f32);
            estimate += current.distance(last_point);
            last_point = current;
        }

        let wanted = (SEGMENTS_FACTOR / self.length_error * estimate) as usize;
        let segments = wanted.clamp(MIN_SEGMENTS, MAX_SEGMENTS);

        let error = self.length_error;
        let mut last_sample = LengthSample::default();
        let mut last_value = last_sample;
        let mut current = last_sample;
        let mut min_slope = f32::MIN;
        let mut max_slope = f32::MAX;

        self.samples.reserve(segments / 10 + 4);
        self.samples.push(last_sample);

        last_point = self.f0;
        for i in 1..=segments {
            current.t = i as f32 / segments as f32;
            let point = self.point(current.t);
            current.length += point.distance(last_point);
            last_point = point;

            let dt = current.t - last_sample.t;
            let dl = current.length - last_sample.length;
            min_slope = min_slope.max((dl - error) / dt);
            max_slope = max_slope.min((dl + error) / dt);

            if min_slope >= max_slope {
                self.samples.push(last_value);
                last_sample = last_value;

                let dt = current.t - last_sample.t;
                let dl = current.length - last_sample.length;
                min_slope = (dl - error) / dt;
                max_slope = (dl + error) / dt;
            }

            last_value = current;
        }

        self.samples.push(last_value);
        log::trace!(
            "Längen-Tabelle: {} Sehnen → {} Stützstellen, Länge {:.4}",
            segments,
            self.samples.len(),
            last_value.length
        );
    }

    /// Gesamtlänge des Segments.
    pub fn length(&mut self) -> f32 {
        self.validate_samples();
        self.samples.last().map_or(0.0, |s| s.length)
    }

    /// Bogenlänge von `t = 0` bis `t`.
    pub fn length_at(&mut self, t: f32) -> f32 {
        self.validate_samples();
        let total = self.samples.last().map_or(0.0, |s| s.length);

        if t >= 1.0 {
            return total;
        }
        if t <= 0.0 {
            return 0.0;
        }

        let guess = (t * self.samples.len() as f32) as usize;
        let (start, end) = bracket(&self.samples, guess, |s| s.t, t);
        interpolate(start.t, start.length, end.t, end.length, t)
    }

    /// Parameter `t` zur Bogenlänge `length` (außerhalb geklemmt auf 0 / 1).
    pub fn location_by_length(&mut self, length: f32) -> f32 {
        self.validate_samples();
        let total = self.samples.last().map_or(0.0, |s| s.length);

        if length <= 0.0 {
            return 0.0;
        }
        if length >= total {
            return 1.0;
        }

        let guess = (length / total * self.samples.len() as f32) as usize;
        let (start, end) = bracket(&self.samples, guess, |s| s.length, length);
        interpolate(start.length, start.t, end.length, end.t, length)
    }

    /// Parameter `t` des Kurvenpunkts mit geringstem Abstand zu `point`.
    ///
    /// Heuristik über `segments` Sehnen; die Genauigkeit wächst mit der Anzahl.
    pub fn closest_location(&self, point: Vec3, segments: usize) -> f32 {
        let segments = segments.max(1);
        let mut last = self.f0;
        let mut best_sqr = f32::MAX;
        let mut best_t = 0.0;

        for i in 1..=segments {
            let current = self.point(i as f32 / segments as f32);
            let factor = closest_point_on_segment_factor(point, last, current);
            let sqr = (last + (current - last) * factor - point).length_squared();

            if sqr < best_sqr {
                best_sqr = sqr;
                best_t = (i as f32 - 1.0 + factor) / segments as f32;
            }
            last = current;
        }

        best_t
    }
}

/// Sucht die zwei Stützstellen, deren Schlüssel `value` einschließen.
///
/// Voraussetzung: `key(first) < value < key(last)` und mindestens zwei Einträge.
/// `guess` ist der Startindex der linearen Suche.
fn bracket(
    samples: &[LengthSample],
    guess: usize,
    key: impl Fn(&LengthSample) -> f32,
    value: f32,
) -> (LengthSample, LengthSample) {
    let last = samples.len() - 1;
    let mut index = guess.min(last);

    if key(&samples[index]) > value {
        while index > 0 {
            index -= 1;
            if key(&samples[index]) <= value {
                break;
            }
        }
        (samples[index], samples[(index + 1).min(last)])
    } else {
        while index < last {
            index += 1;
            if key(&samples[index]) >= value {
                break;
            }
        }
        (samples[index.max(1) - 1], samples[index.max(1)])
    }
}

/// Lineare Interpolation `x → y` zwischen zwei Stützstellen.
fn interpolate(x0: f32, y0: f32, x1: f32, y1: f32, x: f32) -> f32 {
    let span = x1 - x0;
    if span.abs() <= f32::EPSILON {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / span
}
