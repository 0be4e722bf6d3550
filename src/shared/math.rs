//! Kleine numerische Hilfsfunktionen ohne Abhängigkeit zu Pfad-Typen.
//!
//! Layer-neutral: wird von `core::cubic_spline`, `core::path` und der
//! Physik-Integration gemeinsam genutzt.

use glam::Vec3;

/// Kleinster erlaubter Betrag für Skalierungen.
pub const ONE_MILLIONTH: f32 = 1e-6;
/// Größter erlaubter Betrag für Skalierungen.
pub const MILLION: f32 = 1e6;

/// Faktor `t` des nächsten Punkts auf der Strecke `start + (end - start) * t`.
///
/// Degenerierte Strecken (Länge 0) liefern `0.0`.
pub fn closest_point_on_segment_factor(point: Vec3, start: Vec3, end: Vec3) -> f32 {
    let direction = end - start;
    let sqr_length = direction.length_squared();
    if sqr_length == 0.0 {
        return 0.0;
    }
    ((point - start).dot(direction) / sqr_length).clamp(0.0, 1.0)
}

/// Klemmt den Betrag eines vorzeichenbehafteten Werts auf `[min_abs, max_abs]`.
///
/// Das Vorzeichen bleibt erhalten, `0.0` wird als positiv behandelt.
pub fn clamp_signed_magnitude(value: f32, min_abs: f32, max_abs: f32) -> f32 {
    if value < 0.0 {
        value.clamp(-max_abs, -min_abs)
    } else {
        value.clamp(min_abs, max_abs)
    }
}

/// Verringert den Betrag von `value` um `amount`, ohne das Vorzeichen zu kippen.
///
/// Entspricht einer reinen Abbremsung: das Ergebnis bleibt bei `0.0` stehen.
pub fn decelerate(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_factor_clamped() {
        let start = Vec3::ZERO;
        let end = Vec3::new(10.0, 0.0, 0.0);

        assert_relative_eq!(
            closest_point_on_segment_factor(Vec3::new(5.0, 3.0, 0.0), start, end),
            0.5
        );
        assert_eq!(
            closest_point_on_segment_factor(Vec3::new(-5.0, 0.0, 0.0), start, end),
            0.0
        );
        assert_eq!(
            closest_point_on_segment_factor(Vec3::new(50.0, 0.0, 0.0), start, end),
            1.0
        );
    }

    #[test]
    fn test_segment_factor_degenerate() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(closest_point_on_segment_factor(Vec3::ONE, p, p), 0.0);
    }

    #[test]
    fn test_clamp_signed_magnitude() {
        assert_eq!(clamp_signed_magnitude(0.0, ONE_MILLIONTH, MILLION), ONE_MILLIONTH);
        assert_eq!(clamp_signed_magnitude(-1e9, ONE_MILLIONTH, MILLION), -MILLION);
        assert_eq!(clamp_signed_magnitude(-1e-9, ONE_MILLIONTH, MILLION), -ONE_MILLIONTH);
        assert_eq!(clamp_signed_magnitude(2.5, ONE_MILLIONTH, MILLION), 2.5);
    }

    #[test]
    fn test_decelerate_stops_at_zero() {
        assert_eq!(decelerate(3.0, 1.0), 2.0);
        assert_eq!(decelerate(3.0, 10.0), 0.0);
        assert_eq!(decelerate(-3.0, 1.0), -2.0);
        assert_eq!(decelerate(-3.0, 10.0), 0.0);
        assert_eq!(decelerate(0.0, 1.0), 0.0);
    }
}
