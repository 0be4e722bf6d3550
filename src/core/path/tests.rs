use super::*;
use crate::core::transform::RigidTransform;
use approx::assert_relative_eq;

/// Offener Pfad aus `count` geraden Segmenten der Länge 10 entlang +X.
/// Das schließende Segment führt zurück zum Ursprung.
fn straight_path(count: usize) -> Path {
    let mut path = Path::default();
    let nodes = count + 1;
    for i in 0..nodes {
        path.insert_segment(i);
    }
    for i in 0..nodes {
        let start = Vec3::new(10.0 * i as f32, 0.0, 0.0);
        let end = if i + 1 < nodes {
            Vec3::new(10.0 * (i + 1) as f32, 0.0, 0.0)
        } else {
            Vec3::ZERO
        };
        let step = (end - start) / 3.0;
        path.set_local_segment(i, [start, start + step, end - step, end], SegmentKind::Bezier);
    }
    path
}

fn circle_path() -> Path {
    // Quadrat-ähnlicher geschlossener Pfad aus vier Bézier-Bögen
    let corners = [
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(-10.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -10.0),
    ];
    let handle = 5.5;
    let mut path = Path::default();
    for i in 0..corners.len() {
        path.insert_segment(i);
    }
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        // Tangente senkrecht zum Radius (gegen den Uhrzeigersinn um +Y)
        let ta = Vec3::new(-a.z, 0.0, a.x).normalize() * handle;
        let tb = Vec3::new(-b.z, 0.0, b.x).normalize() * handle;
        path.set_local_segment(i, [a, a + ta, b - tb, b], SegmentKind::Bezier);
    }
    path.set_circular_flag(true);
    path
}

// ── Struktur ──

#[test]
fn test_segmentanzahl_offen_und_geschlossen() {
    let mut path = straight_path(3);
    assert_eq!(path.node_count(), 4);
    assert_eq!(path.segment_count(), 3);

    path.set_circular_flag(true);
    assert_eq!(path.segment_count(), 4);
}

#[test]
fn test_leerer_pfad_liefert_neutrale_werte() {
    let mut path = Path::default();
    assert_eq!(path.segment_count(), 0);
    assert_eq!(path.length(), 0.0);
    assert_eq!(path.location_by_length(5.0, None, Space::Local), Location::default());
    assert_eq!(path.point(Location::new(3, 0.5), Space::Local), Vec3::ZERO);
    assert_eq!(path.tangent(Location::default(), Space::Local), Vec3::ZERO);
}

#[test]
fn test_welt_skalierung_geklemmt() {
    let mut path = Path::default();
    path.set_world_scale(0.0);
    assert_eq!(path.world_scale(), ONE_MILLIONTH);
    path.set_world_scale(-1e9);
    assert_eq!(path.world_scale(), -MILLION);
    path.set_world_scale(-2.0);
    assert_eq!(path.abs_world_scale(), 2.0);
}

// ── Längen ──

#[test]
fn test_gesamtlaenge_gerader_pfad() {
    let mut path = straight_path(3);
    assert_relative_eq!(path.local_length(), 30.0, epsilon = 1e-3);

    path.set_circular_flag(true);
    assert_relative_eq!(path.local_length(), 60.0, epsilon = 1e-3);
}

#[test]
fn test_laenge_monoton_ueber_segmente() {
    let mut path = straight_path(4);
    let mut prev = -1.0;
    for index in 0..path.segment_count() {
        for step in 0..=10 {
            let len = path.length_at(Location::new(index, step as f32 / 10.0), Space::Local);
            assert!(len >= prev, "Länge fällt bei {} / {}", index, step);
            prev = len;
        }
    }
}

#[test]
fn test_round_trip_laenge_location() {
    let mut path = circle_path();
    let total = path.local_length();
    for i in 0..40 {
        let len = total * i as f32 / 40.0;
        let location = path.location_by_length(len, None, Space::Local);
        let back = path.length_at(location, Space::Local);
        assert!(
            (back - len).abs() <= path.local_length_error() * 2.0,
            "{} → {:?} → {}",
            len,
            location,
            back
        );
    }
}

#[test]
fn test_offener_pfad_klemmt() {
    let mut path = straight_path(2);
    assert_eq!(path.location_by_length(-3.0, None, Space::Local), Location::new(0, 0.0));
    assert_eq!(path.location_by_length(999.0, None, Space::Local), Location::new(1, 1.0));
}

#[test]
fn test_geschlossener_pfad_wickelt_ein() {
    let mut path = circle_path();
    let total = path.local_length();

    let a = path.location_by_length(total + 3.0, None, Space::Local);
    let b = path.location_by_length(3.0, None, Space::Local);
    assert_eq!(a.index, b.index);
    assert!((a.t - b.t).abs() < 1e-3);

    let c = path.location_by_length(-3.0, None, Space::Local);
    let d = path.location_by_length(total - 3.0, None, Space::Local);
    assert_eq!(c.index, d.index);
    assert!((c.t - d.t).abs() < 1e-3);
    assert_eq!(c.index, 3);
}

#[test]
fn test_hinweis_liefert_gleiches_ergebnis() {
    let mut path = straight_path(5);
    for &len in &[0.5f32, 12.0, 25.0, 49.9] {
        let plain = path.location_by_length(len, None, Space::Local);
        for hint in 0..5 {
            let hinted = path.location_by_length(len, Some(hint), Space::Local);
            assert_eq!(plain.index, hinted.index, "len {} hint {}", len, hint);
            assert!((plain.t - hinted.t).abs() < 1e-5);
        }
        // Ungültiger Hinweis wird ignoriert
        let invalid = path.location_by_length(len, Some(99), Space::Local);
        assert_eq!(plain.index, invalid.index);
    }
}

#[test]
fn test_segmentgrenze_exakt() {
    let mut path = straight_path(3);
    path.validate_samples();
    let boundary = path.segment(0).map(|n| n.path_length()).unwrap_or_default();
    let location = path.location_by_length(boundary, None, Space::Local);
    let point = path.point(location, Space::Local);
    assert!((point - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-3);
}

// ── Wasserzeichen ──

#[test]
fn test_wasserzeichen_inkrementell() {
    let mut path = straight_path(4);
    assert_eq!(path.first_invalid_path_length_index(), 0);

    path.validate_path_length(1);
    assert_eq!(path.first_invalid_path_length_index(), 2);

    // Wiederholter Aufruf unterhalb des Wasserzeichens ändert nichts
    path.validate_path_length(0);
    assert_eq!(path.first_invalid_path_length_index(), 2);

    path.validate_samples();
    assert!(path.is_samples_valid());
    let before = path.segment(3).map(|n| n.path_length()).unwrap_or_default();

    // Änderung an Segment 2 senkt das Wasserzeichen auf 2
    path.set_local_segment(
        2,
        [
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(23.0, 5.0, 0.0),
            Vec3::new(27.0, 5.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
        ],
        SegmentKind::Bezier,
    );
    assert_eq!(path.first_invalid_path_length_index(), 2);
    assert!(!path.is_samples_valid());

    let first = path.segment(0).map(|n| n.path_length()).unwrap_or_default();
    assert_relative_eq!(first, 10.0, epsilon = 1e-3);

    path.validate_samples();
    let after = path.segment(3).map(|n| n.path_length()).unwrap_or_default();
    assert!(after > before);
}

#[test]
fn test_einfuegen_und_entfernen_senken_wasserzeichen() {
    let mut path = straight_path(4);
    path.validate_samples();

    path.remove_segment(0);
    assert_eq!(path.first_invalid_path_length_index(), 0);

    path.validate_samples();
    path.insert_segment(2);
    assert_eq!(path.first_invalid_path_length_index(), 2);
}

#[test]
fn test_laengenfehler_invalidiert_alles() {
    let mut path = straight_path(3);
    path.validate_samples();

    path.set_local_length_error(0.5);
    assert_eq!(path.first_invalid_path_length_index(), 0);
    assert_eq!(path.local_length_error(), 0.5);
    for i in 0..path.node_count() {
        let error = path.segment(i).map(|n| n.spline().length_error());
        assert_eq!(error, Some(0.5));
    }

    path.set_world_scale(4.0);
    assert_relative_eq!(path.length_error(), 2.0);
    path.set_length_error(0.4);
    assert_relative_eq!(path.local_length_error(), 0.1);
}

#[test]
fn test_neues_segment_erbt_laengenfehler() {
    let mut path = straight_path(2);
    path.set_local_length_error(0.25);
    path.insert_segment(1);
    assert_eq!(path.segment(1).map(|n| n.spline().length_error()), Some(0.25));
}

// ── Weltraum ──

#[test]
fn test_weltlaenge_skaliert() {
    let mut path = straight_path(2);
    path.set_world_scale(-2.0);
    let t = RigidTransform::from_translation(Vec3::new(0.0, 5.0, 0.0));

    assert_relative_eq!(path.length(), 40.0, epsilon = 1e-2);
    let location = Location::new(1, 1.0);
    assert_relative_eq!(
        path.length_at(location, Space::World(&t)),
        2.0 * path.length_at(location, Space::Local),
        epsilon = 1e-3
    );

    let world = path.location_by_length(20.0, None, Space::World(&t));
    let local = path.location_by_length(10.0, None, Space::Local);
    assert_eq!(world.index, local.index);
    assert!((world.t - local.t).abs() < 1e-4);
}

#[test]
fn test_weltpunkt_und_tangente() {
    let path = straight_path(1);
    let t = RigidTransform::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let location = Location::new(0, 0.5);

    let world = path.point(location, Space::World(&t));
    assert!((world - Vec3::new(6.0, 2.0, 3.0)).length() < 1e-4);

    let tangent = path.tangent(location, Space::World(&t));
    assert!((tangent - Vec3::X).length() < 1e-5);
}

// ── Nächster Punkt ──

#[test]
fn test_closest_location_auf_dem_pfad() {
    let mut path = straight_path(3);
    let location = path.closest_location(Vec3::new(17.0, 0.0, 0.0), 0.5, Space::Local);
    assert_eq!(location.index, 1);
    let point = path.point(location, Space::Local);
    assert!((point - Vec3::new(17.0, 0.0, 0.0)).length() < 1e-3);
}

#[test]
fn test_closest_location_neben_dem_pfad() {
    let mut path = straight_path(3);
    let query = Vec3::new(23.0, 4.0, 0.0);
    let location = path.closest_location(query, 0.5, Space::Local);
    let point = path.point(location, Space::Local);
    assert!((point - Vec3::new(23.0, 0.0, 0.0)).length() < 1e-2);
}

#[test]
fn test_closest_location_im_weltraum() {
    let mut path = straight_path(2);
    path.set_world_scale(2.0);
    let t = RigidTransform::from_translation(Vec3::new(0.0, 0.0, 100.0));

    let location = path.closest_location(Vec3::new(30.0, 0.0, 100.0), 0.5, Space::World(&t));
    let world = path.point(location, Space::World(&t));
    assert!((world - Vec3::new(30.0, 0.0, 100.0)).length() < 1e-2);
}

#[test]
fn test_wrap_index() {
    assert_eq!(wrap_index(-1, 4), 3);
    assert_eq!(wrap_index(4, 4), 0);
    assert_eq!(wrap_index(2, 4), 2);
    assert_eq!(wrap_index(5, 0), 0);
}
