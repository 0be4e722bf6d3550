//! Zentrale Konfiguration für Pfade, Follower-Physik und die Headless-Simulation.
//!
//! `EngineOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

use crate::core::cubic_spline::{DEFAULT_LENGTH_ERROR, MAX_LENGTH_ERROR, MIN_LENGTH_ERROR};
use crate::shared::math::{clamp_signed_magnitude, MILLION, ONE_MILLIONTH};

// ── Pfad ────────────────────────────────────────────────────────────

/// Standard-Weltskalierung eines Pfads.
pub const PATH_WORLD_SCALE: f32 = 1.0;
/// Standard-Spannung für Cardinal-Pfade (0.5 = Catmull-Rom).
pub const CARDINAL_TENSION: f32 = 0.5;
/// Schrittlänge (Welteinheiten) für die Nächster-Punkt-Suche.
pub const CLOSEST_STEP_LENGTH: f32 = 0.5;

// ── Physik ──────────────────────────────────────────────────────────

/// Reibungskoeffizient für Quer- und Anpressanteile.
pub const PHYSICS_FRICTION_COEFFICIENT: f32 = 0.1;
/// Konstanter Fahrtwiderstand (Einheiten/s²).
pub const PHYSICS_DRAG: f32 = 0.5;
/// Maximale Geschwindigkeit entlang des Pfads (Einheiten/s).
pub const PHYSICS_MAX_SPEED: f32 = 10.0;
/// Fester Zeitschritt des Physik-Ticks (Sekunden).
pub const PHYSICS_FIXED_DELTA_TIME: f32 = 0.02;

// ── Simulation ──────────────────────────────────────────────────────

/// Anzahl Physik-Ticks der Headless-Simulation.
pub const SIMULATION_TICKS: u32 = 500;
/// Konstante Kraft (Welt) auf den Agenten in der Headless-Simulation.
pub const SIMULATION_FORCE: [f32; 3] = [4.0, 0.0, 0.0];

/// Alle zur Laufzeit änderbaren Engine-Optionen.
/// Wird als `path_motion.toml` neben der Binary gespeichert.
/// Fehlende Felder übernehmen die Werte aus `Default`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineOptions {
    // ── Pfad ─────────────────────────────────────────────────────
    /// Längenfehler in Pfad-Koordinaten (lokal)
    pub length_error: f32,
    /// Weltskalierung (≠ 0, Vorzeichen spiegelt Richtungen)
    pub world_scale: f32,
    /// Spannung der Cardinal-Kurven
    pub tension: f32,
    /// Geschlossener Pfad (letzter Node → erster Node)
    pub circular: bool,
    /// Schrittlänge für `closest_location` in Welteinheiten
    pub closest_step_length: f32,

    // ── Physik ───────────────────────────────────────────────────
    /// Reibungskoeffizient
    pub friction_coefficient: f32,
    /// Konstanter Fahrtwiderstand
    pub drag: f32,
    /// Maximale Geschwindigkeit
    pub max_speed: f32,
    /// Fester Zeitschritt (Sekunden)
    pub fixed_delta_time: f32,

    // ── Simulation ───────────────────────────────────────────────
    /// Anzahl Ticks der Headless-Simulation
    pub simulation_ticks: u32,
    /// Konstante Weltkraft auf den Agenten
    pub simulation_force: [f32; 3],
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            length_error: DEFAULT_LENGTH_ERROR,
            world_scale: PATH_WORLD_SCALE,
            tension: CARDINAL_TENSION,
            circular: true,
            closest_step_length: CLOSEST_STEP_LENGTH,

            friction_coefficient: PHYSICS_FRICTION_COEFFICIENT,
            drag: PHYSICS_DRAG,
            max_speed: PHYSICS_MAX_SPEED,
            fixed_delta_time: PHYSICS_FIXED_DELTA_TIME,

            simulation_ticks: SIMULATION_TICKS,
            simulation_force: SIMULATION_FORCE,
        }
    }
}

impl EngineOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts.sanitized()
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("path_motion"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("path_motion.toml")
    }

    /// Klemmt alle Werte auf ihre gültigen Bereiche.
    ///
    /// Ungültige Werte sind stufenlose Stellgrößen und werden nie abgelehnt.
    pub fn sanitized(mut self) -> Self {
        self.length_error = self.length_error.clamp(MIN_LENGTH_ERROR, MAX_LENGTH_ERROR);
        self.world_scale = clamp_signed_magnitude(self.world_scale, ONE_MILLIONTH, MILLION);
        self.tension = self.tension.clamp(0.0, 1.0);
        self.closest_step_length = self.closest_step_length.max(MIN_LENGTH_ERROR);
        self.friction_coefficient = self.friction_coefficient.max(0.0);
        self.drag = self.drag.max(0.0);
        self.max_speed = self.max_speed.max(0.0);
        self.fixed_delta_time = self.fixed_delta_time.max(ONE_MILLIONTH);
        self
    }
}
