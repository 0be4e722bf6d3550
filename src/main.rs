//! Path Motion Simulator.
//!
//! Headless-Lauf: ein Physik-Follower fährt mit konstanter Kraft über einen
//! Cardinal-Ring. Optionen kommen aus dem ersten Argument oder aus
//! `path_motion.toml` neben der Binary.

use path_motion::{EngineOptions, Simulation};

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Path Motion Simulator v{} startet...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(EngineOptions::config_path);
    let options = EngineOptions::load_from_file(&config_path);

    let mut simulation = Simulation::demo(&options)
        .ok_or_else(|| anyhow::anyhow!("Demo-Szene konnte nicht aufgebaut werden"))?;

    let report = simulation.run(options.simulation_ticks);
    log::info!(
        "{} Ticks: Distanz {:.2}, Geschwindigkeit {:.2}, Position ({:.2}, {:.2}, {:.2})",
        report.ticks,
        report.distance,
        report.speed,
        report.position.x,
        report.position.y,
        report.position.z
    );
    Ok(())
}
