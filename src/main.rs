use anyhow::Result;
use solarflex::orchestrator::EnergyOrchestrator;
use solarflex::persistence::RunStateStore;
use solarflex::{Config, TelemetrySample};
use tracing::info;

/// Run one allocation cycle from the command line.
///
/// Usage: `solarflex <battery_voltage> <solar_watts> <load_watts>`.
/// The external poll loop that would normally drive the orchestrator is the
/// integration's job; this binary exists for commissioning and debugging.
fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    solarflex::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Solarflex orchestration core starting up (v{})", env!("APP_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let telemetry = if args.len() >= 4 {
        TelemetrySample::new(args[1].parse()?, args[2].parse()?, args[3].parse()?)
    } else {
        anyhow::bail!("Usage: solarflex <battery_voltage> <solar_watts> <load_watts>");
    };

    let store = RunStateStore::new(&config.run_state_file);
    let run_state = store.load()?;

    let mut orchestrator = EnergyOrchestrator::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to create orchestrator: {}", e))?;
    orchestrator.restore_run_state(run_state);

    let outcome = orchestrator.run_cycle(&telemetry);
    store.save(orchestrator.run_state())?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
