//! Cycle orchestration for Solarflex
//!
//! Ties the evaluator, the allocator, and the capacity converter into one
//! synchronous cycle. The orchestrator owns the two pieces of state that
//! carry across cycles - the previous battery state and the run-state map -
//! and exposes them for the caller to persist. Callers must serialize
//! invocations; two concurrent cycles would race on the run state.

use crate::allocator::{self, AllocationDecision};
use crate::battery::{self, BatteryState};
use crate::config::Config;
use crate::devices::RunStateMap;
use crate::error::{Result, SolarflexError};
use crate::logging::get_logger;
use crate::soc;
use crate::telemetry::TelemetrySample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything one cycle produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOutcome {
    /// Unique id for tracing this cycle through logs and actuation
    pub cycle_id: String,

    /// Timestamp of the telemetry sample the cycle consumed
    pub timestamp: DateTime<Utc>,

    /// Battery health verdict for this cycle
    pub battery_state: BatteryState,

    /// Display-only capacity percentage derived from voltage
    pub soc_percent: f64,

    /// Solar surplus the allocator started from, in watts
    pub available_budget_watts: f64,

    /// One decision per enabled device, in allocation order
    pub decisions: Vec<AllocationDecision>,
}

/// Main decision engine, one instance per battery/device set
pub struct EnergyOrchestrator {
    /// Validated configuration
    config: Config,

    /// State returned by the previous evaluation, for hysteresis
    previous_state: BatteryState,

    /// Device on/off flags surviving between cycles
    run_state: RunStateMap,

    /// Logger with context
    logger: crate::logging::StructuredLogger,
}

impl EnergyOrchestrator {
    /// Create an orchestrator over a configuration.
    ///
    /// The configuration is validated here once; an invalid one is refused
    /// outright rather than evaluated on a guess.
    pub fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SolarflexError::config(format!("Refusing invalid configuration: {}", e)))?;

        Ok(Self {
            config,
            previous_state: BatteryState::Optimal,
            run_state: RunStateMap::new(),
            logger: get_logger("orchestrator"),
        })
    }

    /// Run one allocation cycle over a telemetry sample.
    ///
    /// Degenerate telemetry is not an error: it produces a conservative
    /// `Critical`/all-stop outcome, erring toward load-shedding.
    pub fn run_cycle(&mut self, telemetry: &TelemetrySample) -> CycleOutcome {
        let state = battery::evaluate(
            telemetry.battery_voltage,
            &self.config.thresholds,
            self.previous_state,
        );

        let run_state = std::mem::take(&mut self.run_state);
        let (decisions, run_state) =
            allocator::allocate(state, telemetry, &self.config.devices, run_state);
        self.run_state = run_state;
        self.previous_state = state;

        let soc_percent = soc::voltage_to_soc(telemetry.battery_voltage, &self.config.calibration);
        let started = decisions
            .iter()
            .filter(|d| d.action == allocator::AllocationAction::Start)
            .count();
        let stopped = decisions
            .iter()
            .filter(|d| d.action == allocator::AllocationAction::Stop)
            .count();
        self.logger.info(&format!(
            "Cycle complete: state={} soc={:.1}% budget={:.0}W started={} stopped={} loads_gated={}",
            state,
            soc_percent,
            telemetry.available_budget_watts(),
            started,
            stopped,
            state.blocks_new_loads()
        ));

        CycleOutcome {
            cycle_id: Uuid::new_v4().to_string(),
            timestamp: telemetry.timestamp,
            battery_state: state,
            soc_percent,
            available_budget_watts: telemetry.available_budget_watts(),
            decisions,
        }
    }

    /// Current run-state map, for the caller to persist.
    pub fn run_state(&self) -> &RunStateMap {
        &self.run_state
    }

    /// Restore a previously persisted run-state map, typically right after
    /// process start.
    pub fn restore_run_state(&mut self, run_state: RunStateMap) {
        self.run_state = run_state;
    }

    /// The configuration this orchestrator was built over.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::AllocationAction;
    use crate::devices::set_running;

    #[test]
    fn test_rejects_invalid_configuration() {
        let mut config = Config::default();
        config.thresholds.restart = 0.0;
        assert!(EnergyOrchestrator::new(config).is_err());
    }

    #[test]
    fn test_cycle_carries_run_state_forward() {
        let mut orchestrator = EnergyOrchestrator::new(Config::default()).unwrap();

        // Optimal voltage, enough surplus for the compute load; the dump
        // load is still below its start voltage.
        let outcome = orchestrator.run_cycle(&TelemetrySample::new(52.3, 8450.0, 1850.0));
        assert_eq!(outcome.battery_state, BatteryState::Optimal);
        assert_eq!(outcome.available_budget_watts, 6600.0);
        assert_eq!(outcome.decisions[0].action, AllocationAction::Start);
        assert_eq!(outcome.decisions[1].action, AllocationAction::Wait);

        // Next cycle inside the hysteresis band: the compute load holds
        let outcome = orchestrator.run_cycle(&TelemetrySample::new(49.0, 8450.0, 1850.0));
        assert_eq!(outcome.decisions[0].action, AllocationAction::Wait);
        assert!(outcome.decisions[0].reason.contains("running"));
    }

    #[test]
    fn test_hysteresis_uses_previous_state() {
        let mut orchestrator = EnergyOrchestrator::new(Config::default()).unwrap();

        // Drive the battery critical, then lift it just above low.
        let outcome = orchestrator.run_cycle(&TelemetrySample::new(44.5, 0.0, 500.0));
        assert_eq!(outcome.battery_state, BatteryState::Critical);

        let outcome = orchestrator.run_cycle(&TelemetrySample::new(47.5, 0.0, 500.0));
        assert_eq!(outcome.battery_state, BatteryState::Recovering);
    }

    #[test]
    fn test_restore_run_state() {
        let mut orchestrator = EnergyOrchestrator::new(Config::default()).unwrap();
        let mut persisted = RunStateMap::new();
        set_running(&mut persisted, "compute-1", true);
        orchestrator.restore_run_state(persisted);

        // In the hysteresis band the restored device keeps running
        let outcome = orchestrator.run_cycle(&TelemetrySample::new(49.0, 6000.0, 1000.0));
        assert_eq!(outcome.decisions[0].device_id, "compute-1");
        assert!(outcome.decisions[0].reason.contains("running"));
    }
}
