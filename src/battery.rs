//! Battery health state evaluation
//!
//! Classifies a voltage reading into one of five health states against the
//! configured threshold ladder. The `Recovering` band implements hysteresis:
//! a battery that has been Critical or Low must climb past `restart` (not
//! merely `low`) before it is treated as normal again, so loads are not
//! re-enabled the instant voltage ticks over the low threshold.

use crate::config::BatteryThresholds;
use serde::{Deserialize, Serialize};

/// Battery health state, re-derived on every evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryState {
    /// At or below the critical floor; all loads are shed
    Critical,

    /// Low band, no new loads approved
    Low,

    /// Climbing out of a deep discharge, below the restart threshold
    Recovering,

    /// Normal operating band
    Optimal,

    /// Above the optimal band, typically during absorption or equalization
    High,
}

impl BatteryState {
    /// Whether this state forbids starting any load.
    pub fn blocks_new_loads(self) -> bool {
        matches!(
            self,
            BatteryState::Critical | BatteryState::Low | BatteryState::Recovering
        )
    }
}

impl std::fmt::Display for BatteryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BatteryState::Critical => "critical",
            BatteryState::Low => "low",
            BatteryState::Recovering => "recovering",
            BatteryState::Optimal => "optimal",
            BatteryState::High => "high",
        };
        f.write_str(label)
    }
}

/// Evaluate the battery state for one voltage reading.
///
/// Deterministic and side-effect free. `previous` is the state returned by
/// the last evaluation and only influences the hysteresis gap strictly
/// between `low` and `optimal_min`. A non-finite voltage cannot be trusted
/// and evaluates to `Critical` so the allocator sheds everything.
pub fn evaluate(
    voltage: f64,
    thresholds: &BatteryThresholds,
    previous: BatteryState,
) -> BatteryState {
    if !voltage.is_finite() {
        return BatteryState::Critical;
    }

    // Safety floor always wins, regardless of history.
    if voltage <= thresholds.critical_low {
        return BatteryState::Critical;
    }

    if voltage <= thresholds.low {
        return BatteryState::Low;
    }

    if voltage > thresholds.optimal_max {
        return BatteryState::High;
    }

    if voltage >= thresholds.optimal_min {
        return BatteryState::Optimal;
    }

    // Gap strictly between low and optimal_min. Coming out of a discharge
    // the battery stays Recovering until it crosses restart.
    let climbing_out = matches!(
        previous,
        BatteryState::Critical | BatteryState::Low | BatteryState::Recovering
    );
    if climbing_out && voltage < thresholds.restart {
        BatteryState::Recovering
    } else {
        BatteryState::Optimal
    }
}
