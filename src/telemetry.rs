//! Telemetry sample consumed once per evaluation cycle
//!
//! The core does not acquire, retry, or average readings; the caller hands
//! it one authoritative sample per cycle and the sample is dropped when the
//! cycle completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One snapshot of the power system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Battery terminal voltage in volts
    pub battery_voltage: f64,

    /// Current solar production in watts
    pub solar_power_watts: f64,

    /// House consumption in watts, excluding the flexible loads
    /// being allocated
    pub load_power_watts: f64,

    /// Time the sample was taken
    pub timestamp: DateTime<Utc>,
}

impl TelemetrySample {
    /// Construct a sample stamped with the current time.
    pub fn new(battery_voltage: f64, solar_power_watts: f64, load_power_watts: f64) -> Self {
        Self {
            battery_voltage,
            solar_power_watts,
            load_power_watts,
            timestamp: Utc::now(),
        }
    }

    /// Whether every reading in the sample is a usable number.
    ///
    /// A sample failing this check must produce a conservative all-stop
    /// outcome, never a guessed default.
    pub fn is_usable(&self) -> bool {
        self.battery_voltage.is_finite()
            && self.solar_power_watts.is_finite()
            && self.load_power_watts.is_finite()
    }

    /// Power budget available to flexible loads: solar surplus over house
    /// consumption. May be negative when the house draws more than the
    /// panels produce; planned battery discharge is deliberately not added.
    pub fn available_budget_watts(&self) -> f64 {
        self.solar_power_watts - self.load_power_watts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_solar_minus_load() {
        let sample = TelemetrySample::new(52.3, 8450.0, 1850.0);
        assert_eq!(sample.available_budget_watts(), 6600.0);
    }

    #[test]
    fn test_budget_may_be_negative() {
        let sample = TelemetrySample::new(51.0, 500.0, 2200.0);
        assert_eq!(sample.available_budget_watts(), -1700.0);
    }

    #[test]
    fn test_usability() {
        assert!(TelemetrySample::new(52.0, 1000.0, 300.0).is_usable());
        assert!(!TelemetrySample::new(f64::NAN, 1000.0, 300.0).is_usable());
        assert!(!TelemetrySample::new(52.0, f64::INFINITY, 300.0).is_usable());
    }
}
