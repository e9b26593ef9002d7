//! Flexible load profiles and per-device run state
//!
//! A device profile describes one priority-ranked flexible load: its rated
//! power draw, its voltage hysteresis band, and any excess-solar gating.
//! Profiles are owned by the configuration store and read-only to the
//! allocator; the only mutable state the core carries between cycles is the
//! run-state map defined here.

use crate::error::{Result, SolarflexError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Profile of a single flexible load.
///
/// Invariant: `emergency_stop_voltage < stop_voltage < start_voltage`.
/// The gap between stop and start is the device's own hysteresis band and
/// should be sized to its power draw and role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Stable device identifier, referenced by run state and decisions
    pub id: String,

    /// Human-readable name for logs and dashboards
    pub name: String,

    /// Allocation rank; 1 is served first
    pub priority: u32,

    /// Rated consumption of the load in watts
    pub power_draw_watts: f64,

    /// Battery voltage at or above which a stopped device may start
    pub start_voltage: f64,

    /// Battery voltage at or below which a running device is stopped
    pub stop_voltage: f64,

    /// Hard floor; a running device is stopped immediately at or below this
    pub emergency_stop_voltage: f64,

    /// Gate the device on genuine solar surplus in addition to voltage
    #[serde(default)]
    pub requires_excess_solar: bool,

    /// Minimum solar production in watts (only with `requires_excess_solar`)
    #[serde(default)]
    pub minimum_solar_production_watts: f64,

    /// Minimum solar watts left over after this device's draw
    /// (only with `requires_excess_solar`)
    #[serde(default)]
    pub minimum_excess_watts: f64,

    /// Disabled devices are excluded from allocation entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl DeviceProfile {
    /// Validate the profile's internal invariants.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(SolarflexError::validation(
                "device.id",
                "Device id cannot be empty",
            ));
        }

        if self.priority == 0 {
            return Err(SolarflexError::validation(
                "device.priority",
                "Priority must be 1 or greater",
            ));
        }

        if self.power_draw_watts <= 0.0 || !self.power_draw_watts.is_finite() {
            return Err(SolarflexError::validation(
                "device.power_draw_watts",
                "Power draw must be a positive finite number",
            ));
        }

        if !(self.emergency_stop_voltage < self.stop_voltage
            && self.stop_voltage < self.start_voltage)
        {
            return Err(SolarflexError::validation(
                "device.voltages",
                "Required ordering: emergency_stop_voltage < stop_voltage < start_voltage",
            ));
        }

        if self.requires_excess_solar
            && (self.minimum_solar_production_watts < 0.0 || self.minimum_excess_watts < 0.0)
        {
            return Err(SolarflexError::validation(
                "device.solar_gates",
                "Solar gate watts cannot be negative",
            ));
        }

        Ok(())
    }
}

/// On/off status of one device, persisted between allocation cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceRunState {
    /// Device this state belongs to
    pub device_id: String,

    /// Whether the device was running at the end of the last cycle
    pub is_running: bool,
}

/// Run state for the whole device set, keyed by device id.
///
/// New devices default to not running. The caller owns durable storage of
/// this map across restarts; the core only mutates the copy handed to it.
pub type RunStateMap = HashMap<String, DeviceRunState>;

/// Look up whether a device was running last cycle; unknown devices are off.
pub fn is_running(run_state: &RunStateMap, device_id: &str) -> bool {
    run_state.get(device_id).is_some_and(|s| s.is_running)
}

/// Record a device's new running flag in the map.
pub fn set_running(run_state: &mut RunStateMap, device_id: &str, running: bool) {
    run_state.insert(
        device_id.to_string(),
        DeviceRunState {
            device_id: device_id.to_string(),
            is_running: running,
        },
    );
}
