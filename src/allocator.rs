//! Priority power allocation for flexible loads
//!
//! One allocation cycle walks the enabled devices in ascending priority
//! order, charging each Start or keep-running decision against a shared
//! solar-surplus budget. Higher-priority loads claim budget first; whatever
//! is left decides the fate of the opportunistic loads below them.
//!
//! The run-state map is threaded in and out explicitly so the allocator
//! stays a pure function of its arguments.

use crate::battery::BatteryState;
use crate::devices::{self, DeviceProfile, RunStateMap};
use crate::telemetry::TelemetrySample;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Action the actuation layer should take for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationAction {
    /// Switch the device on
    Start,

    /// Switch the device off
    Stop,

    /// No state change this cycle
    Wait,
}

/// Decision for one device in one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationDecision {
    /// Device the decision applies to
    pub device_id: String,

    /// What the actuation layer should do
    pub action: AllocationAction,

    /// Operator-readable explanation naming the deciding gate
    pub reason: String,

    /// Watts reserved for this device this cycle (0 unless the device is
    /// started or kept running)
    pub power_allocated_watts: f64,
}

/// Decide START/STOP/WAIT for every enabled device.
///
/// `devices` come from the profile store; duplicate priorities should have
/// been rejected there, but ties are still broken deterministically by id.
/// The returned map reflects the running flag implied by each decision and
/// must be handed back on the next cycle.
pub fn allocate(
    battery_state: BatteryState,
    telemetry: &TelemetrySample,
    devices: &[DeviceProfile],
    mut run_state: RunStateMap,
) -> (Vec<AllocationDecision>, RunStateMap) {
    let mut enabled: Vec<&DeviceProfile> = devices.iter().filter(|d| d.enabled).collect();
    enabled.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));

    // Degenerate telemetry cannot be reasoned about; shed everything rather
    // than risk over-discharge on a guessed reading.
    if !telemetry.is_usable() {
        return stop_all(&enabled, "telemetry unusable", run_state);
    }

    // Global safety override: critical battery stops every load, bypassing
    // per-device hysteresis and priority.
    if battery_state == BatteryState::Critical {
        return stop_all(&enabled, "battery critical", run_state);
    }

    let voltage = telemetry.battery_voltage;
    let mut budget = telemetry.available_budget_watts();
    let mut decisions = Vec::with_capacity(enabled.len());

    for device in enabled {
        let was_running = devices::is_running(&run_state, &device.id);
        let decision = if was_running {
            evaluate_running(device, voltage)
        } else {
            evaluate_stopped(device, telemetry, budget)
        };

        let keeps_power = decision.power_allocated_watts > 0.0;
        if keeps_power {
            budget -= device.power_draw_watts;
        }
        devices::set_running(&mut run_state, &device.id, keeps_power);

        debug!(
            device = %device.id,
            action = ?decision.action,
            reason = %decision.reason,
            budget_remaining = budget,
            "allocation decision"
        );
        decisions.push(decision);
    }

    (decisions, run_state)
}

/// Stop every enabled device with a shared reason.
///
/// The whole run-state map goes to all-false, including entries for devices
/// that are currently disabled; a stale running flag would otherwise let a
/// re-enabled device bypass its start gates.
fn stop_all(
    enabled: &[&DeviceProfile],
    reason: &str,
    mut run_state: RunStateMap,
) -> (Vec<AllocationDecision>, RunStateMap) {
    for state in run_state.values_mut() {
        state.is_running = false;
    }

    let mut decisions = Vec::with_capacity(enabled.len());
    for device in enabled {
        devices::set_running(&mut run_state, &device.id, false);
        decisions.push(AllocationDecision {
            device_id: device.id.clone(),
            action: AllocationAction::Stop,
            reason: reason.to_string(),
            power_allocated_watts: 0.0,
        });
    }
    (decisions, run_state)
}

/// A running device is only checked against its stop thresholds; it is not
/// re-validated against start gates, which is what gives each device its
/// hysteresis band.
fn evaluate_running(device: &DeviceProfile, voltage: f64) -> AllocationDecision {
    if voltage <= device.emergency_stop_voltage {
        return AllocationDecision {
            device_id: device.id.clone(),
            action: AllocationAction::Stop,
            reason: format!(
                "emergency voltage floor ({:.1} V <= {:.1} V)",
                voltage, device.emergency_stop_voltage
            ),
            power_allocated_watts: 0.0,
        };
    }

    if voltage <= device.stop_voltage {
        return AllocationDecision {
            device_id: device.id.clone(),
            action: AllocationAction::Stop,
            reason: format!(
                "below stop threshold ({:.1} V <= {:.1} V)",
                voltage, device.stop_voltage
            ),
            power_allocated_watts: 0.0,
        };
    }

    AllocationDecision {
        device_id: device.id.clone(),
        action: AllocationAction::Wait,
        reason: format!("running, holding {:.0} W", device.power_draw_watts),
        power_allocated_watts: device.power_draw_watts,
    }
}

/// Start gates for a stopped device, checked in order: voltage, budget,
/// solar production, solar excess. The first failing gate names the reason.
fn evaluate_stopped(
    device: &DeviceProfile,
    telemetry: &TelemetrySample,
    budget: f64,
) -> AllocationDecision {
    let voltage = telemetry.battery_voltage;

    if voltage < device.start_voltage {
        return wait(
            device,
            format!(
                "below start threshold ({:.1} V < {:.1} V)",
                voltage, device.start_voltage
            ),
        );
    }

    if budget < device.power_draw_watts {
        return wait(
            device,
            format!(
                "insufficient power budget ({:.0} W available, {:.0} W required)",
                budget, device.power_draw_watts
            ),
        );
    }

    if device.requires_excess_solar {
        if telemetry.solar_power_watts < device.minimum_solar_production_watts {
            return wait(
                device,
                format!(
                    "insufficient solar production ({:.0} W < {:.0} W)",
                    telemetry.solar_power_watts, device.minimum_solar_production_watts
                ),
            );
        }

        let excess = telemetry.solar_power_watts - device.power_draw_watts;
        if excess < device.minimum_excess_watts {
            return wait(
                device,
                format!(
                    "insufficient solar excess ({:.0} W < {:.0} W)",
                    excess, device.minimum_excess_watts
                ),
            );
        }
    }

    AllocationDecision {
        device_id: device.id.clone(),
        action: AllocationAction::Start,
        reason: format!(
            "start conditions met ({:.1} V, {:.0} W budget)",
            voltage, budget
        ),
        power_allocated_watts: device.power_draw_watts,
    }
}

fn wait(device: &DeviceProfile, reason: String) -> AllocationDecision {
    AllocationDecision {
        device_id: device.id.clone(),
        action: AllocationAction::Wait,
        reason,
        power_allocated_watts: 0.0,
    }
}
