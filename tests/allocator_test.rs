use solarflex::allocator::{AllocationAction, allocate};
use solarflex::battery::BatteryState;
use solarflex::devices::{DeviceProfile, RunStateMap, is_running, set_running};
use solarflex::telemetry::TelemetrySample;

fn compute_load() -> DeviceProfile {
    DeviceProfile {
        id: "compute-1".to_string(),
        name: "Compute load".to_string(),
        priority: 1,
        power_draw_watts: 3878.0,
        start_voltage: 50.0,
        stop_voltage: 47.0,
        emergency_stop_voltage: 45.0,
        requires_excess_solar: false,
        minimum_solar_production_watts: 0.0,
        minimum_excess_watts: 0.0,
        enabled: true,
    }
}

fn dump_load() -> DeviceProfile {
    DeviceProfile {
        id: "dump-1".to_string(),
        name: "Resistive dump load".to_string(),
        priority: 3,
        power_draw_watts: 3250.0,
        start_voltage: 54.5,
        stop_voltage: 53.0,
        emergency_stop_voltage: 45.0,
        requires_excess_solar: true,
        minimum_solar_production_watts: 8000.0,
        minimum_excess_watts: 3250.0,
        enabled: true,
    }
}

#[test]
fn midday_surplus_feeds_compute_first() {
    // Midday sun, battery optimal: the compute load starts and claims most
    // of the 6600 W surplus; the dump load waits on its start voltage.
    let devices = vec![compute_load(), dump_load()];
    let telemetry = TelemetrySample::new(52.3, 8450.0, 1850.0);
    assert_eq!(telemetry.available_budget_watts(), 6600.0);

    let (decisions, run_state) = allocate(
        BatteryState::Optimal,
        &telemetry,
        &devices,
        RunStateMap::new(),
    );

    assert_eq!(decisions.len(), 2);

    assert_eq!(decisions[0].device_id, "compute-1");
    assert_eq!(decisions[0].action, AllocationAction::Start);
    assert_eq!(decisions[0].power_allocated_watts, 3878.0);

    assert_eq!(decisions[1].device_id, "dump-1");
    assert_eq!(decisions[1].action, AllocationAction::Wait);
    assert!(decisions[1].reason.contains("below start threshold"));

    assert!(is_running(&run_state, "compute-1"));
    assert!(!is_running(&run_state, "dump-1"));
}

#[test]
fn equal_start_thresholds_resolved_by_priority() {
    // Both devices could start; budget fits only one.
    let mut first = compute_load();
    first.power_draw_watts = 3000.0;
    let mut second = compute_load();
    second.id = "compute-2".to_string();
    second.priority = 2;
    second.power_draw_watts = 3000.0;

    let (decisions, _) = allocate(
        BatteryState::Optimal,
        &TelemetrySample::new(52.0, 4500.0, 500.0),
        &[second.clone(), first.clone()],
        RunStateMap::new(),
    );

    assert_eq!(decisions[0].device_id, "compute-1");
    assert_eq!(decisions[0].action, AllocationAction::Start);
    assert_eq!(decisions[1].device_id, "compute-2");
    assert_eq!(decisions[1].action, AllocationAction::Wait);
    assert!(decisions[1].reason.contains("insufficient power budget"));
}

#[test]
fn critical_battery_overrides_priority_and_hysteresis() {
    let devices = vec![compute_load(), dump_load()];
    let mut run_state = RunStateMap::new();
    set_running(&mut run_state, "compute-1", true);
    set_running(&mut run_state, "dump-1", true);

    // Sun blazing, budget huge; critical battery still stops everything.
    let (decisions, run_state) = allocate(
        BatteryState::Critical,
        &TelemetrySample::new(44.8, 12000.0, 500.0),
        &devices,
        run_state,
    );

    for decision in &decisions {
        assert_eq!(decision.action, AllocationAction::Stop);
        assert_eq!(decision.reason, "battery critical");
        assert_eq!(decision.power_allocated_watts, 0.0);
    }
    assert!(!is_running(&run_state, "compute-1"));
    assert!(!is_running(&run_state, "dump-1"));
}

#[test]
fn running_device_survives_hysteresis_band() {
    // 48.0 V would not qualify for a fresh start (start is 50.0) but a
    // running device holds until voltage hits its stop threshold.
    let devices = vec![compute_load()];
    let mut run_state = RunStateMap::new();
    set_running(&mut run_state, "compute-1", true);

    let (decisions, run_state) = allocate(
        BatteryState::Optimal,
        &TelemetrySample::new(48.0, 6000.0, 1000.0),
        &devices,
        run_state,
    );

    assert_eq!(decisions[0].action, AllocationAction::Wait);
    assert!(decisions[0].reason.contains("running"));
    assert_eq!(decisions[0].power_allocated_watts, 3878.0);
    assert!(is_running(&run_state, "compute-1"));

    // From a cold start the same voltage only waits.
    let (decisions, _) = allocate(
        BatteryState::Optimal,
        &TelemetrySample::new(48.0, 6000.0, 1000.0),
        &devices,
        RunStateMap::new(),
    );
    assert_eq!(decisions[0].action, AllocationAction::Wait);
    assert!(decisions[0].reason.contains("below start threshold"));
}

#[test]
fn running_devices_reserve_budget_before_lower_priorities() {
    // The running compute load reserves its draw, leaving the dump load
    // short even though raw surplus would have covered it.
    let mut dump = dump_load();
    dump.start_voltage = 50.0;
    dump.requires_excess_solar = false;
    let devices = vec![compute_load(), dump];
    let mut run_state = RunStateMap::new();
    set_running(&mut run_state, "compute-1", true);

    let (decisions, _) = allocate(
        BatteryState::Optimal,
        &TelemetrySample::new(52.0, 7000.0, 500.0),
        &devices,
        run_state,
    );

    // Surplus 6500, compute holds 3878, leaving 2622 < 3250.
    assert_eq!(decisions[0].power_allocated_watts, 3878.0);
    assert_eq!(decisions[1].action, AllocationAction::Wait);
    assert!(decisions[1].reason.contains("insufficient power budget"));
}

#[test]
fn excess_solar_device_waits_without_genuine_surplus() {
    let devices = vec![dump_load()];

    // Voltage and budget fine, production below the device's floor.
    let (decisions, _) = allocate(
        BatteryState::High,
        &TelemetrySample::new(55.0, 7500.0, 100.0),
        &devices,
        RunStateMap::new(),
    );
    assert_eq!(decisions[0].action, AllocationAction::Wait);
    assert!(decisions[0].reason.contains("insufficient solar production"));

    // Production fine: starts.
    let (decisions, _) = allocate(
        BatteryState::High,
        &TelemetrySample::new(55.0, 8450.0, 100.0),
        &devices,
        RunStateMap::new(),
    );
    assert_eq!(decisions[0].action, AllocationAction::Start);
}

#[test]
fn nan_power_reading_sheds_all_loads() {
    let devices = vec![compute_load()];
    let mut run_state = RunStateMap::new();
    set_running(&mut run_state, "compute-1", true);

    let (decisions, run_state) = allocate(
        BatteryState::Optimal,
        &TelemetrySample::new(52.0, f64::NAN, 500.0),
        &devices,
        run_state,
    );

    assert_eq!(decisions[0].action, AllocationAction::Stop);
    assert_eq!(decisions[0].reason, "telemetry unusable");
    assert!(!is_running(&run_state, "compute-1"));
}
