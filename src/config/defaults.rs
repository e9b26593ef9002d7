use super::*;

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            voltage_at_0_percent: 45.0,
            voltage_at_100_percent: 56.0,
            curve: None,
        }
    }
}

impl Default for BatteryThresholds {
    // 48 V LiFePO4 bank, 16 cells
    fn default() -> Self {
        Self {
            shutdown: 44.0,
            critical_low: 45.0,
            low: 47.0,
            restart: 50.0,
            optimal_min: 50.0,
            optimal_max: 54.5,
            float_voltage: 54.5,
            absorption: 56.0,
            full: 56.8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/solarflex.log".to_string(),
            format: "structured".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            thresholds: BatteryThresholds::default(),
            devices: vec![
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
                },
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
                },
            ],
            logging: LoggingConfig::default(),
            run_state_file: "/tmp/solarflex_run_state.json".to_string(),
        }
    }
}
