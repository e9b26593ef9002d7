//! Configuration management for Solarflex
//!
//! This module handles loading, validation, and management of the
//! orchestration configuration from YAML files. Validation happens once at
//! the load boundary; the decision hot path assumes a valid configuration
//! and never re-checks it.

use crate::devices::DeviceProfile;
use crate::error::{Result, SolarflexError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Voltage-to-capacity calibration
    pub calibration: CalibrationConfig,

    /// Battery health threshold ladder
    pub thresholds: BatteryThresholds,

    /// Flexible load profiles, allocated in priority order
    #[serde(default)]
    pub devices: Vec<DeviceProfile>,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Path for the run-state persistence file
    pub run_state_file: String,
}

/// One point on a user-supplied calibration curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurvePoint {
    /// State of charge in percent, 0..100
    pub soc: f64,

    /// Battery terminal voltage at that state of charge
    pub voltage: f64,
}

/// Voltage-to-capacity calibration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Terminal voltage considered 0% capacity
    pub voltage_at_0_percent: f64,

    /// Terminal voltage considered 100% capacity
    pub voltage_at_100_percent: f64,

    /// Optional piecewise calibration curve; when present it replaces the
    /// two-point line. Must be strictly monotonic in both soc and voltage.
    #[serde(default)]
    pub curve: Option<Vec<CurvePoint>>,
}

/// Ordered battery health thresholds, all in volts.
///
/// Required ladder:
/// `shutdown < critical_low <= low < restart <= optimal_min < optimal_max
///  <= float_voltage < absorption <= full`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryThresholds {
    /// Inverter shutdown floor, below even the critical threshold
    pub shutdown: f64,

    /// At or below this the battery is Critical and everything stops
    pub critical_low: f64,

    /// Upper bound of the Low band
    pub low: f64,

    /// Recovery exit; a battery leaving Critical/Low must cross this
    /// before it is treated as normal again
    pub restart: f64,

    /// Lower bound of the Optimal band
    pub optimal_min: f64,

    /// Upper bound of the Optimal band
    pub optimal_max: f64,

    /// Charger float stage voltage, display/collaborator use only
    pub float_voltage: f64,

    /// Charger absorption stage voltage, display/collaborator use only
    pub absorption: f64,

    /// Voltage regarded as a full battery, display/collaborator use only
    pub full: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file or directory
    pub file: String,

    /// Log format (structured or simple)
    pub format: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations, with validation
    pub fn load() -> Result<Self> {
        let default_paths = [
            "solarflex_config.yaml",
            "/data/solarflex_config.yaml",
            "/etc/solarflex/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Everything the decision core assumes is checked here, once, so the
    /// per-cycle path stays free of defensive re-checks.
    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()?;
        self.thresholds.validate()?;

        let mut priorities: HashSet<u32> = HashSet::new();
        let mut ids: HashSet<&str> = HashSet::new();
        for device in &self.devices {
            device.validate()?;

            if !ids.insert(device.id.as_str()) {
                return Err(SolarflexError::validation(
                    "devices".to_string(),
                    format!("Duplicate device id: {}", device.id),
                ));
            }

            // Priority ties among enabled devices would make allocation
            // order undefined for loads sharing one budget.
            if device.enabled && !priorities.insert(device.priority) {
                return Err(SolarflexError::validation(
                    "devices".to_string(),
                    format!(
                        "Duplicate priority {} among enabled devices",
                        device.priority
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl CalibrationConfig {
    /// Validate calibration endpoints and the optional curve.
    pub fn validate(&self) -> Result<()> {
        if !(self.voltage_at_0_percent.is_finite() && self.voltage_at_100_percent.is_finite()) {
            return Err(SolarflexError::validation(
                "calibration",
                "Calibration voltages must be finite",
            ));
        }

        if self.voltage_at_0_percent >= self.voltage_at_100_percent {
            return Err(SolarflexError::validation(
                "calibration",
                "voltage_at_0_percent must be below voltage_at_100_percent",
            ));
        }

        if let Some(curve) = &self.curve {
            if curve.len() < 2 {
                return Err(SolarflexError::validation(
                    "calibration.curve",
                    "Curve needs at least two points",
                ));
            }

            for pair in curve.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if !(a.soc.is_finite() && a.voltage.is_finite()) {
                    return Err(SolarflexError::validation(
                        "calibration.curve",
                        "Curve points must be finite",
                    ));
                }
                if a.soc >= b.soc || a.voltage >= b.voltage {
                    return Err(SolarflexError::validation(
                        "calibration.curve",
                        "Curve must be strictly increasing in both soc and voltage",
                    ));
                }
            }

            if let Some(last) = curve.last()
                && !(last.soc.is_finite() && last.voltage.is_finite())
            {
                return Err(SolarflexError::validation(
                    "calibration.curve",
                    "Curve points must be finite",
                ));
            }

            for point in curve {
                if !(0.0..=100.0).contains(&point.soc) {
                    return Err(SolarflexError::validation(
                        "calibration.curve",
                        "Curve soc values must lie in 0..100",
                    ));
                }
            }
        }

        Ok(())
    }
}

impl BatteryThresholds {
    /// Validate the full threshold ladder ordering.
    pub fn validate(&self) -> Result<()> {
        let rungs = [
            ("shutdown", self.shutdown),
            ("critical_low", self.critical_low),
            ("low", self.low),
            ("restart", self.restart),
            ("optimal_min", self.optimal_min),
            ("optimal_max", self.optimal_max),
            ("float_voltage", self.float_voltage),
            ("absorption", self.absorption),
            ("full", self.full),
        ];
        for (name, value) in rungs {
            if !value.is_finite() {
                return Err(SolarflexError::validation(
                    format!("thresholds.{}", name),
                    "Threshold must be finite".to_string(),
                ));
            }
        }

        let ordered = self.shutdown < self.critical_low
            && self.critical_low <= self.low
            && self.low < self.restart
            && self.restart <= self.optimal_min
            && self.optimal_min < self.optimal_max
            && self.optimal_max <= self.float_voltage
            && self.float_voltage < self.absorption
            && self.absorption <= self.full;
        if !ordered {
            return Err(SolarflexError::validation(
                "thresholds",
                "Required ladder: shutdown < critical_low <= low < restart <= optimal_min \
                 < optimal_max <= float_voltage < absorption <= full",
            ));
        }

        Ok(())
    }
}
