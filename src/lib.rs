//! # Solarflex - Priority Power Orchestration
//!
//! Decision engine for an off-grid battery-plus-solar installation: turns
//! raw battery-voltage telemetry into a battery health state and per-device
//! start/stop decisions for a set of priority-ranked flexible loads sharing
//! one power budget.
//!
//! ## Features
//!
//! - **Calibrated capacity display**: linear or curve-based voltage-to-SOC
//!   conversion
//! - **Hysteresis everywhere**: a recovery band between low and restart
//!   thresholds, plus per-device start/stop/emergency voltage bands, so
//!   nothing flaps near a boundary
//! - **Priority allocation**: higher-ranked loads claim the solar surplus
//!   first; opportunistic loads run only on genuine excess
//! - **Fail-safe**: degenerate telemetry or a critical battery sheds every
//!   load rather than guessing
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! The crate follows a modular architecture with clear separation of
//! concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `soc`: Voltage to state-of-charge conversion
//! - `battery`: Battery health state evaluation
//! - `telemetry`: Per-cycle telemetry sample
//! - `devices`: Flexible load profiles and run state
//! - `allocator`: Priority power allocation
//! - `orchestrator`: Cycle orchestration facade
//! - `persistence`: Run-state persistence across restarts
//!
//! The core is synchronous and side-effect free; an external loop feeds it
//! one telemetry sample per tick and actuates the decisions it returns.

pub mod allocator;
pub mod battery;
pub mod config;
pub mod devices;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod persistence;
pub mod soc;
pub mod telemetry;

// Re-export commonly used types
pub use allocator::{AllocationAction, AllocationDecision};
pub use battery::BatteryState;
pub use config::Config;
pub use error::{Result, SolarflexError};
pub use orchestrator::EnergyOrchestrator;
pub use telemetry::TelemetrySample;
