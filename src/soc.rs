//! Voltage to state-of-charge conversion
//!
//! Battery terminal voltage is the measured ground truth everywhere in this
//! crate; state of charge is a derived percentage for display only. Both
//! directions are total functions: out-of-range and non-finite inputs clamp
//! to the nearest boundary instead of erroring.

use crate::config::{CalibrationConfig, CurvePoint};

/// Convert a battery terminal voltage to a state of charge in percent.
///
/// Uses the two-point linear calibration unless the configuration carries a
/// piecewise curve, in which case the bracketing segment is interpolated.
/// Result is clamped to `[0, 100]`.
pub fn voltage_to_soc(voltage: f64, calibration: &CalibrationConfig) -> f64 {
    if !voltage.is_finite() {
        return 0.0;
    }

    if let Some(curve) = &calibration.curve
        && curve.len() >= 2
    {
        let mut points = curve.clone();
        points.sort_by(|a, b| a.voltage.total_cmp(&b.voltage));
        // Outside the curve's voltage span the battery is simply empty or
        // full, even when the curve itself is not anchored at 0/100.
        if voltage < points[0].voltage {
            return 0.0;
        }
        if voltage > points[points.len() - 1].voltage {
            return 100.0;
        }
        return interpolate(&points, voltage, |p| p.voltage, |p| p.soc)
            .clamp(0.0, 100.0);
    }

    let v_min = calibration.voltage_at_0_percent;
    let v_max = calibration.voltage_at_100_percent;
    let soc = 100.0 * (voltage - v_min) / (v_max - v_min);
    soc.clamp(0.0, 100.0)
}

/// Convert a state of charge in percent back to a battery terminal voltage.
///
/// Inverse of [`voltage_to_soc`]; for a value already on the calibration
/// curve the round trip returns the original voltage within floating
/// tolerance.
pub fn soc_to_voltage(soc: f64, calibration: &CalibrationConfig) -> f64 {
    let soc = if soc.is_finite() { soc.clamp(0.0, 100.0) } else { 0.0 };

    if let Some(curve) = &calibration.curve
        && curve.len() >= 2
    {
        let mut points = curve.clone();
        points.sort_by(|a, b| a.soc.total_cmp(&b.soc));
        return interpolate(&points, soc, |p| p.soc, |p| p.voltage);
    }

    let v_min = calibration.voltage_at_0_percent;
    let v_max = calibration.voltage_at_100_percent;
    v_min + (v_max - v_min) * soc / 100.0
}

/// Piecewise-linear interpolation over points sorted by the key axis.
/// Inputs outside the curve clamp to the endpoint values.
fn interpolate<K, V>(points: &[CurvePoint], x: f64, key: K, value: V) -> f64
where
    K: Fn(&CurvePoint) -> f64,
    V: Fn(&CurvePoint) -> f64,
{
    let first = &points[0];
    let last = &points[points.len() - 1];

    if x <= key(first) {
        return value(first);
    }
    if x >= key(last) {
        return value(last);
    }

    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if x <= key(b) {
            let span = key(b) - key(a);
            if span <= f64::EPSILON {
                return value(a);
            }
            let t = (x - key(a)) / span;
            return value(a) + t * (value(b) - value(a));
        }
    }

    value(last)
}
