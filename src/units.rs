/*
 * This file is part of Sensorprobe.
 *
 * Copyright (C) 2025 Sensorprobe contributors
 *
 * Sensorprobe is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorprobe is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorprobe. If not, see <https://www.gnu.org/licenses/>.
 */

//! Raw sensor encodings to physical units.
//!
//! Every decoder returns `0.0` (unknown) instead of an implausible value.

/// Raw readings above this are deciKelvin (273.2 K).
pub const DECIKELVIN_THRESHOLD: u32 = 2732;
/// Raw readings at or below this are treated as noise (~1 °C in Kelvin).
pub const KELVIN_FLOOR: u32 = 274;

/// Bit 7 of `CurrentVoltage`: bits 0-6 hold the voltage in decivolts.
pub const VOLTAGE_DECIVOLT_FLAG: u32 = 0x80;
pub const VOLTAGE_DECIVOLT_MASK: u32 = 0x7F;

const VOLTAGE_CAPS: [(u32, f64); 3] = [(0x1, 5.0), (0x2, 3.3), (0x4, 2.9)];

/// Convert a Kelvin-family reading to Celsius.
///
/// Values above 2732 are deciKelvin, values in (274, 2732] whole Kelvin.
/// Anything else, or any result at or below 0 °C, reads as unknown.
pub fn kelvin_to_celsius(raw: u32) -> f64 {
    let celsius = if raw > DECIKELVIN_THRESHOLD {
        raw as f64 / 10.0 - 273.15
    } else if raw > KELVIN_FLOOR {
        raw as f64 - 273.0
    } else {
        0.0
    };
    if celsius <= 0.0 {
        0.0
    } else {
        celsius
    }
}

/// Decode a `Win32_Processor.CurrentVoltage` value as decivolts in bits 0-6.
pub fn decode_decivolts(raw: u32) -> f64 {
    if raw == 0 {
        return 0.0;
    }
    (raw & VOLTAGE_DECIVOLT_MASK) as f64 / 10.0
}

/// Decode a `Win32_Processor.VoltageCaps` bit mask.
///
/// Lowest set bit wins: bit 0 is 5 V, bit 1 is 3.3 V, bit 2 is 2.9 V.
pub fn decode_voltage_caps(raw: u32) -> f64 {
    VOLTAGE_CAPS
        .iter()
        .find(|(bit, _)| raw & bit != 0)
        .map(|(_, volts)| *volts)
        .unwrap_or(0.0)
}

/// A `CurrentVoltage` value that is really a pointer to `VoltageCaps`.
pub fn is_voltage_caps_marker(raw: u32) -> bool {
    raw > 0 && raw & VOLTAGE_DECIVOLT_FLAG == 0
}

/// Fan speed reported as float, truncated toward zero.
pub fn rpm_from_float(value: f64) -> u32 {
    // `as` saturates: NaN and negatives become 0
    value as u32
}

/// Arithmetic mean, or `0.0` for no values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
