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

//! Sensorprobe - CPU temperature, fan speed and voltage probing
//!
//! Reads an OpenHardwareMonitor-compatible provider when one is running and
//! falls back through the native WMI schemas found on different Windows and
//! hardware generations, normalising their raw encodings to °C, RPM and volts.

pub mod error;
pub mod query;
pub mod units;
pub mod schema;
pub mod provider;
pub mod native;
pub mod sensors;
pub mod config;
pub mod logger;

#[cfg(test)]
pub mod test_utils;

pub use error::QueryError;
pub use query::{Query, QueryPort};
pub use schema::{ProbeSignal, SchemaRef};
pub use sensors::{CpuSensors, SensorReadings};
