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

//! OpenHardwareMonitor-style provider: an optional, separately running
//! monitor that publishes `Hardware` and `Sensor` classes in its own
//! namespace.
//!
//! Nothing here is cached. The provider can start or stop at any time, so
//! its presence is checked on every probe.

use crate::error::or_unknown;
use crate::query::{quote, Query, QueryPort};
use crate::units;

pub const OHM_NAMESPACE: &str = "root\\OpenHardwareMonitor";
/// LibreHardwareMonitor publishes the same classes under its own namespace.
pub const LHM_NAMESPACE: &str = "root\\LibreHardwareMonitor";

const HARDWARE_CLASS: &str = "Hardware";
const SENSOR_CLASS: &str = "Sensor";
const IDENTIFIER_PROPERTY: &str = "Identifier";
const VALUE_PROPERTY: &str = "Value";
const CPU_FILTER: &str = "HardwareType=\"CPU\"";

const TEMPERATURE: &str = "Temperature";
const FAN: &str = "Fan";
const VOLTAGE: &str = "Voltage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareMonitor {
    namespace: String,
}

impl Default for HardwareMonitor {
    fn default() -> Self {
        Self::new(OHM_NAMESPACE)
    }
}

impl HardwareMonitor {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn sensor_filter(parent: &str, sensor_type: &str) -> String {
        format!("Parent={} AND SensorType={}", quote(parent), quote(sensor_type))
    }

    /// Identifier of the first CPU hardware node, or `None` when the monitor
    /// is not running or not installed.
    pub fn cpu_identifier<Q: QueryPort>(&self, port: &Q) -> Option<String> {
        let query = Query::new(HARDWARE_CLASS, IDENTIFIER_PROPERTY)
            .namespace(self.namespace.as_str())
            .filter(CPU_FILTER);
        let id = or_unknown(port.query_string(&query), &query);
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    fn child_values<Q: QueryPort>(&self, port: &Q, parent: &str, sensor_type: &str) -> Vec<f64> {
        let query = Query::new(SENSOR_CLASS, VALUE_PROPERTY)
            .namespace(self.namespace.as_str())
            .filter(Self::sensor_filter(parent, sensor_type));
        or_unknown(port.query_floats(&query), &query)
    }

    /// Mean of the CPU's temperature sensors in °C.
    ///
    /// `None` when the monitor is absent; `Some(0.0)` when it is present but
    /// reports no temperature sensors.
    pub fn temperature<Q: QueryPort>(&self, port: &Q) -> Option<f64> {
        let id = self.cpu_identifier(port)?;
        Some(units::mean(&self.child_values(port, &id, TEMPERATURE)))
    }

    /// One RPM per CPU fan sensor. An empty vector means the monitor is
    /// present but reports no fans.
    pub fn fan_speeds<Q: QueryPort>(&self, port: &Q) -> Option<Vec<u32>> {
        let id = self.cpu_identifier(port)?;
        Some(
            self.child_values(port, &id, FAN)
                .into_iter()
                .map(units::rpm_from_float)
                .collect(),
        )
    }

    /// CPU voltage in volts.
    ///
    /// Unlike temperature and fans this lists hardware nodes carrying voltage
    /// sensors directly, preferring one whose identifier mentions the CPU.
    pub fn voltage<Q: QueryPort>(&self, port: &Q) -> Option<f64> {
        let query = Query::new(HARDWARE_CLASS, IDENTIFIER_PROPERTY)
            .namespace(self.namespace.as_str())
            .filter(format!("SensorType={}", quote(VOLTAGE)));
        let ids = or_unknown(port.query_strings(&query), &query);
        let id = select_voltage_identifier(&ids)?;

        let query = Query::new(SENSOR_CLASS, VALUE_PROPERTY)
            .namespace(self.namespace.as_str())
            .filter(Self::sensor_filter(id, VOLTAGE));
        Some(or_unknown(port.query_float(&query), &query))
    }
}

/// First identifier containing "cpu" (any case), else the first one.
pub fn select_voltage_identifier(ids: &[String]) -> Option<&str> {
    ids.iter()
        .find(|id| id.to_lowercase().contains("cpu"))
        .or_else(|| ids.first())
        .map(String::as_str)
}
