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

#[cfg(test)]
pub mod test_utils {
    use crate::provider::OHM_NAMESPACE;
    use crate::query::{MemoryStore, Query};

    /// Query for the provider's CPU hardware node
    pub fn ohm_cpu_query() -> Query {
        Query::new("Hardware", "Identifier")
            .namespace(OHM_NAMESPACE)
            .filter("HardwareType=\"CPU\"")
    }

    /// Query for a provider sensor under `parent`
    pub fn ohm_sensor_query(parent: &str, sensor_type: &str) -> Query {
        Query::new("Sensor", "Value")
            .namespace(OHM_NAMESPACE)
            .filter(format!("Parent=\"{}\" AND SensorType=\"{}\"", parent, sensor_type))
    }

    /// Store with a running monitor reporting one CPU with two cores and two fans
    pub fn create_mock_ohm_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set_strings(ohm_cpu_query(), ["/intelcpu/0"]);
        store.set_floats(ohm_sensor_query("/intelcpu/0", "Temperature"), [47.0, 49.0]);
        store.set_floats(ohm_sensor_query("/intelcpu/0", "Fan"), [1200.0, 980.5]);
        store.set_strings(
            Query::new("Hardware", "Identifier")
                .namespace(OHM_NAMESPACE)
                .filter("SensorType=\"Voltage\""),
            ["/lpc/nct6775", "/intelcpu/0"],
        );
        store.set_floats(ohm_sensor_query("/intelcpu/0", "Voltage"), [1.104]);
        store
    }

    /// Store with only native schemas: ACPI thermal zone, decivolt voltage and one fan
    pub fn create_mock_native_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set_uint32(
            Query::new("MSAcpi_ThermalZoneTemperature", "CurrentTemperature").namespace("root\\wmi"),
            3132,
        );
        store.set_uint32(
            Query::new("Win32_Processor", "CurrentVoltage").namespace("root\\cimv2"),
            0x80 | 11,
        );
        store.set_uint32(Query::new("Win32_Fan", "DesiredSpeed"), 1450);
        store
    }

    /// Asserts that two floating point numbers are approximately equal
    pub fn assert_approx_eq(a: f64, b: f64, tolerance: f64) {
        assert!(
            (a - b).abs() < tolerance,
            "Values {} and {} are not approximately equal (tolerance: {})",
            a, b, tolerance
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use crate::query::QueryPort;
    use crate::sensors::CpuSensors;

    #[test]
    fn test_mock_ohm_store() {
        let store = create_mock_ohm_store();
        assert_eq!(store.query_string(&ohm_cpu_query()).unwrap(), "/intelcpu/0");
        let mut sensors = CpuSensors::new(&store);
        assert_eq!(sensors.probe_temperature(), 48.0);
        assert_eq!(sensors.probe_fan_speeds(), vec![1200, 980]);
        assert_eq!(sensors.probe_voltage(), 1.104);
        assert_eq!(store.calls_in("root\\cimv2"), 0);
    }

    #[test]
    fn test_mock_native_store() {
        let store = create_mock_native_store();
        let mut sensors = CpuSensors::new(&store);
        assert_approx_eq(sensors.probe_temperature(), 40.05, 1e-9);
        assert_eq!(sensors.probe_fan_speeds(), vec![1450]);
        assert_approx_eq(sensors.probe_voltage(), 1.1, 1e-9);
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.001, 0.01);
        assert_approx_eq(25.5, 25.49, 0.1);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.01);
    }
}
