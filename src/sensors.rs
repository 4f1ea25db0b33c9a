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

//! CPU temperature, fan speed and voltage probes.

use serde::Serialize;

use crate::config::ProbeConfig;
use crate::native;
use crate::provider::HardwareMonitor;
use crate::query::QueryPort;
use crate::schema::{ProbeSignal, SchemaCache, SchemaRef};

/// One reading of every signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReadings {
    /// °C, `0.0` when unknown.
    pub cpu_temperature: f64,
    /// RPM per fan. Empty when the hardware monitor reports no fans,
    /// `[0]` when no source knows.
    pub fan_speeds: Vec<u32>,
    /// Volts, `0.0` when unknown.
    pub cpu_voltage: f64,
}

/// Stateful probe over a [`QueryPort`].
///
/// Each probe asks the third-party hardware monitor first and falls back to
/// native schemas. The native schema that answers is remembered per signal,
/// so only the first native probe pays for the search.
///
/// Probes take `&mut self`: one owner, one polling thread. Failures never
/// surface; they read as `0.0` / `[0]` and are traced at debug level.
pub struct CpuSensors<Q: QueryPort> {
    port: Q,
    provider: Option<HardwareMonitor>,
    cache: SchemaCache,
}

impl<Q: QueryPort> CpuSensors<Q> {
    pub fn new(port: Q) -> Self {
        Self {
            port,
            provider: Some(HardwareMonitor::default()),
            cache: SchemaCache::new(),
        }
    }

    pub fn with_config(port: Q, cfg: &ProbeConfig) -> Self {
        Self {
            port,
            provider: cfg
                .use_provider
                .then(|| HardwareMonitor::new(cfg.provider_namespace.as_str())),
            cache: SchemaCache::new(),
        }
    }

    /// CPU temperature in °C.
    pub fn probe_temperature(&mut self) -> f64 {
        if let Some(celsius) = self.provider.as_ref().and_then(|p| p.temperature(&self.port)) {
            return celsius;
        }
        native::temperature(&self.port, &mut self.cache)
    }

    /// CPU fan speeds in RPM.
    pub fn probe_fan_speeds(&mut self) -> Vec<u32> {
        if let Some(rpms) = self.provider.as_ref().and_then(|p| p.fan_speeds(&self.port)) {
            return rpms;
        }
        native::fan_speeds(&self.port)
    }

    /// CPU core voltage in volts.
    pub fn probe_voltage(&mut self) -> f64 {
        if let Some(volts) = self.provider.as_ref().and_then(|p| p.voltage(&self.port)) {
            return volts;
        }
        native::voltage(&self.port, &mut self.cache)
    }

    pub fn probe_all(&mut self) -> SensorReadings {
        SensorReadings {
            cpu_temperature: self.probe_temperature(),
            fan_speeds: self.probe_fan_speeds(),
            cpu_voltage: self.probe_voltage(),
        }
    }

    /// Native schema currently cached for `signal`.
    pub fn cached_schema(&self, signal: ProbeSignal) -> Option<SchemaRef> {
        self.cache.get(signal).map(|n| n.schema)
    }

    /// Forget cached schemas so the next native probe searches again.
    pub fn reset_schema_cache(&mut self) {
        self.cache.clear();
    }

    pub fn provider(&self) -> Option<&HardwareMonitor> {
        self.provider.as_ref()
    }

    pub fn port(&self) -> &Q {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut Q {
        &mut self.port
    }

    pub fn into_inner(self) -> Q {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::query::{MockQueryPort, Query};

    fn is_cpu_lookup(q: &Query) -> bool {
        q.class == "Hardware" && q.filter.as_deref() == Some("HardwareType=\"CPU\"")
    }

    fn provider_absent(mock: &mut MockQueryPort) {
        mock.expect_query_string()
            .withf(|q| is_cpu_lookup(q))
            .returning(|_| Ok(String::new()));
        mock.expect_query_strings().returning(|_| Ok(Vec::new()));
    }

    #[test]
    fn test_provider_temperature_skips_native_chain() {
        let mut mock = MockQueryPort::new();
        mock.expect_query_string()
            .withf(|q| is_cpu_lookup(q))
            .times(1)
            .returning(|_| Ok("/intelcpu/0".to_string()));
        mock.expect_query_floats()
            .withf(|q| {
                q.class == "Sensor"
                    && q.filter.as_deref() == Some("Parent=\"/intelcpu/0\" AND SensorType=\"Temperature\"")
            })
            .times(1)
            .returning(|_| Ok(vec![50.0, 52.0]));
        mock.expect_query_uint32().times(0);

        let mut sensors = CpuSensors::new(mock);
        assert_eq!(sensors.probe_temperature(), 51.0);
        assert!(sensors.cached_schema(ProbeSignal::Temperature).is_none());
    }

    #[test]
    fn test_provider_checked_on_every_call() {
        let mut mock = MockQueryPort::new();
        mock.expect_query_string()
            .withf(|q| is_cpu_lookup(q))
            .times(3)
            .returning(|_| Ok("/amdcpu/0".to_string()));
        mock.expect_query_floats().times(3).returning(|_| Ok(vec![1200.0, 980.5]));
        mock.expect_query_uint32().times(0);

        let mut sensors = CpuSensors::new(mock);
        for _ in 0..3 {
            assert_eq!(sensors.probe_fan_speeds(), vec![1200, 980]);
        }
    }

    #[test]
    fn test_native_schema_reused_after_discovery() {
        let mut mock = MockQueryPort::new();
        provider_absent(&mut mock);
        mock.expect_query_uint32()
            .withf(|q| q.class == "Win32_Temperature")
            .times(1)
            .returning(|_| Ok(0));
        mock.expect_query_uint32()
            .withf(|q| q.class == "Win32_TemperatureProbe")
            .times(1)
            .returning(|_| Ok(0));
        mock.expect_query_uint32()
            .withf(|q| q.class == "Win32_PerfFormattedData_Counters_ThermalZoneInformation")
            .times(2)
            .returning(|_| Ok(318));
        mock.expect_query_uint32()
            .withf(|q| q.class == "MSAcpi_ThermalZoneTemperature")
            .times(0);

        let mut sensors = CpuSensors::new(mock);
        assert_eq!(sensors.probe_temperature(), 45.0);
        assert_eq!(sensors.probe_temperature(), 45.0);
        assert_eq!(
            sensors.cached_schema(ProbeSignal::Temperature).map(|s| s.property),
            Some("Temperature")
        );
    }

    #[test]
    fn test_provider_voltage_identifier_selection() {
        let mut mock = MockQueryPort::new();
        mock.expect_query_strings()
            .withf(|q| q.class == "Hardware" && q.filter.as_deref() == Some("SensorType=\"Voltage\""))
            .times(1)
            .returning(|_| Ok(vec!["gpu0".to_string(), "cpu-core-1".to_string(), "aux".to_string()]));
        mock.expect_query_float()
            .withf(|q| q.filter.as_deref() == Some("Parent=\"cpu-core-1\" AND SensorType=\"Voltage\""))
            .times(1)
            .returning(|_| Ok(1.25));
        mock.expect_query_uint32().times(0);

        let mut sensors = CpuSensors::new(mock);
        assert_eq!(sensors.probe_voltage(), 1.25);
    }

    #[test]
    fn test_native_voltage_when_no_voltage_nodes() {
        let mut mock = MockQueryPort::new();
        provider_absent(&mut mock);
        mock.expect_query_uint32()
            .withf(|q| q.property == "CurrentVoltage")
            .times(1)
            .returning(|_| Ok(0x8C));

        let mut sensors = CpuSensors::new(mock);
        assert_eq!(sensors.probe_voltage(), 1.2);
    }

    #[test]
    fn test_provider_fault_falls_back_to_native() {
        let mut mock = MockQueryPort::new();
        mock.expect_query_string()
            .returning(|q| Err(QueryError::Connection {
                namespace: q.namespace_or_default().to_string(),
                reason: "invalid namespace".to_string(),
            }));
        mock.expect_query_uint32()
            .withf(|q| q.class == "Win32_Fan")
            .times(1)
            .returning(|_| Ok(1750));

        let mut sensors = CpuSensors::new(mock);
        assert_eq!(sensors.probe_fan_speeds(), vec![1750]);
    }

    #[test]
    fn test_provider_disabled_by_config() {
        let mut mock = MockQueryPort::new();
        mock.expect_query_string().times(0);
        mock.expect_query_strings().times(0);
        mock.expect_query_uint32().returning(|_| Ok(0));

        let cfg = ProbeConfig { use_provider: false, ..ProbeConfig::default() };
        let mut sensors = CpuSensors::with_config(mock, &cfg);
        assert!(sensors.provider().is_none());
        assert_eq!(
            sensors.probe_all(),
            SensorReadings { cpu_temperature: 0.0, fan_speeds: vec![0], cpu_voltage: 0.0 }
        );
    }

    #[test]
    fn test_configured_provider_namespace() {
        let mut mock = MockQueryPort::new();
        mock.expect_query_string()
            .withf(|q| q.namespace.as_deref() == Some("root\\LibreHardwareMonitor"))
            .times(1)
            .returning(|_| Ok("/amdcpu/0".to_string()));
        mock.expect_query_floats().returning(|_| Ok(vec![61.5]));

        let cfg = ProbeConfig {
            provider_namespace: "root\\LibreHardwareMonitor".to_string(),
            ..ProbeConfig::default()
        };
        let mut sensors = CpuSensors::with_config(mock, &cfg);
        assert_eq!(sensors.probe_temperature(), 61.5);
    }

    #[test]
    fn test_reset_schema_cache_searches_again() {
        let mut mock = MockQueryPort::new();
        provider_absent(&mut mock);
        mock.expect_query_uint32()
            .withf(|q| q.class == "Win32_Temperature")
            .times(2)
            .returning(|_| Ok(3100));

        let mut sensors = CpuSensors::new(mock);
        sensors.probe_temperature();
        assert!(sensors.cached_schema(ProbeSignal::Temperature).is_some());
        sensors.reset_schema_cache();
        assert!(sensors.cached_schema(ProbeSignal::Temperature).is_none());
        sensors.probe_temperature();
    }
}
