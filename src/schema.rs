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

//! Native management-information schemas known to carry CPU sensor data, and
//! the per-signal cache of which one answered.

use std::fmt;

use serde::Serialize;

use crate::query::Query;
use crate::units;

/// The unit of work for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeSignal {
    Temperature,
    FanSpeed,
    Voltage,
}

/// Where a native value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaRef {
    /// `None` reads from the store's default namespace.
    pub namespace: Option<&'static str>,
    pub class: &'static str,
    pub property: &'static str,
}

impl SchemaRef {
    pub fn query(&self) -> Query {
        let q = Query::new(self.class, self.property);
        match self.namespace {
            Some(ns) => q.namespace(ns),
            None => q,
        }
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.namespace.unwrap_or("(default)"),
            self.class,
            self.property
        )
    }
}

/// A schema plus the decoder for its raw integer encoding.
#[derive(Clone, Copy)]
pub struct NativeSchema {
    pub schema: SchemaRef,
    pub decode: fn(u32) -> f64,
}

impl fmt::Debug for NativeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSchema").field("schema", &self.schema).finish()
    }
}

pub const CIMV2: &str = "root\\cimv2";
pub const ROOT_WMI: &str = "root\\wmi";

/// Temperature sources, most specific first.
pub static TEMPERATURE_CHAIN: [NativeSchema; 4] = [
    NativeSchema {
        schema: SchemaRef {
            namespace: Some(CIMV2),
            class: "Win32_Temperature",
            property: "CurrentReading",
        },
        decode: units::kelvin_to_celsius,
    },
    NativeSchema {
        schema: SchemaRef {
            namespace: Some(CIMV2),
            class: "Win32_TemperatureProbe",
            property: "CurrentReading",
        },
        decode: units::kelvin_to_celsius,
    },
    NativeSchema {
        schema: SchemaRef {
            namespace: Some(CIMV2),
            class: "Win32_PerfFormattedData_Counters_ThermalZoneInformation",
            property: "Temperature",
        },
        decode: units::kelvin_to_celsius,
    },
    NativeSchema {
        schema: SchemaRef {
            namespace: Some(ROOT_WMI),
            class: "MSAcpi_ThermalZoneTemperature",
            property: "CurrentTemperature",
        },
        decode: units::kelvin_to_celsius,
    },
];

pub static VOLTAGE_CURRENT: NativeSchema = NativeSchema {
    schema: SchemaRef {
        namespace: Some(CIMV2),
        class: "Win32_Processor",
        property: "CurrentVoltage",
    },
    decode: units::decode_decivolts,
};

pub static VOLTAGE_CAPS: NativeSchema = NativeSchema {
    schema: SchemaRef {
        namespace: Some(CIMV2),
        class: "Win32_Processor",
        property: "VoltageCaps",
    },
    decode: units::decode_voltage_caps,
};

/// Only fan source; never cached.
pub const FAN_SCHEMA: SchemaRef = SchemaRef {
    namespace: None,
    class: "Win32_Fan",
    property: "DesiredSpeed",
};

/// Last native schema tried per signal.
///
/// Filled on the first native probe and then reused for the life of the
/// owner, even if it stops returning data.
#[derive(Debug, Default, Clone)]
pub struct SchemaCache {
    temperature: Option<&'static NativeSchema>,
    voltage: Option<&'static NativeSchema>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signal: ProbeSignal) -> Option<&'static NativeSchema> {
        match signal {
            ProbeSignal::Temperature => self.temperature,
            ProbeSignal::Voltage => self.voltage,
            ProbeSignal::FanSpeed => None,
        }
    }

    /// Record `schema` for `signal`. Fan speed has no slot and is ignored.
    pub fn set(&mut self, signal: ProbeSignal, schema: &'static NativeSchema) {
        match signal {
            ProbeSignal::Temperature => self.temperature = Some(schema),
            ProbeSignal::Voltage => self.voltage = Some(schema),
            ProbeSignal::FanSpeed => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
