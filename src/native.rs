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

//! Fallback to the schemas built into the operating system.
//!
//! Each signal walks a fixed chain of schemas once, remembers the last one it
//! tried in the [`SchemaCache`], and from then on reads only that schema.

use serde_json::json;
use tracing::{debug, info};

use crate::error::or_unknown;
use crate::logger;
use crate::query::QueryPort;
use crate::schema::{
    NativeSchema, ProbeSignal, SchemaCache, FAN_SCHEMA, TEMPERATURE_CHAIN, VOLTAGE_CAPS,
    VOLTAGE_CURRENT,
};
use crate::units;

fn read_raw<Q: QueryPort>(port: &Q, native: &NativeSchema) -> u32 {
    let query = native.schema.query();
    or_unknown(port.query_uint32(&query), &query)
}

fn remember(cache: &mut SchemaCache, signal: ProbeSignal, native: &'static NativeSchema, raw: u32) {
    cache.set(signal, native);
    if raw > 0 {
        info!("{:?}: using {}", signal, native.schema);
    } else {
        debug!("{:?}: no schema answered, keeping {}", signal, native.schema);
    }
    logger::log_event(
        "schema_cached",
        json!({
            "signal": signal,
            "schema": native.schema,
            "answered": raw > 0,
        }),
    );
}

// Stops at the first nonzero reading; otherwise the last entry is kept so
// later probes retry only that one.
fn discover_temperature<Q: QueryPort>(port: &Q, cache: &mut SchemaCache) -> (&'static NativeSchema, u32) {
    let mut found = (&TEMPERATURE_CHAIN[0], 0);
    for native in TEMPERATURE_CHAIN.iter() {
        found = (native, read_raw(port, native));
        if found.1 > 0 {
            break;
        }
    }
    remember(cache, ProbeSignal::Temperature, found.0, found.1);
    found
}

fn discover_voltage<Q: QueryPort>(port: &Q, cache: &mut SchemaCache) -> (&'static NativeSchema, u32) {
    let mut native = &VOLTAGE_CURRENT;
    let mut raw = read_raw(port, native);
    // Without bit 7 the reading is a pointer to the capability bits
    if units::is_voltage_caps_marker(raw) {
        native = &VOLTAGE_CAPS;
        raw = read_raw(port, native);
    }
    remember(cache, ProbeSignal::Voltage, native, raw);
    (native, raw)
}

fn probe<Q: QueryPort>(
    port: &Q,
    cache: &mut SchemaCache,
    signal: ProbeSignal,
    discover: fn(&Q, &mut SchemaCache) -> (&'static NativeSchema, u32),
) -> f64 {
    let (native, raw) = match cache.get(signal) {
        Some(native) => (native, read_raw(port, native)),
        None => discover(port, cache),
    };
    (native.decode)(raw)
}

/// CPU temperature in °C, or `0.0`.
pub fn temperature<Q: QueryPort>(port: &Q, cache: &mut SchemaCache) -> f64 {
    probe(port, cache, ProbeSignal::Temperature, discover_temperature::<Q>)
}

/// CPU voltage in volts, or `0.0`.
pub fn voltage<Q: QueryPort>(port: &Q, cache: &mut SchemaCache) -> f64 {
    probe(port, cache, ProbeSignal::Voltage, discover_voltage::<Q>)
}

/// Always one element; `[0]` when no fan speed is known.
pub fn fan_speeds<Q: QueryPort>(port: &Q) -> Vec<u32> {
    let query = FAN_SCHEMA.query();
    vec![or_unknown(port.query_uint32(&query), &query)]
}
