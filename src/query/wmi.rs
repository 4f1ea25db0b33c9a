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

//! [`QueryPort`] over the Windows Management Instrumentation service.

use std::cell::RefCell;
use std::collections::HashMap;

use ::wmi::{COMLibrary, Variant, WMIConnection};
use tracing::debug;

use super::{Query, QueryPort};
use crate::error::QueryError;

/// Runs each [`Query`] as WQL against the namespace it names.
///
/// Connections are opened on first use of a namespace and kept for the life
/// of the port. COM is initialised on the creating thread, so the port must
/// stay on that thread.
pub struct WmiQueryPort {
    com: COMLibrary,
    connections: RefCell<HashMap<String, WMIConnection>>,
}

impl WmiQueryPort {
    pub fn new() -> Result<Self, QueryError> {
        let com = COMLibrary::new().map_err(|e| QueryError::Unavailable(e.to_string()))?;
        Ok(Self {
            com,
            connections: RefCell::new(HashMap::new()),
        })
    }

    fn rows(&self, query: &Query) -> Result<Vec<Variant>, QueryError> {
        let namespace = query.namespace_or_default().to_string();
        let mut connections = self.connections.borrow_mut();
        if !connections.contains_key(&namespace) {
            let conn = WMIConnection::with_namespace_path(&namespace, self.com).map_err(|e| {
                QueryError::Connection {
                    namespace: namespace.clone(),
                    reason: e.to_string(),
                }
            })?;
            connections.insert(namespace.clone(), conn);
        }
        let conn = connections
            .get(&namespace)
            .ok_or_else(|| QueryError::Unavailable(format!("no connection to {}", namespace)))?;

        let wql = query.to_string();
        let results: Vec<HashMap<String, Variant>> =
            conn.raw_query(&wql).map_err(|e| QueryError::Query {
                query: wql.clone(),
                reason: e.to_string(),
            })?;
        debug!("wmi: {} in {} -> {} row(s)", wql, namespace, results.len());

        Ok(results
            .into_iter()
            .filter_map(|mut row| row.remove(&query.property))
            .flat_map(|v| match v {
                Variant::Array(items) => items,
                other => vec![other],
            })
            .collect())
    }
}

fn variant_to_string(v: Variant) -> Option<String> {
    match v {
        Variant::String(s) => Some(s),
        _ => None,
    }
}

fn variant_to_f64(v: &Variant) -> Option<f64> {
    match *v {
        Variant::R4(f) => Some(f as f64),
        Variant::R8(f) => Some(f),
        Variant::UI1(n) => Some(n as f64),
        Variant::UI2(n) => Some(n as f64),
        Variant::UI4(n) => Some(n as f64),
        Variant::UI8(n) => Some(n as f64),
        Variant::I1(n) => Some(n as f64),
        Variant::I2(n) => Some(n as f64),
        Variant::I4(n) => Some(n as f64),
        Variant::I8(n) => Some(n as f64),
        Variant::String(ref s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn variant_to_u32(v: &Variant) -> Option<u32> {
    match *v {
        Variant::UI1(n) => Some(n as u32),
        Variant::UI2(n) => Some(n as u32),
        Variant::UI4(n) => Some(n),
        Variant::UI8(n) => u32::try_from(n).ok(),
        Variant::I1(n) => u32::try_from(n).ok(),
        Variant::I2(n) => u32::try_from(n).ok(),
        Variant::I4(n) => u32::try_from(n).ok(),
        Variant::I8(n) => u32::try_from(n).ok(),
        // Formatted perf counters report 64-bit values as strings
        Variant::String(ref s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl QueryPort for WmiQueryPort {
    fn query_strings(&self, query: &Query) -> Result<Vec<String>, QueryError> {
        Ok(self.rows(query)?.into_iter().filter_map(variant_to_string).collect())
    }

    fn query_floats(&self, query: &Query) -> Result<Vec<f64>, QueryError> {
        Ok(self.rows(query)?.iter().filter_map(variant_to_f64).collect())
    }

    fn query_uint32(&self, query: &Query) -> Result<u32, QueryError> {
        Ok(self
            .rows(query)?
            .iter()
            .find_map(variant_to_u32)
            .unwrap_or(0))
    }
}
