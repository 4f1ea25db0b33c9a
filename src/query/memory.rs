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

//! In-memory [`QueryPort`] holding canned values per query.
//!
//! Used by the test suites and for replaying readings captured on another
//! machine. Every lookup is recorded so callers can check which schemas a
//! probe touched.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Query, QueryPort, DEFAULT_NAMESPACE};
use crate::error::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Float(f64),
    Uint(u32),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<Query, Vec<Value>>,
    faults: HashMap<Query, QueryError>,
    calls: RefCell<Vec<Query>>,
}

// Queries without a namespace land in the default one, like on a real store.
fn key(query: &Query) -> Query {
    let mut k = query.clone();
    if k.namespace.is_none() {
        k.namespace = Some(DEFAULT_NAMESPACE.to_string());
    }
    k
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: Query, values: Vec<Value>) {
        self.faults.remove(&key(&query));
        self.values.insert(key(&query), values);
    }

    pub fn set_strings<I, S>(&mut self, query: Query, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(query, values.into_iter().map(|s| Value::Str(s.into())).collect());
    }

    pub fn set_floats<I>(&mut self, query: Query, values: I)
    where
        I: IntoIterator<Item = f64>,
    {
        self.insert(query, values.into_iter().map(Value::Float).collect());
    }

    pub fn set_uint32(&mut self, query: Query, value: u32) {
        self.insert(query, vec![Value::Uint(value)]);
    }

    /// Make every lookup of `query` fail with `err` until it is re-inserted.
    pub fn fail(&mut self, query: Query, err: QueryError) {
        self.values.remove(&key(&query));
        self.faults.insert(key(&query), err);
    }

    pub fn remove(&mut self, query: &Query) {
        self.values.remove(&key(query));
        self.faults.remove(&key(query));
    }

    pub fn calls(&self) -> Vec<Query> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of recorded lookups against `namespace`.
    pub fn calls_in(&self, namespace: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|q| q.namespace_or_default().eq_ignore_ascii_case(namespace))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn lookup(&self, query: &Query) -> Result<&[Value], QueryError> {
        self.calls.borrow_mut().push(query.clone());
        let k = key(query);
        if let Some(err) = self.faults.get(&k) {
            return Err(err.clone());
        }
        Ok(self.values.get(&k).map(Vec::as_slice).unwrap_or(&[]))
    }
}

impl QueryPort for MemoryStore {
    fn query_strings(&self, query: &Query) -> Result<Vec<String>, QueryError> {
        Ok(self
            .lookup(query)?
            .iter()
            .filter_map(|v| match v {
                Value::Str(s) => Some(s.clone()),
                _ => None,
            })
            .collect())
    }

    fn query_floats(&self, query: &Query) -> Result<Vec<f64>, QueryError> {
        Ok(self
            .lookup(query)?
            .iter()
            .filter_map(|v| match v {
                Value::Float(f) => Some(*f),
                Value::Uint(u) => Some(*u as f64),
                Value::Str(_) => None,
            })
            .collect())
    }

    fn query_uint32(&self, query: &Query) -> Result<u32, QueryError> {
        Ok(self
            .lookup(query)?
            .iter()
            .find_map(|v| match v {
                Value::Uint(u) => Some(*u),
                _ => None,
            })
            .unwrap_or(0))
    }
}
