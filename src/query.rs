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

//! The query capability the probes run on: filtered property lookups against
//! a hierarchical management-information store (WMI on Windows).

use std::fmt;

use crate::error::QueryError;

pub mod memory;
#[cfg(windows)]
pub mod wmi;

pub use memory::MemoryStore;
#[cfg(windows)]
pub use self::wmi::WmiQueryPort;

/// Namespace used when a [`Query`] does not name one.
pub const DEFAULT_NAMESPACE: &str = "root\\cimv2";

/// A single property lookup: `SELECT property FROM class [WHERE filter]`
/// evaluated in `namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub namespace: Option<String>,
    pub class: String,
    pub property: String,
    /// Predicate without the leading `WHERE`.
    pub filter: Option<String>,
}

impl Query {
    pub fn new(class: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            namespace: None,
            class: class.into(),
            property: property.into(),
            filter: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.property, self.class)?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }
        Ok(())
    }
}

/// Render `value` as a double-quoted WQL string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Typed property lookups against a management-information store.
///
/// An absent namespace, class or instance is reported as an empty/zero value,
/// not an error. Errors are reserved for a store that could not be asked.
#[cfg_attr(test, mockall::automock)]
pub trait QueryPort {
    /// First matching string, or empty.
    fn query_string(&self, query: &Query) -> Result<String, QueryError> {
        Ok(self.query_strings(query)?.into_iter().next().unwrap_or_default())
    }

    fn query_strings(&self, query: &Query) -> Result<Vec<String>, QueryError>;

    /// First matching float, or `0.0`.
    fn query_float(&self, query: &Query) -> Result<f64, QueryError> {
        Ok(self.query_floats(query)?.into_iter().next().unwrap_or(0.0))
    }

    fn query_floats(&self, query: &Query) -> Result<Vec<f64>, QueryError>;

    /// First matching unsigned 32-bit value, or `0`.
    fn query_uint32(&self, query: &Query) -> Result<u32, QueryError>;
}

impl<Q: QueryPort + ?Sized> QueryPort for &Q {
    fn query_string(&self, query: &Query) -> Result<String, QueryError> {
        (**self).query_string(query)
    }

    fn query_strings(&self, query: &Query) -> Result<Vec<String>, QueryError> {
        (**self).query_strings(query)
    }

    fn query_float(&self, query: &Query) -> Result<f64, QueryError> {
        (**self).query_float(query)
    }

    fn query_floats(&self, query: &Query) -> Result<Vec<f64>, QueryError> {
        (**self).query_floats(query)
    }

    fn query_uint32(&self, query: &Query) -> Result<u32, QueryError> {
        (**self).query_uint32(query)
    }
}

/// Port for hosts without a management-information store. Every query fails
/// with [`QueryError::Unavailable`], so every probe reads as unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl Unsupported {
    fn fail<T>(query: &Query) -> Result<T, QueryError> {
        Err(QueryError::Unavailable(format!(
            "no management-information store on this platform ({})",
            query
        )))
    }
}

impl QueryPort for Unsupported {
    fn query_strings(&self, query: &Query) -> Result<Vec<String>, QueryError> {
        Self::fail(query)
    }

    fn query_floats(&self, query: &Query) -> Result<Vec<f64>, QueryError> {
        Self::fail(query)
    }

    fn query_uint32(&self, query: &Query) -> Result<u32, QueryError> {
        Self::fail(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_display_without_filter() {
        let q = Query::new("Win32_Fan", "DesiredSpeed");
        assert_eq!(q.to_string(), "SELECT DesiredSpeed FROM Win32_Fan");
        assert_eq!(q.namespace_or_default(), "root\\cimv2");
    }

    #[test]
    fn test_query_display_with_filter() {
        let q = Query::new("Hardware", "Identifier")
            .namespace("root\\OpenHardwareMonitor")
            .filter("HardwareType=\"CPU\"");
        assert_eq!(
            q.to_string(),
            "SELECT Identifier FROM Hardware WHERE HardwareType=\"CPU\""
        );
        assert_eq!(q.namespace_or_default(), "root\\OpenHardwareMonitor");
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("/intelcpu/0"), "\"/intelcpu/0\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("c:\\x"), "\"c:\\\\x\"");
    }

    struct Fixed;

    impl QueryPort for Fixed {
        fn query_strings(&self, _q: &Query) -> Result<Vec<String>, QueryError> {
            Ok(vec!["first".to_string(), "second".to_string()])
        }

        fn query_floats(&self, _q: &Query) -> Result<Vec<f64>, QueryError> {
            Ok(Vec::new())
        }

        fn query_uint32(&self, _q: &Query) -> Result<u32, QueryError> {
            Ok(0)
        }
    }

    #[test]
    fn test_default_methods_take_first() {
        let q = Query::new("Hardware", "Identifier");
        assert_eq!(Fixed.query_string(&q).unwrap(), "first");
        assert_eq!(Fixed.query_float(&q).unwrap(), 0.0);

        fn first_of<P: QueryPort>(port: P, q: &Query) -> String {
            port.query_string(q).unwrap()
        }
        assert_eq!(first_of(&Fixed, &q), "first");
    }

    #[test]
    fn test_unsupported_fails_every_query() {
        let q = Query::new("Win32_Processor", "CurrentVoltage");
        assert!(matches!(Unsupported.query_uint32(&q), Err(QueryError::Unavailable(_))));
        assert!(matches!(Unsupported.query_string(&q), Err(QueryError::Unavailable(_))));
        assert!(matches!(Unsupported.query_floats(&q), Err(QueryError::Unavailable(_))));
    }
}
