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

use std::fmt::Display;

use thiserror::Error;
use tracing::debug;

/// Failure raised by a [`QueryPort`](crate::query::QueryPort) backend.
///
/// "No matching instance" is not an error; backends report it as an empty
/// or zero value. These variants cover the cases where the store itself
/// could not be asked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Query backend unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to connect to namespace {namespace}: {reason}")]
    Connection { namespace: String, reason: String },
    #[error("Query failed ({query}): {reason}")]
    Query { query: String, reason: String },
    #[error("Cannot convert {property}: {reason}")]
    Conversion { property: String, reason: String },
}

/// Collapse a failed lookup into the "no data" value, leaving a trace of it.
pub(crate) fn or_unknown<T: Default>(result: Result<T, QueryError>, context: impl Display) -> T {
    result.unwrap_or_else(|e| {
        debug!("{}: {}; treating as no data", context, e);
        T::default()
    })
}
