/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the static HMI configuration.
//!
//! Every variant is fatal at startup: the line topology and controller
//! registry are validated once when they are built, so at runtime a
//! [`ConfigError`] can only mean a caller passed an id that was never
//! configured.  The refresh cycle logs such an error and skips the entity.

use std::time::Duration;

use thiserror::Error;

use crate::topology::{ArrayKind, LineId};

/// Configuration failure raised while building or querying the line topology,
/// the controller registry or the refresh timing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The id is not one of `weline`, `nsline`, `ccline`.
    #[error("unknown line '{0}' (valid: weline, nsline, ccline)")]
    UnknownLine(String),

    /// No controller with this id is registered.
    #[error("unknown controller '{0}'")]
    UnknownController(String),

    /// A known line has no entry in the topology table.
    #[error("line '{0}' is missing from the topology table")]
    MissingLine(LineId),

    /// The same line appears twice in the topology table.
    #[error("line '{0}' is declared more than once")]
    DuplicateLine(LineId),

    /// The same controller id appears twice in the registry.
    #[error("controller '{0}' is declared more than once")]
    DuplicateController(String),

    /// The registry has no controllers at all.
    #[error("controller registry is empty")]
    EmptyRegistry,

    /// A half-open range with `start > end`.
    #[error("{owner}: {field} range [{start}, {end}) has start > end")]
    InvalidRange {
        owner: String,
        field: &'static str,
        start: usize,
        end: usize,
    },

    /// Two lines map overlapping index ranges onto the same controller array.
    #[error(
        "lines '{first}' and '{second}' overlap on {controller} {array} \
         ([{first_start}, {first_end}) vs [{second_start}, {second_end}))"
    )]
    OverlappingRanges {
        first: LineId,
        second: LineId,
        controller: String,
        array: ArrayKind,
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    /// A controller or line names a data source that is not a trio head
    /// (its own `source` is some other controller).
    #[error("'{owner}' reads through '{source_id}', which is not a source controller")]
    NotASourceController { owner: String, source_id: String },

    /// The base timer period must be non-zero and shorter than the minimum
    /// refresh interval.
    #[error(
        "timer period {tick:?} must be non-zero and shorter than the minimum refresh interval {min_interval:?}"
    )]
    InvalidTiming {
        tick: Duration,
        min_interval: Duration,
    },
}
