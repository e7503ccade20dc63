// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A vector with (near) zero length was normalized.
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// A vertex loop has fewer than 3 non-collinear points.
    #[error("degenerate vertex loop ({vertices} vertices, no usable normal)")]
    DegenerateLoop { vertices: usize },

    /// Two planes were expected to coincide with opposite facing.
    #[error("planes are not reverse-equal: {0}")]
    GeometryMismatch(String),

    #[error("polygon boolean failed: {0}")]
    Boolean(String),
}
