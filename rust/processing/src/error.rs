// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the import pipeline.
//!
//! Data-quality problems never surface here; they are recorded as
//! diagnostics and the offending record is skipped.

use thiserror::Error;

/// Result type for import operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input document could not be decoded.
    #[error("invalid import document: {0}")]
    Document(String),

    #[error(transparent)]
    Geometry(#[from] bem_lite_geometry::Error),

    #[error(transparent)]
    Model(#[from] bem_lite_model::Error),
}
