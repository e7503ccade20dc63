// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Warnings and errors collected during an import.
//!
//! Every entry is also emitted through `tracing` as it is recorded.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// One data-quality finding, tied to the record that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Id of the offending input record, if it has one.
    pub record_id: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.record_id {
            Some(id) => write!(f, "{level} [{id}]: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Ordered diagnostics sink.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, record_id: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(record = record_id.unwrap_or("-"), "{message}");
        self.push(Severity::Warning, record_id, message);
    }

    pub fn error(&mut self, record_id: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(record = record_id.unwrap_or("-"), "{message}");
        self.push(Severity::Error, record_id, message);
    }

    fn push(&mut self, severity: Severity, record_id: Option<&str>, message: String) {
        self.entries.push(Diagnostic {
            severity,
            record_id: record_id.map(str::to_string),
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Diagnostics recorded against one input record.
    pub fn for_record<'a>(&'a self, record_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries
            .iter()
            .filter(move |d| d.record_id.as_deref() == Some(record_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
