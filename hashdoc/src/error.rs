// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Collection of errors to be used in hashdoc.
//!
//! Errors are reserved for problems that stop a document from being read at all: unreadable
//! files, inclusion cycles and invalid style guides. Everything a check finds inside a document
//! is reported as a [crate::report::Violation] instead, so a lint run always completes.

use thiserror::Error;

pub type HashDocResult<T> = Result<T, HashDocError>;

/// Collection of errors to be used in hashdoc.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HashDocError {
    /// Invalid value was given to the function
    #[error("Invalid value was given to the function")]
    InvalidInput,

    /// The style guide is inconsistent.
    #[error("Invalid style guide: {0}")]
    InvalidConfig(String),

    /// A source file could not be read.
    #[error("Unable to read {path}: {message}")]
    Io { path: String, message: String },

    /// A file includes itself, directly or through other files.
    #[error("Inclusion cycle through {0}")]
    InputCycle(String),
}

impl From<serde_json::Error> for HashDocError {
    fn from(e: serde_json::Error) -> Self {
        HashDocError::InvalidConfig(e.to_string())
    }
}
