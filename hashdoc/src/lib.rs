// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0
#![warn(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    rust_2021_compatibility
)]

//! Checks hash descriptions in a LaTeX survey of non-cryptographic hash functions against the
//! survey's notation style guide.
//!
//! Three checks run over static text. The notation checker compares symbol usage with the role
//! table, the structure checker verifies the six canonical phases of each pseudocode block, and
//! the reference checker resolves every invoked function to a definition. All findings are
//! collected into one [report::Report]; none of them stop the run.

#[cfg(test)]
#[path = "tests/test_helpers.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
pub mod scanner_tests;

#[cfg(test)]
#[path = "tests/document_tests.rs"]
pub mod document_tests;

#[cfg(test)]
#[path = "tests/notation_tests.rs"]
pub mod notation_tests;

#[cfg(test)]
#[path = "tests/structure_tests.rs"]
pub mod structure_tests;

#[cfg(test)]
#[path = "tests/reference_tests.rs"]
pub mod reference_tests;

#[cfg(test)]
#[path = "tests/config_tests.rs"]
pub mod config_tests;

#[cfg(test)]
#[path = "tests/lint_tests.rs"]
pub mod lint_tests;

pub mod config;
pub mod document;
pub mod error;
pub mod roles;
pub mod scanner;
pub mod source;

// Checks
pub mod notation;
pub mod reference;
pub mod structure;

pub mod lint;
pub mod outline;
pub mod report;
