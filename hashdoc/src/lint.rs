// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runs the checks over a whole document and collects a [Report].
//!
//! # Example
//! ```rust
//! # use hashdoc::config::StyleGuide;
//! # use hashdoc::lint::lint;
//! let text = r"\section{Hashes}
//! \subsection{Bad}
//! \begin{algorithmic}
//! \State $acc \gets 0$
//! \end{algorithmic}";
//! let report = lint(text, &StyleGuide::default());
//! assert!(!report.is_clean());
//! ```

use crate::config::StyleGuide;
use crate::document::Document;
use crate::notation::check_notation;
use crate::reference::check_references;
use crate::report::{Finding, Report, ViolationKind};
use crate::structure::{check_section_order, check_structure};
use tracing::info;

/// Which checks to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checks {
    pub notation: bool,
    pub structure: bool,
    pub reference: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            notation: true,
            structure: true,
            reference: true,
        }
    }
}

impl Checks {
    pub fn skip(mut self, kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::Notation => self.notation = false,
            ViolationKind::Structure => self.structure = false,
            ViolationKind::Reference => self.reference = false,
        }
        self
    }
}

/// Runs all checks.
pub fn lint(text: &str, guide: &StyleGuide) -> Report {
    lint_with(text, guide, Checks::default())
}

pub fn lint_with(text: &str, guide: &StyleGuide, checks: Checks) -> Report {
    lint_document(&Document::parse(text, guide), guide, checks)
}

pub fn lint_document(document: &Document, guide: &StyleGuide, checks: Checks) -> Report {
    let mut findings = vec![];
    for description in document.descriptions() {
        let name = Some(description.name.as_str());
        if checks.notation {
            findings.extend(
                check_notation(description, guide)
                    .into_iter()
                    .map(|v| Finding::new(name, v)),
            );
        }
        if checks.structure {
            findings.extend(
                check_structure(description, guide)
                    .into_iter()
                    .map(|v| Finding::new(name, v)),
            );
        }
    }
    if checks.structure {
        findings.extend(
            check_section_order(document, guide)
                .into_iter()
                .map(|v| Finding::new(None, v)),
        );
    }
    if checks.reference {
        findings.extend(check_references(document, guide));
    }

    let report = Report::new(findings);
    info!(
        "Checked {} hash descriptions: {}",
        document.descriptions().count(),
        report.summary()
    );
    report
}
