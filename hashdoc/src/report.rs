// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Violations and the report that collects them.
//!
//! Violations are never fatal and never fixed automatically. A [Report] always holds the
//! complete set, sorted and free of duplicates, so that running the checks twice on unchanged
//! text gives identical reports.

use crate::roles::{Role, Usage};
use crate::scanner::Callee;
use crate::source::{Location, Source};
use crate::structure::Phase;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Notation,
    Structure,
    Reference,
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ViolationKind::Notation => "notation",
            ViolationKind::Structure => "structure",
            ViolationKind::Reference => "reference",
        })
    }
}

/// A symbol used against the role table. `expected` is `None` for ad-hoc names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotationViolation {
    pub location: Location,
    pub symbol: String,
    pub expected: Option<Role>,
    pub observed: Usage,
}

impl NotationViolation {
    pub fn is_ad_hoc(&self) -> bool {
        self.expected.is_none()
    }
}

impl Display for NotationViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.expected {
            None => write!(
                f,
                "ad-hoc name \"{}\" is not in the symbol table",
                self.symbol
            ),
            Some(role) => write!(
                f,
                "role mismatch: {} is a {} but is used as {}",
                self.symbol, role, self.observed
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum StructureViolation {
    MissingPhase {
        phase: Phase,
        location: Location,
    },
    DuplicatePhase {
        phase: Phase,
        location: Location,
        first: Location,
    },
    MisorderedPhase {
        phase: Phase,
        after: Phase,
        location: Location,
    },
    MissingPseudocode {
        location: Location,
    },
    MultiplePseudocode {
        location: Location,
        first: Location,
    },
    UnterminatedPseudocode {
        location: Location,
    },
    MisorderedSection {
        title: String,
        after: String,
        location: Location,
    },
    UnlistedSection {
        title: String,
        location: Location,
    },
}

impl StructureViolation {
    pub fn location(&self) -> Location {
        match self {
            StructureViolation::MissingPhase { location, .. }
            | StructureViolation::DuplicatePhase { location, .. }
            | StructureViolation::MisorderedPhase { location, .. }
            | StructureViolation::MissingPseudocode { location }
            | StructureViolation::MultiplePseudocode { location, .. }
            | StructureViolation::UnterminatedPseudocode { location }
            | StructureViolation::MisorderedSection { location, .. }
            | StructureViolation::UnlistedSection { location, .. } => *location,
        }
    }
}

impl Display for StructureViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureViolation::MissingPhase { phase, .. } => {
                write!(f, "missing phase: {phase}")
            }
            StructureViolation::DuplicatePhase { phase, first, .. } => {
                write!(f, "duplicated phase: {phase} already started at line {}", first.line)
            }
            StructureViolation::MisorderedPhase { phase, after, .. } => {
                write!(f, "out-of-order phase: {phase} appears after {after}")
            }
            StructureViolation::MissingPseudocode { .. } => {
                f.write_str("missing pseudocode block")
            }
            StructureViolation::MultiplePseudocode { first, .. } => write!(
                f,
                "more than one pseudocode block, the first starts at line {}",
                first.line
            ),
            StructureViolation::UnterminatedPseudocode { .. } => {
                f.write_str("pseudocode block is never closed")
            }
            StructureViolation::MisorderedSection { title, after, .. } => {
                write!(f, "section \"{title}\" appears after \"{after}\"")
            }
            StructureViolation::UnlistedSection { title, .. } => {
                write!(f, "section \"{title}\" is not in the section order")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum ReferenceViolation {
    Undefined {
        callee: Callee,
        location: Location,
    },
    AmbiguousDefinition {
        callee: Callee,
        location: Location,
        definitions: Vec<Location>,
    },
    UsedBeforeDefinition {
        callee: Callee,
        location: Location,
        definition: Location,
    },
    DuplicateDefinition {
        callee: Callee,
        location: Location,
        first: Location,
    },
    RedefinesSharedBlock {
        callee: Callee,
        location: Location,
        shared: Location,
    },
    MissingSharedBlock {
        callee: Callee,
        location: Location,
    },
}

impl ReferenceViolation {
    pub fn location(&self) -> Location {
        match self {
            ReferenceViolation::Undefined { location, .. }
            | ReferenceViolation::AmbiguousDefinition { location, .. }
            | ReferenceViolation::UsedBeforeDefinition { location, .. }
            | ReferenceViolation::DuplicateDefinition { location, .. }
            | ReferenceViolation::RedefinesSharedBlock { location, .. }
            | ReferenceViolation::MissingSharedBlock { location, .. } => *location,
        }
    }

    pub fn callee(&self) -> &Callee {
        match self {
            ReferenceViolation::Undefined { callee, .. }
            | ReferenceViolation::AmbiguousDefinition { callee, .. }
            | ReferenceViolation::UsedBeforeDefinition { callee, .. }
            | ReferenceViolation::DuplicateDefinition { callee, .. }
            | ReferenceViolation::RedefinesSharedBlock { callee, .. }
            | ReferenceViolation::MissingSharedBlock { callee, .. } => callee,
        }
    }
}

impl Display for ReferenceViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceViolation::Undefined { callee, .. } => write!(f, "undefined: {callee}"),
            ReferenceViolation::AmbiguousDefinition {
                callee,
                definitions,
                ..
            } => write!(
                f,
                "ambiguous: {callee} is defined at lines {}",
                definitions.iter().map(|l| l.line).join(", ")
            ),
            ReferenceViolation::UsedBeforeDefinition {
                callee, definition, ..
            } => write!(
                f,
                "{callee} is used before its definition at line {}",
                definition.line
            ),
            ReferenceViolation::DuplicateDefinition { callee, first, .. } => write!(
                f,
                "{callee} is defined more than once, first at line {}",
                first.line
            ),
            ReferenceViolation::RedefinesSharedBlock { callee, shared, .. } => write!(
                f,
                "{callee} redefines the shared building block defined at line {}",
                shared.line
            ),
            ReferenceViolation::MissingSharedBlock { callee, .. } => {
                write!(f, "shared building block {callee} is never defined")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Violation {
    Notation(NotationViolation),
    Structure(StructureViolation),
    Reference(ReferenceViolation),
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::Notation(_) => ViolationKind::Notation,
            Violation::Structure(_) => ViolationKind::Structure,
            Violation::Reference(_) => ViolationKind::Reference,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Violation::Notation(v) => v.location,
            Violation::Structure(v) => v.location(),
            Violation::Reference(v) => v.location(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Notation(v) => v.fmt(f),
            Violation::Structure(v) => v.fmt(f),
            Violation::Reference(v) => v.fmt(f),
        }
    }
}

impl From<NotationViolation> for Violation {
    fn from(v: NotationViolation) -> Self {
        Violation::Notation(v)
    }
}

impl From<StructureViolation> for Violation {
    fn from(v: StructureViolation) -> Self {
        Violation::Structure(v)
    }
}

impl From<ReferenceViolation> for Violation {
    fn from(v: ReferenceViolation) -> Self {
        Violation::Reference(v)
    }
}

/// A violation and the hash description it was found in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub description: Option<String>,
    pub violation: Violation,
}

impl Finding {
    pub fn new(description: Option<&str>, violation: impl Into<Violation>) -> Self {
        Self {
            description: description.map(str::to_string),
            violation: violation.into(),
        }
    }

    fn sort_key(&self) -> (Location, ViolationKind, String, Option<&str>) {
        (
            self.violation.location(),
            self.violation.kind(),
            self.violation.to_string(),
            self.description.as_deref(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub notation: usize,
    pub structure: usize,
    pub reference: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.notation + self.structure + self.reference
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.total() == 0 {
            return f.write_str("No violations found.");
        }
        write!(
            f,
            "{} violation(s): {} notation, {} structure, {} reference",
            self.total(),
            self.notation,
            self.structure,
            self.reference
        )
    }
}

/// The complete, ordered set of findings of a lint run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    pub fn new(findings: Vec<Finding>) -> Self {
        let findings = findings
            .into_iter()
            .sorted_by(|a, b| a.sort_key().cmp(&b.sort_key()))
            .dedup()
            .collect();
        Self { findings }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.findings.iter().map(|f| &f.violation)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations().filter(|v| v.kind() == kind).count()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            notation: self.count(ViolationKind::Notation),
            structure: self.count(ViolationKind::Structure),
            reference: self.count(ViolationKind::Reference),
        }
    }

    /// Maps every finding back to the file and line it came from.
    pub fn locate(&self, source: &Source) -> Vec<LocatedFinding> {
        self.findings
            .iter()
            .map(|finding| {
                let location = finding.violation.location();
                let (file, line) = source
                    .origin(location.line)
                    .map_or((source.name().to_string(), location.line), |o| {
                        (o.file.clone(), o.line)
                    });
                LocatedFinding {
                    file,
                    line,
                    column: location.column,
                    kind: finding.violation.kind(),
                    description: finding.description.clone(),
                    message: finding.violation.to_string(),
                }
            })
            .collect()
    }
}

/// A finding in terms of the file an editor has open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedFinding {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub kind: ViolationKind,
    pub description: Option<String>,
    pub message: String,
}

impl Display for LocatedFinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file, self.line, self.column, self.kind, self.message
        )?;
        if let Some(description) = &self.description {
            write!(f, " [{description}]")?;
        }
        Ok(())
    }
}
