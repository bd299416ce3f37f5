// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The reference checker.
//!
//! Every named function invoked in pseudocode needs exactly one definition reachable from the
//! invocation. Lookup goes from the nearest scope outwards:
//! 1. the hash description itself,
//! 2. the description immediately before it in the same section,
//! 3. the section's intro,
//! 4. global scope, i.e. the preamble and the shared building-block sections.
//!
//! Hardware intrinsics are the exception. They are defined once, at their first use, and are
//! visible from then on. Global definitions are checked too: each is defined once, before it is
//! first used, and everything its own body invokes resolves in global scope.

use crate::config::StyleGuide;
use crate::document::{Definition, Document, Invocation, SectionKind};
use crate::report::{Finding, ReferenceViolation};
use crate::scanner::Callee;
use crate::source::Location;
use std::collections::BTreeMap;
use tracing::debug;

/// Where a definition is visible from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    /// The intro of the section with this index.
    Intro(usize),
    /// A hash description, by section and description index.
    Description(usize, usize),
}

/// All definitions of a document, tagged with their scope.
pub struct DefinitionIndex<'a> {
    definitions: Vec<(Scope, &'a Definition)>,
}

impl<'a> DefinitionIndex<'a> {
    pub fn new(document: &'a Document) -> Self {
        let mut definitions: Vec<(Scope, &Definition)> =
            document.preamble.iter().map(|d| (Scope::Global, d)).collect();
        for (s, section) in document.sections.iter().enumerate() {
            let scope = match section.kind {
                SectionKind::Shared => Scope::Global,
                _ => Scope::Intro(s),
            };
            definitions.extend(section.intro.iter().map(|d| (scope, d)));
            for (i, description) in section.descriptions.iter().enumerate() {
                definitions.extend(
                    description
                        .definitions
                        .iter()
                        .map(|d| (Scope::Description(s, i), d)),
                );
            }
        }
        definitions.sort_by_key(|(_, d)| d.location);
        Self { definitions }
    }

    /// Definitions of `callee` in `scope`, in document order.
    pub fn in_scope(&self, scope: Scope, callee: &Callee) -> Vec<&'a Definition> {
        self.definitions
            .iter()
            .filter(|(s, d)| *s == scope && d.callee == *callee)
            .map(|(_, d)| *d)
            .collect()
    }

    pub fn global(&self, callee: &Callee) -> Vec<&'a Definition> {
        self.in_scope(Scope::Global, callee)
    }

    /// Definitions of `callee` in any scope, in document order.
    pub fn anywhere(&self, callee: &Callee) -> Vec<&'a Definition> {
        self.definitions
            .iter()
            .filter(|(_, d)| d.callee == *callee)
            .map(|(_, d)| *d)
            .collect()
    }

    /// Every global definition, in document order.
    fn globals(&self) -> impl Iterator<Item = &'a Definition> + '_ {
        self.definitions
            .iter()
            .filter(|(s, _)| *s == Scope::Global)
            .map(|(_, d)| *d)
    }

    /// Resolves an invocation, trying `local` scopes in order before global scope.
    pub fn resolve(
        &self,
        invocation: &Invocation,
        local: &[Scope],
        guide: &StyleGuide,
    ) -> Option<ReferenceViolation> {
        let callee = &invocation.callee;
        for scope in local {
            match self.in_scope(*scope, callee).as_slice() {
                [] => continue,
                [_] => return None,
                definitions => {
                    return Some(ReferenceViolation::AmbiguousDefinition {
                        callee: callee.clone(),
                        location: invocation.location,
                        definitions: definitions.iter().map(|d| d.location).collect(),
                    })
                }
            }
        }

        let global = self.global(callee);
        let earliest = if let Some(first) = global.first() {
            Some(*first)
        } else if guide.is_intrinsic(callee) {
            self.anywhere(callee).first().copied()
        } else {
            None
        };
        match earliest {
            None => Some(ReferenceViolation::Undefined {
                callee: callee.clone(),
                location: invocation.location,
            }),
            Some(definition) if definition.location > invocation.location => {
                Some(ReferenceViolation::UsedBeforeDefinition {
                    callee: callee.clone(),
                    location: invocation.location,
                    definition: definition.location,
                })
            }
            Some(_) => None,
        }
    }
}

/// Runs every reference check over a document.
pub fn check_references(document: &Document, guide: &StyleGuide) -> Vec<Finding> {
    let index = DefinitionIndex::new(document);
    let mut findings: Vec<Finding> = check_global(&index, document, guide)
        .into_iter()
        .map(|v| Finding::new(None, v))
        .collect();

    for (s, section) in document.sections.iter().enumerate() {
        if section.kind != SectionKind::Shared {
            let scopes = [Scope::Intro(s)];
            for definition in &section.intro {
                findings.extend(
                    check_local_definition(&index, definition, &scopes, guide)
                        .into_iter()
                        .map(|v| Finding::new(None, v)),
                );
            }
        }

        for (i, description) in section.descriptions.iter().enumerate() {
            let mut scopes = vec![Scope::Description(s, i)];
            if i > 0 {
                scopes.push(Scope::Description(s, i - 1));
            }
            scopes.push(Scope::Intro(s));

            let mut violations: Vec<ReferenceViolation> = description
                .invocations()
                .iter()
                .filter_map(|invocation| index.resolve(invocation, &scopes, guide))
                .collect();
            violations.extend(
                description
                    .definitions
                    .iter()
                    .filter_map(|d| redefinition(&index, d)),
            );
            debug!(
                "References of {}: {} violations",
                description.name,
                violations.len()
            );
            findings.extend(
                violations
                    .into_iter()
                    .map(|v| Finding::new(Some(&description.name), v)),
            );
        }
    }
    findings
}

/// Checks a section-intro definition: it must not shadow a shared block, and its body must
/// resolve.
fn check_local_definition(
    index: &DefinitionIndex<'_>,
    definition: &Definition,
    scopes: &[Scope],
    guide: &StyleGuide,
) -> Vec<ReferenceViolation> {
    redefinition(index, definition)
        .into_iter()
        .chain(
            definition
                .body
                .iter()
                .filter_map(|invocation| index.resolve(invocation, scopes, guide)),
        )
        .collect()
}

fn redefinition(
    index: &DefinitionIndex<'_>,
    definition: &Definition,
) -> Option<ReferenceViolation> {
    index
        .global(&definition.callee)
        .first()
        .map(|shared| ReferenceViolation::RedefinesSharedBlock {
            callee: definition.callee.clone(),
            location: definition.location,
            shared: shared.location,
        })
}

/// Checks global definitions: uniqueness, configured shared blocks, intrinsic uniqueness and
/// the transitive resolution of their bodies.
fn check_global(
    index: &DefinitionIndex<'_>,
    document: &Document,
    guide: &StyleGuide,
) -> Vec<ReferenceViolation> {
    let mut violations = vec![];

    let mut by_callee: BTreeMap<&Callee, Vec<&Definition>> = BTreeMap::new();
    for definition in index.globals() {
        by_callee.entry(&definition.callee).or_default().push(definition);
    }
    for (callee, definitions) in &by_callee {
        if let [first, rest @ ..] = definitions.as_slice() {
            violations.extend(rest.iter().map(|d| ReferenceViolation::DuplicateDefinition {
                callee: (*callee).clone(),
                location: d.location,
                first: first.location,
            }));
        }
    }

    for name in &guide.intrinsics {
        let callee = Callee::parse(name);
        if !index.global(&callee).is_empty() {
            continue;
        }
        if let [first, rest @ ..] = index.anywhere(&callee).as_slice() {
            violations.extend(rest.iter().map(|d| ReferenceViolation::DuplicateDefinition {
                callee: callee.clone(),
                location: d.location,
                first: first.location,
            }));
        }
    }

    for name in &guide.shared_blocks {
        let callee = Callee::parse(name);
        if index.global(&callee).is_empty() {
            let location = first_use(document, &callee).unwrap_or_else(|| Location::line(1));
            violations.push(ReferenceViolation::MissingSharedBlock { callee, location });
        }
    }

    for definition in index.globals() {
        violations.extend(
            definition
                .body
                .iter()
                .filter_map(|invocation| index.resolve(invocation, &[], guide)),
        );
    }
    violations
}

/// The first invocation of `callee` in any pseudocode block or definition body.
fn first_use(document: &Document, callee: &Callee) -> Option<Location> {
    let bodies = document
        .preamble
        .iter()
        .chain(document.sections.iter().flat_map(|s| s.intro.iter()))
        .flat_map(|d| d.body.iter().cloned());
    let pseudocode = document.descriptions().flat_map(|d| d.invocations());
    bodies
        .chain(pseudocode)
        .filter(|i| i.callee == *callee)
        .map(|i| i.location)
        .min()
}
