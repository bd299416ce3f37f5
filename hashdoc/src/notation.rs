// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The notation checker.
//!
//! Every identifier in a pseudocode block must be a symbol of the role table or a loop index.
//! For table symbols, each occurrence is classified by how it is used and compared with the
//! usages the symbol's role permits. A constant that is updated inside the main loop is as much
//! a violation as an accumulator named `acc`.

use crate::config::StyleGuide;
use crate::document::{HashDescription, PseudocodeLine};
use crate::report::NotationViolation;
use crate::roles::Usage;
use crate::scanner::{Symbol, Token, TokenKind};
use crate::source::Location;
use crate::structure::{classify_phases, Phase};

/// An identifier occurrence and how it is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub symbol: Symbol,
    pub location: Location,
    pub usage: Usage,
}

/// Classifies every identifier on a line. `phase` decides whether a plain assignment
/// initializes or loads its target.
pub fn occurrences(line: &PseudocodeLine, phase: Option<Phase>) -> Vec<Occurrence> {
    let binds_in = line.keyword().map_or(false, |k| k.opens_loop());
    let assignment_usage = match phase {
        None | Some(Phase::Init) => Usage::Initialized,
        Some(_) => Usage::Loaded,
    };

    let mut result = vec![];
    for statement in statements(&line.scanned.tokens) {
        let split = statement.iter().position(|t| match t.kind {
            TokenKind::Assign { .. } => true,
            TokenKind::In => binds_in,
            _ => false,
        });
        let Some(split) = split else {
            result.extend(idents(statement).map(|(symbol, column)| Occurrence {
                symbol: symbol.clone(),
                location: Location::new(line.line, column),
                usage: Usage::Read,
            }));
            continue;
        };

        let (lhs, rhs) = statement.split_at(split);
        let compound = matches!(rhs[0].kind, TokenKind::Assign { compound: true });
        let rhs_bases: Vec<&str> = idents(&rhs[1..]).map(|(s, _)| s.base.as_str()).collect();
        for (symbol, column) in idents(lhs) {
            let usage = if compound || rhs_bases.contains(&symbol.base.as_str()) {
                Usage::Updated
            } else if matches!(rhs[0].kind, TokenKind::In) {
                Usage::Loaded
            } else {
                assignment_usage
            };
            result.push(Occurrence {
                symbol: symbol.clone(),
                location: Location::new(line.line, column),
                usage,
            });
        }
        result.extend(idents(&rhs[1..]).map(|(symbol, column)| Occurrence {
            symbol: symbol.clone(),
            location: Location::new(line.line, column),
            usage: Usage::Read,
        }));
    }
    result
}

fn idents(tokens: &[Token]) -> impl Iterator<Item = (&Symbol, usize)> {
    tokens.iter().filter_map(|t| match &t.kind {
        TokenKind::Ident(s) => Some((s, t.column)),
        _ => None,
    })
}

fn is_assignment(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Assign { .. })
}

/// Splits a line into statements at `;`, and at top-level commas when a piece holds more than
/// one assignment, as in `$v_1 \gets s_1, v_2 \gets s_2$`.
fn statements(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| t.kind == TokenKind::Semicolon)
        .flat_map(|piece| {
            if piece.iter().filter(|t| is_assignment(t)).count() > 1 {
                piece
                    .split(|t| t.kind == TokenKind::Comma { top_level: true })
                    .collect::<Vec<_>>()
            } else {
                vec![piece]
            }
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Checks every symbol use in the description's pseudocode against the role table.
pub fn check_notation(description: &HashDescription, guide: &StyleGuide) -> Vec<NotationViolation> {
    let mut violations = vec![];
    for block in &description.blocks {
        let phases = classify_phases(block, guide);
        for (line, phase) in block.lines.iter().zip(phases) {
            for occurrence in occurrences(line, phase) {
                if let Some(violation) = check_occurrence(&occurrence, guide) {
                    violations.push(violation);
                }
            }
        }
    }
    violations
}

fn check_occurrence(occurrence: &Occurrence, guide: &StyleGuide) -> Option<NotationViolation> {
    let base = occurrence.symbol.base.as_str();
    if guide.is_index(base) {
        return None;
    }
    match guide.role_of(base) {
        None => Some(NotationViolation {
            location: occurrence.location,
            symbol: occurrence.symbol.base.clone(),
            expected: None,
            observed: occurrence.usage,
        }),
        Some(role) if !role.permits(occurrence.usage) => Some(NotationViolation {
            location: occurrence.location,
            symbol: occurrence.symbol.to_string(),
            expected: Some(role),
            observed: occurrence.usage,
        }),
        Some(_) => None,
    }
}
