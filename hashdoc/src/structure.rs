// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The structure checker.
//!
//! Every hash description presents its main path in one pseudocode block whose lines fall into
//! six phases, in this order: initialize, main loop, tail, lane collapse, finalize, return. A
//! phase may consist of a single summarizing statement, but it must be there. In particular a
//! hash without a finalizer still says so, e.g. `\Statex \emph{No finalizer.}`.

use crate::config::StyleGuide;
use crate::document::{Document, HashDescription, PseudocodeBlock, SectionKind};
use crate::report::StructureViolation;
use crate::scanner::{normalize_prose, Keyword, ScannedLine};
use crate::source::Location;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    MainLoop,
    Tail,
    Collapse,
    Finalize,
    Return,
}

impl Phase {
    pub const CANONICAL: [Phase; 6] = [
        Phase::Init,
        Phase::MainLoop,
        Phase::Tail,
        Phase::Collapse,
        Phase::Finalize,
        Phase::Return,
    ];

    /// Position in the canonical order.
    pub fn rank(&self) -> usize {
        *self as usize
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Init => "initialize",
            Phase::MainLoop => "main loop",
            Phase::Tail => "tail",
            Phase::Collapse => "lane collapse",
            Phase::Finalize => "finalize",
            Phase::Return => "return",
        })
    }
}

/// A maximal run of consecutive lines in the same phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseRun {
    pub phase: Phase,
    pub location: Location,
}

/// Assigns a phase to every line of a block. Header lines get `None`.
pub fn classify_phases(block: &PseudocodeBlock, guide: &StyleGuide) -> Vec<Option<Phase>> {
    let mut phases = Vec::with_capacity(block.lines.len());
    let mut current: Option<Phase> = None;
    let mut depth = 0usize;
    for line in &block.lines {
        let keyword = line.keyword();
        if keyword.map_or(false, |k| k.is_header()) {
            phases.push(None);
            continue;
        }
        if keyword.map_or(false, |k| k.closes_loop()) {
            depth = depth.saturating_sub(1);
            phases.push(current);
            continue;
        }
        let cue = prose_cue(&line.scanned, guide)
            .or_else(|| callee_cue(&line.scanned, guide))
            .or_else(|| structural_cue(keyword, depth, current));
        if keyword.map_or(false, |k| k.opens_loop()) {
            depth += 1;
        }
        current = cue.or(current).or(Some(Phase::Init));
        phases.push(current);
    }
    phases
}

/// Collapses the per-line phases of a block into runs.
pub fn phase_runs(block: &PseudocodeBlock, guide: &StyleGuide) -> Vec<PhaseRun> {
    let mut runs: Vec<PhaseRun> = vec![];
    for (line, phase) in block.lines.iter().zip(classify_phases(block, guide)) {
        let Some(phase) = phase else { continue };
        if runs.last().map_or(true, |r| r.phase != phase) {
            runs.push(PhaseRun {
                phase,
                location: Location::line(line.line),
            });
        }
    }
    runs
}

/// Words that state a phase by its absence, as in "No tail" or "Identity finalizer".
const ABSENCE_WORDS: &[&str] = &["no", "without", "identity", "trivial"];

fn starts_with_keyword(prose: &str, keyword: &str) -> bool {
    let keyword = normalize_prose(keyword);
    !keyword.is_empty()
        && prose
            .strip_prefix(keyword.as_str())
            .map_or(false, |rest| rest.is_empty() || rest.starts_with(' '))
}

fn prose_cue(line: &ScannedLine, guide: &StyleGuide) -> Option<Phase> {
    let prose = line.normalized_prose();
    if prose.is_empty() {
        return None;
    }
    let stated_absent = prose
        .split_once(' ')
        .filter(|(first, _)| ABSENCE_WORDS.contains(first))
        .map(|(_, rest)| rest);
    // The longest matching keyword wins, so that "no final" beats a shorter prefix.
    Phase::CANONICAL
        .iter()
        .flat_map(|phase| guide.keywords(*phase).iter().map(move |k| (*phase, k)))
        .filter(|(_, k)| {
            starts_with_keyword(&prose, k)
                || stated_absent.map_or(false, |rest| starts_with_keyword(rest, k))
        })
        .max_by_key(|(_, k)| k.len())
        .map(|(phase, _)| phase)
}

fn callee_cue(line: &ScannedLine, guide: &StyleGuide) -> Option<Phase> {
    line.invocations().find_map(|(callee, _)| {
        let name = callee.name.to_ascii_lowercase();
        [Phase::Tail, Phase::Collapse, Phase::Finalize]
            .into_iter()
            .find(|phase| {
                guide.keywords(*phase).iter().any(|k| {
                    let k = k.to_ascii_lowercase();
                    !k.contains(' ') && k.len() >= 4 && name.contains(&k)
                })
            })
    })
}

fn structural_cue(keyword: Option<Keyword>, depth: usize, current: Option<Phase>) -> Option<Phase> {
    match keyword {
        Some(Keyword::Return) => Some(Phase::Return),
        Some(k) if k.opens_loop() && depth == 0 && matches!(current, None | Some(Phase::Init)) => {
            Some(Phase::MainLoop)
        }
        _ => None,
    }
}

/// Checks presence and order of the six phases in a single pseudocode block.
pub fn check_block(block: &PseudocodeBlock, guide: &StyleGuide) -> Vec<StructureViolation> {
    let mut violations = vec![];
    if !block.terminated {
        violations.push(StructureViolation::UnterminatedPseudocode {
            location: block.location,
        });
    }

    let runs = phase_runs(block, guide);
    let mut seen: Vec<PhaseRun> = vec![];
    for run in &runs {
        if let Some(first) = seen.iter().find(|s| s.phase == run.phase) {
            violations.push(StructureViolation::DuplicatePhase {
                phase: run.phase,
                location: run.location,
                first: first.location,
            });
            continue;
        }
        if let Some(later) = seen.iter().filter(|s| s.phase > run.phase).max_by_key(|s| s.phase) {
            violations.push(StructureViolation::MisorderedPhase {
                phase: run.phase,
                after: later.phase,
                location: run.location,
            });
        }
        seen.push(*run);
    }

    let end = block
        .lines
        .last()
        .map_or(block.location, |l| Location::line(l.line));
    for phase in Phase::CANONICAL {
        if !seen.iter().any(|s| s.phase == phase) {
            violations.push(StructureViolation::MissingPhase {
                phase,
                location: missing_location(&seen, phase, block.location, end),
            });
        }
    }
    violations
}

/// Points at the run a missing phase should have preceded, or the end of the block.
fn missing_location(seen: &[PhaseRun], phase: Phase, start: Location, end: Location) -> Location {
    if phase == Phase::Init {
        return start;
    }
    seen.iter()
        .filter(|s| s.phase > phase)
        .min_by_key(|s| s.location)
        .map_or(end, |s| s.location)
}

/// Checks one hash description: exactly one pseudocode block, with all phases in order.
pub fn check_structure(description: &HashDescription, guide: &StyleGuide) -> Vec<StructureViolation> {
    let violations = match description.blocks.as_slice() {
        [] => vec![StructureViolation::MissingPseudocode {
            location: description.location,
        }],
        [block] => check_block(block, guide),
        [first, rest @ ..] => {
            let mut violations = check_block(first, guide);
            violations.extend(rest.iter().map(|b| StructureViolation::MultiplePseudocode {
                location: b.location,
                first: first.location,
            }));
            violations
        }
    };
    debug!(
        "Structure of {}: {} violations",
        description.name,
        violations.len()
    );
    violations
}

/// Checks that sections appear in the configured order.
pub fn check_section_order(document: &Document, guide: &StyleGuide) -> Vec<StructureViolation> {
    if guide.section_order.is_empty() {
        return vec![];
    }
    let position = |title: &str| {
        guide
            .section_order
            .iter()
            .position(|t| t.trim().eq_ignore_ascii_case(title.trim()))
    };

    let mut violations = vec![];
    let mut last: Option<(usize, &str)> = None;
    for section in &document.sections {
        match position(&section.title) {
            Some(index) => {
                if let Some((previous, previous_title)) = last {
                    if index < previous {
                        violations.push(StructureViolation::MisorderedSection {
                            title: section.title.clone(),
                            after: previous_title.to_string(),
                            location: section.location,
                        });
                        continue;
                    }
                }
                last = Some((index, section.title.as_str()));
            }
            None if section.kind == SectionKind::Hashes => {
                violations.push(StructureViolation::UnlistedSection {
                    title: section.title.clone(),
                    location: section.location,
                })
            }
            None => {}
        }
    }
    violations
}
