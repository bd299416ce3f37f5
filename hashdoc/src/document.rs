// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The document model: preamble, sections and hash descriptions.
//!
//! Parsing never fails. Malformed input, such as an `algorithmic` environment that is never
//! closed, is recorded in the model and reported later by the structure checker.

use crate::config::StyleGuide;
use crate::roles::Role;
use crate::scanner::{normalize_name, scan_line, strip_commands, Callee, Keyword, ScannedLine};
use crate::source::{strip_comment, Location};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::debug;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(section|subsection)\*?\s*(?:\[[^\]]*\])?\s*\{").expect("valid regex")
});
static BEGIN_ALGORITHMIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\s*\{algorithmic\}").expect("valid regex"));
static END_ALGORITHMIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\end\s*\{algorithmic\}").expect("valid regex"));
static MACRO_DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(?:(?:new|renew|provide)command|DeclareMathOperator)\*?\s*\{?\s*\\([A-Za-z]+)\s*\}?|\\def\s*\\([A-Za-z]+)",
    )
    .expect("valid regex")
});
static ROUTINE_PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\paragraph\*?\s*\{\s*\\textsc\s*\{([^}]*)\}\s*\}").expect("valid regex")
});
static FINALIZER_PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\paragraph\*?\s*\{\s*[Ff]inali[sz]er\s*\}").expect("valid regex"));
static ANY_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:section|subsection|subsubsection|paragraph)\b").expect("valid regex")
});

/// A use of a named function.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub callee: Callee,
    pub location: Location,
}

/// A definition of a named function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    pub callee: Callee,
    pub location: Location,
    /// Functions invoked by the definition itself.
    pub body: Vec<Invocation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudocodeLine {
    pub line: usize,
    pub scanned: ScannedLine,
}

impl PseudocodeLine {
    pub fn keyword(&self) -> Option<Keyword> {
        self.scanned.keyword
    }

    pub fn invocations(&self) -> impl Iterator<Item = Invocation> + '_ {
        self.scanned
            .invocations()
            .map(move |(callee, column)| Invocation {
                callee: callee.clone(),
                location: Location::new(self.line, column),
            })
    }
}

/// The contents of one `algorithmic` environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudocodeBlock {
    /// Location of `\begin{algorithmic}`.
    pub location: Location,
    /// Non-empty lines between begin and end.
    pub lines: Vec<PseudocodeLine>,
    pub terminated: bool,
}

impl PseudocodeBlock {
    /// A definition block starts with `\Function` or `\Procedure` and defines routines. It
    /// presents the hash only when it holds the description's main routine.
    pub fn is_definition_block(&self) -> bool {
        self.lines
            .iter()
            .find_map(|l| l.keyword())
            .map_or(false, |k| k.opens_routine())
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.lines.iter().flat_map(|l| l.invocations()).collect()
    }
}

/// The atomic content unit: one hash or hash variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashDescription {
    pub name: String,
    pub location: Location,
    /// Last line belonging to the description.
    pub end_line: usize,
    /// Pseudocode blocks. A description without a plain block is presented by its main
    /// routine instead, see [HashDescription::parse].
    pub blocks: Vec<PseudocodeBlock>,
    /// Local definitions: macros, `\Function` blocks and small-caps paragraphs.
    pub definitions: Vec<Definition>,
    /// Text of the `\paragraph{Finalizer}` paragraph.
    pub finalizer: Option<String>,
}

impl HashDescription {
    /// Treat a whole text as a single hash description. The name is taken from the first
    /// `\subsection`, if any.
    ///
    /// When no `algorithmic` block is a plain pseudocode block, the body of the routine named
    /// after the description, or of its only routine, is used as the pseudocode block. The
    /// routine stays a local definition.
    pub fn parse(text: &str, guide: &StyleGuide) -> Self {
        let lines = stripped_lines(text);
        let (name, location) = lines
            .iter()
            .enumerate()
            .find_map(|(i, l)| match heading(l) {
                Some((HeadingKind::Subsection, title)) => Some((title, Location::line(i + 1))),
                _ => None,
            })
            .unwrap_or_else(|| ("<unnamed>".to_string(), Location::line(1)));
        scan_content(&lines, 0..lines.len(), guide).into_description(name, location, lines.len())
    }

    /// The single pseudocode block, if there is exactly one.
    pub fn pseudocode(&self) -> Option<&PseudocodeBlock> {
        match self.blocks.as_slice() {
            [block] => Some(block),
            _ => None,
        }
    }

    /// Every invocation that must resolve: pseudocode lines and bodies of local definitions.
    /// A main routine is both, and its invocations are listed once.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.blocks
            .iter()
            .flat_map(|b| b.invocations())
            .chain(self.definitions.iter().flat_map(|d| d.body.iter().cloned()))
            .unique()
            .collect()
    }

    /// Symbols of the given roles that occur in the pseudocode, in display form.
    pub fn symbols_with_role(&self, guide: &StyleGuide, roles: &[Role]) -> BTreeSet<String> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.scanned.identifiers())
            .filter(|(s, _)| guide.role_of(&s.base).map_or(false, |r| roles.contains(&r)))
            .map(|(s, _)| s.to_string())
            .collect()
    }

    pub fn state_words(&self, guide: &StyleGuide) -> BTreeSet<String> {
        self.symbols_with_role(guide, &[Role::State])
    }

    pub fn constants(&self, guide: &StyleGuide) -> BTreeSet<String> {
        self.symbols_with_role(guide, &[Role::Constant, Role::Key])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    /// Holds hash descriptions.
    Hashes,
    /// Holds building blocks shared by the whole document.
    Shared,
    /// Prose only; subsections are not hash descriptions.
    Prose,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub location: Location,
    pub kind: SectionKind,
    /// Definitions before the first hash description, or all definitions of shared and prose
    /// sections.
    pub intro: Vec<Definition>,
    pub descriptions: Vec<HashDescription>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Definitions before the first section.
    pub preamble: Vec<Definition>,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn parse(text: &str, guide: &StyleGuide) -> Self {
        let lines = stripped_lines(text);
        let headings: Vec<(usize, HeadingKind, String)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, l)| heading(l).map(|(kind, title)| (i, kind, title)))
            .collect();

        let section_starts: Vec<usize> = headings
            .iter()
            .filter(|(_, kind, _)| *kind == HeadingKind::Section)
            .map(|(i, _, _)| *i)
            .collect();
        let preamble_end = section_starts.first().copied().unwrap_or(lines.len());
        let preamble = scan_content(&lines, 0..preamble_end, guide).definitions;

        let mut sections = vec![];
        for (index, start) in section_starts.iter().enumerate() {
            let end = section_starts.get(index + 1).copied().unwrap_or(lines.len());
            let title = headings
                .iter()
                .find(|(i, _, _)| i == start)
                .map(|(_, _, t)| t.clone())
                .unwrap_or_default();
            let kind = if guide.is_shared_section(&title) {
                SectionKind::Shared
            } else if guide.is_prose_section(&title) {
                SectionKind::Prose
            } else {
                SectionKind::Hashes
            };
            let subsections: Vec<(usize, String)> = headings
                .iter()
                .filter(|(i, kind, _)| *kind == HeadingKind::Subsection && i > start && *i < end)
                .map(|(i, _, t)| (*i, t.clone()))
                .collect();

            let mut section = Section {
                title,
                location: Location::line(start + 1),
                kind,
                intro: vec![],
                descriptions: vec![],
            };
            if kind != SectionKind::Hashes {
                section.intro = scan_content(&lines, start + 1..end, guide).definitions;
                sections.push(section);
                continue;
            }

            let intro_end = subsections.first().map_or(end, |(i, _)| *i);
            section.intro = scan_content(&lines, start + 1..intro_end, guide).definitions;
            for (sub_index, (sub_start, name)) in subsections.iter().enumerate() {
                let sub_end = subsections.get(sub_index + 1).map_or(end, |(i, _)| *i);
                section.descriptions.push(
                    scan_content(&lines, sub_start + 1..sub_end, guide).into_description(
                        name.clone(),
                        Location::line(sub_start + 1),
                        sub_end,
                    ),
                );
            }
            sections.push(section);
        }

        debug!(
            "Parsed {} sections with {} hash descriptions",
            sections.len(),
            sections.iter().map(|s| s.descriptions.len()).sum::<usize>()
        );
        Document { preamble, sections }
    }

    pub fn descriptions(&self) -> impl Iterator<Item = &HashDescription> {
        self.sections.iter().flat_map(|s| s.descriptions.iter())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HeadingKind {
    Section,
    Subsection,
}

fn stripped_lines(text: &str) -> Vec<&str> {
    text.lines().map(strip_comment).collect()
}

/// Returns the kind and plain-text title of a `\section` or `\subsection` heading.
fn heading(line: &str) -> Option<(HeadingKind, String)> {
    let captures = HEADING_RE.captures(line)?;
    let kind = match &captures[1] {
        "section" => HeadingKind::Section,
        _ => HeadingKind::Subsection,
    };
    let rest = &line[captures.get(0)?.end()..];
    let mut depth = 1;
    let mut end = rest.len();
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = i;
                    break;
                }
            }
            _ => {}
        }
    }
    let title = strip_commands(&rest[..end].replace("\\_", "_"))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    Some((kind, title))
}

#[derive(Default)]
struct Content {
    blocks: Vec<PseudocodeBlock>,
    definition_blocks: Vec<PseudocodeBlock>,
    definitions: Vec<Definition>,
    finalizer: Option<String>,
}

impl Content {
    fn into_description(
        self,
        name: String,
        location: Location,
        end_line: usize,
    ) -> HashDescription {
        let mut blocks = self.blocks;
        if blocks.is_empty() {
            blocks.extend(main_routine(&self.definition_blocks, &name));
        }
        HashDescription {
            name,
            location,
            end_line,
            blocks,
            definitions: self.definitions,
            finalizer: self.finalizer,
        }
    }
}

/// The body of the routine named `name`, or of the only routine, as a pseudocode block.
fn main_routine(blocks: &[PseudocodeBlock], name: &str) -> Option<PseudocodeBlock> {
    let mut routines: Vec<(String, PseudocodeBlock)> =
        blocks.iter().flat_map(routine_bodies).collect();
    match routines
        .iter()
        .position(|(label, _)| label.trim().eq_ignore_ascii_case(name.trim()))
    {
        Some(index) => Some(routines.swap_remove(index).1),
        None if routines.len() == 1 => routines.pop().map(|(_, body)| body),
        None => None,
    }
}

/// Splits a definition block into the labelled bodies of its routines.
fn routine_bodies(block: &PseudocodeBlock) -> Vec<(String, PseudocodeBlock)> {
    let mut bodies = vec![];
    let mut current: Option<(String, PseudocodeBlock)> = None;
    for line in &block.lines {
        match line.keyword() {
            Some(k) if k.opens_routine() => {
                bodies.extend(current.take());
                current = line.scanned.label.clone().map(|label| {
                    let body = PseudocodeBlock {
                        location: block.location,
                        lines: vec![],
                        terminated: block.terminated,
                    };
                    (label, body)
                });
            }
            Some(k) if k.closes_routine() => bodies.extend(current.take()),
            _ => {
                if let Some((_, body)) = current.as_mut() {
                    body.lines.push(line.clone());
                }
            }
        }
    }
    bodies.extend(current);
    bodies
}

/// Scans the lines in `range` (0-based indices) for pseudocode blocks and definitions.
fn scan_content(lines: &[&str], range: Range<usize>, guide: &StyleGuide) -> Content {
    let mut content = Content::default();
    let mut i = range.start;
    while i < range.end {
        let line = lines[i];
        if let Some(begin) = BEGIN_ALGORITHMIC_RE.find(line) {
            let mut block = PseudocodeBlock {
                location: Location::new(i + 1, line[..begin.start()].chars().count() + 1),
                lines: vec![],
                terminated: false,
            };
            let mut math = false;
            i += 1;
            while i < range.end {
                if END_ALGORITHMIC_RE.is_match(lines[i]) {
                    block.terminated = true;
                    break;
                }
                if !lines[i].trim().is_empty() {
                    let scanned = scan_line(lines[i], math, guide);
                    math = scanned.ends_in_math;
                    block.lines.push(PseudocodeLine {
                        line: i + 1,
                        scanned,
                    });
                }
                i += 1;
            }
            if block.is_definition_block() {
                content.definitions.extend(routine_definitions(&block));
                content.definition_blocks.push(block);
            } else {
                content.blocks.push(block);
            }
            i += 1;
            continue;
        }

        content
            .definitions
            .extend(macro_definitions(line, i + 1, guide));
        if let Some(c) = ROUTINE_PARAGRAPH_RE.captures(line) {
            let start = c.get(0).map_or(0, |m| m.start());
            content.definitions.push(Definition {
                callee: Callee::routine(&normalize_name(&c[1])),
                location: Location::new(i + 1, line[..start].chars().count() + 1),
                body: vec![],
            });
        }
        if let Some(m) = FINALIZER_PARAGRAPH_RE.find(line) {
            content.finalizer = Some(paragraph_text(lines, i, m.end(), range.end));
        }
        i += 1;
    }
    content
}

/// Collects a paragraph starting after `offset` on line `start` up to the next blank line or
/// heading.
fn paragraph_text(lines: &[&str], start: usize, offset: usize, end: usize) -> String {
    let mut text = vec![lines[start][offset..].trim().to_string()];
    for line in lines.iter().take(end).skip(start + 1) {
        if line.trim().is_empty() || ANY_HEADING_RE.is_match(line) {
            break;
        }
        text.push(line.trim().to_string());
    }
    strip_commands(&text.join(" "))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn macro_definitions(line: &str, line_number: usize, guide: &StyleGuide) -> Vec<Definition> {
    let matches: Vec<_> = MACRO_DEFINITION_RE.captures_iter(line).collect();
    matches
        .iter()
        .enumerate()
        .filter_map(|(index, c)| {
            let whole = c.get(0)?;
            let name = c.get(1).or_else(|| c.get(2))?.as_str();
            let body_end = matches
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |m| m.start());
            let body_column = line[..whole.end()].chars().count();
            let body = scan_line(&line[whole.end()..body_end], true, guide)
                .invocations()
                .map(|(callee, column)| Invocation {
                    callee: callee.clone(),
                    location: Location::new(line_number, body_column + column),
                })
                .collect();
            Some(Definition {
                callee: Callee::macro_(name),
                location: Location::new(line_number, line[..whole.start()].chars().count() + 1),
                body,
            })
        })
        .collect()
}

fn routine_definitions(block: &PseudocodeBlock) -> Vec<Definition> {
    let mut definitions = vec![];
    let mut current: Option<Definition> = None;
    for line in &block.lines {
        match line.keyword() {
            Some(k) if k.opens_routine() => {
                definitions.extend(current.take());
                current = line.scanned.label.as_ref().map(|label| Definition {
                    callee: Callee::routine(label),
                    location: Location::line(line.line),
                    body: vec![],
                });
            }
            Some(k) if k.closes_routine() => definitions.extend(current.take()),
            _ => {
                if let Some(definition) = current.as_mut() {
                    definition.body.extend(line.invocations());
                }
            }
        }
    }
    definitions.extend(current);
    definitions
}
