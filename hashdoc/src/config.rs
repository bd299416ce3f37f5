// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The style guide every section of the survey is checked against.
//!
//! The defaults encode the survey's notation table. A JSON file may override any subset of the
//! fields, e.g.
//! ```rust
//! # use hashdoc::config::StyleGuide;
//! let guide = StyleGuide::from_json(r#"{ "intrinsics": ["CLMUL"] }"#).unwrap();
//! assert_eq!(guide.intrinsics, vec!["CLMUL".to_string()]);
//! assert!(guide.role_of("seed").is_some());
//! ```

use crate::error::{HashDocError, HashDocResult};
use crate::roles::{Role, SymbolRule};
use crate::scanner::Callee;
use crate::structure::Phase;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleGuide {
    /// The fixed role table.
    pub symbols: Vec<SymbolRule>,
    /// Loop indices, exempt from the role table.
    pub indices: Vec<String>,
    /// Required order of section titles. Empty disables the check.
    pub section_order: Vec<String>,
    /// Sections whose definitions are global building blocks.
    pub shared_sections: Vec<String>,
    /// Sections whose subsections are prose rather than hash descriptions.
    pub prose_sections: Vec<String>,
    /// Building blocks that must be defined in global scope. Macros are written with a
    /// leading backslash.
    pub shared_blocks: Vec<String>,
    /// Hardware intrinsics, defined once at their first use.
    pub intrinsics: Vec<String>,
    /// Leading words of prose that mark the start of a phase. Matched on whole words.
    pub phase_keywords: BTreeMap<Phase, Vec<String>>,
    /// Additional commands that are neither macros to resolve nor symbols.
    pub ignored_commands: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for StyleGuide {
    fn default() -> Self {
        let phase_keywords = BTreeMap::from([
            (
                Phase::Init,
                strings(&[
                    "init",
                    "initial",
                    "initialize",
                    "initialise",
                    "initialization",
                    "initialisation",
                    "setup",
                    "set up",
                ]),
            ),
            (Phase::MainLoop, strings(&["main loop", "loop", "bulk"])),
            (
                Phase::Tail,
                strings(&[
                    "tail",
                    "no tail",
                    "remaining",
                    "remainder",
                    "leftover",
                    "leftovers",
                ]),
            ),
            (
                Phase::Collapse,
                strings(&[
                    "collapse",
                    "lane collapse",
                    "no collapse",
                    "no lane collapse",
                    "single lane",
                    "merge",
                    "converge",
                ]),
            ),
            (
                Phase::Finalize,
                strings(&[
                    "final",
                    "finalize",
                    "finalise",
                    "finalizer",
                    "finaliser",
                    "finalization",
                    "finalisation",
                    "no final",
                    "no finalizer",
                    "identity",
                    "avalanche",
                    "fmix",
                ]),
            ),
            (Phase::Return, strings(&["return", "output"])),
        ]);
        Self {
            symbols: vec![
                SymbolRule::new("x", Role::Input),
                SymbolRule::new("v", Role::State),
                SymbolRule::new("s", Role::Constant),
                SymbolRule::new("k", Role::Key),
                SymbolRule::new("seed", Role::Parameter),
                SymbolRule::new("p", Role::Cursor),
                SymbolRule::new("n", Role::Parameter),
            ],
            indices: strings(&["i", "j"]),
            section_order: vec![],
            shared_sections: strings(&["Building Blocks", "Common Building Blocks"]),
            prose_sections: strings(&[
                "Introduction",
                "Background",
                "Related Work",
                "Conclusion",
                "Conclusions",
            ]),
            shared_blocks: vec![],
            intrinsics: vec![],
            phase_keywords,
            ignored_commands: vec![],
        }
    }
}

impl StyleGuide {
    /// Parse a style guide from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> HashDocResult<Self> {
        let guide: StyleGuide = serde_json::from_str(json)?;
        guide.validate()?;
        Ok(guide)
    }

    /// Read a style guide from a JSON file.
    pub fn load(path: &Path) -> HashDocResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| HashDocError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Loading style guide from {}", path.display());
        Self::from_json(&json)
    }

    pub fn validate(&self) -> HashDocResult<()> {
        let mut seen = HashSet::new();
        for rule in &self.symbols {
            if rule.name.is_empty() || !rule.name.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(HashDocError::InvalidConfig(format!(
                    "symbol names must be alphabetic, got {:?}",
                    rule.name
                )));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(HashDocError::InvalidConfig(format!(
                    "symbol {} is listed twice",
                    rule.name
                )));
            }
        }
        if let Some(index) = self.indices.iter().find(|i| seen.contains(i.as_str())) {
            return Err(HashDocError::InvalidConfig(format!(
                "{index} is both a symbol and a loop index"
            )));
        }
        for phase in Phase::CANONICAL {
            if self
                .phase_keywords
                .get(&phase)
                .map_or(true, |keywords| keywords.iter().all(|k| k.trim().is_empty()))
            {
                return Err(HashDocError::InvalidConfig(format!(
                    "no keywords for phase {phase}"
                )));
            }
        }
        Ok(())
    }

    /// The role of a symbol, or `None` for names outside the table.
    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.symbols.iter().find(|s| s.name == name).map(|s| s.role)
    }

    pub fn is_index(&self, name: &str) -> bool {
        self.indices.iter().any(|i| i == name)
    }

    pub fn is_shared_section(&self, title: &str) -> bool {
        contains_title(&self.shared_sections, title)
    }

    pub fn is_prose_section(&self, title: &str) -> bool {
        contains_title(&self.prose_sections, title)
    }

    pub fn is_intrinsic(&self, callee: &Callee) -> bool {
        self.intrinsics.iter().any(|i| Callee::parse(i) == *callee)
    }

    pub fn is_ignored_command(&self, command: &str) -> bool {
        self.ignored_commands
            .iter()
            .any(|c| c.trim_start_matches('\\') == command)
    }

    pub fn keywords(&self, phase: Phase) -> &[String] {
        self.phase_keywords
            .get(&phase)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Section titles are compared case-insensitively with surrounding whitespace ignored.
fn contains_title(titles: &[String], title: &str) -> bool {
    titles
        .iter()
        .any(|t| t.trim().eq_ignore_ascii_case(title.trim()))
}
