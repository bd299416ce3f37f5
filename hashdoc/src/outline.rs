// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A summary of what the checks see in each hash description.

use crate::config::StyleGuide;
use crate::document::{Document, HashDescription};
use crate::structure::{phase_runs, Phase};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionOutline {
    pub name: String,
    pub line: usize,
    pub state_words: Vec<String>,
    pub constants: Vec<String>,
    /// Locally defined primitives.
    pub primitives: Vec<String>,
    /// Phase runs of the first pseudocode block, in order.
    pub phases: Vec<Phase>,
    pub finalizer: Option<String>,
}

impl DescriptionOutline {
    pub fn new(description: &HashDescription, guide: &StyleGuide) -> Self {
        Self {
            name: description.name.clone(),
            line: description.location.line,
            state_words: description.state_words(guide).into_iter().collect(),
            constants: description.constants(guide).into_iter().collect(),
            primitives: description
                .definitions
                .iter()
                .map(|d| d.callee.to_string())
                .collect(),
            phases: description
                .blocks
                .first()
                .map(|b| phase_runs(b, guide).into_iter().map(|r| r.phase).collect())
                .unwrap_or_default(),
            finalizer: description.finalizer.clone(),
        }
    }
}

impl Display for DescriptionOutline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  {} (line {})", self.name, self.line)?;
        writeln!(f, "    state: {}", self.state_words.iter().join(", "))?;
        writeln!(f, "    constants: {}", self.constants.iter().join(", "))?;
        writeln!(f, "    primitives: {}", self.primitives.iter().join(", "))?;
        write!(f, "    phases: {}", self.phases.iter().join(" > "))?;
        if let Some(finalizer) = &self.finalizer {
            write!(f, "\n    finalizer: {finalizer}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutline {
    pub title: String,
    pub line: usize,
    pub descriptions: Vec<DescriptionOutline>,
}

pub fn outline(document: &Document, guide: &StyleGuide) -> Vec<SectionOutline> {
    document
        .sections
        .iter()
        .map(|section| SectionOutline {
            title: section.title.clone(),
            line: section.location.line,
            descriptions: section
                .descriptions
                .iter()
                .map(|d| DescriptionOutline::new(d, guide))
                .collect(),
        })
        .collect()
}
