// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Loading LaTeX sources.
//!
//! A [Source] is the text a lint run sees: one file, optionally with its `\input` and `\include`
//! lines expanded in place. Every line of the expanded text remembers where it came from, so
//! findings can be reported against the file an editor actually has open.

use crate::error::{HashDocError, HashDocResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::debug;

static INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\\(?:input|include)\s*\{([^}]+)\}\s*$").expect("valid regex"));

/// A 1-based position in the (expanded) text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The first column of a line.
    pub fn line(line: usize) -> Self {
        Self { line, column: 1 }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where a line of the expanded text was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub file: String,
    pub line: usize,
}

/// The text of a document together with the origin of each of its lines.
#[derive(Clone, Debug)]
pub struct Source {
    text: String,
    origins: Vec<Origin>,
}

impl Source {
    /// A source that was not read from a file, e.g. stdin.
    pub fn from_text(name: &str, text: &str) -> Self {
        let origins = (1..=text.lines().count())
            .map(|line| Origin {
                file: name.to_string(),
                line,
            })
            .collect();
        Self {
            text: text.to_string(),
            origins,
        }
    }

    /// Read a file. With `follow_inputs`, lines consisting of a single `\input{..}` or
    /// `\include{..}` are replaced by the contents of the named file, recursively.
    pub fn load(path: &Path, follow_inputs: bool) -> HashDocResult<Self> {
        let mut source = Source {
            text: String::new(),
            origins: vec![],
        };
        let mut stack = vec![];
        source.append(path, follow_inputs, &mut stack)?;
        Ok(source)
    }

    fn append(
        &mut self,
        path: &Path,
        follow_inputs: bool,
        stack: &mut Vec<PathBuf>,
    ) -> HashDocResult<()> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if stack.contains(&canonical) {
            return Err(HashDocError::InputCycle(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| HashDocError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Read {} ({} lines)", path.display(), text.lines().count());

        stack.push(canonical);
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        for (index, line) in text.lines().enumerate() {
            let included = if follow_inputs {
                INPUT_RE
                    .captures(strip_comment(line))
                    .map(|c| included_path(dir, c[1].trim()))
            } else {
                None
            };
            match included {
                Some(included) => self.append(&included, follow_inputs, stack)?,
                None => {
                    self.text.push_str(line);
                    self.text.push('\n');
                    self.origins.push(Origin {
                        file: path.display().to_string(),
                        line: index + 1,
                    });
                }
            }
        }
        stack.pop();
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The origin of a 1-based line of the expanded text.
    pub fn origin(&self, line: usize) -> Option<&Origin> {
        line.checked_sub(1).and_then(|i| self.origins.get(i))
    }

    /// The file the source was loaded from, i.e. the origin of its first line.
    pub fn name(&self) -> &str {
        self.origins.first().map_or("", |o| o.file.as_str())
    }
}

fn included_path(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("tex")
    }
}

/// Removes a LaTeX comment from a line. An escaped `\%` does not start a comment.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut backslashes = 0;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'\\' => backslashes += 1,
            b'%' if backslashes % 2 == 0 => return &line[..i],
            _ => backslashes = 0,
        }
    }
    line
}
