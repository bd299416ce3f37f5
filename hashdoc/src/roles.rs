// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Symbol roles and the usages they permit.
//!
//! Every symbol in the style guide has one role for the whole document. The notation checker
//! observes how each occurrence is used and asks the role whether that usage is allowed.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The semantic role of a notational symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Input words read from the message, e.g. `x_i`.
    Input,
    /// Evolving lane state, e.g. `v_i`.
    State,
    /// Fixed constants such as primes, e.g. `s_i`. Never assigned in pseudocode.
    Constant,
    /// Words derived once during initialization and fixed afterwards, e.g. `k_i`.
    Key,
    /// Caller supplied values, e.g. `seed` and `n`.
    Parameter,
    /// The read position in the input, e.g. `p`.
    Cursor,
}

/// How a single occurrence of a symbol is used in a pseudocode statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    Read,
    Initialized,
    Loaded,
    Updated,
}

impl Role {
    pub fn permits(&self, usage: Usage) -> bool {
        match self {
            Role::State | Role::Cursor => true,
            Role::Input => matches!(usage, Usage::Read | Usage::Loaded),
            Role::Constant | Role::Parameter => usage == Usage::Read,
            Role::Key => matches!(usage, Usage::Read | Usage::Initialized),
        }
    }

    /// Returns the usages this role permits.
    pub fn permitted(&self) -> Vec<Usage> {
        [Usage::Read, Usage::Initialized, Usage::Loaded, Usage::Updated]
            .into_iter()
            .filter(|u| self.permits(*u))
            .collect()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Input => "input word",
            Role::State => "lane state",
            Role::Constant => "constant",
            Role::Key => "key",
            Role::Parameter => "parameter",
            Role::Cursor => "cursor",
        })
    }
}

impl Display for Usage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Usage::Read => "read",
            Usage::Initialized => "initialized",
            Usage::Loaded => "loaded per iteration",
            Usage::Updated => "evolving state",
        })
    }
}

/// A symbol of the style guide together with its fixed role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRule {
    pub name: String,
    pub role: Role,
}

impl SymbolRule {
    pub fn new(name: &str, role: Role) -> Self {
        Self {
            name: name.to_string(),
            role,
        }
    }
}
