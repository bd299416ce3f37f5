// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tokenizer for single lines of `algorithmic` pseudocode and macro bodies.
//!
//! The scanner does not try to understand LaTeX in general. It splits a line into the pieces
//! the checks care about:
//! * identifiers inside math, with their subscript, e.g. `v_1` or `\mathit{seed}`,
//! * invocations of named functions, e.g. `\Call{Round}`, `\textsc{Mix}`, `\mathrm{rotl}(..)`
//!   or any user macro such as `\rotl`,
//! * assignment operators, and
//! * prose (comments and text-mode words), which carries phase cues.
//!
//! # Example
//! ```rust
//! # use hashdoc::config::StyleGuide;
//! # use hashdoc::scanner::*;
//! let line = scan_line(r"\State $v_1 \gets \Call{Round}{v_1, x_1}$", false, &StyleGuide::default());
//! assert_eq!(line.keyword, Some(Keyword::State));
//! assert_eq!(line.identifiers().map(|(s, _)| s.to_string()).collect::<Vec<_>>(), ["v_1", "v_1", "x_1"]);
//! assert_eq!(line.invocations().next().unwrap().0.to_string(), "Round");
//! ```

use crate::config::StyleGuide;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An algorithmicx statement command that starts a pseudocode line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    State,
    Statex,
    For,
    ForAll,
    While,
    Repeat,
    Loop,
    Until,
    EndFor,
    EndWhile,
    EndLoop,
    If,
    ElsIf,
    Else,
    EndIf,
    Return,
    Function,
    EndFunction,
    Procedure,
    EndProcedure,
    Require,
    Ensure,
}

impl Keyword {
    pub fn from_command(command: &str) -> Option<Self> {
        Some(match command {
            "State" => Keyword::State,
            "Statex" => Keyword::Statex,
            "For" => Keyword::For,
            "ForAll" => Keyword::ForAll,
            "While" => Keyword::While,
            "Repeat" => Keyword::Repeat,
            "Loop" => Keyword::Loop,
            "Until" => Keyword::Until,
            "EndFor" => Keyword::EndFor,
            "EndWhile" => Keyword::EndWhile,
            "EndLoop" => Keyword::EndLoop,
            "If" => Keyword::If,
            "ElsIf" => Keyword::ElsIf,
            "Else" => Keyword::Else,
            "EndIf" => Keyword::EndIf,
            "Return" => Keyword::Return,
            "Function" => Keyword::Function,
            "EndFunction" => Keyword::EndFunction,
            "Procedure" => Keyword::Procedure,
            "EndProcedure" => Keyword::EndProcedure,
            "Require" => Keyword::Require,
            "Ensure" => Keyword::Ensure,
            _ => return None,
        })
    }

    pub fn opens_loop(&self) -> bool {
        matches!(
            self,
            Keyword::For | Keyword::ForAll | Keyword::While | Keyword::Repeat | Keyword::Loop
        )
    }

    pub fn closes_loop(&self) -> bool {
        matches!(
            self,
            Keyword::EndFor | Keyword::EndWhile | Keyword::EndLoop | Keyword::Until
        )
    }

    /// Lines that frame a routine rather than belong to one of its phases.
    pub fn is_header(&self) -> bool {
        matches!(
            self,
            Keyword::Function
                | Keyword::EndFunction
                | Keyword::Procedure
                | Keyword::EndProcedure
                | Keyword::Require
                | Keyword::Ensure
        )
    }

    pub fn opens_routine(&self) -> bool {
        matches!(self, Keyword::Function | Keyword::Procedure)
    }

    pub fn closes_routine(&self) -> bool {
        matches!(self, Keyword::EndFunction | Keyword::EndProcedure)
    }
}

/// A notational symbol, split into its base name and optional subscript.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub subscript: Option<String>,
}

impl Symbol {
    pub fn new(base: &str, subscript: Option<&str>) -> Self {
        Self {
            base: base.to_string(),
            subscript: subscript.map(str::to_string),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.subscript {
            None => f.write_str(&self.base),
            Some(sub) if sub.chars().count() == 1 => write!(f, "{}_{}", self.base, sub),
            Some(sub) => write!(f, "{}_{{{}}}", self.base, sub),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalleeKind {
    /// A user defined LaTeX macro, e.g. `\rotl`.
    Macro,
    /// A routine named in small caps or via `\Call`, e.g. `Round`.
    Routine,
}

/// The name of an invoked function.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Callee {
    pub name: String,
    pub kind: CalleeKind,
}

impl Callee {
    pub fn routine(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: CalleeKind::Routine,
        }
    }

    pub fn macro_(name: &str) -> Self {
        Self {
            name: name.trim_start_matches('\\').to_string(),
            kind: CalleeKind::Macro,
        }
    }

    /// Parse a name as written in a style guide: `\name` is a macro, anything else a routine.
    pub fn parse(name: &str) -> Self {
        match name.strip_prefix('\\') {
            Some(stripped) => Self::macro_(stripped),
            None => Self::routine(name),
        }
    }
}

impl Display for Callee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CalleeKind::Macro => write!(f, "\\{}", self.name),
            CalleeKind::Routine => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident(Symbol),
    Invoke(Callee),
    Assign { compound: bool },
    /// `\in`, which binds a variable in a loop header.
    In,
    Comma { top_level: bool },
    Semicolon,
    Operator(String),
    Literal(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based column of the first character of the token.
    pub column: usize,
}

/// The result of scanning one line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScannedLine {
    /// The first statement command on the line.
    pub keyword: Option<Keyword>,
    /// The name given to `\Function` or `\Procedure`.
    pub label: Option<String>,
    pub tokens: Vec<Token>,
    /// Comment text and text-mode words.
    pub prose: String,
    /// Whether the line ends inside math mode.
    pub ends_in_math: bool,
}

impl ScannedLine {
    pub fn identifiers(&self) -> impl Iterator<Item = (&Symbol, usize)> {
        self.tokens.iter().filter_map(|t| match &t.kind {
            TokenKind::Ident(s) => Some((s, t.column)),
            _ => None,
        })
    }

    pub fn invocations(&self) -> impl Iterator<Item = (&Callee, usize)> {
        self.tokens.iter().filter_map(|t| match &t.kind {
            TokenKind::Invoke(c) => Some((c, t.column)),
            _ => None,
        })
    }

    /// The prose in lowercase with punctuation and LaTeX leftovers replaced by single spaces.
    pub fn normalized_prose(&self) -> String {
        normalize_prose(&self.prose)
    }
}

pub fn normalize_prose(prose: &str) -> String {
    prose
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a function name as written in LaTeX, e.g. `MEOW\_MIX` becomes `MEOW_MIX`.
pub fn normalize_name(raw: &str) -> String {
    raw.replace("\\_", "_")
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '\\' | '$'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "varpi", "rho", "varrho",
    "sigma", "varsigma", "tau", "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma",
    "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

const OPERATORS: &[&str] = &[
    "oplus", "ominus", "otimes", "odot", "boxplus", "boxminus", "wedge", "vee", "land", "lor",
    "lnot", "neg", "cdot", "times", "div", "ll", "gg", "lll", "ggg", "bmod", "mod", "pmod",
    "circ", "ne", "neq", "le", "leq", "ge", "geq", "lt", "gt", "equiv", "approx", "cap", "cup",
    "rightarrow", "to", "mapsto", "pm", "mp", "AND", "OR", "NOT", "XOR", "bigoplus", "bigotimes",
    "bigodot", "bigwedge", "bigvee", "bigcap", "bigcup", "bigsqcup", "biguplus", "coprod",
    "int", "oint", "setminus", "ast", "star", "bullet", "oslash", "sqcap", "sqcup", "uplus",
    "amalg", "dagger", "wr", "sim", "simeq", "cong", "doteq", "triangleq", "propto", "prec",
    "preceq", "succ", "succeq", "subset", "subseteq", "supset", "supseteq", "sqsubseteq",
    "sqsupseteq", "notin", "ni", "nmid", "parallel", "perp", "models", "vdash", "dashv",
    "leftrightarrow", "Leftarrow", "Rightarrow", "Leftrightarrow", "longleftarrow",
    "longrightarrow", "longleftrightarrow", "Longleftarrow", "Longrightarrow",
    "Longleftrightarrow", "implies", "impliedby", "iff", "uparrow", "downarrow", "updownarrow",
    "Uparrow", "Downarrow", "hookleftarrow", "hookrightarrow", "longmapsto", "leadsto",
    "rightleftharpoons", "twoheadrightarrow", "geqslant", "leqslant", "lesssim",
    "gtrsim", "nleq", "ngeq", "nless", "ngtr", "shortmid", "divides",
];

/// Operators that form a compound assignment when directly followed by `=`.
const COMPOUND_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "&", "|", "oplus", "wedge", "vee", "land", "lor", "times", "cdot", "ll",
    "gg", "lll", "ggg", "boxplus",
];

/// Commands whose arguments are neither code nor prose.
const SKIP_ARGUMENT: &[&str] = &[
    "begin", "end", "label", "ref", "eqref", "cite", "citep", "citet", "hspace", "vspace",
    "caption", "color", "mathbb", "mathcal", "mathfrak", "footnote", "url", "href",
];

const BUILTINS: &[&str] = &[
    "left", "right", "big", "Big", "bigg", "Bigg", "bigl", "bigr", "Bigl", "Bigr", "lfloor",
    "rfloor", "lceil", "rceil", "lvert", "rvert", "vert", "Vert", "mid", "langle", "rangle",
    "ldots", "cdots", "dots", "dotsc", "dotsb", "vdots", "quad", "qquad", "hfill", "newline",
    "noindent", "par", "phantom", "hphantom", "vphantom", "underbrace", "overbrace",
    "overline", "underline", "hat", "bar", "tilde", "widehat", "frac", "dfrac", "tfrac", "sqrt",
    "sum", "prod", "min", "max", "log", "lg", "ln", "exp", "top", "bot", "infty", "prime", "not",
    "TRUE", "FALSE", "textsuperscript", "textsubscript", "bf", "it", "rm", "tt", "sf", "sc",
    "em", "displaystyle", "textstyle", "scriptstyle", "limits", "nolimits", "mathop",
    "ensuremath", "textcolor", "xspace", "relax", "protect", "nobreak", "allowbreak",
    "linebreak", "smallskip", "medskip", "bigskip", "centering", "small", "footnotesize",
    "scriptsize", "normalsize", "large", "Large", "item", "lbrace", "rbrace", "colon",
    "algorithmicrequire", "algorithmicensure", "Input", "Output", "section", "subsection",
    "subsubsection", "paragraph", "Break", "Continue", "algorithmicbreak", "algorithmiccontinue",
    "ell", "hbar", "imath", "jmath", "wp", "Re", "Im", "aleph", "emptyset", "varnothing",
    "partial", "nabla", "forall", "exists", "nexists", "angle", "triangle", "square", "Box",
    "Diamond", "diamond", "checkmark", "sharp", "flat", "natural", "clubsuit", "spadesuit",
    "ldotp", "cdotp", "vec", "dot", "ddot", "dddot", "acute", "grave", "breve", "check",
    "mathring", "widetilde", "overrightarrow", "overleftarrow", "overleftrightarrow", "binom",
    "dbinom", "tbinom", "choose", "overset", "underset", "stackrel", "substack", "tag", "notag",
    "nonumber", "boldsymbol", "pmb", "mathopen", "mathclose", "mathpunct", "mathord", "lbrack",
    "rbrack", "backslash", "lgroup", "rgroup", "llbracket", "rrbracket", "arg", "deg", "det",
    "dim", "gcd", "lcm", "inf", "sup", "lim", "liminf", "limsup", "sin", "cos", "tan", "Pr",
    "hom", "ker", "hline", "cline", "nolinebreak", "enspace", "thinspace", "negthinspace",
    "medspace", "thickspace",
];

/// Scan one line. `math` tells whether the line starts inside math mode, as it does for
/// macro bodies.
pub fn scan_line(text: &str, math: bool, guide: &StyleGuide) -> ScannedLine {
    let mut lexer = Lexer {
        chars: text.chars().collect(),
        pos: 0,
        math,
        nesting: 0,
        guide,
        line: ScannedLine::default(),
    };
    lexer.run();
    lexer.line.ends_in_math = lexer.math;
    lexer.line
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    math: bool,
    /// Bracket nesting inside the current math segment.
    nesting: usize,
    guide: &'a StyleGuide,
    line: ScannedLine,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn next_non_space(&self) -> Option<char> {
        self.chars[self.pos.min(self.chars.len())..]
            .iter()
            .copied()
            .find(|c| !c.is_whitespace())
    }

    fn skip_spaces(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn push(&mut self, kind: TokenKind, column: usize) {
        self.line.tokens.push(Token { kind, column });
    }

    fn push_prose(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.line.prose.is_empty() {
            self.line.prose.push(' ');
        }
        self.line.prose.push_str(text);
    }

    fn set_math(&mut self, math: bool) {
        self.math = math;
        self.nesting = 0;
    }

    fn read_while(&mut self, f: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().map_or(false, &f) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Reads a `{..}` group, returning its raw contents.
    fn read_group(&mut self) -> Option<String> {
        self.skip_spaces();
        if self.peek() != Some('{') {
            return None;
        }
        self.pos += 1;
        let start = self.pos;
        let mut depth = 1;
        while let Some(c) = self.peek() {
            match c {
                '\\' => self.pos += 1,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        return Some(inner);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Some(self.chars[start..self.chars.len().min(self.pos)].iter().collect())
    }

    /// Consumes any `_` and `^` scripts, returning the last subscript.
    fn read_scripts(&mut self) -> Option<String> {
        let mut subscript = None;
        while let Some(c @ ('_' | '^')) = self.peek() {
            self.pos += 1;
            let script = match self.peek() {
                Some('{') => self.read_group().unwrap_or_default(),
                Some('\\') => {
                    self.pos += 1;
                    self.read_while(|c| c.is_ascii_alphabetic())
                }
                Some(other) => {
                    self.pos += 1;
                    other.to_string()
                }
                None => String::new(),
            };
            if c == '_' {
                subscript = Some(normalize_name(&script));
            }
        }
        subscript
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '$' => {
                    self.pos += 1;
                    if self.peek() == Some('$') {
                        self.pos += 1;
                    }
                    self.set_math(!self.math);
                }
                '\\' => self.command(),
                _ if self.math => self.math_char(c),
                _ => self.text_char(c),
            }
        }
    }

    fn command(&mut self) {
        let column = self.pos + 1;
        self.pos += 1;
        let name = self.read_while(|c| c.is_ascii_alphabetic());
        if name.is_empty() {
            match self.peek() {
                Some('(') | Some('[') => self.set_math(true),
                Some(')') | Some(']') => self.set_math(false),
                _ => {}
            }
            self.pos += 1;
            return;
        }
        if self.peek() == Some('*') {
            self.pos += 1;
        }
        self.on_command(&name, column);
    }

    fn on_command(&mut self, name: &str, column: usize) {
        if let Some(keyword) = Keyword::from_command(name) {
            if self.line.keyword.is_none() {
                self.line.keyword = Some(keyword);
            }
            if keyword.opens_routine() {
                self.line.label = self.read_group().map(|g| normalize_name(&g));
            }
            return;
        }
        match name {
            "Call" | "textsc" => {
                if let Some(group) = self.read_group() {
                    let callee = normalize_name(&group);
                    if !callee.is_empty() {
                        self.push(TokenKind::Invoke(Callee::routine(&callee)), column);
                    }
                }
            }
            "Comment" => {
                if let Some(group) = self.read_group() {
                    self.push_prose(&strip_commands(&group));
                }
            }
            "mathrm" | "mathit" | "mathsf" | "mathbf" | "operatorname" => {
                if let Some(group) = self.read_group() {
                    self.named(&group, column, true);
                }
            }
            "text" | "textit" | "textrm" | "textsf" | "textbf" | "textup" | "textnormal"
            | "emph" | "mbox" => {
                if let Some(group) = self.read_group() {
                    self.named(&group, column, false);
                }
            }
            "mathtt" | "texttt" => {
                if let Some(group) = self.read_group() {
                    self.push(TokenKind::Literal(group), column);
                }
            }
            "gets" | "leftarrow" | "coloneqq" => {
                self.push(TokenKind::Assign { compound: false }, column)
            }
            "in" => self.push(TokenKind::In, column),
            "mathrel" | "mathbin" => {
                let group = self.read_group().unwrap_or_default();
                if self.next_non_space() == Some('=') {
                    self.skip_spaces();
                    self.pos += 1;
                    self.push(TokenKind::Assign { compound: true }, column);
                } else {
                    self.push(TokenKind::Operator(normalize_name(&group)), column);
                }
            }
            _ if SKIP_ARGUMENT.contains(&name) => {
                self.read_group();
            }
            _ if GREEK.contains(&name) => {
                if self.math {
                    let subscript = self.read_scripts();
                    self.push(
                        TokenKind::Ident(Symbol {
                            base: name.to_string(),
                            subscript,
                        }),
                        column,
                    );
                }
            }
            _ if OPERATORS.contains(&name) => {
                self.push(TokenKind::Operator(name.to_string()), column)
            }
            _ if BUILTINS.contains(&name) || self.guide.is_ignored_command(name) => {}
            _ => self.push(TokenKind::Invoke(Callee::macro_(name)), column),
        }
    }

    /// Handles the argument of a font command: an identifier in math, a routine when followed
    /// by an argument list, prose otherwise.
    fn named(&mut self, raw: &str, column: usize, math_font: bool) {
        let name = normalize_name(raw);
        let scripts = self.read_scripts();
        let single_word = is_identifier(&name);
        if single_word && self.next_non_space() == Some('(') {
            self.push(TokenKind::Invoke(Callee::routine(&name)), column);
        } else if single_word && math_font && self.math {
            let (base, inner) = match name.split_once('_') {
                Some((base, sub)) => (base.to_string(), Some(sub.to_string())),
                None => (name, None),
            };
            self.push(
                TokenKind::Ident(Symbol {
                    base,
                    subscript: scripts.or(inner),
                }),
                column,
            );
        } else {
            self.push_prose(&strip_commands(raw));
        }
    }

    fn math_char(&mut self, c: char) {
        let column = self.pos + 1;
        if c.is_ascii_alphabetic() {
            let word = self.read_while(|c| c.is_ascii_alphabetic());
            let subscript = self.read_scripts();
            if word.len() > 1 && self.next_non_space() == Some('(') {
                self.push(TokenKind::Invoke(Callee::routine(&word)), column);
            } else {
                self.push(
                    TokenKind::Ident(Symbol {
                        base: word,
                        subscript,
                    }),
                    column,
                );
            }
            return;
        }
        if c.is_ascii_digit() {
            let literal = self.read_while(|c| c.is_ascii_alphanumeric());
            self.read_scripts();
            self.push(TokenKind::Literal(literal), column);
            return;
        }
        self.pos += 1;
        match c {
            ':' if self.peek() == Some('=') => {
                self.pos += 1;
                self.push(TokenKind::Assign { compound: false }, column);
            }
            '=' => {
                let compound = matches!(
                    self.line.tokens.last(),
                    Some(Token { kind: TokenKind::Operator(op), .. }) if COMPOUND_OPERATORS.contains(&op.as_str())
                );
                if compound {
                    let operator = self.line.tokens.pop().map_or(column, |t| t.column);
                    self.push(TokenKind::Assign { compound: true }, operator);
                } else {
                    self.push(TokenKind::Operator("=".to_string()), column);
                }
            }
            ',' => self.push(
                TokenKind::Comma {
                    top_level: self.nesting == 0,
                },
                column,
            ),
            ';' => self.push(TokenKind::Semicolon, column),
            '(' | '[' | '{' => self.nesting += 1,
            ')' | ']' | '}' => self.nesting = self.nesting.saturating_sub(1),
            '_' | '^' => {
                self.pos -= 1;
                self.read_scripts();
            }
            '+' | '-' | '*' | '/' | '&' | '|' | '<' | '>' => {
                self.push(TokenKind::Operator(c.to_string()), column)
            }
            _ => {}
        }
    }

    fn text_char(&mut self, c: char) {
        if c.is_alphanumeric() {
            let word = self.read_while(|c| c.is_alphanumeric() || c == '-' || c == '\'');
            self.push_prose(&word);
        } else {
            self.pos += 1;
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Drops LaTeX commands and grouping characters, keeping the words.
pub(crate) fn strip_commands(raw: &str) -> String {
    let mut out = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut skipped = false;
                while chars.peek().map_or(false, |c| c.is_ascii_alphabetic()) {
                    chars.next();
                    skipped = true;
                }
                if !skipped {
                    chars.next();
                }
                out.push(' ');
            }
            '{' | '}' | '$' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}
