// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::config::StyleGuide;
use crate::scanner::{scan_line, Callee, CalleeKind, Keyword, ScannedLine, Symbol, TokenKind};

fn scan(text: &str) -> ScannedLine {
    scan_line(text, false, &StyleGuide::default())
}

fn kinds(line: &ScannedLine) -> Vec<TokenKind> {
    line.tokens.iter().map(|t| t.kind.clone()).collect()
}

fn ident(base: &str, subscript: Option<&str>) -> TokenKind {
    TokenKind::Ident(Symbol::new(base, subscript))
}

#[test]
fn test_plain_assignment() {
    let line = scan(r"\State $v_1 \gets seed + s_1$");
    assert_eq!(line.keyword, Some(Keyword::State));
    assert_eq!(
        kinds(&line),
        vec![
            ident("v", Some("1")),
            TokenKind::Assign { compound: false },
            ident("seed", None),
            TokenKind::Operator("+".to_string()),
            ident("s", Some("1")),
        ]
    );
    assert_eq!(line.tokens[0].column, 9);
    assert!(!line.ends_in_math);
}

#[test]
fn test_compound_assignments() {
    let line = scan(r"\State $v_1 \mathrel{\oplus}= x_i$");
    assert_eq!(
        kinds(&line),
        vec![
            ident("v", Some("1")),
            TokenKind::Assign { compound: true },
            ident("x", Some("i")),
        ]
    );

    let line = scan(r"\State $p += 8$");
    assert_eq!(
        kinds(&line),
        vec![
            ident("p", None),
            TokenKind::Assign { compound: true },
            TokenKind::Literal("8".to_string()),
        ]
    );
    // The assignment takes the column of its operator.
    assert_eq!(line.tokens[1].column, 11);

    let line = scan(r"\State $v_1 := v_1 \oplus x_i$");
    assert_eq!(line.tokens[1].kind, TokenKind::Assign { compound: false });
}

#[test]
fn test_invocations() {
    let line = scan(r"\State $v_1 \gets \Call{MEOW\_MIX}{v_1, x_i}$");
    let invocations: Vec<_> = line.invocations().collect();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].0, &Callee::routine("MEOW_MIX"));
    assert_eq!(invocations[0].1, 19);

    let line = scan(r"\State $v_1 \gets \rotl(v_1, 31) \oplus \textsc{Round}(x_i)$");
    let callees: Vec<String> = line.invocations().map(|(c, _)| c.to_string()).collect();
    assert_eq!(callees, vec![r"\rotl", "Round"]);

    let line = scan(r"\State $v_1 \gets \mathrm{mix}(v_1) + \mathrm{rotl}$");
    let callees: Vec<&Callee> = line.invocations().map(|(c, _)| c).collect();
    assert_eq!(callees, vec![&Callee::routine("mix")]);
    assert_eq!(
        line.identifiers().map(|(s, _)| s.to_string()).collect::<Vec<_>>(),
        vec!["v_1", "v_1", "rotl"]
    );
}

#[test]
fn test_builtins_and_ignored_commands() {
    let line = scan(r"\State $v_1 \gets \left( v_1 \ll 13 \right) \cdot \lfloor n \rfloor$");
    assert_eq!(line.invocations().count(), 0);

    let guide = StyleGuide {
        ignored_commands: vec![r"\bits".to_string()],
        ..StyleGuide::default()
    };
    let line = scan_line(r"\State $v_1 \gets \bits{64} \xs$", false, &guide);
    let callees: Vec<&Callee> = line.invocations().map(|(c, _)| c).collect();
    assert_eq!(callees, vec![&Callee::macro_("xs")]);
    assert_eq!(callees[0].kind, CalleeKind::Macro);
}

#[test]
fn test_scripts() {
    let line = scan(r"\State $v_1 \gets v_1 \cdot s_1^{(64)} + x_{i+1} + \mathit{seed}$");
    let symbols: Vec<String> = line.identifiers().map(|(s, _)| s.to_string()).collect();
    assert_eq!(symbols, vec!["v_1", "v_1", "s_1", "x_{i+1}", "seed"]);
}

#[test]
fn test_greek_letters_are_identifiers() {
    let line = scan(r"\State $\sigma_2 \gets \sigma_1$");
    assert_eq!(line.tokens[0].kind, ident("sigma", Some("2")));
}

#[test]
fn test_prose() {
    let line = scan(r"\State \Comment{Tail: remaining \emph{bytes}}");
    assert_eq!(line.normalized_prose(), "tail remaining bytes");
    assert!(line.tokens.is_empty());

    let line = scan(r"\State \emph{No finalizer.}");
    assert_eq!(line.normalized_prose(), "no finalizer");
}

#[test]
fn test_loop_headers() {
    let line = scan(r"\ForAll{$x_i \in$ blocks}");
    assert_eq!(line.keyword, Some(Keyword::ForAll));
    assert_eq!(kinds(&line), vec![ident("x", Some("i")), TokenKind::In]);
    assert_eq!(line.prose, "blocks");

    let line = scan(r"\For{$i \gets 0$ \textbf{to} $n - 1$}");
    assert_eq!(line.keyword, Some(Keyword::For));
    assert_eq!(line.prose, "to");
}

#[test]
fn test_routine_labels() {
    let line = scan(r"\Function{Mix\_Lanes}{$a, b$}");
    assert_eq!(line.keyword, Some(Keyword::Function));
    assert_eq!(line.label.as_deref(), Some("Mix_Lanes"));
    assert!(line.keyword.unwrap().opens_routine());
}

#[test]
fn test_commas() {
    let line = scan(r"\State $v_1 \gets \mathrm{mix}(v_1, x_1), v_2 \gets s_2$");
    let commas: Vec<bool> = line
        .tokens
        .iter()
        .filter_map(|t| match t.kind {
            TokenKind::Comma { top_level } => Some(top_level),
            _ => None,
        })
        .collect();
    assert_eq!(commas, vec![false, true]);
}

#[test]
fn test_math_spans_lines() {
    let guide = StyleGuide::default();
    let first = scan_line(r"\State $v_1 \gets", false, &guide);
    assert!(first.ends_in_math);
    let second = scan_line(r"  s_1 + x_1$", first.ends_in_math, &guide);
    assert!(!second.ends_in_math);
    assert_eq!(
        second.identifiers().map(|(s, _)| s.to_string()).collect::<Vec<_>>(),
        vec!["s_1", "x_1"]
    );
}

#[test]
fn test_literals() {
    let line = scan(r"\State $v_1 \gets 0x9E3779B1 \oplus \mathtt{PRIME64\_1}$");
    assert_eq!(line.tokens[2].kind, TokenKind::Literal("0x9E3779B1".to_string()));
    assert_eq!(
        line.tokens[4].kind,
        TokenKind::Literal(r"PRIME64\_1".to_string())
    );
    assert_eq!(line.identifiers().count(), 1);
}

#[test]
fn test_callee_parse() {
    assert_eq!(Callee::parse(r"\rotl"), Callee::macro_("rotl"));
    assert_eq!(Callee::parse("CLMUL"), Callee::routine("CLMUL"));
    assert_eq!(Callee::macro_(r"\rotl").to_string(), r"\rotl");
}

#[test]
fn test_standard_math_commands_are_not_invocations() {
    let line = scan(r"\State $v_1 \gets v_1 \bigoplus x_i \sim s_2 \ell \Rightarrow \vec{v_1}$");
    assert_eq!(line.invocations().count(), 0);
    let symbols: Vec<String> = line.identifiers().map(|(s, _)| s.to_string()).collect();
    assert_eq!(symbols, ["v_1", "v_1", "x_i", "s_2", "v_1"]);

    assert_eq!(scan(r"\State \Break").invocations().count(), 0);
    assert_eq!(scan(r"\If{$p \ge n$} \Continue").invocations().count(), 0);
}
