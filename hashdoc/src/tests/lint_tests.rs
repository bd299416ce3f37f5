// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::config::StyleGuide;
use crate::document::Document;
use crate::lint::{lint, lint_with, Checks};
use crate::outline::outline;
use crate::report::{Report, ViolationKind};
use crate::source::Source;
use crate::structure::Phase;
use crate::test_helpers::{hash_document, remove_line, replace_line, CLEAN_BODY};
use proptest::{collection, prelude::*};

#[test]
fn test_clean_document() {
    let report = lint(&hash_document(CLEAN_BODY), &StyleGuide::default());
    assert!(report.is_clean());
    assert_eq!(report.summary().to_string(), "No violations found.");
}

#[test]
fn test_all_checks_report() {
    let guide = StyleGuide::default();
    let text = hash_document(
        &CLEAN_BODY
            .replace(r"\State \Comment{No finalizer}", r"\State $v_1 \gets \Call{MEOW\_MIX}{v_1}$")
            .replace(r"\State $v_1 \gets \rotl(v_1 + x_i \cdot s_2)$", r"\State $acc \gets x_i$"),
    );
    let report = lint(&text, &guide);
    let summary = report.summary();
    assert_eq!(summary.notation, 1);
    assert_eq!(summary.structure, 1);
    assert_eq!(summary.reference, 1);
    assert_eq!(
        summary.to_string(),
        "3 violation(s): 1 notation, 1 structure, 1 reference"
    );

    // Findings are ordered by location.
    let kinds: Vec<ViolationKind> = report.violations().map(|v| v.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ViolationKind::Notation,
            ViolationKind::Reference,
            ViolationKind::Structure
        ]
    );
}

#[test]
fn test_skipping_checks() {
    let text = replace_line(8, r"\State $acc \gets acc + x_i$");
    let guide = StyleGuide::default();
    assert_eq!(lint(&text, &guide).count(ViolationKind::Notation), 2);
    let report = lint_with(&text, &guide, Checks::default().skip(ViolationKind::Notation));
    assert!(report.is_clean());
}

#[test]
fn test_located_findings() {
    let text = replace_line(8, r"\State $acc \gets acc + x_i$");
    let report = lint(&text, &StyleGuide::default());
    let located = report.locate(&Source::from_text("toy.tex", &text));
    assert_eq!(
        located[0].to_string(),
        "toy.tex:8:9: notation: ad-hoc name \"acc\" is not in the symbol table [ToyHash]"
    );
    assert_eq!(located[1].column, 19);
}

#[test]
fn test_report_serialization() {
    let report = lint(&remove_line(12), &StyleGuide::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["findings"][0]["description"], "ToyHash");
    assert_eq!(json["findings"][0]["violation"]["kind"], "structure");
    assert_eq!(
        json["findings"][0]["violation"]["detail"]["violation"],
        "missing_phase"
    );
    assert_eq!(
        json["findings"][0]["violation"]["detail"]["phase"],
        "finalize"
    );
}

#[test]
fn test_outline() {
    let guide = StyleGuide::default();
    let document = Document::parse(&hash_document(CLEAN_BODY), &guide);
    let sections = outline(&document, &guide);
    assert_eq!(sections.len(), 1);
    let toy = &sections[0].descriptions[0];
    assert_eq!(toy.name, "ToyHash");
    assert_eq!(toy.state_words, vec!["v_1".to_string()]);
    assert_eq!(toy.constants, vec!["s_1".to_string(), "s_2".to_string()]);
    assert_eq!(toy.phases, Phase::CANONICAL.to_vec());
    assert!(toy.to_string().contains(
        "phases: initialize > main loop > tail > lane collapse > finalize > return"
    ));
}

const FRAGMENTS: &[&str] = &[
    r"\section{Hashes}",
    r"\section{Building Blocks}",
    r"\subsection{Toy}",
    r"\begin{algorithmic}",
    r"\end{algorithmic}",
    r"\State \Comment{Initialize} $v_1 \gets seed$",
    r"\For{$i \gets 1$ \textbf{to} $n$}",
    r"\EndFor",
    r"\State $acc \gets acc + x_i$",
    r"\State $s_1 \gets s_1 \oplus v_1$",
    r"\State $v_1 \gets \Call{MEOW\_MIX}{v_1}$",
    r"\State \Comment{Tail} $v_1 \gets v_1 + x_n$",
    r"\State \Comment{No finalizer}",
    r"\Return $v_1$",
    r"\newcommand{\rotl}{\operatorname{rotl}}",
    r"\newcommand{\fmix}{\xs\rotl}",
    r"\paragraph{\textsc{MEOW\_MIX}} Mixes.",
    r"\State $v_1 \gets \rotl(v_1)$ % \Call{Missing}",
];

proptest! {
    #[test]
    fn test_lint_is_idempotent(lines in collection::vec(prop::sample::select(FRAGMENTS.to_vec()), 0..40)) {
        let text = lines.join("\n");
        let guide = StyleGuide::default();
        let first = lint(&text, &guide);
        let second = lint(&text, &guide);
        prop_assert_eq!(&first, &second);

        // The report does not depend on the order findings were collected in.
        let mut findings = first.findings().to_vec();
        findings.reverse();
        prop_assert_eq!(Report::new(findings), first);
    }
}
