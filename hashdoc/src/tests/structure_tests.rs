// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::config::StyleGuide;
use crate::document::{Document, HashDescription};
use crate::lint::lint;
use crate::report::StructureViolation;
use crate::scanner::Callee;
use crate::source::Location;
use crate::structure::{check_section_order, check_structure, classify_phases, phase_runs, Phase};
use crate::test_helpers::{hash_document, remove_line, replace_line, CLEAN_BODY};

fn violations(text: &str) -> Vec<StructureViolation> {
    let guide = StyleGuide::default();
    check_structure(&HashDescription::parse(text, &guide), &guide)
}

#[test]
fn test_clean_structure() {
    assert!(violations(&hash_document(CLEAN_BODY)).is_empty());

    let guide = StyleGuide::default();
    let description = HashDescription::parse(&hash_document(CLEAN_BODY), &guide);
    let phases: Vec<Phase> = phase_runs(&description.blocks[0], &guide)
        .into_iter()
        .map(|r| r.phase)
        .collect();
    assert_eq!(phases, Phase::CANONICAL.to_vec());
}

#[test]
fn test_missing_finalizer() {
    assert_eq!(
        violations(&remove_line(12)),
        vec![StructureViolation::MissingPhase {
            phase: Phase::Finalize,
            location: Location::line(12),
        }]
    );
    assert_eq!(
        violations(&remove_line(12))[0].to_string(),
        "missing phase: finalize"
    );
}

#[test]
fn test_finalizer_in_a_comment_is_absent() {
    let violations = violations(&replace_line(12, r"\State % No finalizer"));
    assert_eq!(
        violations,
        vec![StructureViolation::MissingPhase {
            phase: Phase::Finalize,
            location: Location::line(13),
        }]
    );
}

#[test]
fn test_identity_finalizer_stated_in_prose() {
    assert!(violations(&replace_line(12, r"\Statex \emph{No finalizer.}")).is_empty());
    assert!(violations(&replace_line(12, r"\State $v_1 \gets \fmix(v_1)$")).is_empty());
}

#[test]
fn test_phases_stated_by_absence() {
    let body = CLEAN_BODY
        .replace("Tail: no remaining bytes", "No tail: whole words only")
        .replace("Lane collapse: single lane", "No lane collapse: single lane")
        .replace("No finalizer", "Identity finalizer");
    assert!(violations(&hash_document(&body)).is_empty());

    for (line, statement) in [
        (10, r"\State \Comment{Without remaining bytes}"),
        (11, r"\State \Comment{No collapse}"),
        (11, r"\State \Comment{Single lane, nothing to merge}"),
        (12, r"\State \Comment{Identity}"),
        (12, r"\Statex \emph{Trivial finalizer.}"),
    ] {
        assert!(
            violations(&replace_line(line, statement)).is_empty(),
            "{}",
            statement
        );
    }
}

#[test]
fn test_keywords_match_whole_words() {
    let guide = StyleGuide::default();
    let body = r"\State \Comment{Initialize} $v_1 \gets seed$
\For{$i \gets 1$ \textbf{to} $n$} \Comment{Main loop}
\State \Comment{Outputs of the round} $v_1 \gets v_1 + x_i$
\State \Comment{Finally rotate} $v_1 \gets \rotl(v_1)$
\EndFor";
    let description = HashDescription::parse(&hash_document(body), &guide);
    assert_eq!(
        classify_phases(&description.blocks[0], &guide),
        vec![
            Some(Phase::Init),
            Some(Phase::MainLoop),
            Some(Phase::MainLoop),
            Some(Phase::MainLoop),
            Some(Phase::MainLoop),
        ]
    );
}

#[test]
fn test_function_listing_is_the_pseudocode() {
    let guide = StyleGuide::default();
    let body = format!("\\Function{{ToyHash}}{{$x, seed$}}\n{CLEAN_BODY}\n\\EndFunction");
    let description = HashDescription::parse(&hash_document(&body), &guide);
    assert_eq!(description.blocks.len(), 1);
    assert_eq!(description.blocks[0].lines.len(), 9);
    assert!(description
        .definitions
        .iter()
        .any(|d| d.callee == Callee::routine("ToyHash")));
    assert!(check_structure(&description, &guide).is_empty());
    assert!(lint(&hash_document(&body), &guide).is_clean());

    let body = body.replace("\\State \\Comment{No finalizer}\n", "");
    assert_eq!(
        violations(&hash_document(&body)),
        vec![StructureViolation::MissingPhase {
            phase: Phase::Finalize,
            location: Location::line(13),
        }]
    );
}

#[test]
fn test_misordered_phases() {
    let body = CLEAN_BODY
        .replace("Tail: no remaining bytes", "PLACEHOLDER")
        .replace("Lane collapse: single lane", "Tail: no remaining bytes")
        .replace("PLACEHOLDER", "Lane collapse: single lane");
    assert_eq!(
        violations(&hash_document(&body)),
        vec![StructureViolation::MisorderedPhase {
            phase: Phase::Tail,
            after: Phase::Collapse,
            location: Location::line(11),
        }]
    );
}

#[test]
fn test_duplicate_phase() {
    let violations = violations(&replace_line(10, r"\State \Comment{Initialize the tail}"));
    assert_eq!(
        violations,
        vec![
            StructureViolation::DuplicatePhase {
                phase: Phase::Init,
                location: Location::line(10),
                first: Location::line(6),
            },
            StructureViolation::MissingPhase {
                phase: Phase::Tail,
                location: Location::line(11),
            },
        ]
    );
    assert_eq!(
        violations[0].to_string(),
        "duplicated phase: initialize already started at line 6"
    );
}

#[test]
fn test_pseudocode_blocks() {
    let guide = StyleGuide::default();
    let text = r"\section{Hashes}
\subsection{Empty}
Nothing to see here.
\subsection{Twice}
\begin{algorithmic}
\State \Comment{Initialize} $v_1 \gets seed$
\Loop
\State $v_1 \gets v_1 + x_i$
\EndLoop
\State \Comment{Tail} $v_1 \gets v_1$
\State \Comment{Collapse} $v_1 \gets v_1$
\State \Comment{Avalanche} $v_1 \gets v_1$
\Return $v_1$
\end{algorithmic}
\begin{algorithmic}
\State $v_1 \gets seed$
\end{algorithmic}";
    let document = Document::parse(text, &guide);
    let descriptions: Vec<_> = document.descriptions().collect();
    assert_eq!(
        check_structure(descriptions[0], &guide),
        vec![StructureViolation::MissingPseudocode {
            location: Location::line(2),
        }]
    );
    assert_eq!(
        check_structure(descriptions[1], &guide),
        vec![StructureViolation::MultiplePseudocode {
            location: Location::line(15),
            first: Location::line(5),
        }]
    );
}

#[test]
fn test_unterminated_pseudocode() {
    let text = format!("\\section{{Hashes}}\n\\subsection{{ToyHash}}\n\\begin{{algorithmic}}\n{CLEAN_BODY}\n");
    assert_eq!(
        violations(&text),
        vec![StructureViolation::UnterminatedPseudocode {
            location: Location::line(3),
        }]
    );
}

#[test]
fn test_callee_cues() {
    let guide = StyleGuide::default();
    let body = r"\State \Comment{Initialize} $v_1 \gets seed$
\For{$i \gets 1$ \textbf{to} $n$}
\State $v_1 \gets v_1 + x_i$
\EndFor
\State $v_1 \gets \Call{MergeLanes}{v_1}$
\State $v_1 \gets \fmix(v_1)$
\Return $v_1$";
    let description = HashDescription::parse(&hash_document(body), &guide);
    assert_eq!(
        classify_phases(&description.blocks[0], &guide),
        vec![
            Some(Phase::Init),
            Some(Phase::MainLoop),
            Some(Phase::MainLoop),
            Some(Phase::MainLoop),
            Some(Phase::Collapse),
            Some(Phase::Finalize),
            Some(Phase::Return),
        ]
    );
}

#[test]
fn test_headers_have_no_phase() {
    let guide = StyleGuide::default();
    let description = HashDescription::parse(&hash_document(CLEAN_BODY), &guide);
    let phases = classify_phases(&description.blocks[0], &guide);
    assert_eq!(phases[0], None);
    assert_eq!(phases[1], Some(Phase::Init));
}

#[test]
fn test_custom_phase_keywords() {
    let guide = StyleGuide::from_json(r#"{ "phase_keywords": {
        "init": ["prepare"], "main_loop": ["stripe"], "tail": ["tail"],
        "collapse": ["fold"], "finalize": ["scramble"], "return": ["emit"] } }"#)
    .unwrap();
    let body = r"\State \Comment{Prepare} $v_1 \gets seed$
\State \Comment{Stripe} $v_1 \gets v_1 + x_1$
\State \Comment{Tail} $v_1 \gets v_1 + x_2$
\State \Comment{Fold} $v_1 \gets v_1$
\State \Comment{Scramble} $v_1 \gets v_1$
\State \Comment{Emit} $v_1$";
    let description = HashDescription::parse(&hash_document(body), &guide);
    assert!(check_structure(&description, &guide).is_empty());
}

#[test]
fn test_section_order() {
    let guide = StyleGuide {
        section_order: vec!["Hashes A".to_string(), "Hashes B".to_string()],
        ..StyleGuide::default()
    };
    let text = r"\section{Introduction}
\section{Hashes B}
\section{Hashes A}
\section{Other}";
    let document = Document::parse(text, &guide);
    assert_eq!(
        check_section_order(&document, &guide),
        vec![
            StructureViolation::MisorderedSection {
                title: "Hashes A".to_string(),
                after: "Hashes B".to_string(),
                location: Location::line(3),
            },
            StructureViolation::UnlistedSection {
                title: "Other".to_string(),
                location: Location::line(4),
            },
        ]
    );
    assert!(check_section_order(&document, &StyleGuide::default()).is_empty());
}
