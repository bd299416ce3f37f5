// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::config::StyleGuide;
use crate::document::{Document, HashDescription, SectionKind};
use crate::scanner::Callee;
use crate::source::Location;
use crate::test_helpers::{hash_document, CLEAN_BODY};

const SURVEY: &str = r"\newcommand{\rotl}{\operatorname{rotl}}
\section{Introduction}
\subsection{Why hashes}
Hashes are everywhere.
\section{Building Blocks}
\begin{algorithmic}
\Function{Mix}{$a, b$}
\State \Return $a \oplus \rotl(b)$
\EndFunction
\end{algorithmic}
\section{Multiplicative Hashes}
\newcommand{\mulhi}{\operatorname{mulhi}}
\subsection{FNV\_1a}
\begin{algorithmic}
\State $v_1 \gets \Call{Mix}{v_1, x_i}$
\end{algorithmic}
\paragraph{Finalizer} None, the state
is returned as is.

\subsection{Second}
\paragraph{\textsc{Round}} Rotates and multiplies.
";

#[test]
fn test_sections() {
    let document = Document::parse(SURVEY, &StyleGuide::default());
    assert_eq!(document.preamble.len(), 1);
    assert_eq!(document.preamble[0].callee, Callee::macro_("rotl"));
    assert_eq!(document.preamble[0].location, Location::line(1));

    let kinds: Vec<SectionKind> = document.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SectionKind::Prose, SectionKind::Shared, SectionKind::Hashes]
    );
    assert!(document.sections[0].descriptions.is_empty());
    assert_eq!(document.sections[2].title, "Multiplicative Hashes");
    assert_eq!(document.sections[2].location, Location::line(11));
}

#[test]
fn test_definitions() {
    let document = Document::parse(SURVEY, &StyleGuide::default());

    let shared = &document.sections[1];
    assert_eq!(shared.intro.len(), 1);
    assert_eq!(shared.intro[0].callee, Callee::routine("Mix"));
    assert_eq!(shared.intro[0].location, Location::line(7));
    assert_eq!(shared.intro[0].body.len(), 1);
    assert_eq!(shared.intro[0].body[0].callee, Callee::macro_("rotl"));
    assert_eq!(shared.intro[0].body[0].location.line, 8);

    let hashes = &document.sections[2];
    assert_eq!(hashes.intro.len(), 1);
    assert_eq!(hashes.intro[0].callee, Callee::macro_("mulhi"));
}

#[test]
fn test_descriptions() {
    let document = Document::parse(SURVEY, &StyleGuide::default());
    let names: Vec<&str> = document.descriptions().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["FNV_1a", "Second"]);

    let fnv = &document.sections[2].descriptions[0];
    assert_eq!(fnv.location, Location::line(13));
    assert_eq!(fnv.blocks.len(), 1);
    assert_eq!(fnv.blocks[0].location, Location::line(14));
    assert_eq!(fnv.blocks[0].lines.len(), 1);
    assert!(fnv.blocks[0].terminated);
    assert_eq!(
        fnv.finalizer.as_deref(),
        Some("None, the state is returned as is.")
    );
    assert_eq!(fnv.invocations()[0].callee, Callee::routine("Mix"));

    let second = &document.sections[2].descriptions[1];
    assert!(second.blocks.is_empty());
    assert_eq!(second.definitions.len(), 1);
    assert_eq!(second.definitions[0].callee, Callee::routine("Round"));
    assert_eq!(second.definitions[0].location, Location::line(21));
}

#[test]
fn test_description_attributes() {
    let guide = StyleGuide::default();
    let description = HashDescription::parse(&hash_document(CLEAN_BODY), &guide);
    assert_eq!(description.name, "ToyHash");
    assert_eq!(description.location, Location::line(3));
    assert_eq!(description.pseudocode().map(|b| b.lines.len()), Some(9));
    assert_eq!(
        description.state_words(&guide).into_iter().collect::<Vec<_>>(),
        vec!["v_1"]
    );
    assert_eq!(
        description.constants(&guide).into_iter().collect::<Vec<_>>(),
        vec!["s_1", "s_2"]
    );
    // The preamble macro is part of the text, so it is a local definition here.
    assert_eq!(description.definitions.len(), 1);
}

#[test]
fn test_unterminated_block_ends_at_next_heading() {
    let text = r"\section{Hashes}
\subsection{A}
\begin{algorithmic}
\State $v_1 \gets seed$
\subsection{B}
\begin{algorithmic}
\State $v_1 \gets seed$
\end{algorithmic}";
    let document = Document::parse(text, &StyleGuide::default());
    let descriptions: Vec<_> = document.descriptions().collect();
    assert!(!descriptions[0].blocks[0].terminated);
    assert_eq!(descriptions[0].blocks[0].lines.len(), 1);
    assert!(descriptions[1].blocks[0].terminated);
}

#[test]
fn test_comments_are_invisible() {
    let text = r"\section{Hashes}
\subsection{A}
% \begin{algorithmic}
\newcommand{\xs}{\oplus} % \newcommand{\ys}{\oplus}";
    let document = Document::parse(text, &StyleGuide::default());
    let description = &document.sections[0].descriptions[0];
    assert!(description.blocks.is_empty());
    assert_eq!(description.definitions.len(), 1);
}

#[test]
fn test_definition_blocks_are_not_pseudocode() {
    let text = r"\section{Hashes}
\subsection{A}
\begin{algorithmic}
\Procedure{Round}{$v, x$}
\State $v \gets \rotl(v + x)$
\EndProcedure
\Function{Avalanche}{$v$}
\State \Return $v$
\EndFunction
\end{algorithmic}";
    let document = Document::parse(text, &StyleGuide::default());
    let description = &document.sections[0].descriptions[0];
    assert!(description.blocks.is_empty());
    let defined: Vec<String> = description
        .definitions
        .iter()
        .map(|d| d.callee.to_string())
        .collect();
    assert_eq!(defined, vec!["Round", "Avalanche"]);
    assert_eq!(description.definitions[0].body.len(), 1);
    assert!(description.definitions[1].body.is_empty());
}

#[test]
fn test_configured_section_kinds() {
    let guide = StyleGuide {
        shared_sections: vec!["Primitives".to_string()],
        ..StyleGuide::default()
    };
    let text = r"\section{primitives}
\newcommand{\xs}{\oplus}
\subsection{Not a hash}";
    let document = Document::parse(text, &guide);
    assert_eq!(document.sections[0].kind, SectionKind::Shared);
    assert_eq!(document.sections[0].intro.len(), 1);
    assert_eq!(document.descriptions().count(), 0);
}
