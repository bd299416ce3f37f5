// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/// Sample survey documents used to test the hashdoc-lint tool.
pub mod lint_cli_test_vectors {

    /// A sample document and the first violation it should produce, if any.
    pub struct TestVector {
        pub name: &'static str,
        pub document: &'static str,
        pub expected: Option<&'static str>,
    }

    pub const CLEAN: TestVector = TestVector {
        name: "clean",
        document: r"\newcommand{\rotl}{\operatorname{rotl}}
\section{Hashes}
\subsection{ToyHash}
\begin{algorithmic}
\Require input words $x_1, \dots, x_n$ and $seed$
\State \Comment{Initialize} $v_1 \gets seed + s_1$
\For{$i \gets 1$ \textbf{to} $n$} \Comment{Main loop}
\State $v_1 \gets \rotl(v_1 + x_i \cdot s_2)$
\EndFor
\State \Comment{Tail: no remaining bytes}
\State \Comment{Lane collapse: single lane}
\State \Comment{No finalizer}
\Return $v_1$
\end{algorithmic}
",
        expected: None,
    };

    pub const AD_HOC_NAME: TestVector = TestVector {
        name: "ad-hoc",
        document: r"\newcommand{\rotl}{\operatorname{rotl}}
\section{Hashes}
\subsection{ToyHash}
\begin{algorithmic}
\Require input words $x_1, \dots, x_n$ and $seed$
\State \Comment{Initialize} $v_1 \gets seed + s_1$
\For{$i \gets 1$ \textbf{to} $n$} \Comment{Main loop}
\State $acc \gets \rotl(v_1 + x_i \cdot s_2)$
\EndFor
\State \Comment{Tail: no remaining bytes}
\State \Comment{Lane collapse: single lane}
\State \Comment{No finalizer}
\Return $v_1$
\end{algorithmic}
",
        expected: Some(
            r#":8:9: notation: ad-hoc name "acc" is not in the symbol table [ToyHash]"#,
        ),
    };

    pub const MISSING_FINALIZER: TestVector = TestVector {
        name: "missing-finalizer",
        document: r"\newcommand{\rotl}{\operatorname{rotl}}
\section{Hashes}
\subsection{ToyHash}
\begin{algorithmic}
\Require input words $x_1, \dots, x_n$ and $seed$
\State \Comment{Initialize} $v_1 \gets seed + s_1$
\For{$i \gets 1$ \textbf{to} $n$} \Comment{Main loop}
\State $v_1 \gets \rotl(v_1 + x_i \cdot s_2)$
\EndFor
\State \Comment{Tail: no remaining bytes}
\State \Comment{Lane collapse: single lane}
\Return $v_1$
\end{algorithmic}
",
        expected: Some(":12:1: structure: missing phase: finalize [ToyHash]"),
    };

    pub const UNDEFINED_FUNCTION: TestVector = TestVector {
        name: "undefined",
        document: r"\section{Hashes}
\subsection{MeowHash}
\begin{algorithmic}
\Require input words $x_1, \dots, x_n$ and $seed$
\State \Comment{Initialize} $v_1 \gets seed + s_1$
\For{$i \gets 1$ \textbf{to} $n$} \Comment{Main loop}
\State $v_1 \gets \Call{MEOW\_MIX}{v_1, x_i}$
\EndFor
\State \Comment{Tail: no remaining bytes}
\State \Comment{Lane collapse: single lane}
\State \Comment{No finalizer}
\Return $v_1$
\end{algorithmic}
",
        expected: Some(":7:19: reference: undefined: MEOW_MIX [MeowHash]"),
    };

    pub const CONSTANT_AS_STATE: TestVector = TestVector {
        name: "constant-as-state",
        document: r"\section{Hashes}
\subsection{ToyHash}
\begin{algorithmic}
\Require input words $x_1, \dots, x_n$ and $seed$
\State \Comment{Initialize} $v_1 \gets seed + s_1$
\For{$i \gets 1$ \textbf{to} $n$} \Comment{Main loop}
\State $s_1 \gets s_1 + x_i$
\EndFor
\State \Comment{Tail: no remaining bytes}
\State \Comment{Lane collapse: single lane}
\State \Comment{No finalizer}
\Return $v_1$
\end{algorithmic}
",
        expected: Some(
            ":7:9: notation: role mismatch: s_1 is a constant but is used as evolving state [ToyHash]",
        ),
    };

    pub const TEST_CASES: [TestVector; 5] = [
        CLEAN,
        AD_HOC_NAME,
        MISSING_FINALIZER,
        UNDEFINED_FUNCTION,
        CONSTANT_AS_STATE,
    ];
}
