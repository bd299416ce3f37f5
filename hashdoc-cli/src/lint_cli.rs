// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use hashdoc::config::StyleGuide;
use hashdoc::document::Document;
use hashdoc::error::{HashDocError, HashDocResult};
use hashdoc::lint::{lint_document, Checks};
use hashdoc::outline::outline;
use hashdoc::report::{LocatedFinding, Summary, ViolationKind};
use hashdoc::source::Source;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashdoc-lint")]
#[command(about = "Checks hash descriptions in a LaTeX survey against the notation style guide.", long_about = None)]
struct Cli {
    /// Log what the checks are doing to stderr.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check documents and report every violation.
    Check(CheckArguments),

    /// Print the sections and hash descriptions of a document as the checks see them.
    Outline(OutlineArguments),

    /// Print the symbol role table.
    Roles(RolesArguments),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Check {
    Notation,
    Structure,
    Reference,
}

impl From<Check> for ViolationKind {
    fn from(check: Check) -> Self {
        match check {
            Check::Notation => ViolationKind::Notation,
            Check::Structure => ViolationKind::Structure,
            Check::Reference => ViolationKind::Reference,
        }
    }
}

#[derive(Parser, Clone)]
struct CheckArguments {
    /// LaTeX files to check. Use - to read from stdin.
    #[clap(required = true)]
    files: Vec<PathBuf>,

    /// A JSON style guide overriding the defaults.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Output format.
    #[clap(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Expand \input and \include lines.
    #[clap(long)]
    follow_inputs: bool,

    /// Skip a check. May be repeated.
    #[clap(long, value_enum)]
    skip: Vec<Check>,
}

#[derive(Parser, Clone)]
struct OutlineArguments {
    /// The LaTeX file. Use - to read from stdin.
    file: PathBuf,

    /// A JSON style guide overriding the defaults.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Output format.
    #[clap(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Expand \input and \include lines.
    #[clap(long)]
    follow_inputs: bool,
}

#[derive(Parser, Clone)]
struct RolesArguments {
    /// A JSON style guide overriding the defaults.
    #[clap(short, long)]
    config: Option<PathBuf>,
}

/// What to print, and whether the documents were free of violations.
struct Output {
    text: String,
    clean: bool,
}

#[derive(Serialize)]
struct JsonReport {
    findings: Vec<LocatedFinding>,
    summary: Summary,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match execute(cli.command) {
        Ok(output) => {
            println!("{}", output.text);
            std::process::exit(if output.clean {
                exitcode::OK
            } else {
                exitcode::DATAERR
            });
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(error: &HashDocError) -> exitcode::ExitCode {
    match error {
        HashDocError::Io { .. } | HashDocError::InputCycle(_) => exitcode::NOINPUT,
        HashDocError::InvalidConfig(_) => exitcode::CONFIG,
        HashDocError::InvalidInput => exitcode::SOFTWARE,
    }
}

fn load_guide(config: Option<&Path>) -> HashDocResult<StyleGuide> {
    match config {
        Some(path) => StyleGuide::load(path),
        None => Ok(StyleGuide::default()),
    }
}

fn load_source(path: &Path, follow_inputs: bool) -> HashDocResult<Source> {
    if path != Path::new("-") {
        return Source::load(path, follow_inputs);
    }
    if follow_inputs {
        warn!("Inputs are not expanded when reading from stdin");
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| HashDocError::Io {
            path: "<stdin>".to_string(),
            message: e.to_string(),
        })?;
    Ok(Source::from_text("<stdin>", &text))
}

fn to_json<T: Serialize>(value: &T) -> HashDocResult<String> {
    serde_json::to_string_pretty(value).map_err(|_| HashDocError::InvalidInput)
}

fn execute(cmd: Command) -> HashDocResult<Output> {
    match cmd {
        Command::Check(arguments) => {
            let guide = load_guide(arguments.config.as_deref())?;
            let checks = arguments
                .skip
                .iter()
                .fold(Checks::default(), |checks, skip| checks.skip((*skip).into()));

            let mut findings = vec![];
            let mut summary = Summary::default();
            for file in &arguments.files {
                let source = load_source(file, arguments.follow_inputs)?;
                let document = Document::parse(source.text(), &guide);
                let report = lint_document(&document, &guide, checks);
                debug!("{}: {}", file.display(), report.summary());

                let file_summary = report.summary();
                summary.notation += file_summary.notation;
                summary.structure += file_summary.structure;
                summary.reference += file_summary.reference;
                findings.extend(report.locate(&source));
            }

            let clean = summary.total() == 0;
            let text = match arguments.format {
                Format::Json => to_json(&JsonReport { findings, summary })?,
                Format::Text => findings
                    .iter()
                    .map(|f| f.to_string())
                    .chain(std::iter::once(summary.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            Ok(Output { text, clean })
        }

        Command::Outline(arguments) => {
            let guide = load_guide(arguments.config.as_deref())?;
            let source = load_source(&arguments.file, arguments.follow_inputs)?;
            let document = Document::parse(source.text(), &guide);
            let sections = outline(&document, &guide);

            let text = match arguments.format {
                Format::Json => to_json(&sections)?,
                Format::Text => {
                    let mut lines = vec![];
                    for section in &sections {
                        lines.push(format!("{} (line {})", section.title, section.line));
                        lines.extend(section.descriptions.iter().map(|d| d.to_string()));
                    }
                    lines.join("\n")
                }
            };
            Ok(Output { text, clean: true })
        }

        Command::Roles(arguments) => {
            let guide = load_guide(arguments.config.as_deref())?;
            let mut lines: Vec<String> = guide
                .symbols
                .iter()
                .map(|rule| {
                    let permitted: Vec<String> = rule
                        .role
                        .permitted()
                        .iter()
                        .map(|u| u.to_string())
                        .collect();
                    format!(
                        "{:<6} {:<12} {}",
                        rule.name,
                        rule.role.to_string(),
                        permitted.join(", ")
                    )
                })
                .collect();
            lines.push(format!("Loop indices: {}", guide.indices.join(", ")));
            Ok(Output {
                text: lines.join("\n"),
                clean: true,
            })
        }
    }
}
