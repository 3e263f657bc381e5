//! YAML parse diagnostics for configuration files.
//!
//! Converts `serde_saphyr` errors into [`miette`] diagnostics that point at the
//! offending character and carry a hint for the usual indentation mistakes.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_saphyr::Error as YamlError;
use thiserror::Error;

const YAML_HINTS: [(&str, &str); 3] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or add quotes around values where needed.",
    ),
    (
        "unresolved placeholder",
        "Write makefile variables as `{ var: NAME }` instead of `${NAME}`.",
    ),
];

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(genmake::config::yaml))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

const TAB_HINT: &str = "Use spaces for indentation; tabs are invalid in YAML.";

/// Where an error points: a one-character span and whether its line is
/// indented with a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    span: SourceSpan,
    tab_indented: bool,
}

/// Locate the 1-based `line`/`column` pair in `src`.
///
/// Columns past the end of a line clamp to its end, lines past the end of the
/// document clamp to its length, and `\r\n` endings are tolerated.
fn locate(src: &str, line: u64, column: u64) -> Position {
    let line_idx = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
    let column_idx = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    let found = src
        .split_inclusive('\n')
        .scan(0usize, |start, segment| {
            let at = *start;
            *start += segment.len();
            Some((at, segment.trim_end_matches(['\n', '\r'])))
        })
        .nth(line_idx);
    let Some((line_start, text)) = found else {
        return Position {
            span: SourceSpan::new(src.len().into(), 0),
            tab_indented: false,
        };
    };
    let (offset, len) = text
        .char_indices()
        .nth(column_idx)
        .map_or((text.len(), 0), |(at, c)| (at, c.len_utf8()));
    Position {
        span: SourceSpan::new((line_start + offset).into(), len),
        tab_indented: text
            .chars()
            .take_while(|c| c.is_whitespace())
            .any(|c| c == '\t'),
    }
}

fn hint_for(message: &str, tab_indented: bool) -> Option<String> {
    if tab_indented {
        return Some(TAB_HINT.to_owned());
    }
    let lower = message.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(*needle))
        .map(|(_, hint)| (*hint).to_owned())
}

/// Map a `serde_saphyr` error for the file `name` into a diagnostic.
#[must_use]
pub fn map_yaml_error(
    err: YamlError,
    src: &str,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let loc = err.location();
    let (line, col) = loc.map_or((1, 1), |l| (l.line(), l.column()));
    let position = loc.map(|l| locate(src, l.line(), l.column()));
    let err_str = err.to_string();
    let help = hint_for(&err_str, position.is_some_and(|p| p.tab_indented));
    let span = position.map(|p| p.span);
    Box::new(YamlDiagnostic {
        src: NamedSource::new(name, src.to_owned()),
        span,
        help,
        source: err,
        message: format!("YAML parse error in {name} at line {line}, column {col}: {err_str}"),
    })
}
