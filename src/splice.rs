//! Template splicing.
//!
//! The Makefile template is copied line by line. Any line starting with
//! [`SENTINEL`] is replaced by the generated body; everything else, including
//! line terminators, is preserved byte for byte.

use crate::paths::parent_dir;
use camino::Utf8Path;
use miette::Diagnostic;
use std::fs;
use std::io::{self, Write};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Marker identifying the splice point in a template.
pub const SENTINEL: &str = "#body";

/// Errors raised while splicing a template.
#[derive(Debug, Error, Diagnostic)]
pub enum SpliceError {
    /// The template contains no line starting with [`SENTINEL`].
    #[error("template {template} has no `#body` line to replace")]
    #[diagnostic(
        code(genmake::splice::missing_splice_point),
        help("add a line beginning with `#body` where the rules should go")
    )]
    MissingSplicePoint {
        /// Name of the template.
        template: String,
    },
    /// The template could not be read.
    #[error("failed to read template {path}")]
    #[diagnostic(code(genmake::splice::read))]
    Read {
        /// Template path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The output could not be written.
    #[error("failed to write {path}")]
    #[diagnostic(code(genmake::splice::write))]
    Write {
        /// Output path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Replace every sentinel line of `template` with `body`.
///
/// `name` identifies the template in error messages.
///
/// # Errors
///
/// Returns [`SpliceError::MissingSplicePoint`] when no line starts with
/// [`SENTINEL`].
///
/// # Examples
///
/// ```
/// use genmake::splice::splice;
/// let out = splice("all: app\n#body\n", "app:\n\ttouch app\n", "makefile.in").unwrap();
/// assert_eq!(out, "all: app\napp:\n\ttouch app\n");
/// ```
pub fn splice(template: &str, body: &str, name: &str) -> Result<String, SpliceError> {
    let mut out = String::with_capacity(template.len() + body.len());
    let mut replaced = 0usize;
    for line in template.split_inclusive('\n') {
        if line.starts_with(SENTINEL) {
            out.push_str(body);
            replaced += 1;
        } else {
            out.push_str(line);
        }
    }
    if replaced == 0 {
        return Err(SpliceError::MissingSplicePoint {
            template: name.to_owned(),
        });
    }
    debug!(template = name, replaced, "spliced template");
    Ok(out)
}

/// Splice `body` into the template at `template_path` and write the result to
/// `output_path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`SpliceError`] when the template cannot be read, has no splice
/// point, or the output cannot be written.
pub fn splice_file(
    template_path: &Utf8Path,
    output_path: &Utf8Path,
    body: &str,
) -> Result<(), SpliceError> {
    let template = fs::read_to_string(template_path).map_err(|source| SpliceError::Read {
        path: template_path.to_string(),
        source,
    })?;
    let content = splice(&template, body, template_path.as_str())?;
    write_atomically(output_path, &content).map_err(|source| SpliceError::Write {
        path: output_path.to_string(),
        source,
    })?;
    info!("Generated makefile at {output_path}");
    Ok(())
}

/// Write through a temporary file in the destination directory so readers
/// never see a partial file.
fn write_atomically(path: &Utf8Path, content: &str) -> io::Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| Utf8Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn replaces_sentinel_in_place() {
        let template = "CXX ?= g++\n#body here\n-include $(deps)\n";
        let out = splice(template, "a:\n\ttouch a\n", "t").expect("splice");
        assert_eq!(out, "CXX ?= g++\na:\n\ttouch a\n-include $(deps)\n");
    }

    #[rstest]
    fn replaces_every_sentinel_identically() {
        let out = splice("#body\nmid\n#body\n", "X\n", "t").expect("splice");
        assert_eq!(out, "X\nmid\nX\n");
    }

    #[rstest]
    fn preserves_crlf_and_missing_final_newline() {
        let out = splice("a\r\n#body\r\nz", "B\n", "t").expect("splice");
        assert_eq!(out, "a\r\nB\nz");
    }

    #[rstest]
    #[case("all:\n\techo\n")]
    #[case("")]
    #[case("  #body\n")]
    fn missing_sentinel_is_an_error(#[case] template: &str) {
        assert!(matches!(
            splice(template, "x", "makefile.in"),
            Err(SpliceError::MissingSplicePoint { template: ref name }) if name == "makefile.in"
        ));
    }
}
