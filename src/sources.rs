//! Source file discovery.
//!
//! [`SourceLister`] is the seam between the generator and the filesystem.
//! [`WalkDirLister`] walks the tree with `walkdir`; tests substitute an
//! in-memory list.

use crate::paths::strip_current_dir;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors raised while enumerating source files.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    /// The directory walk failed.
    #[error("failed to scan source tree at {root}")]
    #[diagnostic(code(genmake::sources::walk))]
    Walk {
        /// Root of the scan.
        root: Utf8PathBuf,
        /// Underlying traversal error.
        #[source]
        source: walkdir::Error,
    },
    /// A matching file has a name that is not valid UTF-8.
    #[error("source path {path} is not valid UTF-8")]
    #[diagnostic(
        code(genmake::sources::non_utf8),
        help("rename the file or exclude its extension")
    )]
    NonUtf8 {
        /// Lossy rendering of the path.
        path: String,
    },
}

/// Enumerates the source files of a project.
pub trait SourceLister {
    /// List files beneath `root` whose names end with one of `extensions`.
    ///
    /// Returned paths include `root` as a prefix unless `root` is `.`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the tree cannot be read.
    fn list(&self, root: &Utf8Path, extensions: &[String]) -> Result<Vec<Utf8PathBuf>, SourceError>;
}

/// Recursive filesystem lister backed by [`WalkDir`].
///
/// Symbolic links are not followed and entries are visited in file-name
/// order.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkDirLister;

impl SourceLister for WalkDirLister {
    fn list(&self, root: &Utf8Path, extensions: &[String]) -> Result<Vec<Utf8PathBuf>, SourceError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name();
        for walk_entry in walker {
            let entry = walk_entry.map_err(|source| SourceError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !matches_extension(&file_name, extensions) {
                continue;
            }
            let path = Utf8PathBuf::from_path_buf(entry.into_path()).map_err(|path_buf| {
                SourceError::NonUtf8 {
                    path: path_buf.to_string_lossy().into_owned(),
                }
            })?;
            debug!(%path, "discovered source");
            files.push(strip_current_dir(&path));
        }
        if files.is_empty() {
            warn!(%root, ?extensions, "no source files found");
        }
        Ok(files)
    }
}

/// Whether `file_name` ends with any of `extensions`.
fn matches_extension(file_name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
}
