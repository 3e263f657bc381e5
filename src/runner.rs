//! CLI execution.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the configuration, assembles the rule graph and splices it into the
//! template.

use crate::assemble::{MakeBody, assemble};
use crate::cli::Cli;
use crate::config::{ConfigFile, GenConfig};
use crate::paths::strip_current_dir;
use crate::sources::{SourceError, SourceLister, WalkDirLister};
use crate::splice::splice_file;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use tracing::debug;

/// Hint printed once the makefile has been written.
pub const USAGE_HINT: &str = "build with: make config=debug|release";

/// Execute the parsed [`Cli`].
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the source tree cannot
/// be scanned, or the template cannot be spliced into the output.
pub fn run(cli: &Cli) -> Result<()> {
    let workspace = Workspace::new(cli.directory.clone());
    let config = load_config(cli, &workspace)?;
    let body = generate(&config, &workspace)?;
    let template = workspace.resolve(&config.template);
    let output = workspace.resolve(&config.output);
    splice_file(&template, &output, &body.render())
        .with_context(|| format!("writing {output} from {template}"))?;
    writeln!(io::stdout().lock(), "{USAGE_HINT}").context("print usage hint")?;
    Ok(())
}

/// Load the configuration selected by `cli` and apply its overrides.
fn load_config(cli: &Cli, workspace: &Workspace) -> Result<GenConfig> {
    let (path, required) = cli.config_path();
    let file = ConfigFile::load(&workspace.resolve(&path), required)
        .with_context(|| format!("loading configuration {path}"))?;
    let config = cli
        .apply_to(file)
        .resolve(cli.profile.as_deref())
        .context("resolving configuration")?;
    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Assemble the makefile body for `config`, scanning sources inside
/// `workspace`.
///
/// # Errors
///
/// Returns an error if the source tree cannot be scanned or the artefact
/// path collides with another rule.
pub fn generate(config: &GenConfig, workspace: &Workspace) -> Result<MakeBody> {
    let lister = InWorkspace {
        inner: WalkDirLister,
        workspace,
    };
    assemble(&lister, &config.layout, &config.toolchain)
        .with_context(|| format!("assembling rules for {}", config.layout.source_root))
}

/// Directory that relative paths are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    root: Option<Utf8PathBuf>,
}

impl Workspace {
    /// Workspace rooted at `root`, or the current directory when `None`.
    #[must_use]
    pub const fn new(root: Option<Utf8PathBuf>) -> Self {
        Self { root }
    }

    /// Resolve `path` against the workspace root unless it is absolute.
    #[must_use]
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Lists sources inside a workspace while reporting paths relative to it, so
/// generated rules never mention the `-C` directory.
struct InWorkspace<'a, L> {
    inner: L,
    workspace: &'a Workspace,
}

impl<L: SourceLister> SourceLister for InWorkspace<'_, L> {
    fn list(&self, root: &Utf8Path, extensions: &[String]) -> Result<Vec<Utf8PathBuf>, SourceError> {
        let Some(base) = &self.workspace.root else {
            return self.inner.list(root, extensions);
        };
        let listed = self.inner.list(&self.workspace.resolve(root), extensions)?;
        let prefix = strip_current_dir(base);
        Ok(listed
            .into_iter()
            .map(|path| {
                let relative = strip_current_dir(&path);
                relative
                    .strip_prefix(&prefix)
                    .unwrap_or(relative.as_path())
                    .to_path_buf()
            })
            .collect())
    }
}
