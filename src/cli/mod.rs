//! Command line interface definition using clap.
//!
//! Every flag is optional: running `genmake` with no arguments reads
//! `genmake.yml` when present and otherwise uses the built-in layout. Flags
//! override the corresponding configuration entries.

use clap::Parser;
use camino::Utf8PathBuf;

use crate::assemble::ArtifactKind;
use crate::config::{ConfigFile, DEFAULT_CONFIG_FILE};

mod parsing;

use parsing::parse_extension;

/// Generate a Makefile for a native-code project from its source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if started in this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Configuration file to read instead of `genmake.yml`.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Toolchain profile defined in the configuration file.
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Directory scanned for source files.
    #[arg(long, value_name = "DIR")]
    pub source_root: Option<Utf8PathBuf>,

    /// Source file suffix; repeat to accept several.
    #[arg(long = "ext", value_name = "EXT", value_parser = parse_extension)]
    pub extensions: Vec<String>,

    /// Makefile template containing the `#body` line.
    #[arg(long, value_name = "FILE")]
    pub template: Option<Utf8PathBuf>,

    /// Generated makefile path.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Produce a static archive instead of an executable.
    #[arg(long)]
    pub archive: bool,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Configuration file path and whether it must exist.
    #[must_use]
    pub fn config_path(&self) -> (Utf8PathBuf, bool) {
        self.config.as_ref().map_or_else(
            || (Utf8PathBuf::from(DEFAULT_CONFIG_FILE), false),
            |path| (path.clone(), true),
        )
    }

    /// Overlay command-line values on top of `file`.
    #[must_use]
    pub fn apply_to(&self, mut file: ConfigFile) -> ConfigFile {
        if let Some(root) = &self.source_root {
            file.sources.root.clone_from(root);
        }
        if !self.extensions.is_empty() {
            file.sources.extensions.clone_from(&self.extensions);
        }
        if let Some(template) = &self.template {
            file.template.clone_from(template);
        }
        if let Some(output) = &self.output {
            file.output.clone_from(output);
        }
        if self.archive {
            file.artifact = ArtifactKind::Archive;
        }
        file
    }
}
