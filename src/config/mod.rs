//! Generator configuration.
//!
//! Settings come from an optional `genmake.yml` file and are resolved into a
//! [`GenConfig`] before any rule is generated. Every field has a default, so
//! an empty or absent file reproduces the stock layout:
//!
//! ```yaml
//! sources:
//!   root: client_src
//!   extensions: [".cpp"]
//! template: makefile.in
//! output: makefile
//! build_dir: { var: build_dir }
//! binary: client
//! artifact: executable
//! toolchain:
//!   compiler: { var: cpp_compiler }
//!   compile_flags: { var: client_compile_flags }
//!   linker: { var: linker }
//!   link_flags: { var: client_link_flags }
//!   archiver: ar
//!   archive_flags: rcs
//! profiles:
//!   release:
//!     compile_flags: -O2 -MMD
//! ```
//!
//! A profile overrides individual toolchain entries and is selected with
//! `--profile`.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

mod diagnostics;

pub use diagnostics::map_yaml_error;

use crate::assemble::{ArtifactKind, Layout, Toolchain};
use crate::token::Token;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use itertools::Itertools;
use miette::Diagnostic;
use serde::Deserialize;
use std::{fs, io};
use thiserror::Error;
use tracing::debug;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "genmake.yml";

/// Errors raised while loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    #[diagnostic(code(genmake::config::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid.
    #[error("configuration parse error")]
    #[diagnostic(code(genmake::config::parse))]
    Parse {
        /// Diagnostic pointing at the offending YAML.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },
    /// The requested profile is not defined.
    #[error("unknown profile `{name}`")]
    #[diagnostic(code(genmake::config::unknown_profile))]
    UnknownProfile {
        /// Requested profile.
        name: String,
        /// Profiles defined by the configuration.
        #[help]
        available: String,
    },
}

/// Source discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesSection {
    /// Directory scanned for sources.
    pub root: Utf8PathBuf,
    /// File-name suffixes identifying sources.
    pub extensions: Vec<String>,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("client_src"),
            extensions: vec![".cpp".to_owned()],
        }
    }
}

/// Toolchain tokens as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainSection {
    /// Compiler program.
    pub compiler: Token,
    /// Compilation flags.
    pub compile_flags: Token,
    /// Linker program.
    pub linker: Token,
    /// Link flags.
    pub link_flags: Token,
    /// Archiver program.
    pub archiver: Token,
    /// Archiver flags.
    pub archive_flags: Token,
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            compiler: var("cpp_compiler"),
            compile_flags: var("client_compile_flags"),
            linker: var("linker"),
            link_flags: var("client_link_flags"),
            archiver: Token::Literal("ar".to_owned()),
            archive_flags: Token::Literal("rcs".to_owned()),
        }
    }
}

impl ToolchainSection {
    fn apply(&mut self, overrides: &ProfileOverrides) {
        let slots = [
            (&mut self.compiler, &overrides.compiler),
            (&mut self.compile_flags, &overrides.compile_flags),
            (&mut self.linker, &overrides.linker),
            (&mut self.link_flags, &overrides.link_flags),
            (&mut self.archiver, &overrides.archiver),
            (&mut self.archive_flags, &overrides.archive_flags),
        ];
        for (slot, value) in slots {
            if let Some(token) = value {
                slot.clone_from(token);
            }
        }
    }
}

/// Toolchain entries replaced by a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOverrides {
    /// Compiler program.
    pub compiler: Option<Token>,
    /// Compilation flags.
    pub compile_flags: Option<Token>,
    /// Linker program.
    pub linker: Option<Token>,
    /// Link flags.
    pub link_flags: Option<Token>,
    /// Archiver program.
    pub archiver: Option<Token>,
    /// Archiver flags.
    pub archive_flags: Option<Token>,
}

/// The configuration file as written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Source discovery.
    pub sources: SourcesSection,
    /// Makefile template containing the `#body` line.
    pub template: Utf8PathBuf,
    /// Generated makefile.
    pub output: Utf8PathBuf,
    /// Directory receiving objects and the final artefact.
    pub build_dir: Token,
    /// File name of the final artefact.
    pub binary: String,
    /// Whether the final artefact is linked or archived.
    pub artifact: ArtifactKind,
    /// Programs and flags.
    pub toolchain: ToolchainSection,
    /// Named toolchain overrides.
    pub profiles: IndexMap<String, ProfileOverrides>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            sources: SourcesSection::default(),
            template: Utf8PathBuf::from("makefile.in"),
            output: Utf8PathBuf::from("makefile"),
            build_dir: var("build_dir"),
            binary: "client".to_owned(),
            artifact: ArtifactKind::Executable,
            toolchain: ToolchainSection::default(),
            profiles: IndexMap::new(),
        }
    }
}

fn var(name: &str) -> Token {
    Token::Variable {
        var: name.to_owned(),
    }
}

/// Fully resolved settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    /// Where sources are read and artefacts written.
    pub layout: Layout,
    /// Programs and flags for the recipes.
    pub toolchain: Toolchain,
    /// Makefile template.
    pub template: Utf8PathBuf,
    /// Generated makefile.
    pub output: Utf8PathBuf,
}

impl ConfigFile {
    /// Parse a configuration document. `name` labels diagnostics.
    ///
    /// A blank document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the YAML is malformed, has unknown
    /// keys, or contains an invalid token.
    pub fn from_yaml(yaml: &str, name: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse {
            source: map_yaml_error(e, yaml, name),
        })
    }

    /// Load the configuration at `path`.
    ///
    /// When `required` is false a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path, required: bool) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(yaml) => {
                debug!(%path, "loaded configuration");
                Self::from_yaml(&yaml, path.as_str())
            }
            Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {
                debug!(%path, "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply `profile` and produce the settings consumed by the generator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] when `profile` is not defined.
    pub fn resolve(self, profile: Option<&str>) -> Result<GenConfig, ConfigError> {
        let mut toolchain = self.toolchain;
        if let Some(name) = profile {
            let overrides = self
                .profiles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProfile {
                    name: name.to_owned(),
                    available: available_profiles(&self.profiles),
                })?;
            toolchain.apply(overrides);
            debug!(profile = name, "applied profile");
        }
        Ok(GenConfig {
            layout: Layout {
                source_root: self.sources.root,
                extensions: self.sources.extensions,
                output_root: self.build_dir,
                binary: self.binary,
                artifact: self.artifact,
            },
            toolchain: Toolchain {
                compiler: toolchain.compiler,
                compile_flags: toolchain.compile_flags,
                linker: toolchain.linker,
                link_flags: toolchain.link_flags,
                archiver: toolchain.archiver,
                archive_flags: toolchain.archive_flags,
            },
            template: self.template,
            output: self.output,
        })
    }
}

fn available_profiles(profiles: &IndexMap<String, ProfileOverrides>) -> String {
    if profiles.is_empty() {
        "no profiles are defined".to_owned()
    } else {
        format!("available profiles: {}", profiles.keys().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("  \n")]
    fn blank_document_yields_defaults(#[case] yaml: &str) -> Result<()> {
        let config = ConfigFile::from_yaml(yaml, "genmake.yml")?;
        ensure!(config == ConfigFile::default(), "expected defaults, got {config:?}");
        Ok(())
    }

    #[test]
    fn defaults_reference_template_variables() {
        let config = ConfigFile::default().resolve(None).expect("defaults resolve");
        assert_eq!(config.layout.binary_path(), "${build_dir}/client");
        assert_eq!(config.toolchain.compiler.to_string(), "${cpp_compiler}");
        assert_eq!(config.layout.source_root, "client_src");
        assert_eq!(config.template, "makefile.in");
        assert_eq!(config.output, "makefile");
    }

    #[test]
    fn parses_literals_and_variables() {
        let yaml = concat!(
            "sources:\n",
            "  root: src\n",
            "  extensions: [\".cc\", \".cpp\"]\n",
            "build_dir: build\n",
            "artifact: archive\n",
            "binary: libnet.a\n",
            "toolchain:\n",
            "  compiler: g++\n",
            "  compile_flags: { var: CXXFLAGS }\n",
        );
        let config = ConfigFile::from_yaml(yaml, "genmake.yml")
            .and_then(|file| file.resolve(None))
            .expect("valid configuration");
        assert_eq!(config.layout.extensions, [".cc", ".cpp"]);
        assert_eq!(config.layout.artifact, ArtifactKind::Archive);
        assert_eq!(config.layout.binary_path(), "build/libnet.a");
        assert_eq!(config.toolchain.compiler, Token::Literal("g++".to_owned()));
        assert_eq!(config.toolchain.compile_flags.to_string(), "${CXXFLAGS}");
        assert_eq!(config.toolchain.linker.to_string(), "${linker}");
    }

    #[test]
    fn profile_overrides_selected_entries() -> Result<()> {
        let yaml = concat!(
            "toolchain:\n",
            "  compiler: g++\n",
            "  compile_flags: -g\n",
            "profiles:\n",
            "  release:\n",
            "    compile_flags: -O2\n",
        );
        let config = ConfigFile::from_yaml(yaml, "genmake.yml")?.resolve(Some("release"))?;
        ensure!(config.toolchain.compiler.to_string() == "g++");
        ensure!(config.toolchain.compile_flags.to_string() == "-O2");
        Ok(())
    }

    #[test]
    fn unknown_profile_lists_alternatives() -> Result<()> {
        let yaml = "profiles:\n  debug: {}\n  release: {}\n";
        let err = ConfigFile::from_yaml(yaml, "genmake.yml")?
            .resolve(Some("fast"))
            .err()
            .ok_or_else(|| anyhow!("expected unknown profile error"))?;
        let ConfigError::UnknownProfile { name, available } = err else {
            return Err(anyhow!("unexpected error: {err}"));
        };
        ensure!(name == "fast");
        ensure!(available == "available profiles: debug, release");
        Ok(())
    }

    #[rstest]
    #[case("toolchain:\n  compiler: ${CXX}\n")]
    #[case("toolchain:\n  compiler: { var: \"two words\" }\n")]
    #[case("unknown_key: 1\n")]
    fn rejects_invalid_documents(#[case] yaml: &str) {
        assert!(matches!(
            ConfigFile::from_yaml(yaml, "genmake.yml"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_optional_file_yields_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = Utf8PathBuf::from_path_buf(dir.path().join("genmake.yml"))
            .map_err(|p| anyhow!("non-UTF-8 temp path {}", p.display()))?;
        ensure!(ConfigFile::load(&path, false)? == ConfigFile::default());
        ensure!(matches!(
            ConfigFile::load(&path, true),
            Err(ConfigError::Read { .. })
        ));
        Ok(())
    }
}
