//! Test utilities for building throwaway projects.
//!
//! [`Project`] owns a temporary directory with helpers for writing source
//! files and templates, and [`make_available`] lets integration tests skip
//! when GNU Make is not installed.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Template used by most tests: a variable block, the splice point and an
/// include of the generated dependency files.
pub const BASIC_TEMPLATE: &str = concat!(
    "config ?= debug\n",
    "build_dir := build/$(config)\n",
    "#body\n",
    "-include $(deps)\n",
);

/// A temporary project directory.
#[derive(Debug)]
pub struct Project {
    /// Held so the directory lives as long as the project.
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    /// Create an empty project.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created or its
    /// path is not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp project dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow!("temp dir {} is not UTF-8", p.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Create a project holding empty `sources` and `template` as
    /// `makefile.in`.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn with_sources(sources: &[&str], template: &str) -> Result<Self> {
        let project = Self::new()?;
        for source in sources {
            project.write(source, "")?;
        }
        project.write("makefile.in", template)?;
        Ok(project)
    }

    /// Root directory of the project.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parents cannot be created.
    pub fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))
    }

    /// Read `relative` as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }
}

/// Whether a working `make` is on `PATH`.
pub fn make_available() -> bool {
    Command::new("make")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}
