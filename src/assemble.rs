//! Build graph assembly.
//!
//! Turns the discovered sources of a project into the Makefile body: one
//! compile rule per source, a single link (or archive) rule over every object,
//! and a `deps` variable listing the compiler-generated dependency files.
//!
//! Sources are sorted before any rule is generated, so the output depends only
//! on the set of files and never on the order the lister returned them in.

use crate::paths::{dependency_path, object_path};
use crate::registry::RuleRegistry;
use crate::rules::{archive_rule, compile_rule, link_rule};
use crate::sources::{SourceError, SourceLister};
use crate::token::Token;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the generated dependency-file variable.
pub const DEPS_VARIABLE: &str = "deps";

/// Errors raised while assembling the rule graph.
#[derive(Debug, Error, Diagnostic)]
pub enum AssembleError {
    /// Source discovery failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sources(#[from] SourceError),
    /// The final artefact path is already the target of another rule.
    #[error("artefact {target} is already produced by another rule")]
    #[diagnostic(
        code(genmake::assemble::target_collision),
        help("choose a binary name that is not an object file or output directory")
    )]
    TargetCollision {
        /// The contested path.
        target: Utf8PathBuf,
    },
}

/// The artefact produced by the final rule.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// A linked executable.
    #[default]
    Executable,
    /// A static archive.
    Archive,
}

/// Where sources are read from and artefacts are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory scanned for sources.
    pub source_root: Utf8PathBuf,
    /// File-name suffixes identifying sources, e.g. `.cpp`.
    pub extensions: Vec<String>,
    /// Directory receiving objects and the final artefact.
    pub output_root: Token,
    /// File name of the final artefact beneath `output_root`.
    pub binary: String,
    /// Whether the final artefact is linked or archived.
    pub artifact: ArtifactKind,
}

impl Layout {
    /// Path of the final artefact.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.output_root_path().join(&self.binary)
    }

    fn output_root_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.output_root.to_string())
    }
}

/// Programs and flags written into recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Compiler program.
    pub compiler: Token,
    /// Flags passed to every compilation.
    pub compile_flags: Token,
    /// Linker program.
    pub linker: Token,
    /// Flags passed when linking.
    pub link_flags: Token,
    /// Archiver program.
    pub archiver: Token,
    /// Flags passed to the archiver.
    pub archive_flags: Token,
}

/// The assembled Makefile body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakeBody {
    /// Rule text in emission order.
    pub fragments: Vec<String>,
    /// Object files in source order.
    pub objects: Vec<Utf8PathBuf>,
    /// Value of the [`DEPS_VARIABLE`] variable.
    pub deps: String,
}

impl MakeBody {
    /// Concatenate every fragment followed by the `deps:=` assignment.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.fragments.concat();
        out.push_str(DEPS_VARIABLE);
        out.push_str(":=");
        out.push_str(&self.deps);
        out.push('\n');
        out
    }
}

/// Discover sources with `lister` and assemble the Makefile body.
///
/// # Errors
///
/// Returns [`AssembleError::Sources`] when the source tree cannot be listed
/// and [`AssembleError::TargetCollision`] when the artefact path clashes with
/// another rule.
pub fn assemble(
    lister: &impl SourceLister,
    layout: &Layout,
    toolchain: &Toolchain,
) -> Result<MakeBody, AssembleError> {
    let sources = lister.list(&layout.source_root, &layout.extensions)?;
    assemble_sources(sources, layout, toolchain)
}

/// Assemble the Makefile body for an already-listed set of sources.
///
/// # Errors
///
/// Returns [`AssembleError::TargetCollision`] when the artefact path is
/// already an object file or an output directory.
pub fn assemble_sources(
    mut sources: Vec<Utf8PathBuf>,
    layout: &Layout,
    toolchain: &Toolchain,
) -> Result<MakeBody, AssembleError> {
    sources.sort();
    let output_root = layout.output_root_path();
    let mut registry = RuleRegistry::default();
    let mut body = MakeBody::default();

    for source in &sources {
        let object = object_path(source, &output_root);
        body.fragments.push(compile_rule(
            &mut registry,
            &toolchain.compiler,
            &toolchain.compile_flags,
            source,
            &object,
        ));
        body.objects.push(object);
    }

    let binary = layout.binary_path();
    if registry.is_claimed(&binary) {
        return Err(AssembleError::TargetCollision { target: binary });
    }
    body.fragments
        .push(final_rule(&mut registry, layout.artifact, toolchain, &body.objects, &binary));
    body.deps = dependency_list(&body.objects);

    debug!(rules = registry.len(), "rules emitted");
    info!(
        sources = sources.len(),
        binary = %binary,
        "assembled makefile body"
    );
    Ok(body)
}

fn final_rule(
    registry: &mut RuleRegistry,
    artifact: ArtifactKind,
    toolchain: &Toolchain,
    objects: &[Utf8PathBuf],
    binary: &Utf8Path,
) -> String {
    match artifact {
        ArtifactKind::Executable => link_rule(
            registry,
            &toolchain.linker,
            &toolchain.link_flags,
            objects,
            binary,
        ),
        ArtifactKind::Archive => archive_rule(
            registry,
            &toolchain.archiver,
            &toolchain.archive_flags,
            objects,
            binary,
        ),
    }
}

/// Each object's dependency file followed by a single space.
fn dependency_list(objects: &[Utf8PathBuf]) -> String {
    objects.iter().fold(String::new(), |mut acc, object| {
        acc.push_str(dependency_path(object).as_str());
        acc.push(' ');
        acc
    })
}
