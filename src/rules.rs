//! Makefile rule generators.
//!
//! Each generator claims its target in the shared [`RuleRegistry`] and renders
//! a [`Rule`] as Make text. A target that was already claimed yields an empty
//! string, so calling a generator twice for the same target is harmless. Rules
//! that write into a directory also emit the `mkdir -p` rule for that
//! directory the first time it is needed, and list the directory as an
//! order-only prerequisite.
//!
//! ```text
//! out/a.o: a.cpp | out
//! 	g++ -O2 -c a.cpp -o out/a.o
//! out:
//! 	mkdir -p $@
//! ```

use crate::paths::parent_dir;
use crate::registry::RuleRegistry;
use crate::token::Token;
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// Recipe used for directory targets. `-p` makes it safe to re-run.
pub const MKDIR_RECIPE: &str = "mkdir -p $@";

/// A single Make rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// File or directory produced by the recipe.
    pub target: Utf8PathBuf,
    /// Normal prerequisites in the order they were supplied.
    pub prerequisites: Vec<Utf8PathBuf>,
    /// Prerequisites that must exist but never trigger a rebuild.
    pub order_only: Vec<Utf8PathBuf>,
    /// The command line run to build `target`.
    pub recipe: String,
}

impl Rule {
    /// Rule with `target`'s parent directory, if any, as its order-only
    /// prerequisite.
    fn in_parent_dir(target: &Utf8Path, prerequisites: Vec<Utf8PathBuf>, recipe: String) -> Self {
        Self {
            target: target.to_path_buf(),
            prerequisites,
            order_only: parent_dir(target).map(Utf8Path::to_path_buf).into_iter().collect(),
            recipe,
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.target)?;
        if !self.prerequisites.is_empty() {
            write!(f, " {}", join(&self.prerequisites))?;
        }
        if !self.order_only.is_empty() {
            write!(f, " | {}", join(&self.order_only))?;
        }
        writeln!(f)?;
        writeln!(f, "\t{}", self.recipe)
    }
}

/// Convert a slice of paths into a space-separated string.
fn join(paths: &[Utf8PathBuf]) -> String {
    paths.iter().join(" ")
}

/// Join command words with single spaces, skipping empty ones.
fn command_line<const N: usize>(words: [String; N]) -> String {
    words.into_iter().filter(|w| !w.is_empty()).join(" ")
}

/// Claim `rule.target` and render it, followed by the rule for the directory
/// it writes into.
fn emit(registry: &mut RuleRegistry, rule: &Rule) -> String {
    if !registry.claim(&rule.target) {
        debug!(path = %rule.target, "rule already emitted");
        return String::new();
    }
    debug!(path = %rule.target, "emitting rule");
    let mut text = rule.to_string();
    for dir in &rule.order_only {
        text.push_str(&directory_rule(registry, dir));
    }
    text
}

/// Rule creating `dir` and any missing ancestors.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use genmake::registry::RuleRegistry;
/// use genmake::rules::directory_rule;
///
/// let mut registry = RuleRegistry::default();
/// assert_eq!(directory_rule(&mut registry, Utf8Path::new("out")), "out:\n\tmkdir -p $@\n");
/// assert_eq!(directory_rule(&mut registry, Utf8Path::new("out")), "");
/// ```
pub fn directory_rule(registry: &mut RuleRegistry, dir: &Utf8Path) -> String {
    let rule = Rule {
        target: dir.to_path_buf(),
        prerequisites: Vec::new(),
        order_only: Vec::new(),
        recipe: MKDIR_RECIPE.to_owned(),
    };
    emit(registry, &rule)
}

/// Rule compiling `source` into `object` without linking.
pub fn compile_rule(
    registry: &mut RuleRegistry,
    compiler: &Token,
    flags: &Token,
    source: &Utf8Path,
    object: &Utf8Path,
) -> String {
    let recipe = command_line([
        compiler.to_string(),
        flags.to_string(),
        "-c".to_owned(),
        source.to_string(),
        "-o".to_owned(),
        object.to_string(),
    ]);
    let rule = Rule::in_parent_dir(object, vec![source.to_path_buf()], recipe);
    emit(registry, &rule)
}

/// Rule linking `objects` into the executable `binary`.
///
/// Objects precede the flags so that library flags resolve against them.
pub fn link_rule(
    registry: &mut RuleRegistry,
    linker: &Token,
    flags: &Token,
    objects: &[Utf8PathBuf],
    binary: &Utf8Path,
) -> String {
    let recipe = command_line([
        linker.to_string(),
        join(objects),
        flags.to_string(),
        "-o".to_owned(),
        binary.to_string(),
    ]);
    let rule = Rule::in_parent_dir(binary, objects.to_vec(), recipe);
    emit(registry, &rule)
}

/// Rule bundling `objects` into the static archive `archive`.
///
/// Archivers take the output before the inputs, e.g. `ar rcs lib.a a.o b.o`.
pub fn archive_rule(
    registry: &mut RuleRegistry,
    archiver: &Token,
    flags: &Token,
    objects: &[Utf8PathBuf],
    archive: &Utf8Path,
) -> String {
    let recipe = command_line([
        archiver.to_string(),
        flags.to_string(),
        archive.to_string(),
        join(objects),
    ]);
    let rule = Rule::in_parent_dir(archive, objects.to_vec(), recipe);
    emit(registry, &rule)
}
