//! Genmake core library.
//!
//! Generates a Makefile for a native-code project: every source file under
//! the source root gets a compile rule, all objects are linked (or archived)
//! into one artefact, and the resulting rules are spliced into a template at
//! its `#body` line.
//!
//! ```
//! use camino::Utf8PathBuf;
//! use genmake::assemble::{ArtifactKind, Layout, Toolchain, assemble_sources};
//! use genmake::token::Token;
//!
//! let lit = |s: &str| Token::Literal(s.to_owned());
//! let layout = Layout {
//!     source_root: Utf8PathBuf::from("src"),
//!     extensions: vec![".c".to_owned()],
//!     output_root: lit("build"),
//!     binary: "app".to_owned(),
//!     artifact: ArtifactKind::Executable,
//! };
//! let toolchain = Toolchain {
//!     compiler: lit("cc"),
//!     compile_flags: lit("-MMD"),
//!     linker: lit("cc"),
//!     link_flags: lit(""),
//!     archiver: lit("ar"),
//!     archive_flags: lit("rcs"),
//! };
//! let body = assemble_sources(vec![Utf8PathBuf::from("src/main.c")], &layout, &toolchain)?;
//! assert!(body.render().starts_with("build/src/main.o: src/main.c | build/src\n"));
//! # Ok::<(), genmake::assemble::AssembleError>(())
//! ```

pub mod assemble;
pub mod cli;
pub mod config;
pub mod paths;
pub mod registry;
pub mod rules;
pub mod runner;
pub mod sources;
pub mod splice;
pub mod token;
