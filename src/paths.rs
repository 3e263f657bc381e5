//! Source-to-artefact path mapping.
//!
//! Object files mirror the source tree beneath the output root, so
//! `src/net/socket.cpp` compiled into `build` becomes `build/src/net/socket.o`.
//! The helpers here are pure string manipulation and never touch the
//! filesystem.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Extension given to compiled objects.
pub const OBJECT_EXTENSION: &str = "o";
/// Extension of the compiler-generated dependency files.
pub const DEPENDENCY_EXTENSION: &str = "d";

/// Replace the extension of `path` with `extension`, appending it when the
/// file name has none.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use genmake::paths::change_extension;
/// assert_eq!(change_extension(Utf8Path::new("a/b.cpp"), "o"), "a/b.o");
/// assert_eq!(change_extension(Utf8Path::new("a/Makefile"), "o"), "a/Makefile.o");
/// ```
#[must_use]
pub fn change_extension(path: &Utf8Path, extension: &str) -> Utf8PathBuf {
    path.with_extension(extension)
}

/// Map `source` to its object path beneath `output_root`.
///
/// Leading `.` components of `source` are dropped so `./a.cpp` and `a.cpp`
/// share an object.
#[must_use]
pub fn object_path(source: &Utf8Path, output_root: &Utf8Path) -> Utf8PathBuf {
    change_extension(&output_root.join(strip_current_dir(source)), OBJECT_EXTENSION)
}

/// Drop leading `.` components so `./src/a.cpp` compares equal to `src/a.cpp`.
///
/// A path made only of `.` components becomes empty.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use genmake::paths::strip_current_dir;
/// assert_eq!(strip_current_dir(Utf8Path::new("./proj/src")), "proj/src");
/// assert_eq!(strip_current_dir(Utf8Path::new("/abs/src")), "/abs/src");
/// ```
#[must_use]
pub fn strip_current_dir(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .skip_while(|c| matches!(c, Utf8Component::CurDir))
        .collect()
}

/// Dependency file written by the compiler alongside `object`.
#[must_use]
pub fn dependency_path(object: &Utf8Path) -> Utf8PathBuf {
    change_extension(object, DEPENDENCY_EXTENSION)
}

/// Directory that must exist before `target` can be written, if any.
#[must_use]
pub fn parent_dir(target: &Utf8Path) -> Option<&Utf8Path> {
    target.parent().filter(|dir| !dir.as_str().is_empty())
}
