//! Per-run record of targets that already have a rule.
//!
//! Every rule generator claims its target here before emitting text. The
//! registry only grows; it lives for one generation run and is then dropped.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;

/// Set of target paths for which a rule has been emitted.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use genmake::registry::RuleRegistry;
///
/// let mut registry = RuleRegistry::default();
/// assert!(registry.claim(Utf8Path::new("out/a.o")));
/// assert!(!registry.claim(Utf8Path::new("out/a.o")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    claimed: HashSet<Utf8PathBuf>,
}

impl RuleRegistry {
    /// Claim `target`, returning `true` only on the first request.
    pub fn claim(&mut self, target: &Utf8Path) -> bool {
        self.claimed.insert(target.to_path_buf())
    }

    /// Report whether `target` has already been claimed.
    #[must_use]
    pub fn is_claimed(&self, target: &Utf8Path) -> bool {
        self.claimed.contains(target)
    }

    /// Number of claimed targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing has been claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
