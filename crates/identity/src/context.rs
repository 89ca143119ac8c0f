//! Process-wide resolution context.
//!
//! Most callers do not thread a [`Resolver`] through their code. These
//! helpers resolve against a single resolver built on first use from the
//! compiled-in [`Registry`] and the [`DotDirProbe`]; its directory cache lives
//! for the rest of the process.

use std::borrow::Cow;
use std::env;
use std::path::Path;
use std::sync::OnceLock;

use crate::probe::DotDirProbe;
use crate::resolver::{Resolver, RootInfo};
use crate::{Identity, Registry};

/// Returns the resolver shared by the whole process.
#[must_use]
pub fn default_resolver() -> &'static Resolver<DotDirProbe> {
    static RESOLVER: OnceLock<Resolver<DotDirProbe>> = OnceLock::new();
    RESOLVER.get_or_init(|| Resolver::new(Registry::builtin().clone(), DotDirProbe))
}

/// Returns the identity forced by the process environment, if any.
#[must_use]
pub fn sniff_env() -> Option<Identity> {
    default_resolver().sniff_env()
}

/// Walks up from `path` (or the working directory) to the nearest repository root.
#[must_use]
pub fn sniff_root(path: Option<&Path>) -> Option<RootInfo> {
    default_resolver().sniff_root(path)
}

/// Returns the identity that applies at `path` (or the working directory).
#[must_use]
pub fn current(path: Option<&Path>) -> Identity {
    default_resolver().current(path)
}

/// Returns the memoised walk result for `path`.
pub fn sniff_dir(path: &Path) -> Option<Identity> {
    default_resolver().sniff_dir(path)
}

/// Replaces brand placeholders with the current identity's vocabulary.
///
/// The identity is resolved for the working directory through the cached
/// walk, keyed by the absolute working directory, so repeated calls from the
/// same directory do not touch the filesystem again and a changed working
/// directory gets its own lookup. If the working directory cannot be read,
/// the default identity applies unless the environment overrides it.
///
/// ```
/// let rendered = identity::replace(Some("@prog@ help")).unwrap();
/// assert!(rendered.ends_with(" help"));
/// assert!(!rendered.contains("@prog@"));
/// assert_eq!(identity::replace(None), None);
/// ```
#[must_use]
pub fn replace(s: Option<&str>) -> Option<Cow<'_, str>> {
    // Absent input never needs an identity.
    let s = s?;
    let resolver = default_resolver();
    let identity = env::current_dir().map_or_else(
        |_| resolver.current(None),
        |cwd| resolver.current_cached(&cwd),
    );
    Some(identity.template_map().render(s))
}
