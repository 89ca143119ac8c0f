//! Sniffing diagnostics.
//!
//! Each event has a no-op twin so call sites stay free of `cfg` attributes
//! when the `tracing` feature is disabled.

use std::io;
use std::path::Path;

use crate::Identity;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

#[cfg(feature = "tracing")]
const TARGET: &str = "identity::sniff";

/// An override variable selected an identity.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn env_override(var: &str, identity: &Identity) {
    debug!(
        target: TARGET,
        var = var,
        identity = identity.cli_name(),
        "identity forced by {}",
        var
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn env_override(_var: &str, _identity: &Identity) {}

/// An override variable was set but named no registered identity.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn env_override_ignored(var: &str, value: &str) {
    debug!(
        target: TARGET,
        var = var,
        value = value,
        "ignoring {} naming unknown identity",
        var
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn env_override_ignored(_var: &str, _value: &str) {}

/// A probe failed; the candidate counts as a non-match.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn probe_error(dir: &Path, identity: &Identity, error: &io::Error) {
    trace!(
        target: TARGET,
        dir = %dir.display(),
        identity = identity.cli_name(),
        error = %error,
        "probe failed, treating as no match"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn probe_error(_dir: &Path, _identity: &Identity, _error: &io::Error) {}

/// The walk stopped at a repository root.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn root_found(root: &Path, identity: &Identity) {
    debug!(
        target: TARGET,
        root = %root.display(),
        identity = identity.cli_name(),
        "found {} repository root",
        identity.cli_name()
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn root_found(_root: &Path, _identity: &Identity) {}

/// The starting path could not be made absolute.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn start_unavailable(path: &Path, error: &io::Error) {
    debug!(
        target: TARGET,
        path = %path.display(),
        error = %error,
        "cannot resolve starting directory"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn start_unavailable(_path: &Path, _error: &io::Error) {}

/// A directory probe was answered from the cache.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn cache_hit(path: &Path) {
    trace!(target: TARGET, path = %path.display(), "sniff cache hit");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn cache_hit(_path: &Path) {}

/// A directory probe missed the cache and will walk the filesystem.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn cache_miss(path: &Path) {
    trace!(target: TARGET, path = %path.display(), "sniff cache miss");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn cache_miss(_path: &Path) {}
