//! Repository root detection.
//!
//! The resolver never inspects the filesystem itself. It asks a
//! [`RootProbe`] whether a directory is the root of a repository belonging to
//! a candidate identity, which keeps the walk independent of how markers are
//! laid out on disk and lets tests substitute scripted probes.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::Identity;

/// Decides whether a directory is a repository root for an identity.
pub trait RootProbe {
    /// Returns `Ok(true)` when `dir` is a repository root owned by `identity`.
    ///
    /// Errors are reported rather than swallowed; the resolver treats them as
    /// a non-match and moves on to the next candidate.
    fn is_repo_root(&self, dir: &Path, identity: &Identity) -> io::Result<bool>;
}

impl<P: RootProbe + ?Sized> RootProbe for &P {
    fn is_repo_root(&self, dir: &Path, identity: &Identity) -> io::Result<bool> {
        (**self).is_repo_root(dir, identity)
    }
}

impl<P: RootProbe + ?Sized> RootProbe for Arc<P> {
    fn is_repo_root(&self, dir: &Path, identity: &Identity) -> io::Result<bool> {
        (**self).is_repo_root(dir, identity)
    }
}

impl<P: RootProbe + ?Sized> RootProbe for Box<P> {
    fn is_repo_root(&self, dir: &Path, identity: &Identity) -> io::Result<bool> {
        (**self).is_repo_root(dir, identity)
    }
}

/// Probe that recognises a root by the identity's marker directory.
///
/// A missing marker, or a marker below something that is not a directory, is
/// a plain non-match. Any other metadata error is returned to the caller.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DotDirProbe;

impl RootProbe for DotDirProbe {
    fn is_repo_root(&self, dir: &Path, identity: &Identity) -> io::Result<bool> {
        match fs::metadata(identity.dot_dir_path(dir)) {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }
}
