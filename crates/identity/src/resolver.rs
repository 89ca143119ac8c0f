//! Identity resolution.
//!
//! [`Resolver`] answers "which identity applies here?" with a fixed
//! precedence:
//!
//! 1. an override variable from the environment naming a registered identity,
//! 2. the nearest ancestor directory that a [`RootProbe`] recognises as a
//!    repository root,
//! 3. the registry default.
//!
//! The walk in step 2 stops at the first matching directory; when several
//! identities match there, registry order decides. [`Resolver::sniff_dir`]
//! memoises the walk in a [`DirCache`] shared through an [`Arc`], so a
//! process can build one resolver and hand out references, while tests build
//! fresh ones.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{self, Component, Path, PathBuf};
use std::sync::Arc;

use crate::cache::DirCache;
use crate::probe::RootProbe;
use crate::trace;
use crate::{Identity, Registry};

/// Repository root found by [`Resolver::sniff_root`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RootInfo {
    root: PathBuf,
    identity: Identity,
}

impl RootInfo {
    /// Creates a new [`RootInfo`].
    #[must_use]
    pub const fn new(root: PathBuf, identity: Identity) -> Self {
        Self { root, identity }
    }

    /// Returns the repository root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the identity whose marker was found at the root.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        self.identity
    }

    /// Consumes the info and returns the root directory.
    #[must_use]
    pub fn into_root(self) -> PathBuf {
        self.root
    }
}

/// Resolves identities against a registry using a root probe.
#[derive(Debug)]
pub struct Resolver<P> {
    registry: Registry,
    probe: P,
    cache: Arc<DirCache>,
}

impl<P: RootProbe> Resolver<P> {
    /// Creates a resolver with a fresh directory cache.
    #[must_use]
    pub fn new(registry: Registry, probe: P) -> Self {
        Self {
            registry,
            probe,
            cache: Arc::new(DirCache::new()),
        }
    }

    /// Replaces the directory cache, letting several resolvers share one.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DirCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the registry consulted by this resolver.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the root probe.
    #[must_use]
    pub const fn probe(&self) -> &P {
        &self.probe
    }

    /// Returns the directory cache backing [`Resolver::sniff_dir`].
    #[must_use]
    pub fn cache(&self) -> &Arc<DirCache> {
        &self.cache
    }

    /// Returns the identity forced by the process environment, if any.
    #[must_use]
    pub fn sniff_env(&self) -> Option<Identity> {
        self.sniff_env_with(|name| env::var_os(name))
    }

    /// Returns the identity forced by the variables `lookup` reports.
    ///
    /// Override variables are consulted in registry order. Unset and empty
    /// variables are skipped, as are values naming no registered identity.
    pub fn sniff_env_with<F>(&self, mut lookup: F) -> Option<Identity>
    where
        F: FnMut(&str) -> Option<OsString>,
    {
        for &var in self.registry.override_envs() {
            let Some(value) = lookup(var) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            let value = value.to_string_lossy();
            match self.registry.find(&value) {
                Some(identity) => {
                    trace::env_override(var, &identity);
                    return Some(identity);
                }
                None => trace::env_override_ignored(var, &value),
            }
        }

        None
    }

    /// Returns the first registered identity whose root marker is in `dir`.
    ///
    /// Only `dir` itself is probed. Probe errors count as a non-match.
    #[must_use]
    pub fn identity_at(&self, dir: &Path) -> Option<Identity> {
        self.registry
            .identities()
            .iter()
            .copied()
            .find(|identity| match self.probe.is_repo_root(dir, identity) {
                Ok(matched) => matched,
                Err(error) => {
                    trace::probe_error(dir, identity, &error);
                    false
                }
            })
    }

    /// Walks from `path` towards the filesystem root looking for a repository.
    ///
    /// `None` and empty paths start from the working directory; relative paths
    /// are resolved against it without following symlinks. `.` and `..`
    /// components are folded lexically before the walk, so `a/b/..` starts at
    /// `a`. The nearest matching directory wins.
    #[must_use]
    pub fn sniff_root(&self, path: Option<&Path>) -> Option<RootInfo> {
        let start = match absolute_start(path) {
            Ok(start) => start,
            Err(error) => {
                trace::start_unavailable(path.unwrap_or_else(|| Path::new("")), &error);
                return None;
            }
        };

        start.ancestors().find_map(|dir| {
            self.identity_at(dir).map(|identity| {
                trace::root_found(dir, &identity);
                RootInfo::new(dir.to_path_buf(), identity)
            })
        })
    }

    /// Returns the identity that applies at `path` in this process.
    ///
    /// Environment overrides win over filesystem evidence, which wins over the
    /// registry default.
    #[must_use]
    pub fn current(&self, path: Option<&Path>) -> Identity {
        self.current_with(path, |name| env::var_os(name))
    }

    /// Resolves like [`Resolver::current`] with an explicit variable source.
    pub fn current_with<F>(&self, path: Option<&Path>, lookup: F) -> Identity
    where
        F: FnMut(&str) -> Option<OsString>,
    {
        self.sniff_env_with(lookup)
            .or_else(|| self.sniff_root(path).map(|info| info.identity()))
            .unwrap_or_else(|| self.registry.default_identity())
    }

    /// Returns the identity found by walking up from `path`, memoised.
    ///
    /// The first call for a path walks the filesystem and records the result,
    /// including a miss. Later calls for the same path are answered from the
    /// cache without probing.
    pub fn sniff_dir(&self, path: &Path) -> Option<Identity> {
        self.cache.get_or_compute(path, || {
            self.sniff_root(Some(path)).map(|info| info.identity())
        })
    }

    /// Resolves like [`Resolver::current`], using the cached walk.
    pub fn current_cached(&self, path: &Path) -> Identity {
        self.sniff_env()
            .or_else(|| self.sniff_dir(path))
            .unwrap_or_else(|| self.registry.default_identity())
    }
}

fn absolute_start(path: Option<&Path>) -> io::Result<PathBuf> {
    let start = match path {
        Some(path) if !path.as_os_str().is_empty() => path::absolute(path)?,
        _ => env::current_dir()?,
    };
    Ok(normalize_lexically(&start))
}

/// Folds `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::probe::DotDirProbe;
    use crate::{MERCURIAL, SAPLING};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Probe answering from a fixed set of `(dir, dot_dir)` pairs.
    #[derive(Default)]
    struct ScriptedProbe {
        roots: HashSet<(PathBuf, &'static str)>,
        failing: HashSet<PathBuf>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedProbe {
        fn root(mut self, dir: &str, identity: Identity) -> Self {
            self.roots.insert((PathBuf::from(dir), identity.dot_dir()));
            self
        }

        fn failing(mut self, dir: &str) -> Self {
            self.failing.insert(PathBuf::from(dir));
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().expect("calls lock").len()
        }
    }

    impl RootProbe for ScriptedProbe {
        fn is_repo_root(&self, dir: &Path, identity: &Identity) -> io::Result<bool> {
            self.calls.lock().expect("calls lock").push(dir.to_path_buf());
            if self.failing.contains(dir) {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            Ok(self.roots.contains(&(dir.to_path_buf(), identity.dot_dir())))
        }
    }

    fn registry() -> Registry {
        Registry::new(vec![SAPLING, MERCURIAL], MERCURIAL)
            .and_then(|registry| registry.with_override_envs(["SL_IDENTITY", "HG_IDENTITY"]))
            .expect("valid registry")
    }

    fn no_env(_: &str) -> Option<OsString> {
        None
    }

    #[test]
    fn sniff_root_finds_nearest_ancestor() {
        let probe = ScriptedProbe::default()
            .root("/outer", SAPLING)
            .root("/outer/inner", MERCURIAL);
        let resolver = Resolver::new(registry(), probe);

        let info = resolver
            .sniff_root(Some(Path::new("/outer/inner/a/b")))
            .expect("root found");
        assert_eq!(info.root(), Path::new("/outer/inner"));
        assert_eq!(info.identity(), MERCURIAL);
    }

    #[test]
    fn sniff_root_breaks_ties_by_registry_order() {
        let probe = ScriptedProbe::default()
            .root("/repo", MERCURIAL)
            .root("/repo", SAPLING);
        let resolver = Resolver::new(registry(), probe);

        let info = resolver.sniff_root(Some(Path::new("/repo"))).unwrap();
        assert_eq!(info.identity(), SAPLING);

        let reversed = Registry::new(vec![MERCURIAL, SAPLING], MERCURIAL).unwrap();
        let probe = ScriptedProbe::default()
            .root("/repo", MERCURIAL)
            .root("/repo", SAPLING);
        let resolver = Resolver::new(reversed, probe);
        assert_eq!(
            resolver.sniff_root(Some(Path::new("/repo"))).unwrap().identity(),
            MERCURIAL
        );
    }

    #[test]
    fn sniff_root_stops_at_first_match() {
        let probe = ScriptedProbe::default().root("/a/b", SAPLING);
        let resolver = Resolver::new(registry(), probe);

        let info = resolver.sniff_root(Some(Path::new("/a/b/c"))).unwrap();
        assert_eq!(info.root(), Path::new("/a/b"));
        let calls = resolver.probe().calls.lock().unwrap().clone();
        assert!(calls.iter().all(|dir| dir.starts_with("/a/b")));
    }

    #[test]
    fn sniff_root_continues_past_probe_errors() {
        let probe = ScriptedProbe::default()
            .root("/top", MERCURIAL)
            .failing("/top/locked");
        let resolver = Resolver::new(registry(), probe);

        let info = resolver
            .sniff_root(Some(Path::new("/top/locked/work")))
            .expect("root above failing directory");
        assert_eq!(info.root(), Path::new("/top"));
    }

    #[test]
    fn sniff_root_without_match_is_none() {
        let resolver = Resolver::new(registry(), ScriptedProbe::default());
        assert_eq!(resolver.sniff_root(Some(Path::new("/x/y/z"))), None);
        assert_eq!(
            resolver.current_with(Some(Path::new("/x/y/z")), no_env),
            MERCURIAL
        );
    }

    #[test]
    fn sniff_root_probes_every_ancestor_up_to_root() {
        let resolver = Resolver::new(registry(), ScriptedProbe::default());
        assert_eq!(resolver.sniff_root(Some(Path::new("/x/y"))), None);

        let calls = resolver.probe().calls.lock().unwrap().clone();
        let dirs: Vec<_> = calls.iter().map(PathBuf::as_path).collect();
        assert_eq!(
            dirs,
            [
                Path::new("/x/y"),
                Path::new("/x/y"),
                Path::new("/x"),
                Path::new("/x"),
                Path::new("/"),
                Path::new("/"),
            ]
        );
    }

    #[test]
    fn sniff_root_resolves_relative_paths_against_working_directory() {
        let cwd = env::current_dir().expect("working directory");
        let resolver = Resolver::new(registry(), ScriptedProbe::default());
        let _ = resolver.sniff_root(Some(Path::new("relative/child")));
        let _ = resolver.sniff_root(None);
        let _ = resolver.sniff_root(Some(Path::new("")));

        let calls = resolver.probe().calls.lock().unwrap().clone();
        assert_eq!(calls[0], cwd.join("relative/child"));
        assert!(calls.contains(&cwd));
        assert!(calls.iter().all(|dir| dir.is_absolute()));
    }

    #[test]
    fn sniff_root_folds_dot_components_before_walking() {
        let probe = ScriptedProbe::default().root("/w/plain/child", MERCURIAL);
        let resolver = Resolver::new(registry(), probe);

        assert_eq!(resolver.sniff_root(Some(Path::new("/w/plain/child/.."))), None);
        let calls = resolver.probe().calls.lock().unwrap().clone();
        assert_eq!(calls[0], Path::new("/w/plain"));
        assert!(calls.iter().all(|dir| !dir.starts_with("/w/plain/child")));

        let info = resolver
            .sniff_root(Some(Path::new("/w/./other/../plain/child/./x")))
            .expect("root found");
        assert_eq!(info.root(), Path::new("/w/plain/child"));
    }

    #[test]
    fn sniff_root_folds_relative_parent_components() {
        let cwd = env::current_dir().expect("working directory");
        let resolver = Resolver::new(registry(), ScriptedProbe::default());
        let _ = resolver.sniff_root(Some(Path::new("./x/../y")));
        let _ = resolver.sniff_root(Some(Path::new("..")));

        let calls = resolver.probe().calls.lock().unwrap().clone();
        assert_eq!(calls[0], cwd.join("y"));
        let parent = cwd.parent().unwrap_or(cwd.as_path());
        assert!(calls.iter().any(|dir| dir == parent));
        assert!(calls.iter().all(|dir| {
            dir.components()
                .all(|c| !matches!(c, Component::CurDir | Component::ParentDir))
        }));
    }

    #[test]
    fn normalize_lexically_keeps_root() {
        assert_eq!(normalize_lexically(Path::new("/../..")), Path::new("/"));
        assert_eq!(normalize_lexically(Path::new("/a/./b/../c")), Path::new("/a/c"));
        assert_eq!(normalize_lexically(Path::new("/a/b/")), Path::new("/a/b"));
    }

    #[test]
    fn sniff_env_uses_first_known_override() {
        let resolver = Resolver::new(registry(), ScriptedProbe::default());

        let env = |name: &str| match name {
            "SL_IDENTITY" => Some(OsString::from("bogus")),
            "HG_IDENTITY" => Some(OsString::from("hg")),
            _ => None,
        };
        assert_eq!(resolver.sniff_env_with(env), Some(MERCURIAL));

        let env = |name: &str| match name {
            "SL_IDENTITY" => Some(OsString::from(" Sapling ")),
            "HG_IDENTITY" => Some(OsString::from("hg")),
            _ => None,
        };
        assert_eq!(resolver.sniff_env_with(env), Some(SAPLING));
    }

    #[test]
    fn sniff_env_ignores_empty_and_unknown_values() {
        let resolver = Resolver::new(registry(), ScriptedProbe::default());

        assert_eq!(resolver.sniff_env_with(no_env), None);
        assert_eq!(
            resolver.sniff_env_with(|_| Some(OsString::new())),
            None
        );
        assert_eq!(
            resolver.sniff_env_with(|_| Some(OsString::from("git"))),
            None
        );
    }

    #[test]
    fn sniff_env_without_override_variables_is_none() {
        let bare = Registry::new(vec![MERCURIAL], MERCURIAL).unwrap();
        let resolver = Resolver::new(bare, ScriptedProbe::default());
        assert_eq!(resolver.sniff_env_with(|_| Some(OsString::from("hg"))), None);
    }

    #[test]
    fn environment_override_wins_over_filesystem() {
        let probe = ScriptedProbe::default().root("/repo", MERCURIAL);
        let resolver = Resolver::new(registry(), probe);

        let identity = resolver.current_with(Some(Path::new("/repo/sub")), |name| {
            (name == "SL_IDENTITY").then(|| OsString::from("sl"))
        });
        assert_eq!(identity, SAPLING);
        assert_eq!(
            resolver.probe().call_count(),
            0,
            "override must short-circuit the walk"
        );
    }

    #[test]
    fn filesystem_wins_over_default() {
        let probe = ScriptedProbe::default().root("/repo", SAPLING);
        let resolver = Resolver::new(registry(), probe);
        assert_eq!(
            resolver.current_with(Some(Path::new("/repo/sub/dir")), no_env),
            SAPLING
        );
    }

    #[test]
    fn sniff_dir_walks_once_per_path() {
        let probe = ScriptedProbe::default().root("/repo", MERCURIAL);
        let resolver = Resolver::new(registry(), probe);
        let path = Path::new("/repo/sub/dir");

        let first = resolver.sniff_dir(path);
        let probes_after_first = resolver.probe().call_count();
        let second = resolver.sniff_dir(path);

        assert_eq!(first, Some(MERCURIAL));
        assert_eq!(first, second);
        assert_eq!(resolver.probe().call_count(), probes_after_first);
        assert_eq!(resolver.cache().hits(), 1);
        assert_eq!(resolver.cache().misses(), 1);
    }

    #[test]
    fn sniff_dir_caches_misses() {
        let resolver = Resolver::new(registry(), ScriptedProbe::default());
        let path = Path::new("/nothing/here");

        assert_eq!(resolver.sniff_dir(path), None);
        let probes = resolver.probe().call_count();
        assert_eq!(resolver.sniff_dir(path), None);
        assert_eq!(resolver.probe().call_count(), probes);
    }

    #[test]
    fn shared_cache_spans_resolvers() {
        let cache = Arc::new(DirCache::new());
        let first = Resolver::new(registry(), ScriptedProbe::default().root("/r", SAPLING))
            .with_cache(Arc::clone(&cache));
        let second =
            Resolver::new(registry(), ScriptedProbe::default()).with_cache(Arc::clone(&cache));

        assert_eq!(first.sniff_dir(Path::new("/r/x")), Some(SAPLING));
        assert_eq!(second.sniff_dir(Path::new("/r/x")), Some(SAPLING));
        assert_eq!(second.probe().call_count(), 0);
    }

    #[test]
    fn identity_at_probes_single_directory() {
        let probe = ScriptedProbe::default().root("/repo", MERCURIAL);
        let resolver = Resolver::new(registry(), probe);

        assert_eq!(resolver.identity_at(Path::new("/repo")), Some(MERCURIAL));
        assert_eq!(resolver.identity_at(Path::new("/repo/sub")), None);
    }

    #[test]
    fn dot_dir_probe_resolver_handles_real_tree() {
        let temp = tempfile::tempdir().expect("create tempdir");
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("create nested");
        std::fs::create_dir(temp.path().join(".sl")).expect("create marker");

        let resolver = Resolver::new(registry(), DotDirProbe);
        let info = resolver.sniff_root(Some(&nested)).expect("root found");
        assert_eq!(info.root(), temp.path());
        assert_eq!(info.identity(), SAPLING);
    }

    #[test]
    fn root_info_accessors() {
        let info = RootInfo::new(PathBuf::from("/repo"), MERCURIAL);
        assert_eq!(info.root(), Path::new("/repo"));
        assert_eq!(info.identity(), MERCURIAL);
        assert_eq!(info.into_root(), PathBuf::from("/repo"));
    }
}
