#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Program identity resolution for the version-control front-end.
//!
//! The same binary ships under several brands. Which one applies to an
//! invocation is decided at runtime: an override variable in the environment
//! wins, otherwise the nearest enclosing repository decides through its
//! marker directory, otherwise the build-configured default applies. Once an
//! identity is known, [`TemplateMap`] renders display strings written against
//! brand placeholders.
//!
//! ```
//! use identity::{DotDirProbe, MERCURIAL, Registry, Resolver, SAPLING};
//!
//! let repo = tempfile::tempdir()?;
//! std::fs::create_dir_all(repo.path().join(".sl"))?;
//! std::fs::create_dir_all(repo.path().join("src/bin"))?;
//!
//! let registry = Registry::new(vec![SAPLING, MERCURIAL], MERCURIAL)?;
//! let resolver = Resolver::new(registry, DotDirProbe);
//! let info = resolver.sniff_root(Some(&repo.path().join("src/bin"))).unwrap();
//! assert_eq!(info.root(), repo.path());
//! assert_eq!(info.identity(), SAPLING);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Memoised directory sniffing.
pub mod cache;
/// Process-wide resolution helpers.
pub mod context;
/// Identity table and registry.
pub mod identity;
/// Repository root detection.
pub mod probe;
/// Identity resolution.
pub mod resolver;
/// Brand placeholder substitution.
pub mod template;
mod trace;
/// Validation helpers for identity tables.
pub mod validation;

pub use cache::DirCache;
pub use context::{current, default_resolver, replace, sniff_dir, sniff_env, sniff_root};
pub use identity::{
    ALL_IDENTITIES, DEFAULT_IDENTITY_NAME, IDENTITY_OVERRIDE_ENVS, Identity, IdentityParseError,
    MERCURIAL, Registry, RegistryError, SAPLING, identity_override_env_vars, manifest_json,
    manifest_json_pretty,
};
pub use probe::{DotDirProbe, RootProbe};
pub use resolver::{Resolver, RootInfo};
pub use template::{LONG_PRODUCT_TOKEN, PRODUCT_TOKEN, PROG_TOKEN, TemplateMap};
pub use validation::ValidationError;
