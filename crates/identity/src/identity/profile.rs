//! Identity profiles encapsulating brand vocabulary and repository markers.

use ::core::str::FromStr;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::template::TemplateMap;

/// Describes one branded variant of the version-control front-end.
///
/// An identity bundles the vocabulary shown to users (the command-line name,
/// the product name and the long product name) with the markers used to
/// recognise repositories that belong to it: the dot directory at the root of
/// a working copy, the prefix of identity-specific environment variables and
/// the name of the per-repository configuration file. Identities are `Copy`
/// and built from `'static` strings so the compiled-in variants can live in
/// constant contexts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Identity {
    cli_name: &'static str,
    product_name: &'static str,
    long_product_name: &'static str,
    dot_dir: &'static str,
    env_prefix: &'static str,
    config_repo_file: &'static str,
}

impl Identity {
    /// Creates a new [`Identity`].
    #[must_use]
    pub const fn new(
        cli_name: &'static str,
        product_name: &'static str,
        long_product_name: &'static str,
        dot_dir: &'static str,
        env_prefix: &'static str,
        config_repo_file: &'static str,
    ) -> Self {
        Self {
            cli_name,
            product_name,
            long_product_name,
            dot_dir,
            env_prefix,
            config_repo_file,
        }
    }

    /// Returns the program name typed on the command line (`hg`, `sl`).
    #[must_use]
    pub const fn cli_name(&self) -> &'static str {
        self.cli_name
    }

    /// Returns the marketing name (`Mercurial`).
    #[must_use]
    pub const fn product_name(&self) -> &'static str {
        self.product_name
    }

    /// Returns the full descriptive name (`Mercurial Distributed SCM`).
    #[must_use]
    pub const fn long_product_name(&self) -> &'static str {
        self.long_product_name
    }

    /// Returns the marker directory name found at repository roots.
    #[must_use]
    pub const fn dot_dir(&self) -> &'static str {
        self.dot_dir
    }

    /// Returns the prefix shared by identity-specific environment variables.
    #[must_use]
    pub const fn env_prefix(&self) -> &'static str {
        self.env_prefix
    }

    /// Returns the file name of the per-repository configuration file.
    #[must_use]
    pub const fn config_repo_file(&self) -> &'static str {
        self.config_repo_file
    }

    /// Returns the marker directory below `root`.
    #[must_use]
    pub fn dot_dir_path(&self, root: &Path) -> PathBuf {
        root.join(self.dot_dir)
    }

    /// Returns the per-repository configuration file below `root`.
    #[must_use]
    pub fn config_repo_path(&self, root: &Path) -> PathBuf {
        self.dot_dir_path(root).join(self.config_repo_file)
    }

    /// Returns the identity-specific environment variable name for `suffix`.
    ///
    /// ```
    /// use identity::MERCURIAL;
    ///
    /// assert_eq!(MERCURIAL.env_name("PLAIN"), "HGPLAIN");
    /// ```
    #[must_use]
    pub fn env_name(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.env_prefix)
    }

    /// Reads the identity-specific environment variable for `suffix`.
    ///
    /// Unset and empty variables both yield `None`.
    #[must_use]
    pub fn env_var(&self, suffix: &str) -> Option<OsString> {
        env::var_os(self.env_name(suffix)).filter(|value| !value.is_empty())
    }

    /// Returns the template map built from this identity's vocabulary.
    #[must_use]
    pub const fn template_map(&self) -> TemplateMap {
        TemplateMap::new(self)
    }

    /// Replaces brand placeholders in `s` with this identity's vocabulary.
    #[must_use]
    pub fn replace<'a>(&self, s: Option<&'a str>) -> Option<std::borrow::Cow<'a, str>> {
        self.template_map().replace(s)
    }

    /// Returns `true` when `name` designates this identity.
    ///
    /// The command-line name and product name match ignoring ASCII case; the
    /// dot directory must match exactly. Surrounding whitespace is ignored.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        name.eq_ignore_ascii_case(self.cli_name)
            || name.eq_ignore_ascii_case(self.product_name)
            || name == self.dot_dir
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name)
    }
}

/// Sapling, recognised by a `.sl` directory.
pub const SAPLING: Identity = Identity::new(
    "sl",
    "Sapling",
    "Sapling SCM",
    ".sl",
    "SL_",
    "config",
);

/// Mercurial, recognised by a `.hg` directory.
pub const MERCURIAL: Identity = Identity::new(
    "hg",
    "Mercurial",
    "Mercurial Distributed SCM",
    ".hg",
    "HG",
    "hgrc",
);

/// Compiled-in identities in tie-break priority order.
pub const ALL_IDENTITIES: [Identity; 2] = [SAPLING, MERCURIAL];

/// Error returned when parsing an [`Identity`] from an unrecognised name fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("unrecognised identity; expected one of the sl or hg aliases")]
pub struct IdentityParseError;

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_IDENTITIES
            .into_iter()
            .find(|identity| identity.answers_to(s))
            .ok_or(IdentityParseError)
    }
}
