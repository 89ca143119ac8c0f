//! Ordered table of known identities.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use super::constants::{DEFAULT_IDENTITY_NAME, IDENTITY_OVERRIDE_ENVS};
use super::profile::{ALL_IDENTITIES, Identity};
use crate::validation::{
    ValidationError, validate_cli_name, validate_dot_dir, validate_env_name, validate_non_empty,
};

/// Error returned when a [`Registry`] cannot be constructed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    /// No identities were supplied.
    #[error("identity registry must contain at least one identity")]
    Empty,
    /// Two identities share a command-line name.
    #[error("duplicate identity name '{0}'")]
    DuplicateCliName(&'static str),
    /// Two identities share a marker directory.
    #[error("duplicate marker directory '{0}'")]
    DuplicateDotDir(&'static str),
    /// The default identity is not part of the registry.
    #[error("default identity '{0}' is not registered")]
    UnknownDefault(&'static str),
    /// An identity field failed validation.
    #[error("identity '{name}' has an invalid {field}")]
    Invalid {
        /// Command-line name of the offending identity.
        name: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },
    /// An override environment variable name failed validation.
    #[error("invalid override environment variable '{name}'")]
    InvalidOverrideEnv {
        /// Offending variable name.
        name: &'static str,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },
}

/// Ordered set of identities together with the default and the override
/// variables.
///
/// Order matters: when the markers of several identities exist in the same
/// directory, the identity listed first wins.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Registry {
    identities: Vec<Identity>,
    default: Identity,
    override_envs: Vec<&'static str>,
}

impl Registry {
    /// Creates a registry from `identities` in priority order.
    ///
    /// The registry starts without override variables; see
    /// [`Registry::with_override_envs`].
    pub fn new(identities: Vec<Identity>, default: Identity) -> Result<Self, RegistryError> {
        if identities.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut names = HashSet::new();
        let mut dot_dirs = HashSet::new();
        for identity in &identities {
            validate_identity(identity)?;

            if !names.insert(identity.cli_name()) {
                return Err(RegistryError::DuplicateCliName(identity.cli_name()));
            }
            if !dot_dirs.insert(identity.dot_dir()) {
                return Err(RegistryError::DuplicateDotDir(identity.dot_dir()));
            }
        }

        if !identities.contains(&default) {
            return Err(RegistryError::UnknownDefault(default.cli_name()));
        }

        Ok(Self {
            identities,
            default,
            override_envs: Vec::new(),
        })
    }

    /// Replaces the environment variables consulted for explicit overrides.
    pub fn with_override_envs<I>(mut self, names: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = &'static str>,
    {
        let names: Vec<_> = names.into_iter().collect();
        for &name in &names {
            validate_env_name(name)
                .map_err(|source| RegistryError::InvalidOverrideEnv { name, source })?;
        }
        self.override_envs = names;
        Ok(self)
    }

    /// Returns the compiled-in registry.
    ///
    /// # Panics
    ///
    /// Panics when the build-configured default names no compiled-in
    /// identity, which the build configuration must never allow.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let default = ALL_IDENTITIES
                .into_iter()
                .find(|identity| identity.answers_to(DEFAULT_IDENTITY_NAME))
                .unwrap_or_else(|| {
                    panic!("unsupported default identity '{DEFAULT_IDENTITY_NAME}'")
                });

            Self::new(ALL_IDENTITIES.to_vec(), default)
                .and_then(|registry| {
                    registry.with_override_envs(IDENTITY_OVERRIDE_ENVS.iter().copied())
                })
                .unwrap_or_else(|error| panic!("invalid compiled-in identity registry: {error}"))
        })
    }

    /// Returns the identities in priority order.
    #[must_use]
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Returns the identity used when nothing else selects one.
    #[must_use]
    pub const fn default_identity(&self) -> Identity {
        self.default
    }

    /// Returns the override environment variables in consultation order.
    #[must_use]
    pub fn override_envs(&self) -> &[&'static str] {
        &self.override_envs
    }

    /// Returns `true` when `identity` is registered.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.identities.contains(identity)
    }

    /// Looks up a registered identity by name.
    ///
    /// Accepts the command-line name or product name in any ASCII case, or
    /// the exact marker directory. The first identity in priority order that
    /// answers to `name` wins.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Identity> {
        self.identities
            .iter()
            .copied()
            .find(|identity| identity.answers_to(name))
    }

    /// Serialises the registry as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error; plain string fields do not produce one.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialises the registry as indented JSON.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::to_json`].
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Returns the compiled-in registry as compact JSON, rendered once.
///
/// Packaging scripts and shell completions read the identity table from here
/// instead of duplicating it.
///
/// ```
/// let json = identity::manifest_json();
/// assert!(json.contains("\"cli_name\":\"hg\""));
/// ```
///
/// # Panics
///
/// Panics if the registry cannot be serialised. Every field is a plain
/// string, so this does not happen in practice.
#[must_use]
pub fn manifest_json() -> &'static str {
    static JSON: OnceLock<String> = OnceLock::new();
    JSON.get_or_init(|| {
        Registry::builtin()
            .to_json()
            .unwrap_or_else(|error| panic!("cannot serialise identity registry: {error}"))
    })
}

/// Returns the compiled-in registry as indented JSON, rendered once.
///
/// # Panics
///
/// Panics under the same conditions as [`manifest_json`].
#[must_use]
pub fn manifest_json_pretty() -> &'static str {
    static JSON_PRETTY: OnceLock<String> = OnceLock::new();
    JSON_PRETTY.get_or_init(|| {
        Registry::builtin()
            .to_json_pretty()
            .unwrap_or_else(|error| panic!("cannot serialise identity registry: {error}"))
    })
}

fn validate_identity(identity: &Identity) -> Result<(), RegistryError> {
    let name = identity.cli_name();

    validate_cli_name(name).map_err(invalid(name, "command-line name"))?;
    validate_non_empty(identity.product_name()).map_err(invalid(name, "product name"))?;
    validate_non_empty(identity.long_product_name())
        .map_err(invalid(name, "long product name"))?;
    validate_dot_dir(identity.dot_dir()).map_err(invalid(name, "marker directory"))?;
    validate_env_name(identity.env_prefix()).map_err(invalid(name, "environment prefix"))?;
    validate_cli_name(identity.config_repo_file())
        .map_err(invalid(name, "repository config file"))?;
    Ok(())
}

fn invalid(
    name: &'static str,
    field: &'static str,
) -> impl FnOnce(ValidationError) -> RegistryError {
    move |source| RegistryError::Invalid {
        name,
        field,
        source,
    }
}
