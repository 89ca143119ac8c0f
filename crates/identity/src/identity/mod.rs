#![deny(unsafe_code)]

//! Identity table shared by the resolver and the template substitutor.
//!
//! An [`Identity`] is one branded variant of the front-end: its command-line
//! name, its product names, and the markers that identify its repositories.
//! The [`Registry`] orders the known identities, names the default, and lists
//! the environment variables that may force a particular identity. Resolution
//! itself lives in [`crate::resolver`]; this module only describes what can be
//! resolved.

mod constants;
mod profile;
mod registry;

pub use constants::{DEFAULT_IDENTITY_NAME, IDENTITY_OVERRIDE_ENVS, identity_override_env_vars};
pub use profile::{ALL_IDENTITIES, Identity, IdentityParseError, MERCURIAL, SAPLING};
pub use registry::{Registry, RegistryError, manifest_json, manifest_json_pretty};
