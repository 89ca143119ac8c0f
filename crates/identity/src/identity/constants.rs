//! Build-configured names consulted during identity resolution.

mod generated {
    include!(concat!(env!("OUT_DIR"), "/identity_generated.rs"));
}

/// Name of the identity used when neither the environment nor the filesystem
/// selects one.
#[doc(alias = "hg")]
pub const DEFAULT_IDENTITY_NAME: &str = generated::DEFAULT_IDENTITY;

/// Environment variables that force a specific [`Identity`][crate::Identity],
/// consulted in order.
#[doc(alias = "SL_IDENTITY")]
#[doc(alias = "HG_IDENTITY")]
pub const IDENTITY_OVERRIDE_ENVS: &[&str] = generated::OVERRIDE_ENVS;

/// Returns the environment variables that force a specific identity at runtime.
#[must_use]
pub const fn identity_override_env_vars() -> &'static [&'static str] {
    IDENTITY_OVERRIDE_ENVS
}
