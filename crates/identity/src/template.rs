//! Brand placeholder substitution for display strings.
//!
//! Help texts and messages are written against placeholders (`@prog@`,
//! `@Product@`, `@LongProduct@`) and rendered with the vocabulary of the
//! resolved [`Identity`]. Matching is literal; there is no escaping and no
//! pattern syntax.

use std::borrow::Cow;

use crate::Identity;

/// Placeholder for the command-line name.
pub const PROG_TOKEN: &str = "@prog@";

/// Placeholder for the product name.
pub const PRODUCT_TOKEN: &str = "@Product@";

/// Placeholder for the long product name.
pub const LONG_PRODUCT_TOKEN: &str = "@LongProduct@";

/// Placeholder-to-vocabulary mapping for one identity.
///
/// Entries are applied in a fixed order. Vocabulary values must not contain
/// placeholder syntax themselves, otherwise a later entry could rewrite text
/// produced by an earlier one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TemplateMap {
    entries: [(&'static str, &'static str); 3],
}

impl TemplateMap {
    /// Builds the map from `identity`'s vocabulary.
    #[must_use]
    pub const fn new(identity: &Identity) -> Self {
        Self {
            entries: [
                (PROG_TOKEN, identity.cli_name()),
                (PRODUCT_TOKEN, identity.product_name()),
                (LONG_PRODUCT_TOKEN, identity.long_product_name()),
            ],
        }
    }

    /// Returns the `(placeholder, replacement)` pairs in application order.
    #[must_use]
    pub const fn entries(&self) -> &[(&'static str, &'static str); 3] {
        &self.entries
    }

    /// Returns the replacement for `token`, if it is a known placeholder.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(placeholder, _)| *placeholder == token)
            .map(|(_, value)| *value)
    }

    /// Replaces every placeholder occurrence in `s`.
    ///
    /// Strings without placeholders come back borrowed.
    ///
    /// ```
    /// use identity::{MERCURIAL, TemplateMap};
    ///
    /// let map = TemplateMap::new(&MERCURIAL);
    /// assert_eq!(
    ///     map.render("Welcome to @Product@ (@LongProduct@)"),
    ///     "Welcome to Mercurial (Mercurial Distributed SCM)"
    /// );
    /// ```
    #[must_use]
    pub fn render<'a>(&self, s: &'a str) -> Cow<'a, str> {
        let mut rendered = Cow::Borrowed(s);
        for &(placeholder, value) in &self.entries {
            if rendered.contains(placeholder) {
                rendered = Cow::Owned(rendered.replace(placeholder, value));
            }
        }
        rendered
    }

    /// Renders `s` when present; an absent string stays absent.
    #[must_use]
    pub fn replace<'a>(&self, s: Option<&'a str>) -> Option<Cow<'a, str>> {
        s.map(|s| self.render(s))
    }
}
