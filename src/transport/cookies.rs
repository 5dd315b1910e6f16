//! Explicit cookie jar
//!
//! The session cookies are kept in a plain ordered map instead of an HTTP
//! library's cookie store. Merging is an explicit operation so the login
//! contract (provisional cookies, then final cookies winning on collision)
//! can be tested without any network stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name/value cookie map
///
/// Serializes as a flat JSON object, which is also the format of the
/// security-check mock fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar(BTreeMap<String, String>);

impl CookieJar {
    /// Create an empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cookie
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of a cookie, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of cookies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the jar holds no cookie
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Union of `self` and `newer`; cookies from `newer` win on name collision
    pub fn merged(&self, newer: &CookieJar) -> CookieJar {
        let mut jar = self.clone();
        for (name, value) in newer.iter() {
            jar.insert(name, value);
        }
        jar
    }

    /// Value for a `Cookie` request header, `None` when the jar is empty
    pub fn header_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        CookieJar(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
