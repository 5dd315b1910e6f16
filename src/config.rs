//! Client configuration
//!
//! Everything the session needs to know before the first network call: the
//! website root, TLS verification, the nominal page size of the operations
//! feed, and how a department code is turned into a regional bank prefix.
//!
//! The configuration can be loaded from a TOML file; every key is optional
//! and falls back to [`ClientConfig::default`]:
//!
//! ```toml
//! base_url = "https://www.credit-agricole.fr"
//! ssl_verify = true
//! page_size = 30
//! request_timeout_secs = 30
//! region_lookup = "local"
//!
//! [department_aliases]
//! "75" = { alias = "ca-paris" }
//! ```

use crate::types::BankError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Root of the website
pub const DEFAULT_BASE_URL: &str = "https://www.credit-agricole.fr";

/// Nominal number of operations per page
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Per-request timeout, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Department table shipped with the crate
const DEFAULT_ALIASES: &str = include_str!("../data/aliases.json");

/// How the regional bank prefix is resolved at login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLookup {
    /// Use the static department table
    #[default]
    Local,
    /// Ask the regional bank directory endpoint
    Remote,
}

/// Entry of the department table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAlias {
    /// Regional path segment, e.g. `ca-paris`
    pub alias: String,
}

/// Configuration of a client session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the website, without trailing slash
    pub base_url: String,
    /// Whether TLS certificates are verified
    pub ssl_verify: bool,
    /// Number of operations requested per page
    pub page_size: usize,
    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
    /// Regional prefix resolution strategy
    pub region_lookup: RegionLookup,
    /// Department code to regional prefix table (local lookup)
    pub department_aliases: BTreeMap<String, DepartmentAlias>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ssl_verify: true,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            region_lookup: RegionLookup::Local,
            department_aliases: default_department_aliases(),
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, BankError> {
        let config: ClientConfig = toml::from_str(text).map_err(BankError::config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self, BankError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BankError::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the invariants the rest of the client relies on
    pub fn validate(&self) -> Result<(), BankError> {
        if self.base_url.trim().is_empty() {
            return Err(BankError::config("base_url must not be empty"));
        }
        if self.page_size == 0 {
            return Err(BankError::config("page_size must be greater than zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(BankError::config(
                "request_timeout_secs must be greater than zero",
            ));
        }
        if self.region_lookup == RegionLookup::Local && self.department_aliases.is_empty() {
            // Report why the bundled table is missing when that is the cause
            parse_department_aliases(DEFAULT_ALIASES)?;
            return Err(BankError::config(
                "department_aliases must not be empty with local region lookup",
            ));
        }
        Ok(())
    }

    /// Website root without trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Regional prefix for a department in the local table
    pub fn department_alias(&self, department: &str) -> Option<&str> {
        self.department_aliases
            .get(&normalize_department(department))
            .map(|entry| entry.alias.as_str())
    }
}

/// Canonical form of a department code
///
/// Numeric codes are zero-padded to two digits (`"5"` becomes `"05"`);
/// alphanumeric codes such as `"2A"` are upper-cased.
pub fn normalize_department(department: &str) -> String {
    let trimmed = department.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>2}", trimmed)
    } else {
        trimmed.to_ascii_uppercase()
    }
}

/// Parse a department table given as JSON
pub fn parse_department_aliases(
    text: &str,
) -> Result<BTreeMap<String, DepartmentAlias>, BankError> {
    serde_json::from_str(text)
        .map_err(|e| BankError::config(format!("invalid department table: {}", e)))
}

fn default_department_aliases() -> BTreeMap<String, DepartmentAlias> {
    parse_department_aliases(DEFAULT_ALIASES).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bundled department table is unusable");
        BTreeMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_table_is_loaded() {
        let config = ClientConfig::default();
        assert!(config.department_aliases.len() > 90);
        assert_eq!(config.department_alias("75"), Some("ca-paris"));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::single_digit("5", "05")]
    #[case::two_digits("75", "75")]
    #[case::whitespace(" 1 ", "01")]
    #[case::corsica("2a", "2A")]
    fn test_normalize_department(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_department(input), expected);
    }

    #[rstest]
    #[case::padded("1", Some("ca-centrest"))]
    #[case::corsica("2b", Some("ca-corse"))]
    #[case::unknown("99", None)]
    #[case::empty("", None)]
    fn test_department_alias(#[case] department: &str, #[case] expected: Option<&str>) {
        assert_eq!(ClientConfig::default().department_alias(department), expected);
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = ClientConfig::from_toml_str(
            r#"
            page_size = 5
            region_lookup = "remote"
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 5);
        assert_eq!(config.region_lookup, RegionLookup::Remote);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.ssl_verify);
    }

    #[test]
    fn test_from_toml_str_replaces_table() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://bank.test/"

            [department_aliases]
            "07" = { alias = "ca-test" }
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://bank.test");
        assert_eq!(config.department_alias("7"), Some("ca-test"));
        assert_eq!(config.department_alias("75"), None);
    }

    #[rstest]
    #[case::zero_page_size("page_size = 0", "page_size")]
    #[case::empty_base_url("base_url = \"  \"", "base_url")]
    #[case::zero_timeout("request_timeout_secs = 0", "request_timeout_secs")]
    #[case::bad_type("page_size = \"ten\"", "Configuration error")]
    fn test_from_toml_str_errors(#[case] text: &str, #[case] expected: &str) {
        let error = ClientConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(error, BankError::Config { .. }));
        assert!(error.to_string().contains(expected));
    }

    #[test]
    fn test_bundled_table_parses() {
        let table = parse_department_aliases(DEFAULT_ALIASES).unwrap();
        assert_eq!(table.len(), ClientConfig::default().department_aliases.len());
    }

    #[rstest]
    #[case::truncated(r#"{"75": {"alias": "ca-paris"}"#)]
    #[case::wrong_shape(r#"{"75": "ca-paris"}"#)]
    fn test_malformed_table_is_reported(#[case] text: &str) {
        let error = parse_department_aliases(text).unwrap_err();
        assert!(matches!(error, BankError::Config { .. }));
        assert!(error.to_string().contains("invalid department table"));
    }

    #[rstest]
    #[case::local(RegionLookup::Local, false)]
    #[case::remote(RegionLookup::Remote, true)]
    fn test_empty_table_needs_remote_lookup(#[case] lookup: RegionLookup, #[case] valid: bool) {
        let config = ClientConfig {
            region_lookup: lookup,
            department_aliases: BTreeMap::new(),
            ..ClientConfig::default()
        };
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ssl_verify = false").unwrap();
        file.flush().unwrap();

        let config = ClientConfig::from_toml_file(file.path()).unwrap();
        assert!(!config.ssl_verify);

        let missing = ClientConfig::from_toml_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(missing, Err(BankError::Config { .. })));
    }
}
