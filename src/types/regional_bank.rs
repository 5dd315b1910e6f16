//! Regional bank directory record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A regional bank as returned by the department directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalBank {
    /// Display name of the regional bank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL prefix with surrounding slashes, e.g. `/ca-paris/`
    #[serde(
        rename = "regionalBankUrlPrefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub url_prefix: Option<String>,

    /// Every other field of the record, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegionalBank {
    /// Path segment used in every authenticated URL
    ///
    /// The directory wraps the segment in slashes; the first and last
    /// characters are dropped.
    pub fn path_segment(&self) -> Option<String> {
        let prefix = self.url_prefix.as_deref()?;
        let mut chars = prefix.chars();
        chars.next();
        chars.next_back();
        Some(chars.as_str().to_string())
    }
}
