//! Regional bank directory
//!
//! Maps a French department code to the regional bank serving it. The
//! directory is public: it is queried before any session exists.

use crate::transport::{ApiRequest, Transport};
use crate::types::{BankError, RegionalBank};
use std::sync::Arc;

/// Directory client
pub struct RegionalBanks {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl RegionalBanks {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Look up the regional bank of a department
    ///
    /// # Arguments
    ///
    /// * `department` - Department code as the user typed it (`"75"`, `"2A"`)
    ///
    /// # Returns
    ///
    /// The first bank of the directory answer, with every field it carries.
    ///
    /// # Errors
    ///
    /// `NotFound` if the directory knows no bank for the department, `Http`
    /// if it answers with an error status.
    pub async fn by_department(&self, department: &str) -> Result<RegionalBank, BankError> {
        let url = format!(
            "{}/particulier/acces-cr.get-cr-by-department.json",
            self.base_url
        );
        let request = ApiRequest::post(url, format!("regionalbank-{}", department))
            .form(vec![("department".to_string(), department.to_string())]);

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(BankError::http(
                "regional bank directory",
                response.status,
                &response.body,
            ));
        }

        let banks: Vec<RegionalBank> = serde_json::from_str(&response.body)
            .map_err(|e| BankError::parse("regional bank directory", e))?;
        tracing::debug!(department, matches = banks.len(), "regional bank lookup");

        banks
            .into_iter()
            .next()
            .ok_or_else(|| BankError::not_found("regional bank", department))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedTransport;
    use crate::transport::Method;

    #[tokio::test]
    async fn test_by_department_returns_first_bank() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            r#"[
                {"name": "Paris", "regionalBankUrlPrefix": "/ca-paris/", "code": "882"},
                {"name": "Other", "regionalBankUrlPrefix": "/ca-other/"}
            ]"#,
        );

        let directory = RegionalBanks::new("https://bank.test/", transport.clone());
        let bank = directory.by_department("75").await.unwrap();

        assert_eq!(bank.name.as_deref(), Some("Paris"));
        assert_eq!(bank.path_segment().as_deref(), Some("ca-paris"));
        assert_eq!(bank.extra["code"], "882");

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.url,
            "https://bank.test/particulier/acces-cr.get-cr-by-department.json"
        );
        assert_eq!(request.form_value("department"), Some("75"));
        assert_eq!(request.fixture, "regionalbank-75");
        assert!(request.cookies.is_empty());
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("[]");

        let directory = RegionalBanks::new("https://bank.test", transport);
        let result = directory.by_department("99").await;

        assert_eq!(result, Err(BankError::not_found("regional bank", "99")));
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_status(502, "bad gateway");

        let directory = RegionalBanks::new("https://bank.test", transport);
        let result = directory.by_department("75").await;

        assert_eq!(
            result,
            Err(BankError::http("regional bank directory", 502, "bad gateway"))
        );
    }
}
