//! Session authenticator
//!
//! Runs the two-step keypad login once per session:
//!
//! ```text
//! Unauthenticated --resolve region--> KeypadRequested --fetch keypad--> CredentialSubmitted
//!       --submit mapped PIN--> Authenticated
//! ```
//!
//! Any failing step moves the authenticator to `Failed` and leaves the
//! session exactly as it was: the regional prefix and the merged cookie jar
//! are installed together, only after the security check succeeded.

use crate::api::regional_banks::RegionalBanks;
use crate::config::{ClientConfig, RegionLookup};
use crate::core::keypad::{join_indices, map_pin, KeypadLayout};
use crate::core::session::Session;
use crate::transport::{ApiRequest, CookieJar, FixtureContent, Transport};
use crate::types::BankError;
use std::fmt;
use std::sync::Arc;

/// Fixture of the keypad challenge
pub const KEYPAD_FIXTURE: &str = "authentication_keypad";

/// Fixture of the security check (stores the cookies it sets)
pub const SECURITY_FIXTURE: &str = "authentication_security";

/// Page the server redirects to after login
const LOGIN_PATH: &str = "/content/npc/start";

/// User credentials
///
/// `Debug` never prints the PIN.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    pin: Vec<u8>,
    department: String,
}

impl Credentials {
    /// Create credentials from a PIN given as digits
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the username or PIN is empty, or a
    /// PIN entry is not a decimal digit.
    pub fn new(
        username: impl Into<String>,
        pin: Vec<u8>,
        department: impl Into<String>,
    ) -> Result<Self, BankError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(BankError::config("username must not be empty"));
        }
        if pin.is_empty() {
            return Err(BankError::config("PIN must not be empty"));
        }
        if pin.iter().any(|&d| d > 9) {
            return Err(BankError::config("PIN must only contain digits"));
        }
        Ok(Self {
            username,
            pin,
            department: department.into(),
        })
    }

    /// Create credentials from a PIN given as text, e.g. `"123456"`
    pub fn from_pin_str(
        username: impl Into<String>,
        pin: &str,
        department: impl Into<String>,
    ) -> Result<Self, BankError> {
        Self::new(username, parse_pin(pin)?, department)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn department(&self) -> &str {
        &self.department
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("pin", &"<redacted>")
            .field("department", &self.department)
            .finish()
    }
}

/// Parse a PIN typed as text into digits
pub fn parse_pin(pin: &str) -> Result<Vec<u8>, BankError> {
    let pin = pin.trim();
    if pin.is_empty() {
        return Err(BankError::config("PIN must not be empty"));
    }
    pin.chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or_else(|| BankError::config("PIN must only contain digits"))
        })
        .collect()
}

/// Login progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    KeypadRequested,
    CredentialSubmitted,
    Authenticated,
    Failed,
}

/// Single-shot login state machine
pub struct Authenticator<'a> {
    config: &'a ClientConfig,
    credentials: Credentials,
    state: AuthState,
}

impl<'a> Authenticator<'a> {
    pub fn new(config: &'a ClientConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
            state: AuthState::Unauthenticated,
        }
    }

    /// Current state of the handshake
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Run the handshake and install the result into `session`
    ///
    /// # Errors
    ///
    /// - `UnknownRegion` if the department has no regional prefix
    /// - `KeypadFetch` if the keypad challenge is refused
    /// - `InvalidLayout` if the keypad lacks one of the PIN digits
    /// - `SecurityCheck` if the credential is refused
    ///
    /// The authenticator is single-shot: calling this again after it ran
    /// returns a configuration error without any network call.
    pub async fn authenticate(&mut self, session: &mut Session) -> Result<(), BankError> {
        if self.state != AuthState::Unauthenticated {
            return Err(BankError::config(format!(
                "authenticator already ran (state {:?})",
                self.state
            )));
        }

        match self.run(session).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(from = ?self.state, "login failed: {}", e);
                self.state = AuthState::Failed;
                Err(e)
            }
        }
    }

    async fn run(&mut self, session: &mut Session) -> Result<(), BankError> {
        let region = self.resolve_region(session).await?;
        self.transition(AuthState::KeypadRequested);

        let (layout, provisional) = self.fetch_keypad(session, &region).await?;
        self.transition(AuthState::CredentialSubmitted);

        let indices = map_pin(&layout.key_layout, &self.credentials.pin)?;
        let final_cookies = self
            .submit_credential(session, &region, &layout.keypad_id, &indices, &provisional)
            .await?;

        session.install(region, provisional.merged(&final_cookies));
        self.transition(AuthState::Authenticated);
        tracing::info!(
            username = %self.credentials.username,
            cookies = session.cookies().len(),
            "session authenticated"
        );
        Ok(())
    }

    fn transition(&mut self, next: AuthState) {
        tracing::debug!(from = ?self.state, to = ?next, "login state change");
        self.state = next;
    }

    async fn resolve_region(&self, session: &Session) -> Result<String, BankError> {
        let department = self.credentials.department.as_str();
        match self.config.region_lookup {
            RegionLookup::Local => self
                .config
                .department_alias(department)
                .map(str::to_string)
                .ok_or_else(|| BankError::unknown_region(department)),
            RegionLookup::Remote => {
                let directory =
                    RegionalBanks::new(session.base_url(), Arc::clone(session.transport()));
                let bank = match directory.by_department(department).await {
                    Err(BankError::NotFound { .. }) => {
                        return Err(BankError::unknown_region(department))
                    }
                    other => other?,
                };
                bank.path_segment()
                    .filter(|segment| !segment.is_empty())
                    .ok_or_else(|| BankError::unknown_region(department))
            }
        }
    }

    async fn fetch_keypad(
        &self,
        session: &Session,
        region: &str,
    ) -> Result<(KeypadLayout, CookieJar), BankError> {
        let url = format!(
            "{}/{}/particulier/acceder-a-mes-comptes.authenticationKeypad.json",
            session.base_url(),
            region
        );
        let response = session
            .transport()
            .execute(ApiRequest::post(url, KEYPAD_FIXTURE))
            .await?;

        if !response.is_success() {
            return Err(BankError::KeypadFetch {
                status: response.status,
                body: response.body,
            });
        }

        let layout: KeypadLayout = serde_json::from_str(&response.body)
            .map_err(|e| BankError::parse("keypad", e))?;
        Ok((layout, response.cookies))
    }

    async fn submit_credential(
        &self,
        session: &Session,
        region: &str,
        keypad_id: &str,
        indices: &[usize],
        provisional: &CookieJar,
    ) -> Result<CookieJar, BankError> {
        let url = format!(
            "{}/{}/particulier/acceder-a-mes-comptes.html/j_security_check",
            session.base_url(),
            region
        );
        let form = vec![
            ("j_password".to_string(), join_indices(indices)),
            ("path".to_string(), LOGIN_PATH.to_string()),
            (
                "j_path_ressource".to_string(),
                format!("%2F{}%2Fparticulier%2Foperations%2Fsynthese.html", region),
            ),
            ("j_username".to_string(), self.credentials.username.clone()),
            ("keypadId".to_string(), keypad_id.to_string()),
            ("j_validate".to_string(), "true".to_string()),
        ];
        let request = ApiRequest::post(url, SECURITY_FIXTURE)
            .form(form)
            .cookies(provisional)
            .fixture_content(FixtureContent::Cookies);

        let response = session.transport().execute(request).await?;
        if !response.is_success() {
            return Err(BankError::SecurityCheck {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.cookies)
    }
}

/// Create a session and log it in
///
/// Convenience wrapper running [`Authenticator::authenticate`] on a fresh
/// [`Session`].
pub async fn login(
    config: &ClientConfig,
    transport: Arc<dyn Transport>,
    credentials: Credentials,
) -> Result<Session, BankError> {
    let mut session = Session::new(config, transport);
    Authenticator::new(config, credentials)
        .authenticate(&mut session)
        .await?;
    Ok(session)
}
