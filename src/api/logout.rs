//! Session termination

use crate::core::session::Session;
use crate::transport::FixtureContent;
use crate::types::BankError;

const LOGOUT_PATH: &str = "particulier.npc.logout.html";
const LOGOUT_RESOURCE: &str = "/content/ca/cr866/npc/fr/particulier.html";

/// Close the session on the server
///
/// The session is consumed: its cookies are no longer valid afterwards,
/// whatever the outcome.
pub async fn logout(session: Session) -> Result<(), BankError> {
    let request = session
        .get(LOGOUT_PATH, "logout")?
        .query("resource", LOGOUT_RESOURCE)
        .fixture_content(FixtureContent::Empty);

    let response = session.send(request).await?;
    if !response.is_success() {
        return Err(BankError::http("logout", response.status, &response.body));
    }

    tracing::info!("session closed");
    Ok(())
}
