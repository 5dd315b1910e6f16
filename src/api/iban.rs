//! IBAN lookup

use crate::core::session::Session;
use crate::types::{Account, BankError, Iban};
use serde_json::Value;

const IBAN_PATH: &str =
    "particulier/operations/operations-courantes/editer-rib/jcr:content.ibaninformation.json";

/// Fetch the IBAN of an account
///
/// The full payload is kept in [`Iban::raw`]; the code itself sits at
/// `ibanData.ibanData.ibanCode`.
pub async fn fetch_iban(session: &Session, account: &Account) -> Result<Iban, BankError> {
    let fixture = format!("account-{}-{}_iban", account.family_code, account.index);
    let request = session
        .get(IBAN_PATH, fixture)?
        .query("compteIdx", &account.index)
        .query("grandeFamilleCode", &account.family_code);

    let response = session.send(request).await?;
    if !response.is_success() {
        return Err(BankError::http("iban", response.status, &response.body));
    }

    let raw: Value =
        serde_json::from_str(&response.body).map_err(|e| BankError::parse("iban", e))?;
    let code = raw
        .pointer("/ibanData/ibanData/ibanCode")
        .and_then(Value::as_str)
        .ok_or_else(|| BankError::parse("iban", "missing ibanData.ibanData.ibanCode"))?
        .to_string();

    Ok(Iban {
        account_number: account.number.clone(),
        code,
        raw,
    })
}
