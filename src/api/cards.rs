//! Payment cards
//!
//! The card listing groups cards under the account they debit. Deferred card
//! operations are read through that owning account.

use crate::api::accounts::Accounts;
use crate::core::pagination::{OperationsQuery, PaginationEngine};
use crate::core::session::Session;
use crate::types::{BankError, Card, Operation, OperationSelector};
use serde::Deserialize;
use std::time::Duration;

const CARDS_PATH: &str = "particulier/operations/moyens-paiement/gestion-carte-v2/mes-cartes/jcr:content.listeCartesParCompte.json";

#[derive(Debug, Deserialize)]
struct CardListing {
    comptes: Vec<CardGroup>,
}

#[derive(Debug, Deserialize)]
struct CardGroup {
    #[serde(rename = "idCompte")]
    account_id: String,
    #[serde(rename = "listeCartes", default)]
    cards: Vec<Card>,
}

/// Decode the card listing, copying each group's account onto its cards
fn flatten_listing(body: &str) -> Result<Vec<Card>, BankError> {
    let listing: CardListing =
        serde_json::from_str(body).map_err(|e| BankError::parse("cards", e))?;

    Ok(listing
        .comptes
        .into_iter()
        .flat_map(|group| {
            let account_id = group.account_id;
            group.cards.into_iter().map(move |mut card| {
                card.account_id = account_id.clone();
                card
            })
        })
        .collect())
}

/// Cards of the session owner
pub struct Cards<'a> {
    session: &'a Session,
    cards: Vec<Card>,
}

impl<'a> Cards<'a> {
    /// List every card
    ///
    /// # Errors
    ///
    /// `Http` on an error status, `Parse` if the answer has no `comptes`.
    pub async fn fetch(session: &'a Session) -> Result<Self, BankError> {
        let request = session.get(CARDS_PATH, "cards")?;
        let response = session.send(request).await?;
        if !response.is_success() {
            return Err(BankError::http("cards", response.status, &response.body));
        }

        let cards = flatten_listing(&response.body)?;
        tracing::debug!(count = cards.len(), "cards listed");
        Ok(Self { session, cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// First card whose identifier ends with `last_digits`
    pub fn search(&self, last_digits: &str) -> Result<&Card, BankError> {
        self.cards
            .iter()
            .find(|card| card.ends_with(last_digits))
            .ok_or_else(|| BankError::not_found("card", last_digits))
    }

    /// Deferred operations of a card
    ///
    /// # Arguments
    ///
    /// * `card` - Card to read
    /// * `accounts` - Account listing holding the card's debit account
    /// * `max_count` - Cap on the number of operations returned
    /// * `page_delay` - Pause between two page requests
    ///
    /// # Errors
    ///
    /// `NotFound` if the debit account is not in `accounts`.
    pub async fn operations(
        &self,
        card: &Card,
        accounts: &Accounts<'_>,
        max_count: usize,
        page_delay: Option<Duration>,
    ) -> Result<Vec<Operation>, BankError> {
        let account = accounts.search(&card.account_id)?;
        let selector = OperationSelector::DeferredCard {
            account_index: account.index.clone(),
            family_code: account.family_code.clone(),
            card_index: card.index.clone(),
        };
        let query = OperationsQuery::new(selector)
            .max_count(max_count)
            .page_delay(page_delay);
        PaginationEngine::new(self.session).fetch(&query).await
    }
}

impl<'s, 'a> IntoIterator for &'s Cards<'a> {
    type Item = &'s Card;
    type IntoIter = std::slice::Iter<'s, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::testing::ScriptedTransport;
    use rstest::rstest;
    use std::sync::Arc;

    const LISTING: &str = r#"{"comptes": [
        {"idCompte": "00011111111", "listeCartes": [
            {"idCarte": "4970XXXXXXXX1234", "typeCarte": "VISA PREMIER", "titulaire": "M DUPONT", "index": 0},
            {"idCarte": "4970XXXXXXXX5678", "typeCarte": "MASTERCARD", "titulaire": "MME DUPONT", "index": "1"}
        ]},
        {"idCompte": "00099999999", "listeCartes": [
            {"idCarte": "5130XXXXXXXX1234", "typeCarte": "VISA", "titulaire": "M DUPONT", "index": 0}
        ]}
    ]}"#;

    fn authenticated(transport: Arc<ScriptedTransport>) -> Session {
        let config = ClientConfig {
            base_url: "https://bank.test".to_string(),
            page_size: 5,
            ..ClientConfig::default()
        };
        let mut session = Session::new(&config, transport);
        session.install("ca-paris".to_string(), Default::default());
        session
    }

    #[test]
    fn test_flatten_listing_copies_account() {
        let cards = flatten_listing(LISTING).unwrap();

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].account_id, "00011111111");
        assert_eq!(cards[1].index, "1");
        assert_eq!(cards[2].account_id, "00099999999");
    }

    #[rstest]
    #[case::missing_comptes(r#"{"cartes": []}"#)]
    #[case::not_json("<html>")]
    fn test_flatten_listing_errors(#[case] body: &str) {
        assert!(matches!(flatten_listing(body), Err(BankError::Parse { .. })));
    }

    #[rstest]
    #[case::first_match_wins("1234", "4970XXXXXXXX1234")]
    #[case::unique("5678", "4970XXXXXXXX5678")]
    #[tokio::test]
    async fn test_search(#[case] digits: &str, #[case] expected: &str) {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(LISTING);
        let session = authenticated(transport.clone());

        let cards = Cards::fetch(&session).await.unwrap();

        assert_eq!(cards.search(digits).unwrap().id, expected);
        assert_eq!(transport.requests()[0].fixture, "cards");
    }

    #[tokio::test]
    async fn test_search_unknown_card() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(LISTING);
        let session = authenticated(transport);

        let cards = Cards::fetch(&session).await.unwrap();

        assert_eq!(
            cards.search("0000").unwrap_err(),
            BankError::not_found("card", "0000")
        );
    }

    #[tokio::test]
    async fn test_card_operations_go_through_owning_account() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(LISTING);
        transport.push_ok(
            r#"[{"numeroCompte": "00011111111", "index": 4, "grandeFamilleProduitCode": "1", "solde": 10}]"#,
        );
        transport.push_ok("[]");
        transport.push_ok("[]");
        transport.push_ok(
            r#"{"listeOperations": [{"dateOperation": "2024-03-05", "libelleOperation": "CB", "montant": -20}], "hasNext": false}"#,
        );
        let session = authenticated(transport.clone());

        let cards = Cards::fetch(&session).await.unwrap();
        let accounts = Accounts::fetch(&session).await.unwrap();
        let card = cards.search("5678").unwrap();
        let operations = cards.operations(card, &accounts, 20, None).await.unwrap();

        assert_eq!(operations.len(), 1);
        let request = transport.requests().pop().unwrap();
        assert_eq!(request.query_value("compteIdx"), Some("4"));
        assert_eq!(request.query_value("carteIdx"), Some("1"));
        assert_eq!(request.fixture, "card-1-4-1_operations-p1");
    }

    #[tokio::test]
    async fn test_card_operations_unknown_account() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(LISTING);
        transport.push_ok("[]");
        transport.push_ok("[]");
        transport.push_ok("[]");
        let session = authenticated(transport.clone());

        let cards = Cards::fetch(&session).await.unwrap();
        let accounts = Accounts::fetch(&session).await.unwrap();
        let card = cards.search("1234").unwrap();
        let result = cards.operations(card, &accounts, 20, None).await;

        assert_eq!(result, Err(BankError::not_found("account", "00011111111")));
        assert_eq!(transport.request_count(), 4);
    }
}
