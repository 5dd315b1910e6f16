//! Payment card types

use super::serde_helpers::string_or_number;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A payment card attached to one of the user's accounts
///
/// The card listing groups cards under their account; `account_id` is copied
/// from that parent entry when the listing is flattened. Serializing a card
/// writes back the card record the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Card {
    /// Card identifier, usually a masked card number (`idCarte`)
    pub id: String,

    /// Card product (`typeCarte`)
    pub card_type: String,

    /// Card holder (`titulaire`)
    pub holder: String,

    /// Server-side card index (`index`), used as `carteIdx`
    pub index: String,

    /// Number of the account the card debits (`idCompte`)
    pub account_id: String,

    /// The record as received
    pub raw: Value,
}

#[derive(Deserialize)]
struct CardFields {
    #[serde(rename = "idCarte")]
    id: String,
    #[serde(rename = "typeCarte", default)]
    card_type: String,
    #[serde(rename = "titulaire", default)]
    holder: String,
    #[serde(rename = "index", deserialize_with = "string_or_number")]
    index: String,
    #[serde(rename = "idCompte", default)]
    account_id: String,
}

impl TryFrom<Value> for Card {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let fields = CardFields::deserialize(&raw)?;
        Ok(Self {
            id: fields.id,
            card_type: fields.card_type,
            holder: fields.holder,
            index: fields.index,
            account_id: fields.account_id,
            raw,
        })
    }
}

impl From<Card> for Value {
    fn from(card: Card) -> Self {
        card.raw
    }
}

impl Card {
    /// Whether the card identifier ends with the given digits
    pub fn ends_with(&self, last_digits: &str) -> bool {
        self.id.ends_with(last_digits)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Card[account={}, type={}, holder={}]",
            self.account_id, self.card_type, self.holder
        )
    }
}
