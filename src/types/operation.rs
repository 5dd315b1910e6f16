//! Operation (transaction) types returned by the banking endpoints
//!
//! An `Operation` keeps the three fields every consumer needs (date, label,
//! amount) as typed values and carries every other server field through
//! verbatim in `extra`.

use super::serde_helpers::string_or_number;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single transaction record
///
/// Immutable once decoded from a page; the pagination engine only ever
/// appends operations to its result and never rewrites them. Serializing an
/// operation writes back the record exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Operation {
    /// Operation date as sent by the server
    ///
    /// Depending on the endpoint this is either a formatted date or an epoch
    /// timestamp; both are kept as text.
    pub date: String,

    /// Display label
    pub label: String,

    /// Signed amount (debits are negative)
    pub amount: Decimal,

    /// Human readable operation type, when the server provides one
    pub kind: Option<String>,

    /// The record as received
    pub raw: Value,
}

#[derive(Deserialize)]
struct OperationFields {
    #[serde(rename = "dateOperation", deserialize_with = "string_or_number")]
    date: String,
    #[serde(rename = "libelleOperation")]
    label: String,
    #[serde(rename = "montant", with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(rename = "libelleTypeOperation", default)]
    kind: Option<String>,
}

impl TryFrom<Value> for Operation {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let fields = OperationFields::deserialize(&raw)?;
        Ok(Self {
            date: fields.date,
            label: fields.label,
            amount: fields.amount,
            kind: fields.kind,
            raw,
        })
    }
}

impl From<Operation> for Value {
    fn from(operation: Operation) -> Self {
        operation.raw
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operation[date={}, label={}, amount={}]",
            self.date, self.label, self.amount
        )
    }
}

/// Which transaction feed a pagination run reads
///
/// The identifiers are kept as text because the server sends them either as
/// numbers or as strings and only ever expects them back in query strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationSelector {
    /// Date-filtered operations of an account
    Account {
        /// Account index (`compteIdx`)
        account_index: String,
        /// Product family code (`grandeFamilleCode`)
        family_code: String,
    },

    /// Deferred (not yet debited) operations of a card
    DeferredCard {
        /// Index of the account the card is attached to
        account_index: String,
        /// Product family code of that account
        family_code: String,
        /// Card index (`carteIdx`)
        card_index: String,
    },
}

impl OperationSelector {
    /// Base name of the mock fixture files for this feed
    ///
    /// The page number is appended by the pagination engine.
    pub fn fixture_base(&self) -> String {
        match self {
            OperationSelector::Account {
                account_index,
                family_code,
            } => format!("account-{}-{}_operations", family_code, account_index),
            OperationSelector::DeferredCard {
                account_index,
                family_code,
                card_index,
            } => format!(
                "card-{}-{}-{}_operations",
                family_code, account_index, card_index
            ),
        }
    }
}
