//! Account-related types
//!
//! This module defines the account record returned by the synthesis endpoint,
//! the product families accounts are grouped by, and the IBAN payload.

use super::serde_helpers::string_or_number;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Product families the synthesis endpoint is queried with
///
/// Each family is fetched separately; together they cover current accounts
/// and both kinds of savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductFamily {
    /// Current accounts (`COMPTES`)
    Accounts,
    /// Savings available on demand (`EPARGNE_DISPONIBLE`)
    AvailableSavings,
    /// Other savings products (`EPARGNE_AUTRE`)
    OtherSavings,
}

impl ProductFamily {
    /// All families, in the order they are fetched
    pub const ALL: [ProductFamily; 3] = [
        ProductFamily::Accounts,
        ProductFamily::AvailableSavings,
        ProductFamily::OtherSavings,
    ];

    /// Numeric code used in URLs and in `grandeFamilleProduitCode`
    pub fn code(self) -> u8 {
        match self {
            ProductFamily::Accounts => 1,
            ProductFamily::AvailableSavings => 3,
            ProductFamily::OtherSavings => 7,
        }
    }

    /// Name the server uses for the family
    pub fn name(self) -> &'static str {
        match self {
            ProductFamily::Accounts => "COMPTES",
            ProductFamily::AvailableSavings => "EPARGNE_DISPONIBLE",
            ProductFamily::OtherSavings => "EPARGNE_AUTRE",
        }
    }

    /// Find the family for a code as found in an account record
    pub fn from_code(code: &str) -> Option<Self> {
        let code: u8 = code.trim().parse().ok()?;
        ProductFamily::ALL.into_iter().find(|f| f.code() == code)
    }
}

/// A bank account as listed by the synthesis endpoint
///
/// Serializes back to the record the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Account {
    /// Account number (`numeroCompte`)
    pub number: String,

    /// Server-side account index (`index`), used as `compteIdx`
    pub index: String,

    /// Product family code (`grandeFamilleProduitCode`)
    pub family_code: String,

    /// Product label (`libelleProduit`)
    pub product_label: String,

    /// Current balance (`solde`)
    pub balance: Option<Decimal>,

    /// Savings amount (`montantEpargne`), only present on savings products
    pub savings_amount: Option<Decimal>,

    /// The record as received
    pub raw: Value,
}

#[derive(Deserialize)]
struct AccountFields {
    #[serde(rename = "numeroCompte")]
    number: String,
    #[serde(rename = "index", deserialize_with = "string_or_number")]
    index: String,
    #[serde(rename = "grandeFamilleProduitCode", deserialize_with = "string_or_number")]
    family_code: String,
    #[serde(rename = "libelleProduit", default)]
    product_label: String,
    #[serde(rename = "solde", default, with = "rust_decimal::serde::float_option")]
    balance: Option<Decimal>,
    #[serde(rename = "montantEpargne", default, with = "rust_decimal::serde::float_option")]
    savings_amount: Option<Decimal>,
}

impl TryFrom<Value> for Account {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let fields = AccountFields::deserialize(&raw)?;
        Ok(Self {
            number: fields.number,
            index: fields.index,
            family_code: fields.family_code,
            product_label: fields.product_label,
            balance: fields.balance,
            savings_amount: fields.savings_amount,
            raw,
        })
    }
}

impl From<Account> for Value {
    fn from(account: Account) -> Self {
        account.raw
    }
}

impl Account {
    /// Balance to report for this account
    ///
    /// Savings products report `montantEpargne`; everything else reports
    /// `solde`. An account carrying neither counts as zero.
    pub fn solde(&self) -> Decimal {
        self.savings_amount
            .or(self.balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// The product family this account belongs to, if it is a known one
    pub fn family(&self) -> Option<ProductFamily> {
        ProductFamily::from_code(&self.family_code)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account[number={}, product={}]",
            self.number, self.product_label
        )
    }
}

/// IBAN details of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Iban {
    /// Account number the IBAN was requested for
    pub account_number: String,
    /// The IBAN itself
    pub code: String,
    /// Full payload as returned by the server
    pub raw: Value,
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Iban[account={}, code={}]", self.account_number, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn account(value: Value) -> Account {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case::accounts("1", Some(ProductFamily::Accounts))]
    #[case::available_savings("3", Some(ProductFamily::AvailableSavings))]
    #[case::other_savings(" 7 ", Some(ProductFamily::OtherSavings))]
    #[case::unknown("5", None)]
    #[case::garbage("abc", None)]
    fn test_family_from_code(#[case] code: &str, #[case] expected: Option<ProductFamily>) {
        assert_eq!(ProductFamily::from_code(code), expected);
    }

    #[test]
    fn test_account_decodes_numeric_identifiers() {
        let acc = account(json!({
            "numeroCompte": "12345678901",
            "index": 0,
            "grandeFamilleProduitCode": 1,
            "libelleProduit": "Compte de Depot",
            "solde": 1520.35,
            "devise": "EUR"
        }));

        assert_eq!(acc.number, "12345678901");
        assert_eq!(acc.index, "0");
        assert_eq!(acc.family_code, "1");
        assert_eq!(acc.family(), Some(ProductFamily::Accounts));
        assert_eq!(acc.raw["devise"], "EUR");
        assert_eq!(serde_json::to_value(&acc).unwrap()["index"], json!(0));
        assert_eq!(serde_json::to_value(&acc).unwrap()["solde"], json!(1520.35));
    }

    #[rstest]
    #[case::current_account(json!({"solde": 100.5}), Decimal::new(1005, 1))]
    #[case::savings_preferred(json!({"solde": 1.0, "montantEpargne": 2500.0}), Decimal::new(2500, 0))]
    #[case::no_balance(json!({}), Decimal::ZERO)]
    fn test_account_solde(#[case] balances: Value, #[case] expected: Decimal) {
        let mut value = json!({
            "numeroCompte": "1",
            "index": "0",
            "grandeFamilleProduitCode": "3",
        });
        if let (Some(target), Some(source)) = (value.as_object_mut(), balances.as_object()) {
            target.extend(source.clone());
        }
        assert_eq!(account(value).solde(), expected);
    }

    #[test]
    fn test_account_display() {
        let acc = account(json!({
            "numeroCompte": "12345678901",
            "index": 0,
            "grandeFamilleProduitCode": 1,
            "libelleProduit": "Compte de Depot"
        }));
        assert_eq!(
            acc.to_string(),
            "Account[number=12345678901, product=Compte de Depot]"
        );
    }
}
