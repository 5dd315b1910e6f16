//! Accounts of the session owner
//!
//! Accounts are listed once per product family and kept in fetch order. The
//! listing is the entry point for the account-scoped calls (IBAN, operations)
//! and for the card operations, which need the owning account's identifiers.

use crate::core::pagination::{OperationsQuery, PaginationEngine};
use crate::core::session::Session;
use crate::types::{Account, BankError, Operation, OperationSelector, ProductFamily};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;

const VALUATION_PATH: &str = "particulier/operations/synthese/jcr:content.produits-valorisation.json";

/// Feed selector for the operations of `account`
pub fn account_selector(account: &Account) -> OperationSelector {
    OperationSelector::Account {
        account_index: account.index.clone(),
        family_code: account.family_code.clone(),
    }
}

/// Accounts of every product family
pub struct Accounts<'a> {
    session: &'a Session,
    accounts: Vec<Account>,
}

impl<'a> Accounts<'a> {
    /// List the accounts of every product family
    ///
    /// # Errors
    ///
    /// `Http` if a family listing answers with an error status, `Parse` if a
    /// listing is not an array of accounts.
    pub async fn fetch(session: &'a Session) -> Result<Self, BankError> {
        let mut accounts = Vec::new();

        for family in ProductFamily::ALL {
            let code = family.code();
            let request = session.get(
                &format!("{}/{}", VALUATION_PATH, code),
                format!("accounts-{}", code),
            )?;
            let response = session.send(request).await?;
            if !response.is_success() {
                return Err(BankError::http("accounts", response.status, &response.body));
            }

            let listed: Vec<Account> = serde_json::from_str(&response.body)
                .map_err(|e| BankError::parse("accounts", e))?;
            tracing::debug!(family = family.name(), count = listed.len(), "accounts listed");
            accounts.extend(listed);
        }

        Ok(Self { session, accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Account> {
        self.accounts.iter()
    }

    pub fn as_slice(&self) -> &[Account] {
        &self.accounts
    }

    /// Find an account by its number
    pub fn search(&self, number: &str) -> Result<&Account, BankError> {
        self.accounts
            .iter()
            .find(|account| account.number == number)
            .ok_or_else(|| BankError::not_found("account", number))
    }

    /// Sum of every account balance, rounded to cents
    pub fn solde(&self) -> Decimal {
        self.accounts
            .iter()
            .map(Account::solde)
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Balance per product family, rounded to cents
    ///
    /// Every family is present, at zero when it holds no account. Accounts of
    /// an unknown family only count in [`Accounts::solde`].
    pub fn solde_per_family(&self) -> BTreeMap<ProductFamily, Decimal> {
        let mut totals: BTreeMap<ProductFamily, Decimal> = ProductFamily::ALL
            .into_iter()
            .map(|family| (family, Decimal::ZERO))
            .collect();

        for account in &self.accounts {
            if let Some(total) = account.family().and_then(|f| totals.get_mut(&f)) {
                *total += account.solde();
            }
        }

        totals
            .into_iter()
            .map(|(family, total)| (family, total.round_dp(2)))
            .collect()
    }

    /// Operations of an account
    ///
    /// # Arguments
    ///
    /// * `account` - Account to read, usually from [`Accounts::search`]
    /// * `date_start` / `date_stop` - Inclusive window; missing bounds default
    ///   to the last 30 days
    /// * `max_count` - Cap on the number of operations returned
    /// * `page_delay` - Pause between two page requests
    pub async fn operations(
        &self,
        account: &Account,
        date_start: Option<NaiveDate>,
        date_stop: Option<NaiveDate>,
        max_count: usize,
        page_delay: Option<Duration>,
    ) -> Result<Vec<Operation>, BankError> {
        let query = OperationsQuery::new(account_selector(account))
            .dates(date_start, date_stop)
            .max_count(max_count)
            .page_delay(page_delay);
        PaginationEngine::new(self.session).fetch(&query).await
    }
}

impl<'s, 'a> IntoIterator for &'s Accounts<'a> {
    type Item = &'s Account;
    type IntoIter = std::slice::Iter<'s, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}
