//! Types module
//!
//! Contains the data structures shared by every component.
//! This module organizes types into logical submodules:
//! - `account`: accounts, product families and IBAN
//! - `card`: payment cards
//! - `operation`: transactions and feed selectors
//! - `regional_bank`: regional bank directory records
//! - `error`: error type for the whole client

pub mod account;
pub mod card;
pub mod error;
pub mod operation;
pub mod regional_bank;
pub(crate) mod serde_helpers;

pub use account::{Account, Iban, ProductFamily};
pub use card::Card;
pub use error::BankError;
pub use operation::{Operation, OperationSelector};
pub use regional_bank::RegionalBank;
