//! Read-only endpoints of an authenticated session
//!
//! - `regional_banks` - Department to regional bank directory (no session)
//! - `accounts` - Accounts per product family, balances, account operations
//! - `cards` - Payment cards and their deferred operations
//! - `iban` - IBAN of an account
//! - `logout` - Session termination

pub mod accounts;
pub mod cards;
pub mod iban;
pub mod logout;
pub mod regional_banks;

pub use accounts::Accounts;
pub use cards::Cards;
pub use iban::fetch_iban;
pub use logout::logout;
pub use regional_banks::RegionalBanks;
