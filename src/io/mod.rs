//! I/O module
//!
//! Handles output of listings on the command line.
//!
//! # Components
//!
//! - `output` - CSV and JSON writers for accounts, balances, cards, operations and IBANs

pub mod output;

pub use output::{
    write_accounts, write_balance, write_cards, write_iban, write_operations,
    write_regional_bank, OutputFormat,
};
