//! Credit Agricole Personal Banking Client
//! # Overview
//!
//! This library reads a customer's own data from the private JSON endpoints of
//! the Credit Agricole personal banking website: accounts, balances, payment
//! cards, IBANs and transaction history. It never writes anything.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Server records (Account, Card, Operation, etc.) and the error type
//! - [`config`] - Client configuration and the department table
//! - [`transport`] - Request/response exchange: live HTTPS, fixture replay, recording
//! - [`core`] - Protocol components:
//!   - [`core::keypad`] - PIN to keypad position mapping
//!   - [`core::authenticator`] - Two-step keypad login
//!   - [`core::pagination`] - Transaction feed pagination
//!   - [`core::session`] - Session handle shared by every call
//! - [`api`] - Listing endpoints (regional banks, accounts, cards, IBAN, logout)
//! - [`io`] - CSV and JSON output
//! - [`cli`] - CLI arguments parsing and command execution
//!
//! # Login
//!
//! The login page shows a keypad whose digits are shuffled by the server on
//! every attempt. The client fetches the layout, translates the PIN into key
//! positions and submits those positions; the cookies of both steps form the
//! session.
//!
//! ```no_run
//! # async fn demo() -> Result<(), ca_particuliers::BankError> {
//! use ca_particuliers::{build_transport, login, Accounts, ClientConfig, Credentials, MockConfig};
//!
//! let config = ClientConfig::default();
//! let transport = build_transport(&config, &MockConfig::default())?;
//! let credentials = Credentials::from_pin_str("12345678901", "123456", "75")?;
//! let session = login(&config, transport, credentials).await?;
//!
//! let accounts = Accounts::fetch(&session).await?;
//! println!("total balance: {}", accounts.solde());
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod transport;
pub mod types;

pub use api::{fetch_iban, logout, Accounts, Cards, RegionalBanks};
pub use config::ClientConfig;
pub use core::{login, Authenticator, Credentials, OperationsQuery, PaginationEngine, Session};
pub use transport::{build_transport, MockConfig, Transport};
pub use types::{Account, BankError, Card, Iban, Operation, OperationSelector, RegionalBank};
