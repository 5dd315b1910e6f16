//! Core protocol module
//!
//! This module contains the stateful parts of the client:
//! - `keypad` - PIN to keypad position mapping
//! - `session` - Shared session handle (prefix, cookies, transport)
//! - `authenticator` - Two-step keypad login state machine
//! - `pagination` - Transaction feed pagination engine

pub mod authenticator;
pub mod keypad;
pub mod pagination;
pub mod session;

pub use authenticator::{login, parse_pin, AuthState, Authenticator, Credentials};
pub use keypad::{join_indices, map_pin, KeypadLayout};
pub use pagination::{bank_offset, bank_today, decode_page, DateWindow, OperationsPage, OperationsQuery, PaginationEngine};
pub use session::Session;
