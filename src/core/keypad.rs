//! Keypad mapper
//!
//! The login page shows the digits 0-9 on a keypad whose layout is shuffled by
//! the server for every attempt. The password is not sent as digits but as
//! the positions of those digits on the keypad.

use crate::types::serde_helpers::digits;
use crate::types::BankError;
use serde::Deserialize;

/// Number of keys on the login keypad
pub const KEYPAD_SIZE: usize = 10;

/// Keypad challenge returned by the server
///
/// Consumed right away to build the mapped credential; never stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeypadLayout {
    /// Opaque identifier echoed back with the credential
    pub keypad_id: String,
    /// Digit shown at each keypad position
    #[serde(deserialize_with = "digits")]
    pub key_layout: Vec<u8>,
}

/// Map each PIN digit to the position of its first occurrence in `layout`
///
/// The result has one index per PIN digit, in PIN order, each in
/// `0..layout.len()`.
///
/// # Errors
///
/// Returns `InvalidLayout` if a PIN digit does not appear in the layout.
pub fn map_pin(layout: &[u8], pin: &[u8]) -> Result<Vec<usize>, BankError> {
    pin.iter()
        .map(|&digit| {
            layout
                .iter()
                .position(|&key| key == digit)
                .ok_or(BankError::InvalidLayout { digit })
        })
        .collect()
}

/// Mapped credential in the wire format (`"4,0,7,1"`)
pub fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
