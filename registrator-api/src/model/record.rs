use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The value stored under an instance path: where the instance can be reached.
///
/// Serializes as compact JSON with exactly `address` and `port`. Unknown fields are
/// ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    address: String,
    port: u16,
}

impl RegistrationRecord {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn get_address(&self) -> &str {
        &self.address
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Encodes the record in its wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
