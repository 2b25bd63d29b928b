//! Passphrase gate in front of the admin panel.
//!
//! TRADE-OFFS
//! ==========
//! One shared passphrase compared by equality. It keeps casual visitors out
//! of the panel and nothing more: there are no user accounts, and a panel
//! token lives only as long as the process.

use std::fmt::Write;

use rand::Rng;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Incorrect password. Please try again.")]
    Mismatch,
}

impl crate::error::ErrorCode for GateError {
    fn error_code(&self) -> &'static str {
        "E_AUTH"
    }

    fn status(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::UNAUTHORIZED
    }
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 32-byte hex token identifying one opened panel.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

pub struct Gate {
    passphrase: String,
}

impl Gate {
    #[must_use]
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self { passphrase: passphrase.into() }
    }

    /// Compare an attempt against the configured passphrase and issue a
    /// panel token on a match.
    ///
    /// # Errors
    ///
    /// Returns `Mismatch` when the attempt differs.
    pub fn check(&self, attempt: &str) -> Result<String, GateError> {
        if attempt != self.passphrase {
            tracing::warn!("admin gate rejected passphrase");
            return Err(GateError::Mismatch);
        }
        Ok(generate_token())
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
