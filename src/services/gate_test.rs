use super::*;
use crate::error::ErrorCode;

// =============================================================================
// bytes_to_hex / generate_token
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// Gate::check
// =============================================================================

#[test]
fn matching_passphrase_issues_token() {
    let gate = Gate::new("lotus");
    let token = gate.check("lotus").unwrap();
    assert_eq!(token.len(), 64);
}

#[test]
fn mismatch_is_auth_failure() {
    let gate = Gate::new("lotus");
    let err = gate.check("Lotus").unwrap_err();
    assert_eq!(err.error_code(), "E_AUTH");
    assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_string(), "Incorrect password. Please try again.");
}

#[test]
fn empty_attempt_is_rejected() {
    assert!(Gate::new("lotus").check("").is_err());
}
