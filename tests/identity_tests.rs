// Unit tests for clinician identity decoding
//
// These tests verify that the doctor id and display name come out of a
// JWT-shaped token's payload segment, and that anything unreadable is a
// clean error rather than a panic.

use base64::Engine;
use clinic_scribe::ClinicianIdentity;
use serde_json::json;

/// Assemble a JWT-shaped token around the given payload claims. The
/// header and signature segments are opaque to the decoder, so any
/// stand-in text works.
fn token_with_payload(claims: &serde_json::Value) -> String {
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("stand-in-header.{}.stand-in-signature", payload)
}

#[test]
fn test_identity_from_token_payload() {
    let token = token_with_payload(&json!({
        "doctor_id": 42,
        "last_name": "Osei"
    }));

    let identity = ClinicianIdentity::from_token(&token).expect("well-formed token must decode");

    assert_eq!(identity.doctor_id, 42);
    assert_eq!(identity.display_name, "Osei");
}

#[test]
fn test_identity_ignores_unrelated_claims() {
    let token = token_with_payload(&json!({
        "doctor_id": 7,
        "last_name": "Marchetti",
        "iat": 1756080000,
        "exp": 1756083600,
        "scope": "notes:write"
    }));

    let identity = ClinicianIdentity::from_token(&token).expect("extra claims are fine");

    assert_eq!(identity.doctor_id, 7);
    assert_eq!(identity.display_name, "Marchetti");
}

#[test]
fn test_token_without_payload_segment_fails() {
    let result = ClinicianIdentity::from_token("no-dots-here");
    assert!(result.is_err(), "a token without segments has no payload to decode");
}

#[test]
fn test_token_with_bad_base64_fails() {
    let result = ClinicianIdentity::from_token("header.!!!not-base64url!!!.sig");
    assert!(result.is_err());
}

#[test]
fn test_token_with_non_json_payload_fails() {
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("just text");
    let token = format!("header.{}.sig", payload);

    let result = ClinicianIdentity::from_token(&token);
    assert!(result.is_err());
}

#[test]
fn test_token_missing_doctor_id_fails() {
    let token = token_with_payload(&json!({
        "last_name": "Nilsson"
    }));

    let result = ClinicianIdentity::from_token(&token);
    assert!(result.is_err(), "claims without doctor_id cannot name a clinician");
}
