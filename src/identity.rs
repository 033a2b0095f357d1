use anyhow::{Context, Result};
use base64::Engine;
use serde::Deserialize;

/// The clinician on whose behalf the pipeline acts.
///
/// Derived once from the authentication collaborator's token blob and then
/// passed explicitly into operations. It is never read from ambient state
/// and never written back.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicianIdentity {
    /// Numeric author identifier attached to submissions and note queries.
    pub doctor_id: i64,

    /// Display name for banners and logs.
    pub display_name: String,
}

/// Claims this pipeline reads from the token. Everything else in the blob
/// is opaque and stays untouched.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    doctor_id: i64,
    last_name: String,
}

impl ClinicianIdentity {
    /// Derive an identity from a JWT-shaped token blob.
    ///
    /// Only the payload segment is decoded: base64url, JSON claims
    /// carrying `doctor_id` and `last_name`. Signature verification is the
    /// authentication service's concern, not this pipeline's.
    pub fn from_token(token: &str) -> Result<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .context("token has no payload segment")?;

        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .context("token payload is not base64url")?;

        let claims: TokenClaims =
            serde_json::from_slice(&decoded).context("token payload is not valid claims JSON")?;

        Ok(Self {
            doctor_id: claims.doctor_id,
            display_name: claims.last_name,
        })
    }
}
