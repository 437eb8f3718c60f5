/// Admin grant tokens
///
/// A grant crosses the HTTP boundary as an HS256 JWT carrying the secret
/// generation it was issued under.

use super::AdminGrant;
use crate::error::{GateError, GateResult};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ADMIN_SCOPE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct AdminClaims {
    sub: String,
    scope: String,
    jti: String,
    gen: i64,
    iat: i64,
    exp: i64,
}

/// Encode a grant as a signed token
pub fn encode_grant(grant: &AdminGrant, token_secret: &str) -> GateResult<String> {
    let claims = AdminClaims {
        sub: ADMIN_SCOPE.to_string(),
        scope: ADMIN_SCOPE.to_string(),
        jti: grant.token_id.to_string(),
        gen: grant.generation,
        iat: grant.issued_at.timestamp(),
        exp: grant.expires_at.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(token_secret.as_bytes()),
    )
    .map_err(|e| GateError::Token(format!("Failed to generate token: {}", e)))
}

/// Verify signature, expiry and scope, and rebuild the grant
///
/// The caller still has to compare the generation with the current one.
pub fn decode_grant(token: &str, token_secret: &str) -> GateResult<AdminGrant> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 30;

    let data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(token_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::warn!("Admin token verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                GateError::Token("Token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                GateError::Token("Invalid token signature".to_string())
            }
            _ => GateError::Token(format!("Invalid token: {}", e)),
        }
    })?;

    let claims = data.claims;
    if claims.scope != ADMIN_SCOPE {
        return Err(GateError::Token("Token does not have admin scope".to_string()));
    }

    let token_id = Uuid::parse_str(&claims.jti)
        .map_err(|_| GateError::Token("Invalid token id".to_string()))?;

    Ok(AdminGrant {
        token_id,
        generation: claims.gen,
        issued_at: timestamp(claims.iat)?,
        expires_at: timestamp(claims.exp)?,
    })
}

fn timestamp(secs: i64) -> GateResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| GateError::Token("Invalid token timestamp".to_string()))
}
