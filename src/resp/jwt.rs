use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::util::date_time_as_unix_seconds;
use crate::resp::problem::{problems, Problem};
use crate::security::{KeySet, Security};

pub const TOKEN_LIFETIME_HOURS: i64 = 5;

/// Signed identity claim handed out by `POST /jwt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub email: String,
}

impl SessionClaims {
    pub fn new(email: impl ToString) -> SessionClaims {
        SessionClaims::issued_at(email, Utc::now())
    }

    pub fn issued_at(email: impl ToString, iat: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            iat,
            exp: iat + Duration::hours(TOKEN_LIFETIME_HOURS),
            email: email.to_string(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

fn keys(security: &Security) -> Result<&KeySet, Problem> {
    security.jwt_keys.as_ref().ok_or_else(|| {
        tracing::error!("JWT signing secret isn't configured.");
        problems::internal()
            .detail("Token signing isn't configured.")
            .to_owned()
    })
}

impl Security {
    pub fn issue_token(&self, claims: &SessionClaims) -> Result<String, Problem> {
        let keys = keys(self)?;
        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding).map_err(|e| {
            tracing::error!("Unable to sign JWT: {}", e);
            problems::internal()
        })
    }

    /// Fails with `401` for malformed, tampered and expired tokens.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, Problem> {
        let keys = keys(self)?;
        decode::<SessionClaims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(Problem::from)
    }
}
