use rocket::serde::json::Json;
use rocket::State;

use crate::resp::jwt::{SessionClaims, TokenRequest, TokenResponse};
use crate::resp::problem::{problems, Problem};
use crate::security::Security;

/// Issue a session token
///
/// The token carries the submitted e-mail and expires after five hours.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed session token", body = TokenResponse),
        (status = 400, description = "Invalid e-mail", body = Problem),
        (status = 500, description = "Signing secret isn't configured", body = Problem),
    )
)]
#[post("/jwt", data = "<request>")]
#[tracing::instrument(skip(security))]
pub async fn token_issue(
    request: Json<TokenRequest>,
    security: &State<Security>,
) -> Result<Json<TokenResponse>, Problem> {
    if !request.email.contains('@') {
        return Err(problems::invalid_field(
            "email",
            "Not a valid e-mail address.",
        ));
    }

    let claims = SessionClaims::new(&request.email);
    let token = security.issue_token(&claims)?;
    tracing::debug!("Issued session token for {}", claims.email);

    Ok(Json(TokenResponse { token }))
}
