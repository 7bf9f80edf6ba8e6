use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::AccessTokenData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Access token in the body, refresh token in an HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequestBody>,
) -> Result<(CookieJar, ApiSuccess<AccessTokenData>), ApiError> {
    let token_pair = state
        .credential_service
        .login(&body.email, &body.password)
        .await?;

    let jar = jar.add(state.refresh_cookie.issue(&token_pair));

    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            AccessTokenData {
                access_token: token_pair.access_token,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}
