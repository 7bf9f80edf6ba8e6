use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::AccessTokenData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<ApiSuccess<AccessTokenData>, ApiError> {
    let refresh_token = state
        .refresh_cookie
        .read(&jar)
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    let access_token = state.credential_service.refresh(&refresh_token).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AccessTokenData { access_token },
    ))
}
