//! Authentication request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest, SendCodeRequest,
    TokenResponse, UpdateProfileRequest, UserResponse, VerifyCodeRequest,
};
use crate::services::auth;

/// `POST /api/auth/register`: create an account and return a token.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let resp = auth::register(&state, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(&state, &body.email, &body.password).await?;
    Ok(Json(resp))
}

/// `GET /api/auth/me`: the signed-in identity.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserResponse>> {
    let resp = auth::me(&state, &claims).await?;
    Ok(Json(resp))
}

/// `PATCH /api/auth/profile`: update name, avatar or password.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::update_profile(&state, &claims, body).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/send-code`: email a verification code.
pub async fn send_code_handler(
    State(state): State<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::send_code(&state, &body.email).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/verify-code`: confirm an email address.
pub async fn verify_code_handler(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::verify_code(&state, &body.email, &body.code).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/reset-password`: set a new password using a code.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::reset_password(&state, body).await?;
    Ok(Json(resp))
}
