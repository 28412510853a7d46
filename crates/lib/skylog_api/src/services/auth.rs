//! Authentication service. Register/login and account flows delegating to
//! `skylog_core::auth`.

use chrono::Utc;
use skylog_core::auth::password::{hash_password_with_cost, verify_password};
use skylog_core::auth::verification::generate_code;
use skylog_core::models::auth::{Identity, TokenClaims, normalize_email};
use tracing::{debug, info};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    MessageResponse, RegisterRequest, ResetPasswordRequest, TokenResponse, UpdateProfileRequest,
    UserResponse,
};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn validate_email(email: &str) -> AppResult<String> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::Validation("A valid email is required".into())),
    }
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn hash(state: &AppState, password: &str) -> AppResult<String> {
    Ok(hash_password_with_cost(password, state.config.bcrypt_cost)?)
}

/// Issue a token for `identity` with the configured lifetime.
fn token_response(state: &AppState, identity: &Identity) -> AppResult<TokenResponse> {
    let token = state.issuer.issue(identity, None)?;
    Ok(TokenResponse {
        token,
        token_type: "Bearer".into(),
        expires_in: state.issuer.default_ttl().num_seconds(),
        user: UserResponse::from(identity),
    })
}

/// Create an identity and sign it in.
pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<TokenResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    if state
        .stores
        .credentials
        .find_by_email(&email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash(state, &req.password)?;
    let identity = state
        .stores
        .credentials
        .save(Identity::new(&email, name, password_hash))
        .await?;

    info!(user_id = %identity.id, "registered identity");
    token_response(state, &identity)
}

/// Check credentials and issue a token.
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<TokenResponse> {
    let identity = state.stores.credentials.find_by_email(email).await?;
    let Some(identity) = identity.filter(|i| verify_password(password, &i.password_hash)) else {
        debug!("login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };
    token_response(state, &identity)
}

/// Current identity, re-read from the store.
pub async fn me(state: &AppState, claims: &TokenClaims) -> AppResult<UserResponse> {
    let identity = state
        .stores
        .credentials
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(UserResponse::from(&identity))
}

/// Update name, avatar or password. Returns a fresh token, since the old one
/// carries the previous name and avatar.
pub async fn update_profile(
    state: &AppState,
    claims: &TokenClaims,
    req: UpdateProfileRequest,
) -> AppResult<TokenResponse> {
    let mut identity = state
        .stores
        .credentials
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        identity.name = name.to_string();
    }
    if let Some(avatar) = req.avatar.filter(|a| !a.trim().is_empty()) {
        identity.avatar = Some(avatar);
    }
    if let Some(password) = req.password.filter(|p| !p.is_empty()) {
        validate_password(&password)?;
        identity.password_hash = hash(state, &password)?;
    }
    identity.updated_at = Utc::now();

    let identity = state.stores.credentials.save(identity).await?;
    token_response(state, &identity)
}

/// Generate a verification code for a registered email and hand it to the
/// delivery channel.
pub async fn send_code(state: &AppState, email: &str) -> AppResult<MessageResponse> {
    let email = validate_email(email)?;
    if state
        .stores
        .credentials
        .find_by_email(&email)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".into()));
    }

    let code = generate_code();
    state
        .codes
        .put(&email, &code, state.config.code_ttl())
        .await?;
    state.delivery.deliver(&email, &code).await?;
    Ok(MessageResponse::ok("Verification code sent"))
}

async fn consume_code(state: &AppState, email: &str, code: &str) -> AppResult<()> {
    if state.codes.consume(email, code.trim()).await? {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Invalid or expired verification code".into(),
        ))
    }
}

/// Mark an identity's email as verified.
pub async fn verify_code(state: &AppState, email: &str, code: &str) -> AppResult<MessageResponse> {
    let email = validate_email(email)?;
    let mut identity = state
        .stores
        .credentials
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    consume_code(state, &email, code).await?;

    identity.is_verified = true;
    identity.updated_at = Utc::now();
    state.stores.credentials.save(identity).await?;
    Ok(MessageResponse::ok("Email verified"))
}

/// Replace a password after proving control of the email.
pub async fn reset_password(
    state: &AppState,
    req: ResetPasswordRequest,
) -> AppResult<MessageResponse> {
    let email = validate_email(&req.email)?;
    validate_password(&req.new_password)?;
    let mut identity = state
        .stores
        .credentials
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    consume_code(state, &email, &req.code).await?;

    identity.password_hash = hash(state, &req.new_password)?;
    identity.updated_at = Utc::now();
    state.stores.credentials.save(identity).await?;
    info!(%email, "password reset");
    Ok(MessageResponse::ok("Password updated"))
}
