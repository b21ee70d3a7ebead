//! services/cli/src/app/auth.rs
//!
//! Account commands: signup, login and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jobprep_core::credentials::LoginForm;
use jobprep_core::domain::User;
use tracing::{error, info};
use uuid::Uuid;

use crate::app::state::AppState;
use crate::error::ClientError;

const SESSION_DAYS: i64 = 30;

/// Creates the account and logs it in.
pub async fn signup(state: &AppState, form: &LoginForm) -> Result<User, ClientError> {
    form.validate(true)?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ClientError::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    // 2. Create user in database
    let username = form.username.as_deref().unwrap_or_default().trim();
    let user = state
        .db
        .create_user_with_email(form.email.trim(), username, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            ClientError::from(e)
        })?;

    // 3. Open the session and remember it locally
    open_session(state, user.user_id).await?;
    info!("Created account {}", user.user_id);
    Ok(user)
}

/// Every failure is reported as the same generic credentials error.
pub async fn login(state: &AppState, form: &LoginForm) -> Result<Uuid, ClientError> {
    form.validate(false)?;

    let user_creds = state
        .db
        .get_user_by_email(form.email.trim())
        .await
        .map_err(|e| {
            error!("Failed to get user: {:?}", e);
            ClientError::InvalidCredentials
        })?;

    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ClientError::InvalidCredentials
    })?;

    let valid = Argon2::default()
        .verify_password(form.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(ClientError::InvalidCredentials);
    }

    open_session(state, user_creds.user_id).await?;
    info!("User {} logged in", user_creds.user_id);
    Ok(user_creds.user_id)
}

/// Ends the stored session. Logging out twice is not an error.
pub async fn logout(state: &AppState) -> Result<(), ClientError> {
    if let Some(token) = state.local.read_token().await? {
        if let Err(e) = state.db.delete_auth_session(&token).await {
            error!("Failed to delete auth session: {:?}", e);
        }
    }
    state.local.clear_token().await
}

async fn open_session(state: &AppState, user_id: Uuid) -> Result<(), ClientError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);

    state
        .db
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ClientError::from(e)
        })?;

    state.local.write_token(&auth_session_id).await
}
