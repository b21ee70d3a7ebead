//! services/cli/src/app/guard.rs
//!
//! Resolves the stored auth token to a user before protected commands run.

use jobprep_core::ports::PortError;
use tracing::{debug, error};
use uuid::Uuid;

use crate::app::state::AppState;
use crate::error::ClientError;

/// The logged-in user, if the stored token still maps to a live session.
/// A stale token is removed so the next command does not try it again.
pub async fn current_user(state: &AppState) -> Result<Option<Uuid>, ClientError> {
    let Some(token) = state.local.read_token().await? else {
        return Ok(None);
    };
    match state.db.validate_auth_session(&token).await {
        Ok(user_id) => Ok(Some(user_id)),
        Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => {
            debug!("Stored auth session is no longer valid");
            state.local.clear_token().await?;
            Ok(None)
        }
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            Err(e.into())
        }
    }
}

/// Fails with `ClientError::Unauthorized` when nobody is logged in.
pub async fn require_auth(state: &AppState) -> Result<Uuid, ClientError> {
    current_user(state).await?.ok_or(ClientError::Unauthorized)
}
