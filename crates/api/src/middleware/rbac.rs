//! Admin authorization.
//!
//! The role lives on the `profiles` row, not in the token, so the guard
//! fetches it per request. The fetch is bounded by
//! `ServerConfig::profile_fetch_timeout`; a slow lookup is treated as an
//! unauthenticated request rather than hanging the handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use nihontowatch_core::roles::ROLE_ADMIN;
use nihontowatch_db::repositories::ProfileRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden for other roles
/// and 401 when the profile cannot be fetched in time.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let lookup = ProfileRepo::find_role(&state.pool, user.user_id);
        let role = match tokio::time::timeout(state.config.profile_fetch_timeout, lookup).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    user_id = %user.user_id,
                    timeout_ms = state.config.profile_fetch_timeout.as_millis() as u64,
                    "Profile fetch timed out in admin guard"
                );
                return Err(AppError::unauthorized("Profile lookup timed out"));
            }
        };

        match role.as_deref() {
            Some(ROLE_ADMIN) => Ok(RequireAdmin(user)),
            Some(_) => Err(AppError::forbidden("Admin role required")),
            None => Err(AppError::unauthorized("Unknown profile")),
        }
    }
}
