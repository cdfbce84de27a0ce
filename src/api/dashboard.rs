use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_principal;
use super::{ApiError, ApiResponse, AppState};
use crate::services::Principal;

/// GET /dashboard/stats
/// Admins see program-wide stats with a per-store breakdown; store owners see
/// their own store only.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    match current_principal(&session).await? {
        Principal::Admin { .. } => {
            let stats = state.shared.dashboard.global_stats().await?;
            Ok(Json(ApiResponse::success(stats)).into_response())
        }
        Principal::StoreOwner { id } => {
            let stats = state.shared.dashboard.owner_stats(id).await?;
            Ok(Json(ApiResponse::success(stats)).into_response())
        }
        Principal::Customer { .. } => {
            Err(ApiError::Forbidden("Staff access required".to_string()))
        }
    }
}
