use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_admin;
use super::{
    ApiError, ApiResponse, AppState, CreateStoreOwnerRequest, MessageResponse, SetActiveRequest,
    StoreOwnerDto,
};
use crate::services::error::is_unique_violation;

/// GET /store-owners
pub async fn list_store_owners(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<StoreOwnerDto>>>, ApiError> {
    require_admin(&session).await?;

    let owners = state.store().list_store_owners().await?;

    Ok(Json(ApiResponse::success(
        owners.into_iter().map(StoreOwnerDto::from).collect(),
    )))
}

/// POST /store-owners
pub async fn create_store_owner(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateStoreOwnerRequest>,
) -> Result<Json<ApiResponse<StoreOwnerDto>>, ApiError> {
    require_admin(&session).await?;

    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("A valid email is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    if payload.store_name.is_empty() {
        return Err(ApiError::validation("Store name is required"));
    }

    let security = state.config().read().await.security.clone();

    let owner = state
        .store()
        .create_store_owner(
            &payload.email,
            &payload.password,
            &payload.store_name,
            Some(security),
        )
        .await
        .map_err(|err| {
            let is_duplicate = err
                .chain()
                .filter_map(|cause| cause.downcast_ref::<sea_orm::DbErr>())
                .any(is_unique_violation);
            if is_duplicate {
                ApiError::Conflict(format!("Store owner '{}' already exists", payload.email))
            } else {
                ApiError::from(err)
            }
        })?;

    tracing::info!("Created store owner {} ({})", owner.id, owner.email);

    Ok(Json(ApiResponse::success(StoreOwnerDto::from(owner))))
}

/// PUT /store-owners/{id}/active
/// Deactivated owners can no longer log in; their data is kept.
pub async fn set_store_owner_active(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<StoreOwnerDto>>, ApiError> {
    require_admin(&session).await?;

    let owner = state
        .store()
        .set_store_owner_active(id, payload.is_active)
        .await?
        .ok_or_else(|| ApiError::store_owner_not_found(id))?;

    Ok(Json(ApiResponse::success(StoreOwnerDto::from(owner))))
}

/// DELETE /store-owners/{id}
pub async fn delete_store_owner(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_admin(&session).await?;

    let removed = state.store().delete_store_owner(id).await?;

    if !removed {
        return Err(ApiError::store_owner_not_found(id));
    }

    tracing::info!("Deleted store owner {}", id);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Store owner {id} deleted"),
    })))
}
