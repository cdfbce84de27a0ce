use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, CustomerDto, StoreOwnerDto};
use crate::services::Principal;

/// Session slot holding the authenticated principal. One slot, so logging in
/// as any role replaces whatever role was active before.
const PRINCIPAL_KEY: &str = "principal";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CustomerLoginRequest {
    pub barcode: String,
}

#[derive(Deserialize)]
pub struct StoreOwnerLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AdminLoginResponse {
    pub id: i32,
    pub username: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without an authenticated principal. Role checks happen in
/// the handlers, which also derive the tenancy scope from the principal.
pub async fn auth_middleware(
    State(_state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(principal)) = session.get::<Principal>(PRINCIPAL_KEY).await {
        tracing::Span::current().record("role", principal.role_name());
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/customer/login
/// A customer authenticates by presenting their loyalty barcode.
pub async fn customer_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CustomerLoginRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    if payload.barcode.is_empty() {
        return Err(ApiError::validation("Barcode is required"));
    }

    let customer = state
        .shared
        .auth
        .authenticate_customer(&payload.barcode, None)
        .await?;

    set_principal(&session, Principal::Customer { id: customer.id }).await?;

    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}

/// POST /auth/store-owner/login
pub async fn store_owner_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<StoreOwnerLoginRequest>,
) -> Result<Json<ApiResponse<StoreOwnerDto>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let owner = state
        .shared
        .auth
        .authenticate_store_owner(&payload.email, &payload.password)
        .await?;

    set_principal(&session, Principal::StoreOwner { id: owner.id }).await?;

    Ok(Json(ApiResponse::success(StoreOwnerDto::from(owner))))
}

/// POST /auth/admin/login
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<ApiResponse<AdminLoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let admin = state
        .shared
        .auth
        .authenticate_admin(&payload.username, &payload.password)
        .await?;

    set_principal(&session, Principal::Admin { id: admin.id }).await?;

    Ok(Json(ApiResponse::success(AdminLoginResponse {
        id: admin.id,
        username: admin.username,
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
pub async fn get_current_principal(
    session: Session,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let principal = current_principal(&session).await?;
    Ok(Json(ApiResponse::success(principal)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn set_principal(session: &Session, principal: Principal) -> Result<(), ApiError> {
    // Replace any previously active role before inserting the new one.
    session.clear().await;
    session
        .insert(PRINCIPAL_KEY, principal)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

pub async fn current_principal(session: &Session) -> Result<Principal, ApiError> {
    session
        .get::<Principal>(PRINCIPAL_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

/// Admin-only endpoints. Returns the admin's ID.
pub async fn require_admin(session: &Session) -> Result<i32, ApiError> {
    match current_principal(session).await? {
        Principal::Admin { id } => Ok(id),
        _ => Err(ApiError::Forbidden("Admin access required".to_string())),
    }
}

/// Staff endpoints (store owner or admin). Returns the tenancy scope:
/// `Some(store_owner_id)` restricts queries to that owner's customers, `None`
/// (admin) sees every store. The scope comes from the session, never from the
/// request.
pub async fn require_staff(session: &Session) -> Result<Option<i32>, ApiError> {
    match current_principal(session).await? {
        Principal::Admin { .. } => Ok(None),
        Principal::StoreOwner { id } => Ok(Some(id)),
        Principal::Customer { .. } => {
            Err(ApiError::Forbidden("Staff access required".to_string()))
        }
    }
}
