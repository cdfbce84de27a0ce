use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_staff;
use super::{
    AdjustPointsRequest, ApiError, ApiResponse, AppState, CustomerDto, DiscountDto, PurchaseDto,
    RegisterCustomerRequest, UpdateCustomerRequest,
};
use crate::db::CustomerProfile;
use crate::entities::customers;

/// GET /customers
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<CustomerDto>>>, ApiError> {
    let scope = require_staff(&session).await?;

    let customers = state.store().list_customers(scope).await?;

    Ok(Json(ApiResponse::success(
        customers.into_iter().map(CustomerDto::from).collect(),
    )))
}

/// POST /customers
/// Register a customer, generating a barcode when none is supplied. A store
/// owner's registrations are attributed to their own store.
pub async fn register_customer(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let scope = require_staff(&session).await?;

    let profile = CustomerProfile {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        birthdate: payload.birthdate,
    };

    let customer = match payload.barcode {
        Some(barcode) => {
            state
                .shared
                .identity
                .register_new(&barcode, &profile, scope)
                .await?
        }
        None => {
            state
                .shared
                .identity
                .register_with_generated_barcode(&profile, scope)
                .await?
        }
    };

    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}

/// GET /customers/resolve/{barcode}
pub async fn resolve_customer(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(barcode): Path<String>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let scope = require_staff(&session).await?;

    let customer = state
        .shared
        .identity
        .resolve_by_barcode(&barcode, scope)
        .await?;

    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}

/// GET /customers/{id}
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let scope = require_staff(&session).await?;
    let customer = load_scoped_customer(&state, scope, id).await?;

    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}

/// PUT /customers/{id}
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let scope = require_staff(&session).await?;
    load_scoped_customer(&state, scope, id).await?;

    let profile = CustomerProfile {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        birthdate: payload.birthdate,
    };

    let updated = state
        .store()
        .update_customer_profile(id, &profile)
        .await?
        .ok_or_else(|| ApiError::customer_not_found(id))?;

    Ok(Json(ApiResponse::success(CustomerDto::from(updated))))
}

/// GET /customers/{id}/purchases
pub async fn list_customer_purchases(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<PurchaseDto>>>, ApiError> {
    let scope = require_staff(&session).await?;
    load_scoped_customer(&state, scope, id).await?;

    let purchases = state.store().list_customer_purchases(id).await?;

    Ok(Json(ApiResponse::success(
        purchases.into_iter().map(PurchaseDto::from).collect(),
    )))
}

/// GET /customers/{id}/discounts
/// Unused, unexpired discounts for the customer.
pub async fn list_customer_discounts(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<DiscountDto>>>, ApiError> {
    let scope = require_staff(&session).await?;
    load_scoped_customer(&state, scope, id).await?;

    let discounts = state.store().list_available_discounts(id).await?;

    Ok(Json(ApiResponse::success(
        discounts.into_iter().map(DiscountDto::from).collect(),
    )))
}

/// POST /customers/{id}/points/adjust
pub async fn adjust_points(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<AdjustPointsRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let scope = require_staff(&session).await?;
    load_scoped_customer(&state, scope, id).await?;

    if payload.delta == 0 {
        return Err(ApiError::validation("Adjustment delta must be non-zero"));
    }

    let updated = state.shared.ledger.adjust_points(id, payload.delta).await?;

    Ok(Json(ApiResponse::success(CustomerDto::from(updated))))
}

/// Load a customer the caller is allowed to see. A customer outside the
/// caller's scope is reported as not found, not as forbidden.
pub(super) async fn load_scoped_customer(
    state: &AppState,
    scope: Option<i32>,
    id: i32,
) -> Result<customers::Model, ApiError> {
    let customer = state
        .store()
        .get_customer(id)
        .await?
        .ok_or_else(|| ApiError::customer_not_found(id))?;

    if let Some(owner_id) = scope
        && customer.store_owner_id != Some(owner_id)
    {
        return Err(ApiError::customer_not_found(id));
    }

    Ok(customer)
}
