use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_staff;
use super::customers::load_scoped_customer;
use super::{ApiError, ApiResponse, AppState, CreateDiscountRequest, DiscountDto};

/// POST /discounts
/// Issue a single-use discount to a customer.
pub async fn create_discount(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateDiscountRequest>,
) -> Result<Json<ApiResponse<DiscountDto>>, ApiError> {
    let scope = require_staff(&session).await?;
    load_scoped_customer(&state, scope, payload.customer_id).await?;

    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Err(ApiError::validation("Discount amount must be positive"));
    }

    let expiry = chrono::DateTime::parse_from_rfc3339(&payload.expiry_date)
        .map_err(|_| ApiError::validation("Expiry date must be an RFC 3339 timestamp"))?;

    if expiry < chrono::Utc::now() {
        return Err(ApiError::validation("Expiry date must be in the future"));
    }

    let discount = state
        .store()
        .create_discount(payload.customer_id, payload.amount, &payload.expiry_date)
        .await?;

    Ok(Json(ApiResponse::success(DiscountDto::from(discount))))
}
