use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_staff;
use super::customers::load_scoped_customer;
use super::{ApiError, ApiResponse, AppState, PurchaseDto, RecordPurchaseRequest};

/// POST /purchases
/// Record a purchase, optionally applying one of the customer's discounts.
pub async fn record_purchase(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RecordPurchaseRequest>,
) -> Result<Json<ApiResponse<PurchaseDto>>, ApiError> {
    let scope = require_staff(&session).await?;
    load_scoped_customer(&state, scope, payload.customer_id).await?;

    let purchase = state
        .shared
        .ledger
        .record_purchase(payload.customer_id, payload.amount, payload.discount_id)
        .await?;

    Ok(Json(ApiResponse::success(PurchaseDto::from(purchase))))
}
