use serde::{Deserialize, Serialize};

use crate::db::StoreOwner;
use crate::entities::{customers, discounts, purchases};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerDto {
    pub id: i32,
    pub barcode: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
    pub points_balance: i64,
    pub total_spent: f64,
    pub store_owner_id: Option<i32>,
    pub created_at: String,
}

impl From<customers::Model> for CustomerDto {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            barcode: model.barcode,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            birthdate: model.birthdate,
            points_balance: model.points_balance,
            total_spent: model.total_spent,
            store_owner_id: model.store_owner_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseDto {
    pub id: i32,
    pub customer_id: i32,
    pub amount: f64,
    pub points_earned: i64,
    pub discount_applied: Option<f64>,
    pub created_at: String,
}

impl From<purchases::Model> for PurchaseDto {
    fn from(model: purchases::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            amount: model.amount,
            points_earned: model.points_earned,
            discount_applied: model.discount_applied,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscountDto {
    pub id: i32,
    pub customer_id: i32,
    pub amount: f64,
    pub expiry_date: String,
    pub is_used: bool,
    pub created_at: String,
}

impl From<discounts::Model> for DiscountDto {
    fn from(model: discounts::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            amount: model.amount,
            expiry_date: model.expiry_date,
            is_used: model.is_used,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreOwnerDto {
    pub id: i32,
    pub email: String,
    pub store_name: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<StoreOwner> for StoreOwnerDto {
    fn from(owner: StoreOwner) -> Self {
        Self {
            id: owner.id,
            email: owner.email,
            store_name: owner.store_name,
            is_active: owner.is_active,
            created_at: owner.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterCustomerRequest {
    /// Omit to have a barcode generated server-side.
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecordPurchaseRequest {
    pub customer_id: i32,
    pub amount: f64,
    pub discount_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDiscountRequest {
    pub customer_id: i32,
    pub amount: f64,
    pub expiry_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStoreOwnerRequest {
    pub email: String,
    pub password: String,
    pub store_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}
