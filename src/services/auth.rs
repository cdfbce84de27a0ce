//! Authentication across the three principal kinds.
//!
//! The active principal is a single tagged value: a session holds exactly one
//! of customer, store owner, or admin, never a combination. Secrets are
//! verified against stored Argon2id hashes; customers authenticate by
//! barcode, which doubles as their informal credential.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{Admin, Store, StoreOwner};
use crate::entities::customers;
use crate::services::error::LedgerError;

/// The authenticated principal, exactly one role at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Customer { id: i32 },
    StoreOwner { id: i32 },
    Admin { id: i32 },
}

impl Principal {
    #[must_use]
    pub const fn role_name(&self) -> &'static str {
        match self {
            Self::Customer { .. } => "customer",
            Self::StoreOwner { .. } => "store_owner",
            Self::Admin { .. } => "admin",
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Store,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Authenticate a customer by barcode, optionally scoped to one store.
    /// A barcode outside the scope is indistinguishable from an unknown one.
    pub async fn authenticate_customer(
        &self,
        barcode: &str,
        scope: Option<i32>,
    ) -> Result<customers::Model, LedgerError> {
        let customer = self
            .store
            .get_customer_by_barcode(barcode, scope)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        info!("Customer {} authenticated by barcode", customer.id);
        Ok(customer)
    }

    /// Authenticate a store owner by email and password. Deactivated owners
    /// are rejected with the same error as a wrong password.
    pub async fn authenticate_store_owner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<StoreOwner, LedgerError> {
        let owner = self
            .store
            .verify_store_owner_credentials(email, password)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        info!("Store owner {} authenticated", owner.id);
        Ok(owner)
    }

    pub async fn authenticate_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Admin, LedgerError> {
        let admin = self
            .store
            .verify_admin_credentials(username, password)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        info!("Admin {} authenticated", admin.id);
        Ok(admin)
    }
}
