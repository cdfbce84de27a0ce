use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::config::SecurityConfig;
use crate::db::repositories::password;
use crate::entities::{prelude::*, store_owners};

/// Store owner data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct StoreOwner {
    pub id: i32,
    pub email: String,
    pub store_name: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<store_owners::Model> for StoreOwner {
    fn from(model: store_owners::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            store_name: model.store_name,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

pub struct StoreOwnerRepository {
    conn: DatabaseConnection,
}

impl StoreOwnerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<StoreOwner>> {
        let owner = StoreOwners::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query store owner by ID")?;

        Ok(owner.map(StoreOwner::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<StoreOwner>> {
        let owner = StoreOwners::find()
            .filter(store_owners::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query store owner by email")?;

        Ok(owner.map(StoreOwner::from))
    }

    pub async fn list(&self) -> Result<Vec<StoreOwner>> {
        let owners = StoreOwners::find()
            .order_by_asc(store_owners::Column::StoreName)
            .all(&self.conn)
            .await
            .context("Failed to list store owners")?;

        Ok(owners.into_iter().map(StoreOwner::from).collect())
    }

    pub async fn count_active(&self) -> Result<u64> {
        StoreOwners::find()
            .filter(store_owners::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count active store owners")
    }

    /// Verify a login secret for an owner. Returns the owner only when the
    /// password matches and the account is active.
    pub async fn verify_credentials(
        &self,
        email: &str,
        submitted_password: &str,
    ) -> Result<Option<StoreOwner>> {
        let owner = StoreOwners::find()
            .filter(store_owners::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query store owner for login")?;

        let Some(owner) = owner else {
            return Ok(None);
        };

        if !owner.is_active {
            return Ok(None);
        }

        let is_valid =
            password::verify_password(owner.password_hash.clone(), submitted_password.to_string())
                .await?;

        Ok(is_valid.then(|| StoreOwner::from(owner)))
    }

    /// Create a store owner, hashing the initial password. A duplicate email
    /// surfaces as the underlying `DbErr` so the caller can classify it.
    pub async fn create(
        &self,
        email: &str,
        initial_password: &str,
        store_name: &str,
        security: Option<SecurityConfig>,
    ) -> Result<StoreOwner> {
        let password_hash =
            password::hash_password_blocking(initial_password.to_string(), security).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let active = store_owners::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            store_name: Set(store_name.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            ..Default::default()
        };

        let created = active.insert(&self.conn).await?;

        Ok(StoreOwner::from(created))
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<Option<StoreOwner>> {
        let Some(owner) = StoreOwners::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query store owner for activation change")?
        else {
            return Ok(None);
        };

        let mut active: store_owners::ActiveModel = owner.into();
        active.is_active = Set(is_active);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update store owner activation")?;

        Ok(Some(StoreOwner::from(updated)))
    }

    /// Delete an owner. Their customers are kept and become unaffiliated
    /// (the FK sets `store_owner_id` to null).
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = StoreOwners::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete store owner")?;

        Ok(result.rows_affected > 0)
    }
}
