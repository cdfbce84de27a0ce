use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::db::repositories::password;
use crate::entities::{admins, prelude::*};

/// Admin data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    pub created_at: String,
}

impl From<admins::Model> for Admin {
    fn from(model: admins::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            created_at: model.created_at,
        }
    }
}

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Admin>> {
        let admin = Admins::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query admin by ID")?;

        Ok(admin.map(Admin::from))
    }

    pub async fn verify_credentials(
        &self,
        username: &str,
        submitted_password: &str,
    ) -> Result<Option<Admin>> {
        let admin = Admins::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin for login")?;

        let Some(admin) = admin else {
            return Ok(None);
        };

        let is_valid =
            password::verify_password(admin.password_hash.clone(), submitted_password.to_string())
                .await?;

        Ok(is_valid.then(|| Admin::from(admin)))
    }
}
