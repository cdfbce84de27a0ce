use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{prelude::*, purchases};

pub struct PurchaseRepository {
    conn: DatabaseConnection,
}

impl PurchaseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Purchase history for one customer, newest first.
    pub async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<purchases::Model>> {
        Purchases::find()
            .filter(purchases::Column::CustomerId.eq(customer_id))
            .order_by_desc(purchases::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list purchases for customer")
    }

    pub async fn get(&self, id: i32) -> Result<Option<purchases::Model>> {
        Purchases::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query purchase by ID")
    }
}
