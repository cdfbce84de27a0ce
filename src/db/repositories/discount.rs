use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{discounts, prelude::*};

pub struct DiscountRepository {
    conn: DatabaseConnection,
}

impl DiscountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<discounts::Model>> {
        Discounts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query discount by ID")
    }

    /// Unused, unexpired discounts for a customer, newest first. Expired rows
    /// are filtered out here but kept in the table.
    pub async fn available_for_customer(&self, customer_id: i32) -> Result<Vec<discounts::Model>> {
        let now = chrono::Utc::now().to_rfc3339();

        Discounts::find()
            .filter(discounts::Column::CustomerId.eq(customer_id))
            .filter(discounts::Column::IsUsed.eq(false))
            .filter(discounts::Column::ExpiryDate.gte(now))
            .order_by_desc(discounts::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list available discounts")
    }

    /// Expiry is stored normalized to UTC so the string comparisons against
    /// `Utc::now().to_rfc3339()` hold whatever offset the caller supplied.
    pub async fn create(
        &self,
        customer_id: i32,
        amount: f64,
        expiry_date: &str,
    ) -> Result<discounts::Model> {
        let expiry = chrono::DateTime::parse_from_rfc3339(expiry_date)
            .context("Discount expiry is not an RFC 3339 timestamp")?
            .with_timezone(&chrono::Utc)
            .to_rfc3339();
        let now = chrono::Utc::now().to_rfc3339();

        let active = discounts::ActiveModel {
            customer_id: Set(customer_id),
            amount: Set(amount),
            expiry_date: Set(expiry),
            is_used: Set(false),
            created_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to create discount")
    }
}
