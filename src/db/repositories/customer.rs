use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{customers, prelude::*};

/// Aggregate totals over the customer table.
#[derive(Debug, Clone, Copy, Default, FromQueryResult)]
pub struct BalanceTotals {
    pub total_points: Option<i64>,
    pub total_spent: Option<f64>,
}

/// Customer count per owning store, for the admin dashboard.
#[derive(Debug, Clone, FromQueryResult)]
pub struct StoreCustomerCount {
    pub store_owner_id: i32,
    pub customer_count: i64,
}

/// Fields a store owner may set when registering or editing a customer.
/// The barcode and the balance aggregates are never writable through this.
#[derive(Debug, Clone, Default)]
pub struct CustomerProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
}

pub struct CustomerRepository {
    conn: DatabaseConnection,
}

impl CustomerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Look up a customer by barcode. When `scope` is given, only a customer
    /// owned by that store owner is returned; this is the tenancy boundary.
    pub async fn get_by_barcode(
        &self,
        barcode: &str,
        scope: Option<i32>,
    ) -> Result<Option<customers::Model>> {
        let mut query = Customers::find().filter(customers::Column::Barcode.eq(barcode));

        if let Some(store_owner_id) = scope {
            query = query.filter(customers::Column::StoreOwnerId.eq(store_owner_id));
        }

        query
            .one(&self.conn)
            .await
            .context("Failed to query customer by barcode")
    }

    pub async fn get(&self, id: i32) -> Result<Option<customers::Model>> {
        Customers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query customer by ID")
    }

    /// Customers visible to a store owner, newest first.
    pub async fn list(&self, scope: Option<i32>) -> Result<Vec<customers::Model>> {
        let mut query = Customers::find().order_by_desc(customers::Column::CreatedAt);

        if let Some(store_owner_id) = scope {
            query = query.filter(customers::Column::StoreOwnerId.eq(store_owner_id));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list customers")
    }

    /// Insert a new customer row. A unique-constraint violation on the
    /// barcode column surfaces as a raw `DbErr` so the caller can classify it.
    pub async fn insert(
        &self,
        barcode: &str,
        profile: &CustomerProfile,
        store_owner_id: Option<i32>,
        starting_points: i64,
    ) -> std::result::Result<customers::Model, sea_orm::DbErr> {
        let now = chrono::Utc::now().to_rfc3339();
        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| default_display_name(barcode));

        let active = customers::ActiveModel {
            barcode: Set(barcode.to_string()),
            name: Set(name),
            email: Set(profile.email.clone()),
            phone: Set(profile.phone.clone()),
            address: Set(profile.address.clone()),
            birthdate: Set(profile.birthdate.clone()),
            points_balance: Set(starting_points),
            total_spent: Set(0.0),
            store_owner_id: Set(store_owner_id),
            created_at: Set(now),
            ..Default::default()
        };

        active.insert(&self.conn).await
    }

    pub async fn update_profile(
        &self,
        id: i32,
        profile: &CustomerProfile,
    ) -> Result<Option<customers::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: customers::ActiveModel = existing.into();
        if let Some(name) = &profile.name {
            active.name = Set(name.clone());
        }
        if profile.email.is_some() {
            active.email = Set(profile.email.clone());
        }
        if profile.phone.is_some() {
            active.phone = Set(profile.phone.clone());
        }
        if profile.address.is_some() {
            active.address = Set(profile.address.clone());
        }
        if profile.birthdate.is_some() {
            active.birthdate = Set(profile.birthdate.clone());
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update customer profile")?;

        Ok(Some(updated))
    }

    pub async fn count(&self, scope: Option<i32>) -> Result<u64> {
        let mut query = Customers::find();

        if let Some(store_owner_id) = scope {
            query = query.filter(customers::Column::StoreOwnerId.eq(store_owner_id));
        }

        query
            .count(&self.conn)
            .await
            .context("Failed to count customers")
    }

    /// Sum of point balances and spend, optionally restricted to one store.
    pub async fn balance_totals(&self, scope: Option<i32>) -> Result<BalanceTotals> {
        let mut query = Customers::find()
            .select_only()
            .column_as(customers::Column::PointsBalance.sum(), "total_points")
            .column_as(customers::Column::TotalSpent.sum(), "total_spent");

        if let Some(store_owner_id) = scope {
            query = query.filter(customers::Column::StoreOwnerId.eq(store_owner_id));
        }

        let totals = query
            .into_model::<BalanceTotals>()
            .one(&self.conn)
            .await
            .context("Failed to aggregate balance totals")?;

        Ok(totals.unwrap_or_default())
    }

    pub async fn per_store_counts(&self) -> Result<Vec<StoreCustomerCount>> {
        Customers::find()
            .select_only()
            .column(customers::Column::StoreOwnerId)
            .column_as(customers::Column::Id.count(), "customer_count")
            .filter(customers::Column::StoreOwnerId.is_not_null())
            .group_by(customers::Column::StoreOwnerId)
            .into_model::<StoreCustomerCount>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate per-store customer counts")
    }
}

/// Placeholder display name for barcode-only registrations. Deterministic so
/// receipts and tests can rely on it.
#[must_use]
pub fn default_display_name(barcode: &str) -> String {
    format!("Customer {barcode}")
}
