use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{customers, discounts, purchases};

pub mod migrator;
pub mod repositories;

pub use repositories::admin::Admin;
pub use repositories::customer::{BalanceTotals, CustomerProfile, StoreCustomerCount};
pub use repositories::store_owner::StoreOwner;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn customer_repo(&self) -> repositories::customer::CustomerRepository {
        repositories::customer::CustomerRepository::new(self.conn.clone())
    }

    fn purchase_repo(&self) -> repositories::purchase::PurchaseRepository {
        repositories::purchase::PurchaseRepository::new(self.conn.clone())
    }

    fn discount_repo(&self) -> repositories::discount::DiscountRepository {
        repositories::discount::DiscountRepository::new(self.conn.clone())
    }

    fn store_owner_repo(&self) -> repositories::store_owner::StoreOwnerRepository {
        repositories::store_owner::StoreOwnerRepository::new(self.conn.clone())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Customers
    // ========================================================================

    pub async fn get_customer(&self, id: i32) -> Result<Option<customers::Model>> {
        self.customer_repo().get(id).await
    }

    pub async fn get_customer_by_barcode(
        &self,
        barcode: &str,
        scope: Option<i32>,
    ) -> Result<Option<customers::Model>> {
        self.customer_repo().get_by_barcode(barcode, scope).await
    }

    pub async fn list_customers(&self, scope: Option<i32>) -> Result<Vec<customers::Model>> {
        self.customer_repo().list(scope).await
    }

    pub async fn insert_customer(
        &self,
        barcode: &str,
        profile: &CustomerProfile,
        store_owner_id: Option<i32>,
        starting_points: i64,
    ) -> std::result::Result<customers::Model, sea_orm::DbErr> {
        self.customer_repo()
            .insert(barcode, profile, store_owner_id, starting_points)
            .await
    }

    pub async fn update_customer_profile(
        &self,
        id: i32,
        profile: &CustomerProfile,
    ) -> Result<Option<customers::Model>> {
        self.customer_repo().update_profile(id, profile).await
    }

    pub async fn count_customers(&self, scope: Option<i32>) -> Result<u64> {
        self.customer_repo().count(scope).await
    }

    pub async fn customer_balance_totals(&self, scope: Option<i32>) -> Result<BalanceTotals> {
        self.customer_repo().balance_totals(scope).await
    }

    pub async fn per_store_customer_counts(&self) -> Result<Vec<StoreCustomerCount>> {
        self.customer_repo().per_store_counts().await
    }

    // ========================================================================
    // Purchases & discounts
    // ========================================================================

    pub async fn list_customer_purchases(&self, customer_id: i32) -> Result<Vec<purchases::Model>> {
        self.purchase_repo().list_for_customer(customer_id).await
    }

    pub async fn get_discount(&self, id: i32) -> Result<Option<discounts::Model>> {
        self.discount_repo().get(id).await
    }

    pub async fn list_available_discounts(
        &self,
        customer_id: i32,
    ) -> Result<Vec<discounts::Model>> {
        self.discount_repo().available_for_customer(customer_id).await
    }

    pub async fn create_discount(
        &self,
        customer_id: i32,
        amount: f64,
        expiry_date: &str,
    ) -> Result<discounts::Model> {
        self.discount_repo()
            .create(customer_id, amount, expiry_date)
            .await
    }

    // ========================================================================
    // Store owners & admins
    // ========================================================================

    pub async fn get_store_owner(&self, id: i32) -> Result<Option<StoreOwner>> {
        self.store_owner_repo().get(id).await
    }

    pub async fn get_store_owner_by_email(&self, email: &str) -> Result<Option<StoreOwner>> {
        self.store_owner_repo().get_by_email(email).await
    }

    pub async fn list_store_owners(&self) -> Result<Vec<StoreOwner>> {
        self.store_owner_repo().list().await
    }

    pub async fn count_active_store_owners(&self) -> Result<u64> {
        self.store_owner_repo().count_active().await
    }

    pub async fn verify_store_owner_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<StoreOwner>> {
        self.store_owner_repo()
            .verify_credentials(email, password)
            .await
    }

    pub async fn create_store_owner(
        &self,
        email: &str,
        initial_password: &str,
        store_name: &str,
        security: Option<SecurityConfig>,
    ) -> Result<StoreOwner> {
        self.store_owner_repo()
            .create(email, initial_password, store_name, security)
            .await
    }

    pub async fn set_store_owner_active(
        &self,
        id: i32,
        is_active: bool,
    ) -> Result<Option<StoreOwner>> {
        self.store_owner_repo().set_active(id, is_active).await
    }

    pub async fn delete_store_owner(&self, id: i32) -> Result<bool> {
        self.store_owner_repo().delete(id).await
    }

    pub async fn get_admin(&self, id: i32) -> Result<Option<Admin>> {
        self.admin_repo().get(id).await
    }

    pub async fn verify_admin_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Admin>> {
        self.admin_repo().verify_credentials(username, password).await
    }
}
