//! Read-side aggregation over committed ledger state. Pure projections,
//! recomputed on every read.

use serde::Serialize;
use std::collections::HashMap;

use crate::db::Store;
use crate::services::error::LedgerError;

#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total_customers: u64,
    pub active_store_owners: u64,
    pub total_points_balance: i64,
    pub total_spent: f64,
    pub stores: Vec<StoreStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub store_owner_id: i32,
    pub store_name: String,
    pub customer_count: i64,
}

/// Summary for one store owner's own customer set.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerStats {
    pub total_customers: u64,
    pub total_points_balance: i64,
    pub total_spent: f64,
}

#[derive(Clone)]
pub struct DashboardService {
    store: Store,
}

impl DashboardService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, LedgerError> {
        let total_customers = self.store.count_customers(None).await?;
        let active_store_owners = self.store.count_active_store_owners().await?;
        let totals = self.store.customer_balance_totals(None).await?;

        let counts: HashMap<i32, i64> = self
            .store
            .per_store_customer_counts()
            .await?
            .into_iter()
            .map(|row| (row.store_owner_id, row.customer_count))
            .collect();

        let stores = self
            .store
            .list_store_owners()
            .await?
            .into_iter()
            .map(|owner| StoreStats {
                customer_count: counts.get(&owner.id).copied().unwrap_or(0),
                store_owner_id: owner.id,
                store_name: owner.store_name,
            })
            .collect();

        Ok(GlobalStats {
            total_customers,
            active_store_owners,
            total_points_balance: totals.total_points.unwrap_or(0),
            total_spent: totals.total_spent.unwrap_or(0.0),
            stores,
        })
    }

    pub async fn owner_stats(&self, store_owner_id: i32) -> Result<OwnerStats, LedgerError> {
        let scope = Some(store_owner_id);
        let total_customers = self.store.count_customers(scope).await?;
        let totals = self.store.customer_balance_totals(scope).await?;

        Ok(OwnerStats {
            total_customers,
            total_points_balance: totals.total_points.unwrap_or(0),
            total_spent: totals.total_spent.unwrap_or(0.0),
        })
    }
}
