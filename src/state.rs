use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, DashboardService, IdentityService, LedgerService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub identity: IdentityService,

    pub ledger: LedgerService,

    pub auth: AuthService,

    pub dashboard: DashboardService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let identity = IdentityService::new(store.clone());
        let ledger = LedgerService::new(store.clone());
        let auth = AuthService::new(store.clone());
        let dashboard = DashboardService::new(store.clone());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            identity,
            ledger,
            auth,
            dashboard,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
