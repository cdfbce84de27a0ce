pub mod auth;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod ledger;

pub use auth::{AuthService, Principal};
pub use dashboard::DashboardService;
pub use error::LedgerError;
pub use identity::IdentityService;
pub use ledger::LedgerService;
