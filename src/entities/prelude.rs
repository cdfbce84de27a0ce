pub use super::admins::Entity as Admins;
pub use super::customers::Entity as Customers;
pub use super::discounts::Entity as Discounts;
pub use super::purchases::Entity as Purchases;
pub use super::store_owners::Entity as StoreOwners;
