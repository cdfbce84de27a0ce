pub mod prelude;

pub mod admins;
pub mod customers;
pub mod discounts;
pub mod purchases;
pub mod store_owners;
