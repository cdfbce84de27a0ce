pub mod admin;
pub mod customer;
pub mod discount;
pub mod password;
pub mod purchase;
pub mod store_owner;
