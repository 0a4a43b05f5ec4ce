pub mod brands;
pub mod customers;
pub mod orders;
pub mod products;
