pub mod cache_keys;
pub mod catalog;
pub mod order_workflow;
