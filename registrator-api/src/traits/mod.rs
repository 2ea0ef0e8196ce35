pub mod adapter;
pub mod factory;
