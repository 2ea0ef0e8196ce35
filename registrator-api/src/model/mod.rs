pub mod instance;
pub mod record;
pub mod service;
