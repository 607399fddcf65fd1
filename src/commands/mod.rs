pub mod config;
pub mod sort;
pub mod types;
