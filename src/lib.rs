pub mod breed;
pub mod common;
pub mod data_loader;
pub mod errors;
pub mod import;
pub mod plan;
pub mod plan_execution;
