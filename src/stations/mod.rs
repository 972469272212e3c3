pub mod cache;
pub mod catalog;
pub mod catalog_loader;
pub mod error;
