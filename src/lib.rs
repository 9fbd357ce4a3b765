pub mod catalog;
pub mod catalog_selector;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod error;
pub mod labelme;
pub mod menu_cache;
