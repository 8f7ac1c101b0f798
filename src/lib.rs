pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod loader;
pub mod output;
pub mod profile;
pub mod render;
pub mod threshold;
