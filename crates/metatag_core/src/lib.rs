pub mod admin;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod model;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod sanitize;
pub mod store;
pub mod tokens;
pub mod trim;
