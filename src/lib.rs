pub mod api;
pub mod config;
pub mod db;
pub mod model;
pub mod store;
pub mod tracker;

pub mod error;
pub mod logger;
