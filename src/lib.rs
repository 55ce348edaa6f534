pub mod api;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod models;
pub mod prefs;
pub mod proxy;
pub mod reshape;
pub mod tracker;
