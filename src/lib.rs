pub mod auth;
pub mod config;
pub mod database;
pub mod listing;
pub mod normalize;
pub mod records;
pub mod stats;
pub mod upstream;
pub mod user_cli;
pub mod web;

pub use config::AppConfig;
pub use web::start_web_server;
