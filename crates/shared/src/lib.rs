pub mod config;
pub mod errors;
pub mod health;
pub mod server;
pub mod utils;
