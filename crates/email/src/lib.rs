pub mod abstract_trait;
pub mod app;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handler;
pub mod renderer;
pub mod service;

pub const EMAIL_SERVICE_NAME: &str = "hipstershop.EmailService";
