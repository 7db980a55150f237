pub mod abstract_trait;
pub mod app;
pub mod config;
pub mod grpc_client;
pub mod handler;
pub mod selector;

pub const RECOMMENDATION_SERVICE_NAME: &str = "hipstershop.RecommendationService";
