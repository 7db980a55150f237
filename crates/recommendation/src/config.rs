use anyhow::{Context, Result};
use shared::{
    config::{EnvLookup, GrpcServerConfig, parse_env_or, process_env},
    utils::LogConfig,
};
use std::time::Duration;

pub const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    pub server: GrpcServerConfig,
    pub log: LogConfig,
    pub catalog_addr: String,
    pub catalog_timeout: Duration,
}

impl RecommendationConfig {
    pub fn init() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let server = GrpcServerConfig::from_lookup(lookup)?;

        let catalog_addr = lookup("PRODUCT_CATALOG_SERVICE_ADDR")
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .context("PRODUCT_CATALOG_SERVICE_ADDR environment variable not set")?;

        let timeout_ms = parse_env_or(lookup, "CATALOG_TIMEOUT_MS", DEFAULT_CATALOG_TIMEOUT_MS)?;

        Ok(Self {
            server,
            log: LogConfig::from_lookup(lookup),
            catalog_addr,
            catalog_timeout: Duration::from_millis(timeout_ms.max(1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_address_is_required() {
        let err = RecommendationConfig::from_lookup(&|_| None).unwrap_err();
        assert!(err.to_string().contains("PRODUCT_CATALOG_SERVICE_ADDR"));

        let blank = |key: &str| (key == "PRODUCT_CATALOG_SERVICE_ADDR").then(|| "  ".to_string());
        assert!(RecommendationConfig::from_lookup(&blank).is_err());
    }

    #[test]
    fn test_config_with_catalog_address() {
        let lookup = |key: &str| match key {
            "PRODUCT_CATALOG_SERVICE_ADDR" => Some("productcatalogservice:3550".to_string()),
            "CATALOG_TIMEOUT_MS" => Some("750".to_string()),
            _ => None,
        };
        let config = RecommendationConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.catalog_addr, "productcatalogservice:3550");
        assert_eq!(config.catalog_timeout, Duration::from_millis(750));
        assert_eq!(config.server.port, 8080);
    }
}
