use anyhow::{Context, Result};
use recommendation::{app::RecommendationServiceApp, config::RecommendationConfig};
use shared::{
    config::process_env,
    utils::{Telemetry, init_logger},
};
use tracing::{error, info};

const SERVICE: &str = "recommendationservice";

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = RecommendationConfig::init().context("failed to load config")?;
    let _log_guard = init_logger(SERVICE, &config.log)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .thread_name("recommendationservice-worker")
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        info!("initialized recommendation service");

        let telemetry = Telemetry::init(SERVICE, &process_env);
        let result = RecommendationServiceApp::new(config).run(&telemetry).await;

        if let Err(e) = telemetry.shutdown() {
            error!("Failed to shutdown telemetry: {e}");
        }

        info!("✅ Recommendation Service shutdown complete.");
        result
    })
}
