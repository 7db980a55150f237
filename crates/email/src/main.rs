use anyhow::{Context, Result};
use email::{app::EmailServiceApp, config::EmailConfig};
use shared::{
    config::process_env,
    utils::{Telemetry, init_logger},
};
use tracing::{error, info};

const SERVICE: &str = "emailservice";

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = EmailConfig::init().context("failed to load config")?;
    let _log_guard = init_logger(SERVICE, &config.log)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .thread_name("emailservice-worker")
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        info!("starting the email service in {} mode.", config.mode);

        let telemetry = Telemetry::init(SERVICE, &process_env);
        let result = EmailServiceApp::new(config).run(&telemetry).await;

        if let Err(e) = telemetry.shutdown() {
            error!("Failed to shutdown telemetry: {e}");
        }

        info!("✅ Email Service shutdown complete.");
        result
    })
}
