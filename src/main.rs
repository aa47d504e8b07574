use sinfgram_server::config::Settings;
use sinfgram_server::startup::Application;
use sinfgram_server::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let settings = Settings::load()?;
    tracing::info!(environment = %settings.environment, "Configuration loaded");

    let app = Application::build(settings).await?;
    app.run_until_stopped().await
}
