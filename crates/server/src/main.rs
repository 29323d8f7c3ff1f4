use llm::{BedrockClient, ModelConfig};
use log::{info, warn};
use rag_core::config::{Config, GatewayConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init_tracing();

    info!("Starting model gateway server");

    let (gateway, region) = match Config::load_from_env() {
        Ok(config) => (config.gateway, Some(config.aws.region)),
        Err(e) => {
            warn!("Could not load config ({}), using development defaults", e);
            (GatewayConfig::default().with_env_overrides(), None)
        }
    };

    let invoker = BedrockClient::new(ModelConfig {
        aws_region: region,
        ..ModelConfig::default()
    })
    .await?;

    let app = server::create_app(Arc::new(invoker));

    let listener = tokio::net::TcpListener::bind(&gateway.bind).await?;

    info!("Gateway running on http://{}", gateway.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
