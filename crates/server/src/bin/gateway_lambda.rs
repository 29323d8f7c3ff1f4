use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use llm::{BedrockClient, ModelConfig, ModelInvoker};
use server::gateway;
use server::models::{ProxyEvent, ProxyResponse};
use std::sync::Arc;

async fn function_handler(
    invoker: &dyn ModelInvoker,
    event: LambdaEvent<ProxyEvent>,
) -> Result<ProxyResponse, Error> {
    Ok(gateway::handle(&event.payload, invoker).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // CloudWatch already prefixes every line with the ingestion time.
        .with_target(false)
        .without_time()
        .init();

    let invoker = Arc::new(
        BedrockClient::new(ModelConfig {
            aws_region: std::env::var("AWS_REGION").ok(),
            ..ModelConfig::default()
        })
        .await?,
    );

    run(service_fn(move |event: LambdaEvent<ProxyEvent>| {
        let invoker = invoker.clone();
        async move { function_handler(invoker.as_ref(), event).await }
    }))
    .await
}
