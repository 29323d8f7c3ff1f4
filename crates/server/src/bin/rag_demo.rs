use anyhow::Context;
use bedrock_logs::{BedrockLogs, DeliveryMode};
use clap::Parser;
use llm::{KnowledgeBaseClient, RagConfig, RagRequest};
use rag_core::Config;
use server::rag;
use std::path::PathBuf;
use tracing::info;

/// Ask a Bedrock knowledge base a question, log the call and optionally
/// rate the answer.
#[derive(Debug, Parser)]
#[command(long_about = "Ask a Bedrock knowledge base a question.

The retrieve-and-generate call is wrapped by BedrockLogs, so its input,
output and timing are delivered to the configured sink (local JSON lines
or a Firehose delivery stream). The printed run and observation ids can be
used to join feedback to the answer.

Environment variables:
  CONFIG_PATH           - Config file (defaults to ./config.toml)
  KNOWLEDGE_BASE_ID     - Overrides knowledge_base.id
  MODEL_ARN             - Overrides knowledge_base.model_arn
  FIREHOSE_STREAM_NAME  - Overrides logging.delivery_stream")]
struct Args {
    /// Question to send to the knowledge base.
    question: String,

    /// Config file to load instead of CONFIG_PATH.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bedrock session id of a previous answer, to continue the conversation.
    #[arg(long)]
    session_id: Option<String>,

    /// Run id of a previous answer, to group this question with it.
    #[arg(long)]
    run_id: Option<String>,

    /// User recorded in the log metadata and the feedback.
    #[arg(long, default_value = "demo-user", env = "RAG_DEMO_USER")]
    user_id: String,

    /// Rate the answer right away (for example 1 or 0).
    #[arg(long)]
    feedback_score: Option<i64>,

    /// Free text comment attached to the feedback.
    #[arg(long, requires = "feedback_score")]
    comment: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
                .with_env_overrides();
            config.validate()?;
            config
        }
        None => Config::load_from_env().context("Failed to load config")?,
    };

    let knowledge_base =
        KnowledgeBaseClient::new(RagConfig::from_config(&config), &config.aws.region).await?;
    let logs = BedrockLogs::from_config(&config.logging, &config.aws.region).await?;
    info!("Logging mode: {:?}", logs.mode());

    let mut request = RagRequest::new(args.question.clone());
    if let Some(session_id) = &args.session_id {
        request = request.with_session(session_id.clone());
    }

    let answer = rag::ask(
        &logs,
        &knowledge_base,
        &request,
        &args.user_id,
        args.run_id.as_deref(),
    )
    .await?;

    println!("{}", answer.response.text);
    for citation in &answer.response.citations {
        for source in &citation.sources {
            println!("  source: {}", source);
        }
    }
    println!();
    println!("session_id:     {}", answer.response.session_id);
    println!("run_id:         {}", answer.run_id());
    println!("observation_id: {}", answer.observation_id());

    if let (DeliveryMode::Local, Some(log)) = (logs.mode(), &answer.log) {
        println!("log: {}", serde_json::to_string_pretty(log)?);
    }

    if let Some(score) = args.feedback_score {
        let receipt = rag::rate_answer(&logs, &answer, &args.user_id, score, args.comment.clone())
            .await?;
        println!("feedback observation_id: {}", receipt.observation_id());
    }

    Ok(())
}
