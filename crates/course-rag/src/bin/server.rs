//! Course knowledge server binary
//!
//! Run with: cargo run -p course-rag --bin course-rag-server

use course_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "course-rag.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                  Course Knowledge Service                 ║
║        Course Document Q&A and Quiz Generation            ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config_path =
        std::env::var("COURSE_RAG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = RagConfig::load(&config_path)?;

    tracing::info!("Configuration loaded from {}", config_path);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Index directory: {}", config.index.storage_dir.display());

    // Create server (also builds the Ollama client)
    let server = RagServer::new(config.clone()).await?;

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let ollama = course_rag::providers::OllamaClient::new(&config.llm)?;
    if ollama.health_check().await? {
        tracing::info!("Ollama is running");
    } else {
        tracing::warn!("Ollama not available at {}", config.llm.base_url);
        tracing::warn!("Please start Ollama:");
        tracing::warn!("  1. Start: ollama serve");
        tracing::warn!(
            "  2. Pull models: ollama pull {} && ollama pull {}",
            config.llm.embed_model,
            config.llm.generate_model
        );
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/courses                         - Create a course");
    println!("  POST /api/courses/:course_id/documents    - Upload documents");
    println!("  POST /api/courses/:course_id/ask          - Ask questions");
    println!("  POST /api/quizzes/generate                - Generate a quiz");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
