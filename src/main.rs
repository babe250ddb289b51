use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Map, Value};

use webrag::core::config::{AppPaths, ConfigService};
use webrag::core::logging;
use webrag::llm::OllamaProvider;
use webrag::rag::{HttpFetcher, Pipeline, PipelineOutput};

#[derive(Parser, Debug)]
#[command(
    name = "webrag",
    version,
    about = "Answer a question from the content of a single web page"
)]
struct Cli {
    /// Page to read and index
    #[arg(long)]
    url: Option<String>,

    /// Question to answer from the page
    #[arg(long)]
    question: Option<String>,

    /// Configuration file (defaults to config.yml in the data dir or project root)
    #[arg(long, env = "WEBRAG_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Number of chunks handed to the model
    #[arg(long)]
    top_k: Option<usize>,

    /// Print the retrieved chunks before the answer
    #[arg(long, default_value_t = false)]
    show_context: bool,
}

impl Cli {
    /// Flags given on the command line, shaped like `config.yml`.
    fn overrides(&self) -> Value {
        let mut run = Map::new();
        if let Some(url) = &self.url {
            run.insert("url".to_string(), json!(url));
        }
        if let Some(question) = &self.question {
            run.insert("question".to_string(), json!(question));
        }

        let mut root = Map::new();
        if !run.is_empty() {
            root.insert("run".to_string(), Value::Object(run));
        }
        if let Some(top_k) = self.top_k {
            root.insert("retrieval".to_string(), json!({ "top_k": top_k }));
        }
        Value::Object(root)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let paths = Arc::new(AppPaths::discover());
    logging::init(&paths);

    let mut service = ConfigService::new(paths.clone());
    if let Some(path) = &cli.config {
        service = service.with_config_path(path);
    }
    let config = service
        .load_config_with_overrides(&cli.overrides())
        .with_context(|| format!("Failed to load {}", service.config_path().display()))?;

    tracing::info!(
        "Answering from {} with {} (embeddings: {}) at {}",
        config.run.url,
        config.ollama.model,
        config.ollama.embedding_model,
        config.ollama.base_url
    );

    let provider =
        Arc::new(OllamaProvider::new(&config.ollama).context("Failed to create Ollama client")?);
    let fetcher =
        Arc::new(HttpFetcher::new(&config.fetch).context("Failed to create HTTP client")?);
    let pipeline = Pipeline::new(
        config.pipeline_config(),
        fetcher,
        provider.clone(),
        provider,
    )
    .context("Invalid pipeline configuration")?;

    let output = match pipeline
        .run_detailed(&config.run.url, &config.run.question)
        .await
    {
        Ok(output) => output,
        Err(err) => {
            let stage = err.stage();
            tracing::error!("Run failed at the {} stage: {}", stage, err);
            return Err(anyhow::Error::new(err).context(format!("{} stage failed", stage)));
        }
    };

    if cli.show_context {
        print_context(&output);
    }
    println!("{}", output.answer.text);

    Ok(())
}

fn print_context(output: &PipelineOutput) {
    println!(
        "Retrieved {} of {} chunks:",
        output.retrieved.len(),
        output.chunk_count
    );
    for (rank, hit) in output.retrieved.hits().iter().enumerate() {
        println!(
            "\n[{}] chunk #{} (score {:.4})\n{}",
            rank + 1,
            hit.entry.chunk.sequence_index,
            hit.score,
            hit.entry.chunk.text
        );
    }
    println!("\n---\n");
}
