use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use lead_router::config::Config;
use lead_router::constants;
use lead_router::infra::GeminiBackend;
use lead_router::pipeline::{EnrichmentClient, LeadPipeline, RunPaths};
use lead_router::server::{start_server, AppState};
use lead_router::{logging, metrics};

#[derive(Parser)]
#[command(name = "lead_router")]
#[command(about = "Enrich inbound sales leads with AI classification and route them to a team")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file (defaults are used if it doesn't exist)
    #[arg(long, global = true, default_value = constants::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a CSV file of leads and write the enriched JSON output
    Run {
        /// Raw leads file: email,job_title,comment per line, no header
        #[arg(long)]
        input: PathBuf,
        /// Where to write the enriched leads (defaults to pipeline.output_file)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Where to write the repaired CSV (defaults to pipeline.cleaned_file)
        #[arg(long)]
        cleaned: Option<PathBuf>,
    },
    /// Serve the CSV upload endpoint
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn build_pipeline(config: &Config) -> anyhow::Result<LeadPipeline> {
    let backend = GeminiBackend::from_config(config).context("failed to set up model backend")?;
    info!(model = %config.model.model, "Using Gemini backend");
    let client = EnrichmentClient::new(Arc::new(backend), config.model.on_backend_error);
    Ok(LeadPipeline::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Run {
            input,
            output,
            cleaned,
        } => {
            println!("🔄 Processing the leads...");
            let pipeline = build_pipeline(&config)?;
            let paths = RunPaths {
                input,
                cleaned: cleaned.unwrap_or_else(|| PathBuf::from(&config.pipeline.cleaned_file)),
                output: output.unwrap_or_else(|| PathBuf::from(&config.pipeline.output_file)),
            };

            match pipeline.run(&paths).await {
                Ok(summary) => {
                    println!("🧹 Saved cleaned file to {}", summary.cleaned_file);
                    println!("\n📊 Run results:");
                    println!("   Total leads: {}", summary.total_leads);
                    println!("   Fallbacks: {}", summary.fallbacks);
                    println!("   Repaired rows: {}", summary.anomalies);
                    for team in constants::all_teams() {
                        let count = summary.team_counts.get(team).copied().unwrap_or(0);
                        println!("   {}: {}", team, count);
                    }
                    println!(
                        "✅ Processing complete. Output saved to {}",
                        summary.output_file
                    );
                }
                Err(e) => {
                    error!("Lead processing failed: {}", e);
                    println!("❌ Lead processing failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Serve { port } => {
            metrics::init_metrics();
            let pipeline = Arc::new(build_pipeline(&config)?);
            let state = Arc::new(AppState::new(pipeline, &config.server));
            let port = port.unwrap_or(config.server.port);
            start_server(state, port)
                .await
                .map_err(|e| anyhow::anyhow!("server error: {}", e))?;
        }
    }
    Ok(())
}
