mod analyze;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ytlens_insight::MetricValue;

#[derive(Debug, Parser)]
#[command(name = "ytlens-cli")]
#[command(about = "ytlens comment and chart insight command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the sampled, truncated comment block without calling the model
    Prepare {
        /// JSON array of comment strings or `{"text": ...}` objects
        #[arg(long)]
        input: PathBuf,

        /// Fixed sampling seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Analyze a comment batch and print the result as JSON
    Comments {
        /// JSON array of comment strings or `{"text": ...}` objects
        #[arg(long)]
        input: PathBuf,

        /// Fixed sampling seed, overriding `YTLENS_SAMPLING_SEED`
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Produce a one-sentence insight for a chart task
    Chart {
        /// Task identifier, e.g. `engagement` or `core_fans`
        #[arg(long)]
        task: String,

        /// Template parameter as `name=value`; repeatable
        #[arg(long = "param", value_parser = input::parse_param)]
        params: Vec<(String, MetricValue)>,

        /// JSON object of template parameters; `--param` values take precedence
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// List chart tasks and the parameters each one requires
    Tasks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Prepare { input, seed } => analyze::run_prepare(&input, seed)?,
        Commands::Comments { input, seed } => analyze::run_comments(&input, seed).await?,
        Commands::Chart { task, params, data } => {
            analyze::run_chart(&task, params, data.as_deref()).await?;
        }
        Commands::Tasks => analyze::run_tasks(),
    }

    Ok(())
}
