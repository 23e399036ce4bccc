use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use views::config::Config;

/// Aggregation BFF for the stock dashboard frontend.
#[derive(Parser)]
#[command(name = "stockview")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = "stockview.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(path = %cli.config.display(), error = %err, "invalid config");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = views::serve(config).await {
        tracing::error!(error = %err, "server exited with error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
