use clap::Parser;
use nfo_watch::cli::{Cli, Commands};
use nfo_watch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load_or_default(&cli.config);

    // Initialize telemetry
    let _telemetry = nfo_watch::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!(config = %cli.config, "Starting watch mode");
            args.execute(config).await?;
        }
        Commands::Status(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("# Effective configuration ({})", cli.config);
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::NotifyTest(args) => {
            args.execute().await?;
        }
    }

    Ok(())
}
