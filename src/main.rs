use clap::Parser;
use tape_flow::cli::{Cli, Commands};
use tape_flow::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    tape_flow::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Replay(args) => {
            tracing::info!(file = ?args.file, "Starting replay");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Capture: enabled={} dir={} queue={}",
                config.capture.enabled,
                config.capture.output_dir.display(),
                config.capture.channel_capacity
            );
            println!("  Fields: {}", config.capture.fields.join(","));
            println!(
                "  Feed record: enabled={} file={}",
                config.capture.record_feed,
                config.capture.feed_file.display()
            );
            println!("  Events: capacity={}", config.events.capacity);
            println!(
                "  Telemetry: level={} format={:?} metrics_port={}",
                config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
