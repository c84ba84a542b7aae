use clap::{Parser, Subcommand};
use gps_extract::config::{self, LogConfig, ServiceConfig};
use gps_extract::http::{self, ExtractResponse};
use gps_extract::service;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Listener overrides for the `serve` command.
#[derive(clap::Args, Clone, Default)]
struct ServeArgs {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
#[command(name = "gps-extract")]
#[command(version)]
#[command(about = "Read GPS coordinates from image EXIF metadata")]
#[command(long_about = "\
Read GPS coordinates from image EXIF metadata

Runs an HTTP service (default) or extracts from a single file.

HTTP API:

  GET  /          liveness probe
  POST /extract   multipart form, field \"image\"
                  200 {\"success\": true, \"latitude\": .., \"longitude\": ..}
                  400 {\"success\": false, \"message\": ..}

Supported containers: JPEG, PNG, WebP, TIFF.

Run 'gps-extract gen-config' to generate a documented config.toml.")]
struct Cli {
    /// Config file (stock defaults when omitted or missing)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// Extract coordinates from one image file and print them as JSON
    Extract {
        /// Image file to read
        file: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            let mut service_config = load_and_init(cli.config)?;
            apply_overrides(&mut service_config, args);
            service_config.validate()?;
            http::serve(&service_config).await?;
        }
        Command::Extract { file } => {
            let service_config = load_and_init(cli.config)?;
            let bytes = std::fs::read(&file)?;
            let coord = service::locate_gps(&bytes, service_config.gps.reference_policy);
            let response = match coord {
                Some(c) => ExtractResponse::found(c),
                None => ExtractResponse::failure(http::HttpError::NoCoordinates.to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            if coord.is_none() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_and_init(path: Option<PathBuf>) -> Result<ServiceConfig, config::ConfigError> {
    let service_config = config::load_config(path.as_deref())?;
    init_logging(&service_config.log);
    Ok(service_config)
}

/// Logs go to stderr so `extract` output stays clean JSON.
fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn apply_overrides(config: &mut ServiceConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}
