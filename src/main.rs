use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use surfreport::{
    Coordinates, Services, SpotIdentifier, SurfReportConfig, ToolCallRequest, telemetry, web,
};

/// SurfReport - surf forecast tools and reports
#[derive(Parser, Debug)]
#[command(name = "surfreport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP tool server
    Serve {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a surf report for one spot
    #[command(allow_negative_numbers = true)]
    Report {
        /// Spot name from the built-in table (defaults to its first entry)
        #[arg(short, long)]
        spot: Option<String>,

        /// Custom latitude (used together with --lon)
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Custom longitude (used together with --lat)
        #[arg(long, requires = "lat")]
        lon: Option<f64>,

        /// Free-text place resolved through geocoding
        #[arg(short, long, conflicts_with_all = ["lat", "lon"])]
        address: Option<String>,

        /// Print the forecast table instead of asking the language model
        #[arg(long)]
        offline: bool,
    },

    /// List the available tools as JSON
    Tools,

    /// Invoke one tool with JSON arguments
    Call {
        /// Tool name, e.g. get_weather_forecast
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SurfReportConfig::load_from_path(cli.config.clone())?;
    telemetry::init_tracing(&config.logging, cli.verbose)?;
    info!("Starting surfreport {}", surfreport::VERSION);

    match cli.command {
        Commands::Serve { port } => {
            let services = Services::from_config(&config, false)?;
            let port = port.unwrap_or(config.server.port);
            runtime()?.block_on(web::run(port, services))
        }
        Commands::Report {
            spot,
            lat,
            lon,
            address,
            offline,
        } => {
            let services = Services::from_config(&config, offline)?;
            let identifier = match address {
                Some(address) => SpotIdentifier::Address(address),
                None => {
                    let coordinates = match (lat, lon) {
                        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                        _ => None,
                    };
                    let spot = match spot {
                        Some(spot) => spot,
                        None => services
                            .pipeline
                            .resolver()
                            .table()
                            .default_spot()
                            .map(|s| s.name.clone())
                            .context("Spot table is empty")?,
                    };
                    SpotIdentifier::new(&spot, coordinates)
                }
            };
            let report = services.pipeline.report_blocking(&identifier);
            println!("{}", report.narrative);
            if !report.summary.is_empty() {
                println!("\n{}", report.summary);
            }
            Ok(())
        }
        Commands::Tools => {
            let services = Services::from_config(&config, true)?;
            let tools: Vec<surfreport::api::ApiTool> = services
                .dispatcher
                .list_tools()
                .iter()
                .map(Into::into)
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
            Ok(())
        }
        Commands::Call { tool, arguments } => {
            let arguments: Value =
                serde_json::from_str(&arguments).context("Tool arguments must be valid JSON")?;
            if !arguments.is_object() {
                bail!("Tool arguments must be a JSON object");
            }
            let services = Services::from_config(&config, true)?;
            let response = runtime()?.block_on(services.dispatcher.call(ToolCallRequest::new(tool, arguments)));
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
