use anyhow::Result;
use bibresolve::config::{find_config_file, get_config, load_config, Config};
use bibresolve::server::{self, ErrorResponse};
use bibresolve::{ui, Resolver};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// bibresolve - Resolve title and authors for a DOI, arXiv, ISBN or hosted PDF URL
#[derive(Parser, Debug)]
#[command(name = "bibresolve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve title and authors for a scholarly work from its URL", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (styled if TTY, JSON otherwise)
    Auto,
    /// JSON format, same body as the HTTP endpoint
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve metadata for a URL
    #[command(alias = "l")]
    Lookup {
        /// DOI, arXiv, ISBN or hosted PDF URL
        url: String,
    },

    /// Run the HTTP metadata endpoint
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Destination path
        #[arg(default_value = "bibresolve.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bibresolve={}", level)),
    );

    // Logs go to stderr so `lookup` output stays machine readable
    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(cli: &Cli) -> Result<Config> {
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        load_config(&config_path)?
    } else {
        get_config()?
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load(&cli)?;
    init_tracing(&cli, &config);

    match cli.command {
        Commands::Lookup { ref url } => {
            let resolver = Resolver::from_config(&config)?;
            let format = match cli.output {
                OutputFormat::Auto if ui::is_terminal() => OutputFormat::Plain,
                OutputFormat::Auto => OutputFormat::Json,
                other => other,
            };

            match resolver.resolve(url).await {
                Ok(metadata) => match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metadata)?),
                    _ if ui::is_terminal() => ui::print_metadata(&metadata),
                    _ => println!("{}", ui::format_plain(&metadata)),
                },
                Err(e) => {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&ErrorResponse::new(e.to_string()))?)
                        }
                        _ => ui::print_error(&e.to_string()),
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Serve { host, port } => {
            let mut server_config = config.server.clone();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }

            let resolver = Arc::new(Resolver::from_config(&config)?);
            server::serve(resolver, &server_config.addr()).await?;
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default().save(&path)?;
            if !cli.quiet {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
