//! vultr-cloud-init - Vultr metadata datasource for early boot
//!
//! Fetches the instance metadata document and prints the derived
//! network configuration for the host's renderer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use vultr_cloud_init::CloudInitError;
use vultr_cloud_init::config::{CloudPaths, VultrSettings, loader};
use vultr_cloud_init::datasources::vultr::Vultr;
use vultr_cloud_init::datasources::{Datasource, detect_datasource};
use vultr_cloud_init::network::SysfsInterfaces;

#[derive(Parser)]
#[command(name = "vultr-cloud-init")]
#[command(author, version, about = "Vultr metadata datasource for early boot", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Host configuration directory
    #[arg(long, env = "VULTR_CLOUD_INIT_CONFIG_DIR", default_value = "/etc/cloud")]
    config_dir: PathBuf,

    /// Directory listing network interfaces
    #[arg(long, default_value = "/sys/class/net")]
    sysfs_net_root: PathBuf,

    /// Override the metadata endpoint
    #[arg(long)]
    metadata_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch metadata and generate network configuration
    Init,
    /// Check whether this instance runs on Vultr
    Detect,
    /// Fetch and print instance metadata
    Metadata,
    /// Print the generated network configuration
    NetworkConfig {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn load_settings(cli: &Cli) -> Result<VultrSettings, CloudInitError> {
    let paths = CloudPaths::with_config_dir(&cli.config_dir);
    let mut settings = loader::load_settings(&paths).await?;

    if let Some(url) = &cli.metadata_url {
        settings.metadata_url = url.clone();
    }

    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<(), CloudInitError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(&cli).await?;
    let vultr = Vultr::with_interfaces(
        settings.clone(),
        Box::new(SysfsInterfaces::with_root(&cli.sysfs_net_root)),
    )?;

    match cli.command {
        Some(Commands::Detect) => match detect_datasource(settings).await {
            Ok(ds) => println!("{}", ds.name()),
            Err(CloudInitError::NoDatasource) => {
                info!("Not running on Vultr");
                println!("none");
            }
            Err(e) => return Err(e),
        },
        Some(Commands::Metadata) => {
            let metadata = vultr.metadata().await?;
            println!("{}", serde_json::to_string_pretty(metadata)?);
        }
        Some(Commands::NetworkConfig { format }) => {
            let config = vultr.network().await?;
            let rendered = match format {
                Format::Json => config.to_json()?,
                Format::Yaml => config.to_yaml()?,
            };
            println!("{}", rendered);
        }
        Some(Commands::Init) | None => {
            info!("Running Vultr datasource");
            let metadata = vultr.metadata().await?;
            info!(
                "Instance {} ({}), zone {}",
                metadata.instance_id, metadata.local_hostname, metadata.availability_zone
            );
            let config = vultr.network().await?;
            info!("Network configuration ready: {} entries", config.config.len());
        }
    }

    Ok(())
}
