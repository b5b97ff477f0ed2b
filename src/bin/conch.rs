// Copyright (c) 2025 - Cowboy AI, Inc.
//! Conch command line client
//!
//! Connection settings come from `--config`/`--profile` or, without a config
//! file, from `CONCH_URL`, `CONCH_TOKEN` and `CONCH_TIMEOUT`. Logs go to
//! stderr (`RUST_LOG` overrides the `info` default) so stdout can be piped.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use conch::{
    reconcile::{self, DeviceRef, IdentifierResolver, ProductRef},
    render::{self, OutputFormat},
    ConchApi, ConchClient, ConchConfig, ConfigFile,
};
use std::path::PathBuf;
use std::process::exit;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "conch", about, version, subcommand_help_heading = "Commands")]
struct Cli {
    /// JSON profile file
    #[arg(long, global = true, env = "CONCH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Profile to use from the config file
    #[arg(short, long, global = true, env = "CONCH_PROFILE")]
    profile: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Racks, layouts and assignments
    #[command(subcommand)]
    Rack(RackCommand),

    /// Hardware products
    #[command(subcommand)]
    HardwareProduct(ProductCommand),

    /// Devices
    #[command(subcommand)]
    Device(DeviceCommand),

    /// Datacenters
    #[command(subcommand)]
    Datacenter(ListCommand),

    /// Datacenter rooms
    #[command(subcommand)]
    Room(ListCommand),

    /// Check that the API is reachable
    Ping,
}

#[derive(Debug, Args)]
struct RackArg {
    /// Rack UUID
    #[arg(value_name = "rack")]
    rack: Uuid,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    rack: RackArg,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum RackCommand {
    /// Show one rack
    Get(RackArg),

    /// Show a rack's layout slots
    Layout(RackArg),

    /// Write a rack's layout as an import document
    ExportLayout {
        #[command(flatten)]
        args: ExportArgs,

        /// Export product ids instead of product names
        #[arg(long)]
        ids: bool,
    },

    /// Replace a rack's layout from a document
    ///
    /// Deletes every existing slot, then creates the desired slots one at a
    /// time. This is not atomic: a failure part-way leaves the rack with a
    /// partial layout that must be repaired by re-running the import.
    ImportLayout {
        #[command(flatten)]
        rack: RackArg,

        /// Document to read; `-` or omitted reads stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Replace an existing layout
        #[arg(long)]
        overwrite: bool,

        /// Print the planned calls without making them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show a rack's device assignments
    Assignments(RackArg),

    /// Write a rack's assignments as an import document
    ExportAssignments(ExportArgs),

    /// Replace a rack's device assignments from a document
    ImportAssignments {
        #[command(flatten)]
        rack: RackArg,

        /// Document to read; `-` or omitted reads stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProductField {
    Name,
    Alias,
    Sku,
}

#[derive(Debug, Subcommand)]
enum ProductCommand {
    /// Show one hardware product
    Get {
        /// Product id, name, alias or SKU
        key: String,

        /// Only accept a match on this field
        #[arg(long, value_enum)]
        by: Option<ProductField>,
    },

    /// List every hardware product
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceField {
    Serial,
    AssetTag,
}

#[derive(Debug, Subcommand)]
enum DeviceCommand {
    /// Show one device
    Get {
        /// Device id, serial number or asset tag
        key: String,

        /// Only accept a match on this field
        #[arg(long, value_enum)]
        by: Option<DeviceField>,
    },
}

#[derive(Debug, Subcommand)]
enum ListCommand {
    /// List all
    List,
}

impl Cli {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    fn load_config(&self) -> Result<ConchConfig> {
        match &self.config {
            Some(path) => {
                let file = ConfigFile::load(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Ok(file.profile(self.profile.as_deref())?)
            }
            None => Ok(ConchConfig::from_env().context("loading configuration from environment")?),
        }
    }

    async fn run(self) -> Result<()> {
        let format = self.format();
        let client = ConchClient::new(self.load_config()?)?;

        match self.command {
            Command::Rack(cmd) => run_rack(&client, cmd, format).await,
            Command::HardwareProduct(cmd) => run_product(&client, cmd, format).await,
            Command::Device(cmd) => run_device(&client, cmd, format).await,
            Command::Datacenter(ListCommand::List) => {
                let datacenters = client.datacenters().await?;
                println!("{}", render::datacenters(&datacenters, format)?);
                Ok(())
            }
            Command::Room(ListCommand::List) => {
                let rooms = client.rooms().await?;
                println!("{}", render::rooms(&rooms, format)?);
                Ok(())
            }
            Command::Ping => {
                client.health().await.context("Conch health check failed")?;
                println!("ok");
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Err(error) = Cli::parse().run().await {
        error!("{error:#}");
        exit(1);
    }
}

async fn read_document(file: Option<PathBuf>) -> Result<Vec<u8>> {
    match file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut raw = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut raw)
                .await
                .context("reading stdin")?;
            Ok(raw)
        }
    }
}

async fn write_document(output: Option<PathBuf>, raw: Vec<u8>) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(&path, &raw)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", String::from_utf8_lossy(&raw)),
    }
    Ok(())
}

async fn run_rack(client: &ConchClient, cmd: RackCommand, format: OutputFormat) -> Result<()> {
    match cmd {
        RackCommand::Get(RackArg { rack }) => {
            let rack = client.rack(rack).await?;
            println!("{}", render::rack(&rack, format)?);
        }
        RackCommand::Layout(RackArg { rack }) => {
            let layout = client.rack_layout(rack).await?.into_display_order();
            for (a, b) in layout.overlaps() {
                warn!(
                    "Slots {} (rack unit {}) and {} (rack unit {}) overlap",
                    a.id, a.rack_unit_start, b.id, b.rack_unit_start
                );
            }
            let products = match format {
                OutputFormat::Json => Vec::new(),
                OutputFormat::Text => client.hardware_products().await?,
            };
            println!("{}", render::layout(&layout, &products, format)?);
        }
        RackCommand::ExportLayout { args, ids } => {
            let layout = client.rack_layout(args.rack.rack).await?;
            let products = if ids {
                Vec::new()
            } else {
                client.hardware_products().await?
            };
            write_document(args.output, reconcile::export_layout(&layout, &products)?).await?;
        }
        RackCommand::ImportLayout {
            rack,
            file,
            overwrite,
            dry_run,
        } => {
            let raw = read_document(file).await?;
            if dry_run {
                let plan =
                    reconcile::plan_layout_import(client, rack.rack, &raw, overwrite).await?;
                print!("{}", render::plan(&plan, format)?);
                return Ok(());
            }
            let layout = reconcile::import_layout(client, rack.rack, &raw, overwrite).await?;
            let products = match format {
                OutputFormat::Json => Vec::new(),
                OutputFormat::Text => client.hardware_products().await?,
            };
            println!("{}", render::layout(&layout, &products, format)?);
        }
        RackCommand::Assignments(RackArg { rack }) => {
            let assignments = client.rack_assignments(rack).await?.into_display_order();
            println!("{}", render::assignments(&assignments, format)?);
        }
        RackCommand::ExportAssignments(args) => {
            let assignments = client.rack_assignments(args.rack.rack).await?;
            write_document(args.output, reconcile::export_assignments(&assignments)?).await?;
        }
        RackCommand::ImportAssignments { rack, file } => {
            let raw = read_document(file).await?;
            let assignments = reconcile::import_assignments(client, rack.rack, &raw).await?;
            println!("{}", render::assignments(&assignments, format)?);
        }
    }
    Ok(())
}

async fn run_product(client: &ConchClient, cmd: ProductCommand, format: OutputFormat) -> Result<()> {
    match cmd {
        ProductCommand::Get { key, by } => {
            let product = match by {
                None => client.hardware_product(&key).await?,
                Some(field) => {
                    let reference = match field {
                        ProductField::Name => ProductRef::Name(key),
                        ProductField::Alias => ProductRef::Alias(key),
                        ProductField::Sku => ProductRef::Sku(key),
                    };
                    let id = IdentifierResolver::new(client)
                        .resolve_product(&reference)
                        .await?;
                    client.hardware_product(&id.to_string()).await?
                }
            };
            println!("{}", render::hardware_products(&[product], format)?);
        }
        ProductCommand::List => {
            let products = client.hardware_products().await?;
            println!("{}", render::hardware_products(&products, format)?);
        }
    }
    Ok(())
}

async fn run_device(client: &ConchClient, cmd: DeviceCommand, format: OutputFormat) -> Result<()> {
    match cmd {
        DeviceCommand::Get { key, by } => {
            let device = match by {
                None => client.device(&key).await?,
                Some(field) => {
                    let reference = match field {
                        DeviceField::Serial => DeviceRef::Serial(key),
                        DeviceField::AssetTag => DeviceRef::AssetTag(key),
                    };
                    let id = IdentifierResolver::new(client)
                        .resolve_device(&reference)
                        .await?;
                    client.device(&id.to_string()).await?
                }
            };
            println!("{}", render::device(&device, format)?);
        }
    }
    Ok(())
}
