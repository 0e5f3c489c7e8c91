use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use odata_admin::api::{format_api_error, ApiError, Key, RawResponse};
use odata_admin::config::Settings;
use odata_admin::{ClientConfig, ODataQuery, Record, ResourceClient};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command line client for OData resource collections
#[derive(Parser, Debug)]
#[command(name = "odata-admin", version, about, long_about = None)]
struct Args {
    /// OData service root (e.g. http://localhost:2000/odata)
    #[arg(short, long)]
    base_path: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List items of a collection
    List {
        resource: String,
        #[arg(long)]
        expand: Option<String>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        select: Option<String>,
        #[arg(long)]
        order_by: Option<String>,
        #[arg(long)]
        top: Option<u64>,
        #[arg(long)]
        skip: Option<u64>,
        /// Ask the server for the total count
        #[arg(long)]
        count: bool,
        #[arg(long)]
        keywords: Option<String>,
    },
    /// Fetch one item by key
    Get {
        resource: String,
        id: Key,
        #[arg(long)]
        select: Option<String>,
    },
    /// Create an item from a JSON object
    Create {
        resource: String,
        #[arg(long)]
        data: String,
    },
    /// Patch an item with a JSON object
    Update {
        resource: String,
        id: Key,
        #[arg(long)]
        data: String,
    },
    /// Delete an item
    Delete {
        resource: String,
        id: Key,
        /// ETag the item must still have
        #[arg(long)]
        if_match: Option<String>,
    },
    /// Update the item if it has a key, create it otherwise
    Save {
        resource: String,
        #[arg(long)]
        data: String,
    },
}

impl Command {
    fn resource(&self) -> &str {
        match self {
            Command::List { resource, .. }
            | Command::Get { resource, .. }
            | Command::Create { resource, .. }
            | Command::Update { resource, .. }
            | Command::Delete { resource, .. }
            | Command::Save { resource, .. } => resource,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .init();

    tracing::info!("odata-admin started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("odata-admin").join("odata-admin.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".odata-admin").join("odata-admin.log");
    }
    PathBuf::from("odata-admin.log")
}

fn parse_record(data: &str) -> Result<Record> {
    serde_json::from_str(data).context("--data must be a JSON object")
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_response(response: &RawResponse) -> Result<()> {
    if response.is_empty() {
        println!("{}", response.status);
        return Ok(());
    }
    print_json(&response.body)
}

/// Log an API error and turn it into a user-facing message
fn cli_error(err: ApiError) -> anyhow::Error {
    tracing::error!("Request failed: {}", err);
    anyhow::anyhow!(format_api_error(&err))
}

async fn run(client: &ResourceClient<Record>, command: Command) -> Result<()> {
    let response = match command {
        Command::List {
            expand,
            filter,
            select,
            order_by,
            top,
            skip,
            count,
            keywords,
            ..
        } => {
            let query = ODataQuery {
                expand,
                filter,
                select,
                order_by,
                top,
                skip,
                count: count.then_some(true),
                keywords,
            };
            let page = client.list(&query).await.map_err(cli_error)?;
            return print_json(&serde_json::json!({
                "count": page.count,
                "items": page.items,
            }));
        }
        Command::Get { id, select, .. } => client.get_by_id(id, select.as_deref()).await,
        Command::Create { data, .. } => client.create(&parse_record(&data)?).await,
        Command::Update { id, data, .. } => client.update(id, &parse_record(&data)?).await,
        Command::Delete { id, if_match, .. } => client.delete(id, if_match.as_deref()).await,
        Command::Save { data, .. } => client.save(&parse_record(&data)?, true).await,
    };

    print_response(&response.map_err(cli_error)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut settings = Settings::load();
    let base_path = settings.effective_base_path(args.base_path.as_deref());
    let resource = args.command.resource().to_string();

    tracing::info!("Using base path: {}, resource: {}", base_path, resource);

    let config = ClientConfig::new(&base_path).map_err(cli_error)?;
    let client: ResourceClient<Record> = ResourceClient::new(config, resource.as_str()).map_err(cli_error)?;

    run(&client, args.command).await?;

    if let Err(e) = settings.remember(&base_path, &resource) {
        tracing::warn!("Failed to save settings: {}", e);
    }

    Ok(())
}
