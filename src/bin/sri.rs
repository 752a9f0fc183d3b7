//! SRI CLI: convert resource readings to RDF and publish them over MQTT.
//!
//! Usage:
//!   sri convert --type pv --file readings.json
//!   sri publish --type building --file building.csv [--dry-run]
//!   sri interactive [--dry-run]
//!   sri topics

use clap::{Args, Parser, Subcommand};
use sri::input::{self, InputError};
use sri::{
    Config, DispatchRouter, MemoryTransport, MqttTransport, RawRecord, ResourceType,
    RouteOutcome, SemanticConverter, Transport,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sri",
    version,
    about = "Semantic resource interface: readings to RDF, published over MQTT"
)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RecordSource {
    /// Resource type: ev, pv, hvac, building or weather
    #[arg(long = "type", short = 't')]
    resource_type: String,
    /// JSON or CSV file holding the record
    #[arg(long, conflicts_with = "json", required_unless_present = "json")]
    file: Option<PathBuf>,
    /// Record given inline as JSON
    #[arg(long)]
    json: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a record and print the Turtle graph
    Convert {
        #[command(flatten)]
        source: RecordSource,
    },
    /// Convert a record and publish it on its topic
    Publish {
        #[command(flatten)]
        source: RecordSource,
        /// Print what would be published instead of connecting to the broker
        #[arg(long)]
        dry_run: bool,
    },
    /// Prompt for records in a loop
    Interactive {
        /// Print what would be published instead of connecting to the broker
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the topic each resource type is published on
    Topics,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sri=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_record(source: &RecordSource) -> Result<RawRecord, InputError> {
    match (&source.file, &source.json) {
        (Some(path), _) => input::load_file(path),
        (None, Some(text)) => input::parse_json(text),
        (None, None) => Err(InputError::UnsupportedFormat("no record given".to_string())),
    }
}

/// The transport chosen for a run, plus the handles needed to shut it down
/// or report on it.
enum Publisher {
    Mqtt(Arc<MqttTransport>),
    DryRun(Arc<MemoryTransport>),
}

impl Publisher {
    async fn open(config: &Config, dry_run: bool) -> Result<Self, String> {
        if dry_run {
            return Ok(Self::DryRun(Arc::new(MemoryTransport::new())));
        }
        let settings = config.require_broker().map_err(|e| e.to_string())?;
        let transport = Arc::new(MqttTransport::new(settings.clone()));
        transport
            .connect()
            .await
            .map_err(|e| format!("Failed to connect to {}: {}", settings.broker, e))?;
        Ok(Self::Mqtt(transport))
    }

    fn transport(&self) -> Arc<dyn Transport> {
        match self {
            Self::Mqtt(t) => t.clone(),
            Self::DryRun(t) => t.clone(),
        }
    }

    /// Print dry-run messages published since the last call.
    fn flush(&self) {
        if let Self::DryRun(t) = self {
            for message in t.drain() {
                println!("# topic: {}", message.topic);
                println!("{}", message.payload);
            }
        }
    }

    async fn close(&self) {
        if let Self::Mqtt(t) = self {
            if let Err(e) = t.disconnect().await {
                tracing::warn!(error = %e, "disconnect failed");
            }
        }
    }
}

fn build_router(config: &Config, publisher: &Publisher) -> DispatchRouter {
    DispatchRouter::new(publisher.transport())
        .with_converter(config.conversion.converter())
        .with_routes(config.routing.table())
}

fn report(outcome: &RouteOutcome) {
    println!(
        "Published {} triples ({} items) to '{}'",
        outcome.triples, outcome.items, outcome.topic
    );
    for failure in &outcome.failures {
        eprintln!("Skipped item {}: {}", failure.index, failure.error);
    }
}

fn cmd_convert(config: &Config, source: &RecordSource) -> i32 {
    let resource: ResourceType = match source.resource_type.parse() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let record = match load_record(source) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let converter: SemanticConverter = config.conversion.converter();
    match converter.convert(resource, &record) {
        Ok(conversion) => {
            print!("{}", conversion.payload);
            for failure in &conversion.failures {
                eprintln!("Skipped item {}: {}", failure.index, failure.error);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_publish(config: &Config, source: &RecordSource, dry_run: bool) -> i32 {
    let record = match load_record(source) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let publisher = match Publisher::open(config, dry_run).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let router = build_router(config, &publisher);
    let code = match router.route(&source.resource_type, &record).await {
        Ok(outcome) => {
            publisher.flush();
            report(&outcome);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    publisher.close().await;
    code
}

fn cmd_topics(config: &Config) -> i32 {
    let table = config.routing.table();
    println!("{:<10}  {}", "TYPE", "TOPIC");
    println!("{}", "-".repeat(48));
    for (resource, topic) in table.entries() {
        println!("{:<10}  {}", resource, topic);
    }
    0
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> Option<String> {
    print!("{}", text);
    std::io::stdout().flush().ok();
    match lines.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_string()),
        _ => None,
    }
}

fn load_existing(path: &str, load: fn(&Path) -> Result<RawRecord, InputError>) -> Option<RawRecord> {
    let path = Path::new(path);
    if !path.is_file() {
        println!("File not found! Please provide a valid path.");
        return None;
    }
    match load(path) {
        Ok(record) => Some(record),
        Err(e) => {
            println!("Error loading file: {}", e);
            None
        }
    }
}

async fn cmd_interactive(config: &Config, dry_run: bool) -> i32 {
    let publisher = match Publisher::open(config, dry_run).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let router = build_router(config, &publisher);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("\nSemantic Resource Interface");
    println!("Available Resource and Service Types: ev, pv, hvac, building, weather");

    loop {
        let tag = match prompt(&mut lines, "\nEnter Resource type (or 'quit' to exit): ").await {
            Some(t) => t.to_lowercase(),
            None => break,
        };
        if tag == "quit" {
            break;
        }
        if tag.parse::<ResourceType>().is_err() {
            println!("Invalid data type!");
            continue;
        }

        let choice = match prompt(
            &mut lines,
            "Enter '1' to input JSON data, '2' to upload a JSON file or '3' to upload a CSV file: ",
        )
        .await
        {
            Some(c) => c,
            None => break,
        };

        let record = match choice.as_str() {
            "1" => match prompt(&mut lines, "Enter JSON data: ").await {
                Some(text) => match input::parse_json(&text) {
                    Ok(r) => Some(r),
                    Err(_) => {
                        println!("Invalid JSON format!");
                        None
                    }
                },
                None => break,
            },
            "2" => match prompt(&mut lines, "Enter the path to the JSON file: ").await {
                Some(path) => load_existing(&path, input::load_json),
                None => break,
            },
            "3" => match prompt(&mut lines, "Enter the path to the CSV file: ").await {
                Some(path) => load_existing(&path, input::load_csv),
                None => break,
            },
            _ => {
                println!("Invalid choice! Please enter '1', '2' or '3'.");
                None
            }
        };

        if let Some(record) = record {
            match router.route(&tag, &record).await {
                Ok(outcome) => {
                    publisher.flush();
                    report(&outcome);
                    println!("Data processed and published successfully!");
                }
                Err(e) => println!("Error processing data: {}", e),
            }
        }
    }

    publisher.close().await;
    0
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Convert { source } => cmd_convert(&config, &source),
        Commands::Publish { source, dry_run } => cmd_publish(&config, &source, dry_run).await,
        Commands::Interactive { dry_run } => cmd_interactive(&config, dry_run).await,
        Commands::Topics => cmd_topics(&config),
    };
    std::process::exit(code);
}
