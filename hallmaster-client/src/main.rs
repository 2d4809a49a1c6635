//! hallmaster - command-line client for the Hallmaster venue scheduler
//!
//! Lists rooms, collated bookings over a date range, and runs tiered
//! searches over booking titles and descriptions.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use hallmaster_client::{HallService, HallmasterClient, SearchHit, SearchOptions};
use hallmaster_common::config::{load_toml_config, ClientSettings, LoggingConfig};
use hallmaster_common::time::{now, parse_user_date};
use hallmaster_common::RoomFilter;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for hallmaster
#[derive(Parser, Debug)]
#[command(name = "hallmaster")]
#[command(about = "Query room bookings from the Hallmaster venue scheduler")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/hallmaster/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hall to query (falls back to HALLMASTER_HALL_ID, then the config file)
    #[arg(long, global = true)]
    hall_id: Option<u32>,

    /// Scheduler host (falls back to HALLMASTER_BASE_URL, then the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the hall's rooms and their colors
    Rooms,

    /// List collated bookings in a date range
    Bookings {
        #[command(flatten)]
        range: RangeArgs,

        /// Fetch every booking's description as well
        #[arg(long)]
        descriptions: bool,
    },

    /// Search booking titles and descriptions
    Search {
        /// Search terms
        #[arg(required = true)]
        terms: Vec<String>,

        #[command(flatten)]
        range: RangeArgs,

        /// Keep scanning after the first acronym match for a term
        #[arg(long)]
        all_acronym_hits: bool,
    },
}

/// Date range and room restriction shared by the query commands
#[derive(Args, Debug)]
struct RangeArgs {
    /// Range start, YYYY-MM-DD or RFC 3339 (default: now)
    #[arg(long)]
    from: Option<String>,

    /// Range end, YYYY-MM-DD or RFC 3339
    #[arg(long, conflicts_with = "days")]
    to: Option<String>,

    /// Range length in days when --to is not given
    #[arg(long, default_value_t = 90)]
    days: i64,

    /// Only this room id
    #[arg(long)]
    room: Option<u32>,
}

impl RangeArgs {
    fn resolve(&self) -> Result<(DateTime<Utc>, DateTime<Utc>, RoomFilter)> {
        let start = match &self.from {
            Some(value) => parse_user_date(value)?,
            None => now(),
        };

        let end = match &self.to {
            Some(value) => parse_user_date(value)?,
            None => {
                if self.days < 0 {
                    bail!("--days must not be negative");
                }
                start + Duration::days(self.days)
            }
        };

        Ok((start, end, RoomFilter::from(self.room)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml_config = load_toml_config(cli.config.as_deref()).context("Failed to load config")?;
    init_logging(&toml_config.logging)?;

    let settings = ClientSettings::resolve(cli.hall_id, cli.base_url.as_deref(), &toml_config)?;
    info!(hall_id = settings.hall_id, base_url = %settings.base_url, "Starting hallmaster");

    let client = HallmasterClient::new(settings)?;
    let service = HallService::connect(client)
        .await
        .context("Failed to load room directory")?;

    match cli.command {
        Command::Rooms => {
            let rooms = service.registry().rooms();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rooms)?);
            } else {
                for room in rooms {
                    println!("{:>6}  {:<9}  {}", room.id(), room.color_key(), room.name());
                }
            }
        }

        Command::Bookings {
            range,
            descriptions,
        } => {
            let (start, end, rooms) = range.resolve()?;
            let bookings = if descriptions {
                service.get_bookings_with_descriptions(start, end, rooms).await?
            } else {
                service.get_bookings(start, end, rooms).await?
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&bookings)?);
            } else {
                for booking in &bookings {
                    println!("{}\n", booking);
                }
                println!("{} booking(s)", bookings.len());
            }
        }

        Command::Search {
            terms,
            range,
            all_acronym_hits,
        } => {
            let (start, end, rooms) = range.resolve()?;
            let service = service.with_search_options(SearchOptions {
                stop_on_first_acronym_hit: !all_acronym_hits,
            });
            let results = service.search(&terms, start, end, rooms).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let total = results.len();
                for hit in results {
                    let tier = match &hit {
                        SearchHit::Confident(_) => "confident",
                        SearchHit::Possible(_) => "possible",
                    };
                    println!("({}) {}\n", tier, hit.booking());
                }
                println!("{} match(es)", total);
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// RUST_LOG wins over the configured level. Logs go to the configured file,
/// or stderr so stdout stays clean for results.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let (stderr_layer, file_layer) = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (
                None,
                Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            )
        }
        None => (Some(fmt::layer().with_writer(std::io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
