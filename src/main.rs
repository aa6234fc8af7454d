use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hostelrank::{load_json, load_records, EngineConfig, RecommendRequest, Recommender, RestApi, WeightTable};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Preference-driven hostel recommender
#[derive(Parser, Debug)]
#[command(name = "hostelrank")]
#[command(about = "Rank hostels against your preferences", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the dataset and serve the REST API
    Serve {
        #[command(flatten)]
        model: ModelArgs,

        /// HTTP API port
        #[arg(long, default_value_t = 8080)]
        http_port: u16,
    },
    /// Fit the dataset, answer one query and print the result as JSON
    Recommend {
        #[command(flatten)]
        model: ModelArgs,

        /// Preferences as a JSON object, e.g. '{"distance_km": 1.5}'
        #[arg(long, default_value = "{}")]
        prefs: String,

        /// Gents, Ladies or Mixed
        #[arg(long)]
        hostel_type: Option<String>,

        /// Number of results
        #[arg(short)]
        k: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Candidate dataset (JSON array of records)
    #[arg(short, long)]
    data: PathBuf,

    /// Weight table (JSON); the built-in table is used when absent
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ModelArgs {
    fn build(&self) -> anyhow::Result<Recommender> {
        let records = load_records(&self.data)
            .with_context(|| format!("failed to load dataset {}", self.data.display()))?;

        let weights = match &self.weights {
            Some(path) => load_json::<WeightTable, _>(path)
                .with_context(|| format!("failed to load weights {}", path.display()))?,
            None => WeightTable::default(),
        };

        let config = match &self.config {
            Some(path) => load_json::<EngineConfig, _>(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        Ok(Recommender::from_records(records, weights, config)?)
    }
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn serve(model: ModelArgs, http_port: u16) -> anyhow::Result<()> {
    info!("Starting HostelRank v{}", env!("CARGO_PKG_VERSION"));
    info!("Dataset: {:?}", model.data);
    info!("HTTP API port: {}", http_port);

    let recommender = Arc::new(model.build()?);
    info!("Recommender initialized");

    let recommender_http = recommender.clone();
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(recommender_http, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn recommend_once(
    model: ModelArgs,
    prefs: &str,
    hostel_type: Option<String>,
    k: Option<usize>,
) -> anyhow::Result<()> {
    let preferences: BTreeMap<String, Value> =
        serde_json::from_str(prefs).context("--prefs must be a JSON object")?;

    let recommender = model.build()?;
    let request = RecommendRequest {
        preferences,
        hostel_type,
        k,
        weights: None,
    };

    let recommendation = recommender.recommend(&request)?;
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Serve { model, http_port } => serve(model, http_port).await,
        Command::Recommend {
            model,
            prefs,
            hostel_type,
            k,
        } => recommend_once(model, &prefs, hostel_type, k),
    }
}
