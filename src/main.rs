use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use park_recommender::{
    catalog::loader::load_catalog, FilterSpec, GeoRadius, RecommenderConfig, SearchIndex, Tokenizer,
};

#[derive(Parser, Debug)]
#[command(name = "park-recommender")]
#[command(about = "Recommend amusement parks from review text")]
#[command(version)]
struct Cli {
    /// Scraped park dataset (JSON)
    #[arg(short, long, default_value = "parks_details.json")]
    dataset: PathBuf,

    /// JSON config file; defaults are used for missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the latent rank
    #[arg(long)]
    rank: Option<usize>,

    /// Override the number of results
    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(short, long, default_value = "0.0.0.0:5000")]
        addr: SocketAddr,
    },
    /// Run one query and print the results as JSON
    Query {
        text: String,

        /// Comma separated region names
        #[arg(long, value_delimiter = ',')]
        regions: Vec<String>,

        /// Only parks marked good for kids
        #[arg(long)]
        good_for_kids: bool,

        #[arg(long, requires_all = ["longitude", "distance"])]
        latitude: Option<f64>,

        #[arg(long, requires_all = ["latitude", "distance"])]
        longitude: Option<f64>,

        /// Travel distance in miles
        #[arg(long, requires_all = ["latitude", "longitude"])]
        distance: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => RecommenderConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RecommenderConfig::default(),
    };
    if let Some(rank) = cli.rank {
        config.latent_rank = rank;
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }

    let catalog = load_catalog(&cli.dataset, &Tokenizer::new())
        .with_context(|| format!("loading dataset {}", cli.dataset.display()))?;
    let index = SearchIndex::build(catalog, config).context("building search index")?;

    match cli.command {
        Command::Serve { addr } => {
            info!(parks = index.catalog().len(), "starting server");
            park_recommender::server::serve(Arc::new(index), addr)
                .await
                .context("server failed")?;
        }
        Command::Query { text, regions, good_for_kids, latitude, longitude, distance } => {
            let within = match (latitude, longitude, distance) {
                (Some(latitude), Some(longitude), Some(miles)) => {
                    Some(GeoRadius { latitude, longitude, miles })
                }
                _ => None,
            };
            let filters = FilterSpec::none()
                .with_regions(regions.as_slice(), &index.config().regions)
                .with_good_for_kids(good_for_kids.then_some("yes"))
                .with_radius(within);
            let results = index.search(&text, &filters)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}
