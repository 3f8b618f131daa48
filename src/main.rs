// Command-line entry point.
// Lists featured shows, shows near a location, or a single show and its artworks.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use emergence::artsy::{Artwork, Location, Show};
use emergence::overview::FEATURED_TITLE;
use emergence::{
    ArtsyClient, Config, Environment, LoadingState, LocationsHost, ShowEmitter, ShowKind,
    ShowsOverview, logging,
};

#[derive(Parser, Debug)]
#[command(name = "emergence", version, about = "Browse gallery shows from the Artsy API")]
struct Cli {
    /// Use the Artsy staging API
    #[arg(long)]
    staging: bool,

    /// Only list featured shows
    #[arg(long, conflicts_with_all = ["location", "lat", "show"])]
    featured: bool,

    /// List shows near a known location id (see --locations-file)
    #[arg(long, conflicts_with_all = ["lat", "show"])]
    location: Option<String>,

    /// Latitude to search near
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude to search near
    #[arg(long = "long", id = "longitude", requires = "lat", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Which shows to list near a location: upcoming, closing or past
    #[arg(long, default_value = "closing")]
    kind: ShowKind,

    /// Show a single show by id
    #[arg(long)]
    show: Option<String>,

    /// With --show, also list its artworks
    #[arg(long, requires = "show")]
    artworks: bool,

    /// JSON file of locations and featured location ids
    #[arg(long)]
    locations_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::from_env().context("loading Artsy configuration")?;
    if cli.staging {
        config = config.with_environment(Environment::Staging);
    }
    if let Some(path) = &cli.locations_file {
        config.locations_file = Some(path.clone());
    }
    info!(environment = config.environment.name(), base_url = config.base_url(), "starting");

    let client = Arc::new(ArtsyClient::new(&config)?);

    if let Some(show_id) = &cli.show {
        let show = client.get_show(show_id).await?;
        print_show(&show);
        if cli.artworks {
            for artwork in client.get_show_artworks(&show).await? {
                print_artwork(&artwork);
            }
        }
        return Ok(());
    }

    if cli.featured {
        let emitter = ShowEmitter::featured(FEATURED_TITLE, Vec::new(), client.clone());
        emitter.load().await?;
        print_emitter(&emitter);
        return Ok(());
    }

    let locations = LocationsHost::load(config.locations_file.as_deref())?;

    let location = match (&cli.location, cli.lat, cli.longitude) {
        (Some(id), _, _) => Some(
            locations
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown location {:?}", id))?,
        ),
        (None, Some(lat), Some(long)) => {
            let name = format!("{},{}", lat, long);
            Some(Location::new(&name, &name, lat, long))
        }
        _ => None,
    };

    if let Some(location) = location {
        let emitter = ShowEmitter::location_based(location, cli.kind, client.clone());
        emitter.load().await?;
        print_emitter(&emitter);
        return Ok(());
    }

    let overview = ShowsOverview::new(&locations, cli.kind, Vec::new(), client.clone());
    for row in 1..overview.len() {
        overview.request_shows_at(row);
    }
    overview.settled().await;
    for emitter in overview.emitters() {
        print_emitter(emitter);
    }
    Ok(())
}

fn print_emitter(emitter: &ShowEmitter) {
    println!("== {}", emitter.title());
    match emitter.status() {
        LoadingState::Failed(err) => println!("   (failed: {})", err),
        _ if emitter.is_empty() => println!("   (no shows)"),
        _ => {
            for show in emitter.shows().iter() {
                print_show(show);
            }
        }
    }
}

fn print_show(show: &Show) {
    let partner = show
        .partner
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("unknown partner");
    let dates = match (show.start_at, show.end_at) {
        (Some(start), Some(end)) => format!(
            "{} - {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        (Some(start), None) => format!("from {}", start.format("%Y-%m-%d")),
        _ => String::new(),
    };
    println!("   {} | {} | {} [{}]", show.name, partner, dates, show.id);
}

fn print_artwork(artwork: &Artwork) {
    let artists: Vec<&str> = artwork.artists.iter().map(|a| a.name.as_str()).collect();
    let image = artwork
        .default_image()
        .and_then(|image| image.url_for("large"))
        .unwrap_or_default();
    println!(
        "      {} ({}) by {} {}",
        artwork.title,
        artwork.medium,
        if artists.is_empty() {
            "unknown".to_string()
        } else {
            artists.join(", ")
        },
        image
    );
}
