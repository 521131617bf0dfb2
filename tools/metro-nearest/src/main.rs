use anyhow::{bail, Context, Result};
use clap::Parser;
use metro_core::config::{SearchConfig, ViewerConfig};
use metro_core::search::{Geocoder, NominatimGeocoder, SearchController, SearchState};
use metro_core::{dataset, export, NearestStationSession};
use metro_transit::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

mod report;

#[derive(Parser, Debug)]
#[command(
    name = "metro-nearest",
    author,
    version,
    about = "Find the nearest Ahmedabad metro station",
    long_about = "Resolves the nearest metro station and the walking distance to it.\n\n\
                  The location comes from a searched place (--query) if given, otherwise \
                  from --lat/--lng, otherwise from the configured fallback location."
)]
struct Args {
    /// Viewer configuration JSON (defaults are used when omitted)
    #[arg(short, long, env = "METRO_CONFIG")]
    config: Option<PathBuf>,

    /// Station dataset JSON (the bundled network is used when omitted)
    #[arg(short, long, env = "METRO_DATA")]
    data: Option<PathBuf>,

    /// Latitude of the current position
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Search for a place and use it as the location
    #[arg(short, long)]
    query: Option<String>,

    /// Which search result to use (0 is the first)
    #[arg(long, default_value_t = 0, requires = "query")]
    pick: usize,

    /// Also list the N closest stations
    #[arg(long)]
    count: Option<usize>,

    /// Also list every station within this many meters
    #[arg(long)]
    within: Option<f64>,

    /// List all stations by line and exit
    #[arg(long)]
    list: bool,

    /// Write the network (with the nearest station flagged) as GeoJSON
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    report::setup_logging(args.verbose);

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let lines = match &args.data {
        Some(path) => dataset::load_from_path(path)
            .with_context(|| format!("Failed to load dataset {}", path.display()))?,
        None => dataset::bundled().context("Bundled dataset is invalid")?,
    };

    let network = Arc::new(
        dataset::build_network(lines, &config.merge, config.walking)
            .context("Failed to build the station network")?,
    );

    if args.list {
        report::print_station_list(&network);
        return Ok(());
    }

    let mut session = NearestStationSession::new(network.clone(), config.fallback_location);

    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        let position = Coordinate::new(lat, lng);
        if !position.is_finite() {
            bail!("Position must be finite, got {lat}, {lng}");
        }
        session.update_device_location(position);
    } else {
        session.device_unavailable("no position given");
    }

    if let Some(query) = &args.query {
        let location = search_location(&config, query, args.pick).await?;
        session.set_search_location(location);
    }

    let snapshot = session.snapshot();
    report::print_snapshot(&network, &snapshot);

    if let Some(count) = args.count {
        report::print_ranked(
            &format!("{count} closest stations"),
            &network.nearest_stations(snapshot.active.coordinate, count),
        );
    }

    if let Some(radius) = args.within {
        report::print_ranked(
            &format!("Stations within {}", format_distance(radius)),
            &network.stations_within(snapshot.active.coordinate, radius),
        );
    }

    if let Some(path) = &args.geojson {
        let collection = export::network_features(&network, snapshot.nearest.as_ref());
        let json = export::to_geojson_string(collection).context("Failed to serialize GeoJSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))?;
        tracing::info!("wrote {}", path.display());
    }

    Ok(())
}

/// Run one debounced search and take the chosen result's coordinate
async fn search_location(config: &ViewerConfig, query: &str, pick: usize) -> Result<Coordinate> {
    let geocoder = NominatimGeocoder::new(config.geocoder.clone())
        .context("Failed to set up the search client")?;
    pick_search_result(Arc::new(geocoder), &config.search, query, pick).await
}

async fn pick_search_result<G: Geocoder + ?Sized + 'static>(
    geocoder: Arc<G>,
    config: &SearchConfig,
    query: &str,
    pick: usize,
) -> Result<Coordinate> {
    let min_chars = config.min_query_chars.max(1);
    if query.trim().chars().count() < min_chars {
        bail!("Query {query:?} is too short, type at least {min_chars} characters");
    }

    let mut search = SearchController::new(geocoder, config.clone());
    search.set_query(query);

    let mut updates = search.subscribe();
    let settled = updates
        .wait_for(|state| matches!(state, SearchState::Results { .. } | SearchState::Failed { .. }))
        .await
        .context("Search stopped unexpectedly")?
        .clone();

    let candidates = match settled {
        SearchState::Failed { message, .. } => bail!("{message}"),
        SearchState::Results { candidates, .. } => candidates,
        other => bail!("Search ended in unexpected state {other:?}"),
    };

    report::print_candidates(&candidates, pick);

    let Some(candidate) = candidates.get(pick) else {
        bail!("No search result #{pick} for {query:?} ({} found)", candidates.len());
    };

    search
        .select(candidate)
        .with_context(|| format!("Cannot use {}", candidate.display_name))
}
