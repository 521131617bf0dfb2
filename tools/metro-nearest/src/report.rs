use metro_core::search::SearchCandidate;
use metro_core::SessionSnapshot;
use metro_transit::prelude::*;
use tracing::Level;
use tracing_subscriber::{filter::FilterFn, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log our own crates to stderr so stdout stays clean for results
pub fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = FilterFn::new(|meta| meta.module_path().unwrap_or_default().starts_with("metro"));
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .with(LevelFilter::from_level(level))
        .init();
}

fn line_labels(station: &Station) -> String {
    station
        .lines()
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_snapshot(network: &MetroNetwork, snapshot: &SessionSnapshot) {
    let active = snapshot.active;
    println!(
        "Location: {:.5}, {:.5} ({})",
        active.coordinate.lat,
        active.coordinate.lng,
        active.source.label()
    );

    let Some(nearest) = &snapshot.nearest else {
        println!("No stations loaded");
        return;
    };

    let station = &nearest.station;
    println!(
        "Nearest station: {}{}",
        station.name(),
        if station.is_interchange() { " (interchange)" } else { "" }
    );
    println!("  {}", line_labels(station));
    if let Some(color) = network.station_color(station) {
        println!("  Colour: {color}");
    }
    println!(
        "  {} away, {} walk",
        format_distance(nearest.distance_m),
        format_walking_time(nearest.walking_time_min)
    );
}

pub fn print_ranked(title: &str, stations: &[NearestStation]) {
    println!();
    println!("{title}:");
    if stations.is_empty() {
        println!("  (none)");
    }
    for (rank, nearest) in stations.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:>8}  {}",
            rank + 1,
            nearest.station.name(),
            format_distance(nearest.distance_m),
            format_walking_time(nearest.walking_time_min)
        );
    }
}

pub fn print_candidates(candidates: &[SearchCandidate], pick: usize) {
    if candidates.is_empty() {
        println!("No places found");
        return;
    }

    println!("Search results:");
    for (index, candidate) in candidates.iter().enumerate() {
        let marker = if index == pick { '*' } else { ' ' };
        let note = if candidate.is_selectable() { "" } else { " (no coordinates)" };
        println!("{marker} {index}. {}{note}", candidate.display_name);
    }
    println!();
}

pub fn print_station_list(network: &MetroNetwork) {
    for kind in LineKind::in_merge_order() {
        let Some(line) = network.get_line(kind) else {
            continue;
        };

        println!(
            "{} ({}, {} stations)",
            kind.label(),
            network.line_color(kind).unwrap_or(&*line.color),
            line.stations.len()
        );
        for station in network.stations_on(kind) {
            let marker = if station.is_interchange() { " *" } else { "" };
            println!("  {}{marker}", station.name());
        }
    }

    println!();
    println!(
        "{} unique stations, * marks an interchange",
        network.all_stations().len()
    );
}
