//! Loading line data from the station dataset.
//!
//! The dataset is a JSON document with one entry per line:
//!
//! ```json
//! { "lines": { "east-west": { "name": "...", "color": "#3B82F6", "stations": [ ... ] } } }
//! ```
//!
//! `east-west` and `north-south` are required, `north-south-branch` is
//! optional and any other key is rejected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use metro_transit::{
    Line, LineKind, MergeOptions, MetroNetwork, RawStation, TransitError, TransitProvider,
    WalkingModel,
};
use serde::Deserialize;

const BUNDLED_DATASET: &str = include_str!("../data/metro_stations.json");

const REQUIRED_LINES: [LineKind; 2] = [LineKind::EastWest, LineKind::NorthSouth];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dataset has no {0} line")]
    MissingLine(LineKind),

    #[error(transparent)]
    Network(#[from] TransitError),
}

#[derive(Deserialize)]
struct DatasetFile {
    lines: BTreeMap<LineKind, LineRecord>,
}

#[derive(Deserialize)]
struct LineRecord {
    name: String,
    color: String,
    #[serde(default)]
    stations: Vec<RawStation>,
}

/// Parse a dataset into lines, in merge order
pub fn parse(json: &str) -> Result<Vec<Line>, DatasetError> {
    let file: DatasetFile = serde_json::from_str(json)?;

    if let Some(missing) = REQUIRED_LINES
        .into_iter()
        .find(|kind| !file.lines.contains_key(kind))
    {
        return Err(DatasetError::MissingLine(missing));
    }

    Ok(file
        .lines
        .into_iter()
        .map(|(kind, record)| Line::new(kind, &record.name, &record.color, record.stations))
        .collect())
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<Line>, DatasetError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&json)
}

/// The Ahmedabad–Gandhinagar network shipped with the crate
pub fn bundled() -> Result<Vec<Line>, DatasetError> {
    parse(BUNDLED_DATASET)
}

/// Merge lines into a network, logging anything suspicious found on the way.
pub fn build_network(
    lines: Vec<Line>,
    merge: &MergeOptions,
    walking: WalkingModel,
) -> Result<MetroNetwork, DatasetError> {
    let line_count = lines.len();
    let raw_count: usize = lines.iter().map(|line| line.stations.len()).sum();

    walking.validate()?;
    let network = MetroNetwork::from_lines(lines, merge)?.with_walking_model(walking);

    for collision in network.collisions() {
        tracing::warn!(
            "station name {:?} joins {} ({}) and {} ({}) which are {:.0} m apart; merged as one station",
            collision.name,
            collision.kept,
            collision.kept_line,
            collision.merged,
            collision.merged_line,
            collision.separation_m,
        );
    }

    for mismatch in network.interchange_mismatches() {
        tracing::warn!(
            "{} ({}) declared interchange={} but serves {} line(s)",
            mismatch.name,
            mismatch.station,
            mismatch.declared,
            if mismatch.derived { "several" } else { "one" },
        );
    }

    tracing::info!(
        "loaded {line_count} lines, {raw_count} line stops, {} unique stations",
        network.all_stations().len()
    );

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const TWO_LINES: &str = r##"{
        "lines": {
            "north-south": {
                "name": "North-South",
                "color": "#EF4444",
                "stations": [
                    { "id": "ns-1", "name": "B", "lat": 23.01, "lng": 72.55, "interchange": true },
                    { "id": "ns-2", "name": "C", "lat": 23.05, "lng": 72.56 }
                ]
            },
            "east-west": {
                "name": "East-West",
                "color": "#3B82F6",
                "stations": [
                    { "id": "ew-1", "name": "A", "lat": 23.00, "lng": 72.50, "interchange": false },
                    { "id": "ew-2", "name": "B", "lat": 23.01, "lng": 72.55, "interchange": true }
                ]
            }
        }
    }"##;

    #[test]
    fn test_parse_orders_lines() {
        let lines = parse(TWO_LINES).unwrap();
        let kinds: Vec<_> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LineKind::EastWest, LineKind::NorthSouth]);
        assert_eq!(lines[1].stations[1].name.as_ref(), "C");
        // missing interchange defaults to false
        assert!(!lines[1].stations[1].interchange);
    }

    #[test]
    fn test_build_network_from_parsed_lines() {
        let network = build_network(
            parse(TWO_LINES).unwrap(),
            &MergeOptions::default(),
            WalkingModel::default(),
        )
        .unwrap();

        let names: Vec<_> = network
            .all_stations()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_build_network_rejects_zero_walking_speed() {
        let walking = WalkingModel::from_speed_kmh(0.0);
        let result = build_network(parse(TWO_LINES).unwrap(), &MergeOptions::default(), walking);
        assert!(matches!(
            result,
            Err(DatasetError::Network(TransitError::InvalidData(_)))
        ));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_interchange_mismatch_logged_as_warning() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        // C only serves the north-south line but claims to be an interchange
        let json = TWO_LINES.replace(
            r#""name": "C", "lat": 23.05, "lng": 72.56"#,
            r#""name": "C", "lat": 23.05, "lng": 72.56, "interchange": true"#,
        );
        tracing::subscriber::with_default(subscriber, || {
            build_network(parse(&json).unwrap(), &MergeOptions::default(), WalkingModel::default())
                .unwrap()
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("C (ns-2) declared interchange=true but serves one line(s)"));
        assert!(!output.contains("loaded 2 lines"));
    }

    #[test]
    fn test_missing_main_line() {
        let json = r##"{ "lines": { "east-west": { "name": "EW", "color": "#000", "stations": [] } } }"##;
        assert!(matches!(
            parse(json),
            Err(DatasetError::MissingLine(LineKind::NorthSouth))
        ));
    }

    #[test]
    fn test_unknown_line_rejected() {
        let json = r##"{ "lines": {
            "east-west": { "name": "EW", "color": "#000" },
            "north-south": { "name": "NS", "color": "#000" },
            "circle": { "name": "Circle", "color": "#000" }
        } }"##;
        assert!(matches!(parse(json), Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_bundled_dataset_parses() {
        let lines = bundled().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].kind, LineKind::NorthSouthBranch);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_from_path("/definitely/not/here.json"),
            Err(DatasetError::Io { .. })
        ));
    }
}
