//! Merges per-line station lists into one deduplicated station set.
//!
//! Stations are joined by name. The join is validated while the set is built:
//! a repeated name whose coordinates disagree by more than
//! [`MergeOptions::collision_threshold_m`] is reported as a [`NameCollision`]
//! (or rejected outright in strict mode) instead of being merged silently.

use std::collections::HashMap;
use std::sync::Arc;

use crate::identifiers::StationIdentifier;
use crate::models::types::*;
use crate::spatial::distance::haversine_distance;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MergeOptions {
    /// Same-name entries further apart than this are reported (meters)
    pub collision_threshold_m: f64,
    /// Fail the merge on the first collision instead of reporting it
    pub strict: bool,
}

impl MergeOptions {
    /// The threshold may be infinite (never report) but not negative or NaN
    pub fn validate(&self) -> Result<()> {
        if self.collision_threshold_m.is_nan() || self.collision_threshold_m < 0.0 {
            return Err(TransitError::InvalidData(format!(
                "collision threshold must be zero or more meters, got {}",
                self.collision_threshold_m
            )));
        }
        Ok(())
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            collision_threshold_m: 500.0,
            strict: false,
        }
    }
}

/// Two entries shared a name but not a location
#[derive(Clone, Debug, PartialEq)]
pub struct NameCollision {
    pub name: Arc<str>,
    /// Id of the entry that was kept (first encountered)
    pub kept: StationIdentifier,
    pub kept_line: LineKind,
    /// Id of the entry that was folded into it
    pub merged: StationIdentifier,
    pub merged_line: LineKind,
    pub separation_m: f64,
}

/// The source data's interchange flag disagreed with line membership
#[derive(Clone, Debug, PartialEq)]
pub struct InterchangeMismatch {
    pub station: StationIdentifier,
    pub name: Arc<str>,
    pub declared: bool,
    pub derived: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MergedStations {
    /// Unique stations in first-encounter order
    pub stations: Vec<Arc<Station>>,
    pub collisions: Vec<NameCollision>,
    pub interchange_mismatches: Vec<InterchangeMismatch>,
}

/// The deduplication key for a station name.
///
/// Case-sensitive; only surrounding whitespace is ignored.
pub fn join_key(name: &str) -> &str {
    name.trim()
}

// Mutable while the merge runs, frozen into `Station` afterwards
struct StationDraft {
    id: StationIdentifier,
    name: Arc<str>,
    location: Coordinate,
    first_line: LineKind,
    lines: Vec<LineKind>,
    declared_interchange: bool,
}

impl StationDraft {
    fn new(raw: &RawStation, line: LineKind) -> Self {
        Self {
            id: raw.id.clone(),
            name: join_key(&raw.name).into(),
            location: raw.location(),
            first_line: line,
            lines: vec![line],
            declared_interchange: raw.interchange,
        }
    }

    fn add_line(&mut self, line: LineKind) {
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }

    fn freeze(self) -> (Station, bool) {
        let station = Station {
            interchange: self.lines.len() >= 2,
            id: self.id,
            name: self.name,
            location: self.location,
            lines: self.lines,
        };
        (station, self.declared_interchange)
    }
}

fn validate(raw: &RawStation, line: LineKind) -> Result<()> {
    if join_key(&raw.name).is_empty() {
        return Err(TransitError::InvalidData(format!(
            "station {} on {} has an empty name",
            raw.id, line
        )));
    }

    if !raw.location().is_finite() {
        return Err(TransitError::InvalidData(format!(
            "station {} ({}) on {} has a non-finite coordinate",
            raw.id, raw.name, line
        )));
    }

    Ok(())
}

/// Merge line station lists into a unique station set.
///
/// Lines are processed in [`LineKind`] order whatever order they are passed
/// in. A station's `lines` follow first-encounter order without duplicates and
/// its interchange flag is derived from them.
pub fn merge_lines(lines: &[Line], options: &MergeOptions) -> Result<MergedStations> {
    options.validate()?;

    let mut ordered: Vec<&Line> = lines.iter().collect();
    ordered.sort_by_key(|line| line.kind);

    if let Some(pair) = ordered.windows(2).find(|pair| pair[0].kind == pair[1].kind) {
        return Err(TransitError::InvalidData(format!(
            "line {} is defined more than once",
            pair[0].kind
        )));
    }

    let mut drafts: Vec<StationDraft> = Vec::new();
    let mut by_name: HashMap<Arc<str>, usize> = HashMap::new();
    let mut by_id: HashMap<StationIdentifier, usize> = HashMap::new();
    let mut collisions = Vec::new();

    for line in ordered {
        for raw in &line.stations {
            validate(raw, line.kind)?;

            let Some(&index) = by_name.get(join_key(&raw.name)) else {
                if by_id.contains_key(&raw.id) {
                    return Err(TransitError::DuplicateStationId(raw.id.clone()));
                }

                let draft = StationDraft::new(raw, line.kind);
                by_name.insert(draft.name.clone(), drafts.len());
                by_id.insert(draft.id.clone(), drafts.len());
                drafts.push(draft);
                continue;
            };

            let draft = &mut drafts[index];
            let separation_m = haversine_distance(draft.location, raw.location());
            if separation_m > options.collision_threshold_m {
                if options.strict {
                    return Err(TransitError::NameCollision {
                        name: draft.name.clone(),
                        first: draft.id.clone(),
                        second: raw.id.clone(),
                        separation_m,
                    });
                }

                collisions.push(NameCollision {
                    name: draft.name.clone(),
                    kept: draft.id.clone(),
                    kept_line: draft.first_line,
                    merged: raw.id.clone(),
                    merged_line: line.kind,
                    separation_m,
                });
            }

            draft.add_line(line.kind);
            draft.declared_interchange |= raw.interchange;
        }
    }

    let mut stations = Vec::with_capacity(drafts.len());
    let mut interchange_mismatches = Vec::new();

    for draft in drafts {
        let (station, declared) = draft.freeze();
        if declared != station.interchange {
            interchange_mismatches.push(InterchangeMismatch {
                station: station.id.clone(),
                name: station.name.clone(),
                declared,
                derived: station.interchange,
            });
        }
        stations.push(Arc::new(station));
    }

    Ok(MergedStations {
        stations,
        collisions,
        interchange_mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn east_west(stations: Vec<RawStation>) -> Line {
        Line::new(LineKind::EastWest, "East-West", "#3B82F6", stations)
    }

    fn north_south(stations: Vec<RawStation>) -> Line {
        Line::new(LineKind::NorthSouth, "North-South", "#EF4444", stations)
    }

    fn branch(stations: Vec<RawStation>) -> Line {
        Line::new(LineKind::NorthSouthBranch, "GNLU - GIFT City", "#EF4444", stations)
    }

    fn names(merged: &MergedStations) -> Vec<&str> {
        merged.stations.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_shared_name_becomes_interchange() {
        let merged = merge_lines(
            &[
                east_west(vec![
                    RawStation::new("ew-a", "A", 23.00, 72.50),
                    RawStation::new("ew-b", "B", 23.01, 72.55),
                ]),
                north_south(vec![
                    RawStation::new("ns-b", "B", 23.01, 72.55),
                    RawStation::new("ns-c", "C", 23.05, 72.56),
                ]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(merged.stations.len(), 3);

        let b = &merged.stations[1];
        assert_eq!(b.lines(), &[LineKind::EastWest, LineKind::NorthSouth]);
        assert!(b.is_interchange());
        // first encounter supplies the identity
        assert_eq!(b.id().as_str(), "ew-b");

        let a = &merged.stations[0];
        assert_eq!(a.lines(), &[LineKind::EastWest]);
        assert!(!a.is_interchange());
    }

    #[test]
    fn test_first_seen_order() {
        let merged = merge_lines(
            &[
                east_west(vec![
                    RawStation::new("a", "A", 23.00, 72.50),
                    RawStation::new("b", "B", 23.01, 72.55),
                ]),
                north_south(vec![
                    RawStation::new("b2", "B", 23.01, 72.55),
                    RawStation::new("c", "C", 23.05, 72.56),
                ]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&merged), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_lines_processed_in_fixed_order() {
        // passing north-south first must not change the result
        let merged = merge_lines(
            &[
                north_south(vec![RawStation::new("c", "C", 23.05, 72.56)]),
                east_west(vec![RawStation::new("a", "A", 23.00, 72.50)]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&merged), vec!["A", "C"]);
    }

    #[test]
    fn test_repeated_name_on_one_line_is_a_set() {
        let merged = merge_lines(
            &[east_west(vec![
                RawStation::new("a", "A", 23.00, 72.50),
                RawStation::new("a-again", "A", 23.00, 72.50),
            ])],
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(merged.stations.len(), 1);
        assert_eq!(merged.stations[0].lines(), &[LineKind::EastWest]);
        assert!(!merged.stations[0].is_interchange());
    }

    #[test]
    fn test_empty_line_contributes_nothing() {
        let merged = merge_lines(
            &[
                east_west(vec![RawStation::new("a", "A", 23.00, 72.50)]),
                north_south(vec![]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&merged), vec!["A"]);
        assert!(merge_lines(&[], &MergeOptions::default()).unwrap().stations.is_empty());
    }

    #[test]
    fn test_branch_merges_with_trunk_station() {
        let merged = merge_lines(
            &[
                north_south(vec![RawStation::new("ns-gnlu", "GNLU", 23.16, 72.63)]),
                branch(vec![
                    RawStation::new("br-gnlu", "GNLU", 23.16, 72.63),
                    RawStation::new("br-gift", "GIFT City", 23.16, 72.68),
                ]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        let gnlu = &merged.stations[0];
        assert_eq!(gnlu.lines(), &[LineKind::NorthSouth, LineKind::NorthSouthBranch]);
        assert!(gnlu.is_interchange());

        let gift = &merged.stations[1];
        assert_eq!(gift.lines(), &[LineKind::NorthSouthBranch]);
        assert!(!gift.is_interchange());
        // drawn in the trunk's colour
        assert_eq!(gift.primary_line(), LineKind::NorthSouth);
    }

    #[test]
    fn test_raw_interchange_flag_is_overridden() {
        let mut flagged = RawStation::new("a", "A", 23.00, 72.50);
        flagged.interchange = true;

        let merged = merge_lines(&[east_west(vec![flagged])], &MergeOptions::default()).unwrap();

        assert!(!merged.stations[0].is_interchange());
        assert_eq!(merged.interchange_mismatches.len(), 1);
        assert!(merged.interchange_mismatches[0].declared);
        assert!(!merged.interchange_mismatches[0].derived);
    }

    #[test]
    fn test_distant_same_name_is_reported() {
        let lines = [
            east_west(vec![RawStation::new("ew-x", "Sector 1", 23.00, 72.50)]),
            north_south(vec![RawStation::new("ns-x", "Sector 1", 23.20, 72.65)]),
        ];

        let merged = merge_lines(&lines, &MergeOptions::default()).unwrap();
        // still merged, but not silently
        assert_eq!(merged.stations.len(), 1);
        assert_eq!(merged.collisions.len(), 1);
        let collision = &merged.collisions[0];
        assert_eq!(collision.kept.as_str(), "ew-x");
        assert_eq!(collision.merged.as_str(), "ns-x");
        assert!(collision.separation_m > 20_000.0);

        let strict = MergeOptions {
            strict: true,
            ..MergeOptions::default()
        };
        assert!(matches!(
            merge_lines(&lines, &strict),
            Err(TransitError::NameCollision { .. })
        ));
    }

    #[test]
    fn test_nearby_same_name_is_not_a_collision() {
        let merged = merge_lines(
            &[
                east_west(vec![RawStation::new("ew-ohc", "Old High Court", 23.0395, 72.5735)]),
                north_south(vec![RawStation::new("ns-ohc", "Old High Court", 23.0399, 72.5738)]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        assert!(merged.collisions.is_empty());
        assert!(merged.stations[0].is_interchange());
    }

    #[test]
    fn test_join_key_trims_but_keeps_case() {
        let merged = merge_lines(
            &[
                east_west(vec![RawStation::new("a", "Ranip ", 23.08, 72.57)]),
                north_south(vec![
                    RawStation::new("b", "Ranip", 23.08, 72.57),
                    RawStation::new("c", "ranip", 23.08, 72.57),
                ]),
            ],
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&merged), vec!["Ranip", "ranip"]);
        assert!(merged.stations[0].is_interchange());
    }

    #[test]
    fn test_rejects_bad_data() {
        let options = MergeOptions::default();

        let duplicate_id = merge_lines(
            &[east_west(vec![
                RawStation::new("x", "A", 23.0, 72.5),
                RawStation::new("x", "B", 23.1, 72.5),
            ])],
            &options,
        );
        assert!(matches!(duplicate_id, Err(TransitError::DuplicateStationId(_))));

        let blank = merge_lines(&[east_west(vec![RawStation::new("x", "  ", 23.0, 72.5)])], &options);
        assert!(matches!(blank, Err(TransitError::InvalidData(_))));

        let nan = merge_lines(&[east_west(vec![RawStation::new("x", "A", f64::NAN, 72.5)])], &options);
        assert!(matches!(nan, Err(TransitError::InvalidData(_))));

        let twice = merge_lines(&[east_west(vec![]), east_west(vec![])], &options);
        assert!(matches!(twice, Err(TransitError::InvalidData(_))));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let lines = [east_west(vec![RawStation::new("x", "A", 23.0, 72.5)])];

        for threshold in [-1.0, f64::NAN] {
            let options = MergeOptions {
                collision_threshold_m: threshold,
                ..MergeOptions::default()
            };
            assert!(matches!(
                merge_lines(&lines, &options),
                Err(TransitError::InvalidData(_))
            ));
        }

        let never = MergeOptions {
            collision_threshold_m: f64::INFINITY,
            ..MergeOptions::default()
        };
        assert_eq!(merge_lines(&lines, &never).unwrap().stations.len(), 1);
    }
}
