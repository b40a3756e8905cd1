//! Persisted record document
//!
//! ```text
//! { "date_time": "...",
//!   track: { layout: { "sector_checkpoints": { "sector_1": f64, ... },
//!                      "sector_count": n,
//!                      car: { "sector_1": seconds | "", ... } } } }
//! ```
//!
//! A track without sub-layouts stores its entry directly under the track key.

use contracts::{Checkpoint, TimeSlot, TrackKey, MIN_SECTOR_COUNT};
use lap_engine::{parse_time, ParsedTime, SectorLedger};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const DATE_TIME_KEY: &str = "date_time";
pub const CHECKPOINTS_KEY: &str = "sector_checkpoints";
pub const SECTOR_COUNT_KEY: &str = "sector_count";

/// Stored configuration of one track layout, plus the current car's bests
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub sector_count: usize,
    pub checkpoints: Vec<Checkpoint>,
    /// `None` when the car has never been timed on this layout
    pub best_times: Option<Vec<Option<f64>>>,
}

impl TrackRecord {
    /// Ledger primed with the stored layout and bests
    ///
    /// Falls back to an unconfigured ledger when the stored layout is inconsistent.
    pub fn to_ledger(&self) -> SectorLedger {
        let mut ledger = match SectorLedger::from_checkpoints(self.checkpoints.clone()) {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(error = %e, "Stored checkpoints rejected, starting unconfigured");
                SectorLedger::new(self.sector_count)
            }
        };
        if let Some(best) = &self.best_times {
            ledger.load_best_times(best);
        }
        ledger
    }
}

/// What the session changed, decides how the record is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionChanges {
    /// Checkpoints or sector count were edited
    pub structure_changed: bool,
    /// At least one sector was timed
    pub times_recorded: bool,
    /// Times were wiped by the user
    pub times_reset: bool,
}

impl SessionChanges {
    pub fn is_empty(&self) -> bool {
        !(self.structure_changed || self.times_recorded || self.times_reset)
    }
}

/// In-memory JSON document, key order preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDocument {
    root: Map<String, Value>,
}

impl TrackDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn set_date_time(&mut self, stamp: impl Into<String>) {
        self.root
            .insert(DATE_TIME_KEY.to_string(), Value::String(stamp.into()));
    }

    pub fn date_time(&self) -> Option<&str> {
        self.root.get(DATE_TIME_KEY).and_then(Value::as_str)
    }

    pub fn has_track(&self, track: &str) -> bool {
        self.root.contains_key(track)
    }

    /// Stored record for `key`, if the layout was ever configured
    pub fn record(&self, key: &TrackKey) -> Option<TrackRecord> {
        let entry = self.entry(key)?;

        let sector_count = entry
            .get(SECTOR_COUNT_KEY)
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(MIN_SECTOR_COUNT)
            .max(MIN_SECTOR_COUNT);

        let stored = entry.get(CHECKPOINTS_KEY).and_then(Value::as_object);
        let checkpoints = (0..sector_count)
            .map(|i| {
                let value = stored.and_then(|map| map.get(&sector_key(i)));
                read_checkpoint(value, i)
            })
            .collect();

        let best_times = entry.get(&key.car).and_then(Value::as_object).map(|times| {
            (0..sector_count)
                .map(|i| read_time(times.get(&sector_key(i)), i))
                .collect()
        });

        Some(TrackRecord {
            sector_count,
            checkpoints,
            best_times,
        })
    }

    /// Write the session back into the document
    ///
    /// - structure changed: the layout entry is rebuilt from the ledger, or
    ///   dropped when the ledger is not configured; a track left empty is removed
    /// - times recorded: only the car's best times are rewritten
    /// - times reset: the car's entry is removed
    pub fn apply(&mut self, key: &TrackKey, ledger: &SectorLedger, changes: SessionChanges) {
        if changes.structure_changed {
            self.rebuild_entry(key, ledger);
        } else if changes.times_recorded {
            match self.entry_mut(key) {
                Some(entry) => {
                    entry.insert(key.car.clone(), times_object(ledger));
                    debug!(record = %key, "Best times updated");
                }
                None => self.rebuild_entry(key, ledger),
            }
        } else if changes.times_reset {
            if let Some(entry) = self.entry_mut(key) {
                entry.shift_remove(&key.car);
                debug!(record = %key, "Best times removed");
            }
        }
    }

    fn rebuild_entry(&mut self, key: &TrackKey, ledger: &SectorLedger) {
        if key.has_layout() {
            if let Some(Value::Object(track)) = self.root.get_mut(&key.track) {
                track.shift_remove(&key.layout);
            }
        } else {
            self.root.shift_remove(&key.track);
        }

        if ledger.is_configured() {
            let entry = layout_object(key, ledger);
            if key.has_layout() {
                let track = self
                    .root
                    .entry(key.track.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !track.is_object() {
                    *track = Value::Object(Map::new());
                }
                if let Value::Object(track) = track {
                    track.insert(key.layout.clone(), entry);
                }
            } else {
                self.root.insert(key.track.clone(), entry);
            }
            debug!(record = %key, sectors = ledger.sector_count(), "Layout stored");
        } else {
            debug!(record = %key, "Layout not configured, entry dropped");
        }

        let track_is_empty = self
            .root
            .get(&key.track)
            .and_then(Value::as_object)
            .is_some_and(Map::is_empty);
        if track_is_empty {
            self.root.shift_remove(&key.track);
        }
    }

    fn entry(&self, key: &TrackKey) -> Option<&Map<String, Value>> {
        let track = self.root.get(&key.track)?.as_object()?;
        if key.has_layout() {
            track.get(&key.layout)?.as_object()
        } else if track.contains_key(CHECKPOINTS_KEY) {
            Some(track)
        } else {
            None
        }
    }

    fn entry_mut(&mut self, key: &TrackKey) -> Option<&mut Map<String, Value>> {
        let track = self.root.get_mut(&key.track)?.as_object_mut()?;
        if key.has_layout() {
            track.get_mut(&key.layout)?.as_object_mut()
        } else if track.contains_key(CHECKPOINTS_KEY) {
            Some(track)
        } else {
            None
        }
    }
}

fn sector_key(index: usize) -> String {
    format!("sector_{}", index + 1)
}

fn layout_object(key: &TrackKey, ledger: &SectorLedger) -> Value {
    let checkpoints: Map<String, Value> = ledger
        .checkpoints()
        .iter()
        .enumerate()
        .map(|(i, checkpoint)| (sector_key(i), Value::from(checkpoint.as_raw())))
        .collect();

    let mut entry = Map::new();
    entry.insert(CHECKPOINTS_KEY.to_string(), Value::Object(checkpoints));
    entry.insert(SECTOR_COUNT_KEY.to_string(), Value::from(ledger.sector_count()));
    if ledger.has_best_times() {
        entry.insert(key.car.clone(), times_object(ledger));
    }
    Value::Object(entry)
}

/// Unset times are stored as empty strings
fn times_object(ledger: &SectorLedger) -> Value {
    let times: Map<String, Value> = ledger
        .times(TimeSlot::Best)
        .iter()
        .enumerate()
        .map(|(i, best)| {
            let value = match best {
                Some(seconds) => Value::from(*seconds),
                None => Value::String(String::new()),
            };
            (sector_key(i), value)
        })
        .collect();
    Value::Object(times)
}

fn read_checkpoint(value: Option<&Value>, index: usize) -> Checkpoint {
    match value.and_then(Value::as_f64) {
        Some(raw) => Checkpoint::from_raw(raw).unwrap_or_else(|| {
            warn!(sector = index + 1, raw, "Stored checkpoint out of range, treated as unset");
            Checkpoint::Unset
        }),
        None => Checkpoint::Unset,
    }
}

/// Numbers are seconds; strings may be empty or `M:SS:mmm` display text
fn read_time(value: Option<&Value>, index: usize) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => match parse_time(text, true) {
            ParsedTime::Seconds(seconds) => Some(seconds),
            ParsedTime::Unset => None,
            ParsedTime::Verbatim(raw) => {
                warn!(sector = index + 1, raw, "Stored time unreadable, treated as unset");
                None
            }
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured(positions: &[f64]) -> SectorLedger {
        let checkpoints = positions.iter().map(|p| Checkpoint::At(*p)).collect();
        SectorLedger::from_checkpoints(checkpoints).unwrap()
    }

    fn document(value: Value) -> TrackDocument {
        match value {
            Value::Object(map) => TrackDocument::from_map(map),
            _ => panic!("document must be an object"),
        }
    }

    #[test]
    fn test_read_layout_record() {
        let doc = document(json!({
            "date_time": "01_01_2025_10_00_00",
            "ks_vallelunga": {
                "club_circuit": {
                    "sector_checkpoints": {"sector_1": 0.3, "sector_2": 0.6, "sector_3": 2.0},
                    "sector_count": 3,
                    "abarth500": {"sector_1": 20.5, "sector_2": "", "sector_3": "0:18:250"}
                }
            }
        }));

        let record = doc
            .record(&TrackKey::new("ks_vallelunga", "club_circuit", "abarth500"))
            .unwrap();
        assert_eq!(record.sector_count, 3);
        assert_eq!(
            record.checkpoints,
            vec![Checkpoint::At(0.3), Checkpoint::At(0.6), Checkpoint::FinishLine]
        );
        assert_eq!(record.best_times, Some(vec![Some(20.5), None, Some(18.25)]));

        let other_car = doc
            .record(&TrackKey::new("ks_vallelunga", "club_circuit", "bmw_m3"))
            .unwrap();
        assert_eq!(other_car.best_times, None);
        assert!(doc
            .record(&TrackKey::new("ks_vallelunga", "extended", "abarth500"))
            .is_none());
    }

    #[test]
    fn test_read_track_without_layout() {
        let doc = document(json!({
            "magione": {
                "sector_checkpoints": {"sector_1": 0.5, "sector_2": -1.0},
                "sector_count": 2
            }
        }));
        let record = doc.record(&TrackKey::new("magione", "", "abarth500")).unwrap();
        assert_eq!(record.checkpoints, vec![Checkpoint::At(0.5), Checkpoint::Unset]);
        assert!(!record.to_ledger().is_configured());
    }

    #[test]
    fn test_malformed_values_become_unset() {
        let doc = document(json!({
            "magione": {
                "sector_checkpoints": {"sector_1": 7.5, "sector_2": "abc"},
                "sector_count": 2,
                "abarth500": {"sector_1": "n/a", "sector_2": true}
            }
        }));
        let record = doc.record(&TrackKey::new("magione", "", "abarth500")).unwrap();
        assert_eq!(record.checkpoints, vec![Checkpoint::Unset, Checkpoint::Unset]);
        assert_eq!(record.best_times, Some(vec![None, None]));
    }

    #[test]
    fn test_structure_change_writes_entry_in_order() {
        let key = TrackKey::new("ks_vallelunga", "club_circuit", "abarth500");
        let mut ledger = configured(&[0.3, 0.6]);
        ledger.record_crossing(0, 20.0).unwrap();

        let mut doc = TrackDocument::new();
        doc.set_date_time("now");
        doc.apply(
            &key,
            &ledger,
            SessionChanges {
                structure_changed: true,
                times_recorded: true,
                ..Default::default()
            },
        );

        let expected = json!({
            "date_time": "now",
            "ks_vallelunga": {
                "club_circuit": {
                    "sector_checkpoints": {"sector_1": 0.3, "sector_2": 0.6},
                    "sector_count": 2,
                    "abarth500": {"sector_1": 20.0, "sector_2": ""}
                }
            }
        });
        assert_eq!(
            serde_json::to_string(doc.as_map()).unwrap(),
            serde_json::to_string(&expected).unwrap()
        );
    }

    #[test]
    fn test_unconfigured_structure_drops_empty_track() {
        let key = TrackKey::new("ks_vallelunga", "club_circuit", "abarth500");
        let mut doc = TrackDocument::new();
        doc.apply(
            &key,
            &configured(&[0.3, 0.6]),
            SessionChanges {
                structure_changed: true,
                ..Default::default()
            },
        );
        assert!(doc.has_track("ks_vallelunga"));

        doc.apply(
            &key,
            &SectorLedger::new(2),
            SessionChanges {
                structure_changed: true,
                ..Default::default()
            },
        );
        assert!(!doc.has_track("ks_vallelunga"));
    }

    #[test]
    fn test_other_layouts_survive_structure_change() {
        let mut doc = document(json!({
            "ks_vallelunga": {
                "extended": {"sector_checkpoints": {"sector_1": 0.5, "sector_2": 0.9}, "sector_count": 2}
            }
        }));
        let key = TrackKey::new("ks_vallelunga", "club_circuit", "abarth500");
        doc.apply(
            &key,
            &SectorLedger::new(2),
            SessionChanges {
                structure_changed: true,
                ..Default::default()
            },
        );
        assert!(doc
            .record(&TrackKey::new("ks_vallelunga", "extended", "abarth500"))
            .is_some());
    }

    #[test]
    fn test_times_only_update_and_reset() {
        let key = TrackKey::new("magione", "", "abarth500");
        let mut doc = document(json!({
            "magione": {
                "sector_checkpoints": {"sector_1": 0.5, "sector_2": 0.9},
                "sector_count": 2,
                "bmw_m3": {"sector_1": 31.0, "sector_2": 29.0}
            }
        }));

        let mut ledger = configured(&[0.5, 0.9]);
        ledger.record_crossing(0, 30.0).unwrap();
        ledger.record_crossing(1, 58.0).unwrap();
        doc.apply(
            &key,
            &ledger,
            SessionChanges {
                times_recorded: true,
                ..Default::default()
            },
        );
        let record = doc.record(&key).unwrap();
        assert_eq!(record.best_times, Some(vec![Some(30.0), Some(28.0)]));

        doc.apply(
            &key,
            &ledger,
            SessionChanges {
                times_reset: true,
                ..Default::default()
            },
        );
        assert_eq!(doc.record(&key).unwrap().best_times, None);
        assert!(doc
            .record(&TrackKey::new("magione", "", "bmw_m3"))
            .and_then(|r| r.best_times)
            .is_some());
    }

    #[test]
    fn test_no_changes_leave_document_untouched() {
        let mut doc = document(json!({"magione": {"sector_checkpoints": {}, "sector_count": 2}}));
        let before = doc.clone();
        doc.apply(
            &TrackKey::new("magione", "", "abarth500"),
            &configured(&[0.2, 0.4]),
            SessionChanges::default(),
        );
        assert_eq!(doc, before);
    }
}
