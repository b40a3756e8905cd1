//! Shared fixtures for the plugin's unit tests

use std::ops::RangeInclusive;
use std::sync::Arc;

use contracts::{Checkpoint, HostEnvironment, SimHost, TelemetrySnapshot};
use lap_engine::SectorLedger;
use sim_host::{FrameBuilder, RecordingPlayer, RecordingSurface, ScriptedHost};
use tempfile::TempDir;
use track_store::{BackupRotation, SessionChanges, TrackStore};

use crate::{PluginPaths, TrackSectors};

pub(crate) fn environment() -> HostEnvironment {
    HostEnvironment {
        track_name: "ks_vallelunga".to_string(),
        track_layout: "club_circuit".to_string(),
        car_name: "abarth500".to_string(),
        has_ai_line: true,
        extension_version: 2144,
    }
}

/// Frame at `hundredths / 100` of lap `lap` on a steady 60 s pace
pub(crate) fn lap_frame(lap: u32, hundredths: u32) -> TelemetrySnapshot {
    FrameBuilder::on_track(hundredths as f64 / 100.0)
        .lap(lap)
        .lap_time_ms(hundredths as u64 * 600)
        .build()
}

pub(crate) struct Harness {
    _temp: TempDir,
    pub paths: PluginPaths,
    pub host: Arc<ScriptedHost>,
    pub surface: Arc<RecordingSurface>,
    pub player: Arc<RecordingPlayer>,
}

impl Harness {
    pub fn new(environment: HostEnvironment) -> Self {
        let temp = TempDir::new().unwrap();
        Self {
            paths: PluginPaths::new(temp.path()),
            _temp: temp,
            host: Arc::new(ScriptedHost::new(environment)),
            surface: Arc::new(RecordingSurface::new()),
            player: Arc::new(RecordingPlayer::new()),
        }
    }

    pub fn plugin(&self) -> TrackSectors<ScriptedHost> {
        TrackSectors::new(
            self.paths.clone(),
            Arc::clone(&self.host),
            self.surface.clone(),
            Arc::clone(&self.player),
        )
        .unwrap()
    }

    /// Store a layout and best times for the harness environment
    pub fn seed_record(&self, checkpoints: Vec<Checkpoint>, best: &[Option<f64>]) {
        let backups = BackupRotation::new(self.paths.backup_dir());
        let mut store = TrackStore::open(&self.paths.data_file(), &backups).unwrap();
        let mut ledger = SectorLedger::from_checkpoints(checkpoints).unwrap();
        ledger.load_best_times(best);
        store.apply(
            &self.host.environment().track_key(),
            &ledger,
            SessionChanges {
                structure_changed: true,
                ..Default::default()
            },
        );
        store.save().unwrap();
    }

    /// Queue one frame per step and tick once for each
    pub fn drive(
        &self,
        plugin: &mut TrackSectors<ScriptedHost>,
        steps: RangeInclusive<u32>,
        build: impl Fn(u32) -> TelemetrySnapshot,
    ) {
        for k in steps {
            self.host.push_frame(build(k));
            plugin.update(0.016);
        }
    }

    /// Pit box, then out onto the track at the line with the timer armed
    pub fn leave_pits(&self, plugin: &mut TrackSectors<ScriptedHost>) {
        self.host.push_frame(FrameBuilder::in_pit_box(0.95).build());
        plugin.update(0.016);
        self.drive(plugin, 1..=1, |k| lap_frame(0, k));
    }
}
