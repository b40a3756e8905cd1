//! # Integration Tests
//!
//! Cross-crate and end-to-end tests of the sector timing plugin.
//!
//! Responsibilities:
//! - Contract checks between the settings, store and engine crates
//! - Scripted e2e sessions through `TrackSectors` (no simulator needed)
//! - Timer to feedback cue flow on a live runtime

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigLoader, SettingsStore, BUNDLED_DEFAULTS};
    use contracts::{AppSettings, Checkpoint, TrackKey, UiLayout};
    use lap_engine::SectorLedger;
    use tempfile::TempDir;
    use track_store::{BackupRotation, SessionChanges, TrackStore};

    #[test]
    fn test_saved_settings_reload_with_user_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config").join("config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[main_app]\nui_layout = 2\n").unwrap();

        let mut store = SettingsStore::open(&path, BUNDLED_DEFAULTS).unwrap();
        store
            .update(|s| s.settings_app.next_page_delay = 8)
            .unwrap();
        assert!(store.save_if_dirty().unwrap());

        let reloaded = ConfigLoader::load_from_path(&path, "").unwrap();
        assert_eq!(reloaded.main_app.layout(), UiLayout::Compact);
        assert_eq!(reloaded.settings_app.next_page_delay, 8);
        assert_eq!(
            reloaded.settings_app.max_sector_number,
            AppSettings::default().settings_app.max_sector_number
        );
    }

    #[test]
    fn test_stored_record_rebuilds_the_same_ledger() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        let backups = BackupRotation::new(temp.path().join("backups"));
        let key = TrackKey::new("magione", "", "tatuusfa1");

        let mut ledger = SectorLedger::from_checkpoints(vec![
            Checkpoint::At(0.25),
            Checkpoint::At(0.5),
            Checkpoint::FinishLine,
        ])
        .unwrap();
        ledger.load_best_times(&[Some(21.5), None, Some(19.125)]);

        let mut store = TrackStore::open(&path, &backups).unwrap();
        store.apply(
            &key,
            &ledger,
            SessionChanges {
                structure_changed: true,
                ..Default::default()
            },
        );
        store.save().unwrap();

        let record = TrackStore::open(&path, &backups)
            .unwrap()
            .record(&key)
            .unwrap();
        let rebuilt = record.to_ledger();
        assert_eq!(rebuilt.checkpoints(), ledger.checkpoints());
        assert_eq!(rebuilt.theoretical_best(), ledger.theoretical_best());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::ops::RangeInclusive;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        Checkpoint, Color, HostEnvironment, SessionType, SimHost, TelemetrySnapshot, TimeSlot,
        UiLayout, Widget,
    };
    use feedback::{Cue, FeedbackHandle, Pager, DEFAULT_QUEUE_CAPACITY};
    use lap_engine::{EnginePhase, LapTimer, PitExit, SectorLedger, TimingEvent};
    use serde_json::Value;
    use sim_host::{FrameBuilder, RecordingPlayer, RecordingSurface, ScriptedHost};
    use tempfile::TempDir;
    use track_sectors::{PluginError, PluginPaths, TrackSectors};
    use track_store::{BackupRotation, SessionChanges, TrackStore};

    fn environment() -> HostEnvironment {
        HostEnvironment {
            track_name: "ks_vallelunga".to_string(),
            track_layout: "club_circuit".to_string(),
            car_name: "abarth500".to_string(),
            has_ai_line: true,
            extension_version: 2144,
        }
    }

    /// Frame at `hundredths / 100` of lap `lap` on a steady 60 s pace
    fn lap_frame(lap: u32, hundredths: u32) -> TelemetrySnapshot {
        FrameBuilder::on_track(hundredths as f64 / 100.0)
            .lap(lap)
            .lap_time_ms(hundredths as u64 * 600)
            .build()
    }

    /// First frame of lap `lap`, the previous one done in `last_lap_ms`
    fn lap_end(lap: u32, last_lap_ms: u64) -> TelemetrySnapshot {
        FrameBuilder::from(lap_frame(lap, 1))
            .last_lap_ms(last_lap_ms)
            .build()
    }

    /// Plugin root shared by consecutive sessions
    struct Rig {
        _temp: TempDir,
        paths: PluginPaths,
        host: Arc<ScriptedHost>,
        player: Arc<RecordingPlayer>,
    }

    impl Rig {
        fn new(environment: HostEnvironment) -> Self {
            let temp = TempDir::new().unwrap();
            Self {
                paths: PluginPaths::new(temp.path()),
                _temp: temp,
                host: Arc::new(ScriptedHost::new(environment)),
                player: Arc::new(RecordingPlayer::new()),
            }
        }

        fn session(&self, surface: &Arc<RecordingSurface>) -> TrackSectors<ScriptedHost> {
            TrackSectors::new(
                self.paths.clone(),
                Arc::clone(&self.host),
                surface.clone(),
                Arc::clone(&self.player),
            )
            .unwrap()
        }

        fn tick(&self, plugin: &mut TrackSectors<ScriptedHost>, frame: TelemetrySnapshot) {
            self.host.push_frame(frame);
            plugin.update(0.016);
        }

        fn drive(
            &self,
            plugin: &mut TrackSectors<ScriptedHost>,
            steps: RangeInclusive<u32>,
            build: impl Fn(u32) -> TelemetrySnapshot,
        ) {
            for k in steps {
                self.tick(plugin, build(k));
            }
        }

        fn seed(&self, checkpoints: Vec<Checkpoint>, best: &[Option<f64>]) {
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

        fn data(&self) -> Value {
            serde_json::from_str(&fs::read_to_string(self.paths.data_file()).unwrap()).unwrap()
        }
    }

    /// End-to-end: lay out a track from scratch, time a lap, and find the
    /// bests again in the next session
    ///
    /// 1. Three sectors chosen in the pits
    /// 2. Checkpoints placed on an out lap, last sector closed by the finish line
    /// 3. Back through the pits, then a timed lap
    /// 4. Shutdown writes the layout and bests; a new session shows them
    #[test]
    fn test_e2e_layout_lap_and_next_session() {
        let rig = Rig::new(environment());
        let surface = Arc::new(RecordingSurface::new());
        let mut plugin = rig.session(&surface);

        rig.tick(&mut plugin, FrameBuilder::in_pit_box(0.95).build());
        assert_eq!(plugin.phase(), EnginePhase::Armed(PitExit::Unknown));
        plugin.set_sector_count(3).unwrap();
        assert_eq!(plugin.ledger().sector_count(), 3);

        rig.drive(&mut plugin, 1..=30, |k| lap_frame(0, k));
        assert_eq!(plugin.press_sector_button(0).unwrap(), Checkpoint::At(0.3));
        rig.drive(&mut plugin, 31..=60, |k| lap_frame(0, k));
        assert_eq!(plugin.press_sector_button(1).unwrap(), Checkpoint::At(0.6));
        plugin.set_finish_line_as_last().unwrap();
        assert!(plugin.ledger().is_configured());
        assert_eq!(surface.color(Widget::FinishLineButton), Some(Color::GREEN));

        rig.tick(&mut plugin, FrameBuilder::in_pit_box(0.95).build());
        assert_eq!(plugin.phase(), EnginePhase::Armed(PitExit::NotExited));
        rig.drive(&mut plugin, 1..=99, |k| lap_frame(0, k));
        assert_eq!(plugin.phase(), EnginePhase::Timing);
        assert_eq!(
            surface.text(Widget::SectorTime(TimeSlot::Last, 1)),
            Some("0:18:000".to_string())
        );

        rig.tick(&mut plugin, lap_end(1, 60_000));
        assert_eq!(
            plugin.ledger().times(TimeSlot::Best),
            &[Some(18.0), Some(18.0), Some(24.0)]
        );
        assert_eq!(surface.text(Widget::TotalTime), Some("1:00:000".to_string()));

        let report = plugin.shutdown();
        assert!(report.store_saved);
        assert_eq!(report.summary.laps_committed, 1);
        assert_eq!(report.summary.total_crossings, 3);

        let data = rig.data();
        let entry = &data["ks_vallelunga"]["club_circuit"];
        assert_eq!(entry["sector_count"].as_u64(), Some(3));
        assert_eq!(entry["sector_checkpoints"]["sector_1"].as_f64(), Some(0.3));
        assert_eq!(entry["abarth500"]["sector_3"].as_f64(), Some(24.0));

        let next_surface = Arc::new(RecordingSurface::new());
        let mut next = rig.session(&next_surface);
        rig.tick(&mut next, FrameBuilder::in_pit_box(0.95).build());
        assert!(next.ledger().is_configured());
        assert_eq!(
            next_surface.text(Widget::SectorTime(TimeSlot::Best, 0)),
            Some("0:18:000".to_string())
        );
        assert_eq!(
            next_surface.text(Widget::TheoreticalBest),
            Some("1:00:000".to_string())
        );
        assert_eq!(next_surface.color(Widget::FinishLineButton), Some(Color::GREEN));
        assert!(!next.shutdown().store_saved);
    }

    /// End-to-end: a practice session restarted by the host is noticed from
    /// its clock, and timing resumes once the car is back at the start
    #[test]
    fn test_e2e_clock_jump_restarts_timing() {
        let rig = Rig::new(environment());
        rig.seed(
            vec![Checkpoint::At(0.3), Checkpoint::At(0.6), Checkpoint::FinishLine],
            &[None, None, None],
        );
        let surface = Arc::new(RecordingSurface::new());
        let mut plugin = rig.session(&surface);

        let practice = |clock_start: f64| {
            move |k: u32| {
                FrameBuilder::from(lap_frame(0, k))
                    .session(SessionType::Practice, clock_start - k as f64 * 0.1)
                    .build()
            }
        };

        rig.drive(&mut plugin, 1..=40, practice(100.0));
        assert_eq!(plugin.phase(), EnginePhase::Timing);
        assert!(plugin.ledger().is_cleared(0));

        // Host restarted the session: clock back up, car on the grid
        rig.tick(
            &mut plugin,
            FrameBuilder::from(lap_frame(0, 1))
                .session(SessionType::Practice, 150.0)
                .build(),
        );
        assert_eq!(plugin.phase(), EnginePhase::Armed(PitExit::Unknown));
        assert!(!plugin.ledger().is_cleared(0));
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Last, 0)),
            Some(Color::ORANGE)
        );
        assert_eq!(plugin.pager().page(), 1);

        rig.drive(&mut plugin, 1..=40, practice(149.95));
        assert_eq!(plugin.phase(), EnginePhase::Timing);
        assert!(plugin.ledger().is_cleared(0));

        let report = plugin.shutdown();
        assert_eq!(report.summary.resets, 1);
        assert_eq!(report.summary.total_crossings, 2);
        assert!(report.store_saved);
    }

    /// End-to-end: a last checkpoint the car never reaches is closed by the
    /// lap counter, and every improved split plays the new-best sound
    #[test]
    fn test_e2e_lap_counter_closes_last_sector() {
        let rig = Rig::new(environment());
        rig.seed(
            vec![Checkpoint::At(0.3), Checkpoint::At(0.6), Checkpoint::At(0.97)],
            &[Some(20.0), Some(20.0), Some(25.0)],
        );
        let surface = Arc::new(RecordingSurface::new());
        let mut plugin = rig.session(&surface);

        rig.tick(&mut plugin, FrameBuilder::in_pit_box(0.95).build());
        plugin.set_next_page_delay(1).unwrap();
        rig.drive(&mut plugin, 1..=96, |k| lap_frame(0, k));
        assert!(!plugin.ledger().is_cleared(2));

        rig.tick(&mut plugin, lap_end(1, 57_000));
        assert_eq!(
            plugin.ledger().times(TimeSlot::Best),
            &[Some(18.0), Some(18.0), Some(21.0)]
        );
        assert_eq!(
            surface.text(Widget::SectorTime(TimeSlot::Delta, 2)),
            Some("-0:04:000".to_string())
        );
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Delta, 2)),
            Some(Color::GREEN)
        );

        let report = plugin.shutdown();
        assert!(report.settings_saved);
        assert_eq!(report.summary.new_bests, 3);
        assert_eq!(rig.player.play_count(), 3);
        assert!(rig
            .player
            .played()
            .iter()
            .all(|asset| *asset == rig.paths.new_best_sound()));
    }

    /// End-to-end: a replay disables timing; nothing is editable or written
    #[test]
    fn test_e2e_replay_is_disabled() {
        let rig = Rig::new(environment());
        let surface = Arc::new(RecordingSurface::new());
        let mut plugin = rig.session(&surface);

        rig.tick(&mut plugin, FrameBuilder::on_track(0.4).live(false).build());
        assert!(matches!(plugin.phase(), EnginePhase::Disabled(_)));
        assert!(surface.is_visible(Widget::ErrorLine(0)));
        assert_eq!(surface.color(Widget::ErrorLine(0)), Some(Color::RED));
        assert!(matches!(
            plugin.press_sector_button(0),
            Err(PluginError::Disabled(_))
        ));

        let report = plugin.shutdown();
        assert!(!report.store_saved);
        assert_eq!(fs::read_to_string(rig.paths.data_file()).unwrap(), "");
    }

    /// End-to-end: an unreadable data file is backed up and never overwritten
    #[test]
    fn test_e2e_corrupt_data_file_is_preserved() {
        let rig = Rig::new(environment());
        fs::create_dir_all(rig.paths.data_file().parent().unwrap()).unwrap();
        fs::write(rig.paths.data_file(), "{ \"ks_vallelunga\": ").unwrap();

        let surface = Arc::new(RecordingSurface::new());
        let mut plugin = rig.session(&surface);
        assert!(plugin.store().is_read_only());

        rig.tick(&mut plugin, FrameBuilder::in_pit_box(0.95).build());
        plugin.set_sector_count(4).unwrap();
        assert!(plugin.changes().structure_changed);

        let report = plugin.shutdown();
        assert!(!report.store_saved);
        assert_eq!(
            fs::read_to_string(rig.paths.data_file()).unwrap(),
            "{ \"ks_vallelunga\": "
        );
        let backups = BackupRotation::new(rig.paths.backup_dir());
        assert_eq!(backups.list().unwrap().len(), 1);
    }

    /// Timer events drive cues on a shared runtime: new-best sounds play and
    /// the page flips back once the lap closes
    #[tokio::test]
    async fn test_e2e_timer_events_to_cues() {
        let env = environment();
        let mut ledger =
            SectorLedger::from_checkpoints(vec![Checkpoint::At(0.5), Checkpoint::FinishLine])
                .unwrap();
        ledger.load_best_times(&[Some(40.0), Some(40.0)]);
        let mut timer = LapTimer::new(ledger);

        let surface = Arc::new(RecordingSurface::new());
        let player = Arc::new(RecordingPlayer::new());
        let pager = Arc::new(Pager::new(2, UiLayout::Full));
        let handle = FeedbackHandle::spawn(
            surface.clone(),
            Arc::clone(&player),
            Arc::clone(&pager),
            DEFAULT_QUEUE_CAPACITY,
        );

        let pit = FrameBuilder::in_pit_box(0.95).build();
        timer.initialize(&env, &pit);
        let mut frames = vec![pit];
        frames.extend((1..=99).map(|k| lap_frame(0, k)));
        frames.push(lap_end(1, 58_000));

        let mut laps = 0;
        for frame in &frames {
            for event in timer.tick(frame).events {
                match event {
                    TimingEvent::SectorCleared(crossing) if crossing.outcome.is_new_best() => {
                        handle
                            .try_send(Cue::NewBestSound {
                                asset: "new_best.wav".into(),
                            })
                            .unwrap();
                    }
                    TimingEvent::LapCommitted { .. } => {
                        laps += 1;
                        handle
                            .try_send(Cue::AdvancePage {
                                delay: Duration::from_millis(10),
                            })
                            .unwrap();
                    }
                    _ => {}
                }
            }
        }

        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;

        assert_eq!(laps, 1);
        assert_eq!(timer.ledger().times(TimeSlot::Best), &[Some(30.0), Some(28.0)]);
        assert_eq!(player.play_count(), 2);
        assert_eq!(metrics.completed(), 3);
        assert_eq!(pager.page(), 1);
        assert_eq!(surface.value(Widget::PageSpinner), Some(1.0));
    }
}
