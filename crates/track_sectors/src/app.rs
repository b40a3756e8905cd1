//! Plugin session context - owns every component for one simulator session.

use std::sync::Arc;
use std::time::Duration;

use config_loader::{ConfigLoader, SettingsStore};
use contracts::{
    AppSettings, CuePlayer, OverlaySurface, SectorCrossing, SimHost, TelemetrySnapshot, TrackKey,
    Widget, MIN_SECTOR_COUNT,
};
use feedback::{Cue, FeedbackHandle, FeedbackMetrics, FeedbackSnapshot, Pager, DEFAULT_QUEUE_CAPACITY, SECTORS_PER_PAGE};
use lap_engine::{format_time, EnginePhase, LapTimer, SectorLedger, TickReport, TimingEvent};
use observability::{SessionStatsAggregator, SessionSummary};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error, info, instrument, warn};
use track_store::{BackupRotation, SessionChanges, TrackRecord, TrackStore};

use crate::error::Result;
use crate::messages;
use crate::paths::PluginPaths;
use crate::render;

/// Longest wait for queued cues at shutdown
pub const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// What shutdown wrote and how the session went
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    pub settings_saved: bool,
    pub store_saved: bool,
    /// Seconds of simulation time seen through `update`
    pub session_time: f64,
    pub cues: FeedbackSnapshot,
    pub summary: SessionSummary,
}

/// The sector timing plugin
///
/// Built when the host loads the plugin, driven by [`TrackSectors::update`]
/// once per simulation tick and consumed by [`TrackSectors::shutdown`].
pub struct TrackSectors<H> {
    pub(crate) paths: PluginPaths,
    pub(crate) host: Arc<H>,
    pub(crate) surface: Arc<dyn OverlaySurface>,
    pub(crate) settings: SettingsStore,
    store: TrackStore,
    key: TrackKey,
    /// Record read at load time, consumed by initialization
    stored: Option<TrackRecord>,
    pub(crate) timer: LapTimer,
    pub(crate) pager: Arc<Pager>,
    feedback: FeedbackHandle,
    runtime: Runtime,
    pub(crate) changes: SessionChanges,
    stats: SessionStatsAggregator,
    /// Telemetry of the most recent tick; user actions are judged against it
    pub(crate) latest: Option<TelemetrySnapshot>,
    session_time: f64,
}

impl<H: SimHost> TrackSectors<H> {
    /// Load settings and stored data for the session the host has loaded
    ///
    /// Unreadable settings fall back to defaults and are not written back; an
    /// unreadable data file leaves the session without persistence.
    ///
    /// # Errors
    /// Returns `Io` when the cue runtime cannot be started.
    #[instrument(name = "track_sectors_new", skip_all, fields(root = %paths.root().display()))]
    pub fn new<P>(
        paths: PluginPaths,
        host: Arc<H>,
        surface: Arc<dyn OverlaySurface>,
        player: Arc<P>,
    ) -> Result<Self>
    where
        P: CuePlayer + Sync + 'static,
    {
        let defaults = ConfigLoader::read_defaults(&paths.defaults_file());
        let settings = match SettingsStore::open(paths.config_file(), &defaults) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Settings unreadable, using defaults for this session");
                SettingsStore::with_settings(paths.config_file(), AppSettings::default())
            }
        };

        let backups = BackupRotation::new(paths.backup_dir());
        let store = match TrackStore::open(&paths.data_file(), &backups) {
            Ok(store) => store,
            Err(e) => {
                error!(error = %e, "Data file unavailable, running without persistence");
                TrackStore::detached(paths.data_file())
            }
        };

        let key = host.environment().track_key();
        let stored = store.record(&key);
        match &stored {
            Some(record) => info!(
                record = %key,
                sectors = record.sector_count,
                car_times = record.best_times.is_some(),
                "Stored layout found"
            ),
            None => debug!(record = %key, "No stored layout, timing starts cold"),
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("track-sectors-cues")
            .enable_time()
            .build()?;

        let sector_count = stored
            .as_ref()
            .map_or(MIN_SECTOR_COUNT, |record| record.sector_count);
        let pager = Arc::new(Pager::new(
            sector_count,
            settings.settings().main_app.layout(),
        ));
        let feedback = FeedbackHandle::spawn_on(
            runtime.handle(),
            Arc::clone(&surface),
            player,
            Arc::clone(&pager),
            DEFAULT_QUEUE_CAPACITY,
        );

        Ok(Self {
            paths,
            host,
            surface,
            settings,
            store,
            key,
            stored,
            timer: LapTimer::new(SectorLedger::new(sector_count)),
            pager,
            feedback,
            runtime,
            changes: SessionChanges::default(),
            stats: SessionStatsAggregator::new(),
            latest: None,
            session_time: 0.0,
        })
    }

    /// Build the session once the car is connected
    ///
    /// Calling it again after a successful start returns the current phase.
    ///
    /// # Errors
    /// Returns `HostUnavailable` when no telemetry can be read yet.
    pub fn initialize(&mut self) -> Result<EnginePhase> {
        if self.timer.phase() != EnginePhase::Uninitialized {
            return Ok(self.timer.phase());
        }
        let snapshot = self.host.snapshot()?;
        let phase = self.start(&snapshot);
        self.latest = Some(snapshot);
        Ok(phase)
    }

    /// One simulation tick
    pub fn update(&mut self, dt: f64) {
        self.session_time += dt;

        let uninitialized = self.timer.phase() == EnginePhase::Uninitialized;
        if uninitialized && !self.host.is_car_connected() {
            return;
        }

        let snapshot = match self.host.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "Tick skipped");
                return;
            }
        };

        if uninitialized {
            self.start(&snapshot);
        }
        if self.timer.is_disabled() {
            return;
        }

        let report = self.timer.tick(&snapshot);
        self.latest = Some(snapshot);
        if !report.is_empty() {
            self.render_report(&report);
        }
    }

    /// Persist what changed and stop background work
    ///
    /// Write failures are logged; the report tells which writes happened.
    #[instrument(name = "track_sectors_shutdown", skip(self), fields(record = %self.key))]
    pub fn shutdown(mut self) -> ShutdownReport {
        let settings_saved = match self.settings.save_if_dirty() {
            Ok(written) => written,
            Err(e) => {
                error!(error = %e, "Failed to save settings");
                false
            }
        };
        let store_saved = self.persist();

        let Self {
            runtime,
            feedback,
            stats,
            session_time,
            ..
        } = self;

        let metrics: Arc<FeedbackMetrics> = Arc::clone(feedback.metrics());
        let drained = runtime.block_on(async {
            tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, feedback.shutdown())
                .await
                .is_ok()
        });
        if !drained {
            warn!(
                timeout_ms = SHUTDOWN_DRAIN_TIMEOUT.as_millis() as u64,
                "Pending cues abandoned"
            );
        }
        runtime.shutdown_timeout(Duration::from_millis(100));

        let summary = stats.summary();
        info!(
            laps = summary.laps_committed,
            sectors = summary.total_crossings,
            new_bests = summary.new_bests,
            settings_saved,
            store_saved,
            "Track sectors shut down"
        );
        debug!("{summary}");

        ShutdownReport {
            settings_saved,
            store_saved,
            session_time,
            cues: metrics.snapshot(),
            summary,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.timer.phase()
    }

    pub fn ledger(&self) -> &SectorLedger {
        self.timer.ledger()
    }

    pub fn settings(&self) -> &AppSettings {
        self.settings.settings()
    }

    pub fn pager(&self) -> &Arc<Pager> {
        &self.pager
    }

    pub fn key(&self) -> &TrackKey {
        &self.key
    }

    pub fn changes(&self) -> SessionChanges {
        self.changes
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn feedback_metrics(&self) -> &Arc<FeedbackMetrics> {
        self.feedback.metrics()
    }

    /// Queue a cue; a full queue only costs the cue
    pub(crate) fn send_cue(&self, cue: Cue) {
        if let Err(e) = self.feedback.try_send(cue) {
            debug!(error = %e, "Cue not delivered");
        }
    }

    #[instrument(
        name = "track_sectors_start",
        skip_all,
        fields(record = %self.key, pit = snapshot.in_pit_area())
    )]
    fn start(&mut self, snapshot: &TelemetrySnapshot) -> EnginePhase {
        let ledger = self
            .stored
            .take()
            .map(|record| record.to_ledger())
            .unwrap_or_else(|| SectorLedger::new(MIN_SECTOR_COUNT));
        self.timer = LapTimer::new(ledger);

        let phase = self.timer.initialize(&self.host.environment(), snapshot);
        match phase {
            EnginePhase::Disabled(reason) => {
                messages::show_disabled(self.surface.as_ref(), reason);
            }
            _ => self.render_initial(),
        }
        phase
    }

    fn render_initial(&self) {
        let surface = self.surface.as_ref();
        let ledger = self.timer.ledger();

        render::render_rows(surface, ledger);
        render::render_buttons(surface, ledger);
        surface.set_text(Widget::TotalTime, lap_engine::UNSET_TIME);
        surface.set_text(
            Widget::TheoreticalBest,
            &format_time(ledger.theoretical_best()),
        );
        render::set_totals_visible(surface, self.settings().main_app.theoretical_best);

        self.pager.set_sector_count(ledger.sector_count());
        self.pager.reset();
        self.pager.render(surface);
    }

    fn render_report(&mut self, report: &TickReport) {
        for event in &report.events {
            match event {
                TimingEvent::SectorCleared(crossing) => self.on_sector_cleared(crossing),
                TimingEvent::LapCommitted { .. } => self.stats.record_lap(),
                TimingEvent::SessionReset { cause } => {
                    self.stats.record_reset(*cause);
                    let surface = self.surface.as_ref();
                    self.pager.reset();
                    self.pager.render(surface);
                    render::highlight_sector(surface, self.timer.ledger().sector_count(), 0);
                }
                TimingEvent::PitExited | TimingEvent::StartConfirmed => {}
            }
        }
    }

    fn on_sector_cleared(&mut self, crossing: &SectorCrossing) {
        self.changes.times_recorded = true;
        self.stats.record_crossing(crossing);

        let ledger = self.timer.ledger();
        render::render_crossing(self.surface.as_ref(), ledger, crossing);

        let settings = &self.settings.settings().settings_app;
        if crossing.outcome.is_new_best() && settings.new_best_sfx {
            self.send_cue(Cue::NewBestSound {
                asset: self.paths.new_best_sound(),
            });
        }

        let closes_page = (crossing.index + 1) % SECTORS_PER_PAGE == 0;
        let closes_lap = crossing.index + 1 == ledger.sector_count();
        if closes_page || closes_lap {
            self.send_cue(Cue::AdvancePage {
                delay: Duration::from_secs(settings.next_page_delay),
            });
        }
    }

    /// Write the session back to the data file when it is worth keeping
    fn persist(&mut self) -> bool {
        match self.timer.phase() {
            EnginePhase::Uninitialized => {
                debug!("Session never started, data file untouched");
                return false;
            }
            EnginePhase::Disabled(reason) => {
                debug!(%reason, "Timing disabled, data file untouched");
                return false;
            }
            _ => {}
        }
        if self.changes.is_empty() {
            debug!("No session changes to store");
            return false;
        }
        if !self.timer.ledger().is_configured() {
            info!("Layout left unconfigured, session changes discarded");
            return false;
        }
        if self.store.is_read_only() {
            warn!(
                path = %self.store.path().display(),
                "Data file not writable this session, changes discarded"
            );
            return false;
        }

        self.store.apply(&self.key, self.timer.ledger(), self.changes);
        match self.store.save() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to save data file");
                false
            }
        }
    }
}
