//! Lap update orchestrator

use contracts::{
    Checkpoint, HostEnvironment, ResetCause, SectorCrossing, TelemetrySnapshot,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::detector::{PitExit, StartDetector};
use crate::error::Result;
use crate::ledger::SectorLedger;
use crate::progress::ProgressClassifier;

/// Oldest host extension build the plugin supports
pub const MIN_EXTENSION_VERSION: u32 = 2051;

/// A lap is only committed once the car is this close past the line
pub const LAP_COMMIT_PROGRESS_LIMIT: f64 = 0.3;

/// Synthetic progress used to close sectors left open at lap end
///
/// Lies above the finish-line sentinel so every set checkpoint is due.
pub const FORCE_CLOSE_PROGRESS: f64 = 3.0;

/// Why timing is disabled for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsupportedEnvironment {
    #[error("host extension {found} is older than the required {required}")]
    ExtensionTooOld { found: u32, required: u32 },

    #[error("track has no AI line")]
    MissingAiLine,

    #[error("session is not live")]
    NotLive,
}

impl UnsupportedEnvironment {
    /// First failing requirement, in display priority order
    pub fn check(env: &HostEnvironment, snapshot: &TelemetrySnapshot) -> Option<Self> {
        if env.extension_version < MIN_EXTENSION_VERSION {
            Some(Self::ExtensionTooOld {
                found: env.extension_version,
                required: MIN_EXTENSION_VERSION,
            })
        } else if !env.has_ai_line {
            Some(Self::MissingAiLine)
        } else if !snapshot.is_live {
            Some(Self::NotLive)
        } else {
            None
        }
    }
}

/// Coarse orchestrator state for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Uninitialized,
    Disabled(UnsupportedEnvironment),
    /// Waiting for the car to leave the pits
    Armed(PitExit),
    Timing,
}

/// Something the UI binding should react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingEvent {
    SectorCleared(SectorCrossing),
    LapCommitted { lap: u32 },
    SessionReset { cause: ResetCause },
    PitExited,
    StartConfirmed,
}

/// Events produced by one tick, in occurrence order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<TimingEvent>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn crossings(&self) -> impl Iterator<Item = &SectorCrossing> {
        self.events.iter().filter_map(|event| match event {
            TimingEvent::SectorCleared(crossing) => Some(crossing),
            _ => None,
        })
    }

    pub fn reset(&self) -> Option<ResetCause> {
        self.events.iter().find_map(|event| match event {
            TimingEvent::SessionReset { cause } => Some(*cause),
            _ => None,
        })
    }

    pub fn lap_committed(&self) -> Option<u32> {
        self.events.iter().find_map(|event| match event {
            TimingEvent::LapCommitted { lap } => Some(*lap),
            _ => None,
        })
    }

    fn push(&mut self, event: TimingEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Clone)]
enum TimerState {
    Uninitialized,
    Disabled(UnsupportedEnvironment),
    Active(StartDetector),
}

/// Per-tick lap timing state machine
///
/// Owns the ledger, classifier and detector of the current session.
#[derive(Debug, Clone)]
pub struct LapTimer {
    ledger: SectorLedger,
    classifier: ProgressClassifier,
    state: TimerState,
}

impl LapTimer {
    pub fn new(ledger: SectorLedger) -> Self {
        Self {
            ledger,
            classifier: ProgressClassifier::new(),
            state: TimerState::Uninitialized,
        }
    }

    /// Check the environment and latch the pit state of the first connected tick
    #[instrument(
        name = "lap_timer_initialize",
        skip(self, env, snapshot),
        fields(track = %env.track_name, layout = %env.track_layout, car = %env.car_name)
    )]
    pub fn initialize(&mut self, env: &HostEnvironment, snapshot: &TelemetrySnapshot) -> EnginePhase {
        self.state = match UnsupportedEnvironment::check(env, snapshot) {
            Some(reason) => {
                warn!(%reason, "Lap timing disabled");
                TimerState::Disabled(reason)
            }
            None => {
                let started_outside = !snapshot.in_pit_area();
                info!(started_outside, sectors = self.ledger.sector_count(), "Lap timing armed");
                TimerState::Active(StartDetector::new(started_outside))
            }
        };
        self.phase()
    }

    /// Run one simulation tick
    pub fn tick(&mut self, snapshot: &TelemetrySnapshot) -> TickReport {
        let mut report = TickReport::default();
        let TimerState::Active(detector) = &mut self.state else {
            return report;
        };

        detector.record_anchor(snapshot);
        if !self.ledger.is_configured() {
            return report;
        }

        let step = detector.observe(snapshot);
        if step.start_confirmed {
            self.classifier.clear();
            report.push(TimingEvent::StartConfirmed);
        }
        if step.pit_exited {
            debug!(lap = snapshot.lap_count, "Pit exit");
            report.push(TimingEvent::PitExited);
        }
        if let Some(cause) = step.reset {
            self.classifier.clear();
            self.ledger.reset_cleared();
            observability::record_session_reset(cause);
            info!(cause = cause.as_str(), lap = snapshot.lap_count, "Session reset detected");
            report.push(TimingEvent::SessionReset { cause });
            return report;
        }

        if detector.pit_exit() != PitExit::Exited || snapshot.in_pit_area() {
            return report;
        }

        if snapshot.lap_count == detector.previous_lap() {
            let motion = self.classifier.classify(snapshot.spline_position);
            if motion.advances() {
                for crossing in self
                    .ledger
                    .advance(snapshot.spline_position, snapshot.lap_time_secs())
                {
                    on_crossing(&crossing);
                    report.push(TimingEvent::SectorCleared(crossing));
                }
                detector.latch_clock(snapshot);
            } else {
                observability::record_motion_rejected(motion.as_str());
            }
        } else if snapshot.completed_laps != 0 && snapshot.lap_count == snapshot.completed_laps {
            if !self.ledger.all_cleared() {
                for crossing in self
                    .ledger
                    .advance(FORCE_CLOSE_PROGRESS, snapshot.last_lap_secs())
                {
                    on_crossing(&crossing);
                    report.push(TimingEvent::SectorCleared(crossing));
                }
            }
            if snapshot.spline_position <= LAP_COMMIT_PROGRESS_LIMIT {
                detector.commit_lap(snapshot.lap_count);
                self.ledger.reset_cleared();
                self.classifier.clear();
                observability::record_lap_committed(snapshot.lap_count);
                info!(lap = snapshot.lap_count, "Lap committed");
                report.push(TimingEvent::LapCommitted {
                    lap: snapshot.lap_count,
                });
            }
        }

        report
    }

    /// Place the checkpoint of sector `index` at the car's progress
    pub fn place_checkpoint(&mut self, index: usize, progress: f64) -> Result<Checkpoint> {
        self.ledger.place_checkpoint(index, progress)
    }

    pub fn set_finish_line_as_last(&mut self) -> Result<()> {
        self.ledger.set_finish_line_as_last()
    }

    pub fn reset_checkpoints(&mut self) {
        self.ledger.reset_checkpoints();
        self.ledger.reset_cleared();
        self.invalidate();
    }

    pub fn reset_times(&mut self) {
        self.ledger.reset_times();
        self.ledger.reset_cleared();
        self.invalidate();
    }

    pub fn resize(&mut self, count: usize, max: usize) -> Result<()> {
        self.ledger.resize(count, max)?;
        self.invalidate();
        Ok(())
    }

    pub fn ledger(&self) -> &SectorLedger {
        &self.ledger
    }

    pub fn phase(&self) -> EnginePhase {
        match &self.state {
            TimerState::Uninitialized => EnginePhase::Uninitialized,
            TimerState::Disabled(reason) => EnginePhase::Disabled(*reason),
            TimerState::Active(detector) => match detector.pit_exit() {
                PitExit::Exited => EnginePhase::Timing,
                other => EnginePhase::Armed(other),
            },
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.state, TimerState::Disabled(_))
    }

    fn invalidate(&mut self) {
        self.classifier.clear();
        if let TimerState::Active(detector) = &mut self.state {
            detector.invalidate();
        }
    }
}

fn on_crossing(crossing: &SectorCrossing) {
    observability::record_sector_crossing(crossing);
    debug!(
        sector = crossing.index + 1,
        split = crossing.split,
        outcome = crossing.outcome.as_str(),
        "Sector cleared"
    );
}
