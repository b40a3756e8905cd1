//! Start/reset detector
//!
//! Tracks whether the player has left the pits since the last session
//! (re)start and notices when the host restarts the session underneath us.

use contracts::{ClockDirection, Position, ResetCause, TelemetrySnapshot};
use tracing::debug;

/// Track progress below which leaving the pit area counts as a pit exit
pub const PIT_EXIT_PROGRESS_LIMIT: f64 = 0.3;

/// Per-axis tolerance around the recorded start coordinates
pub const START_POSITION_TOLERANCE: f64 = 0.05;

/// Tolerance around the recorded start progress
pub const START_PROGRESS_TOLERANCE: f64 = 0.03;

/// "Player has exited the pits since the last reset"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitExit {
    #[default]
    Unknown,
    NotExited,
    Exited,
}

/// Where the car stood on its first loaded tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartAnchor {
    pub position: Position,
    pub progress: f64,
}

impl StartAnchor {
    /// Whether the car is back where the session started
    fn matches(&self, snapshot: &TelemetrySnapshot) -> bool {
        let current = snapshot.car_coordinates.rounded();
        let position_ok = self
            .position
            .axes()
            .iter()
            .zip(current.axes())
            .all(|(anchor, now)| within(now, *anchor, START_POSITION_TOLERANCE));

        position_ok && within(self.progress, snapshot.spline_position, START_PROGRESS_TOLERANCE)
    }
}

/// `value` lies within `reference ± ratio·|reference|`
fn within(value: f64, reference: f64, ratio: f64) -> bool {
    (value - reference).abs() <= reference.abs() * ratio
}

/// Transitions observed during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectorStep {
    /// A pending clock reset was confirmed at the start position
    pub start_confirmed: bool,
    /// The car just left the pit area
    pub pit_exited: bool,
    pub reset: Option<ResetCause>,
}

#[derive(Debug, Clone)]
pub struct StartDetector {
    pit_exit: PitExit,
    started_outside_pits: bool,
    anchor: Option<StartAnchor>,
    clock_reference: Option<f64>,
    awaiting_start_confirmation: bool,
    previous_lap: u32,
}

impl StartDetector {
    pub fn new(started_outside_pits: bool) -> Self {
        Self {
            pit_exit: PitExit::Unknown,
            started_outside_pits,
            anchor: None,
            clock_reference: None,
            awaiting_start_confirmation: false,
            previous_lap: 0,
        }
    }

    /// Record the start anchor on the first tick with loaded coordinates
    pub fn record_anchor(&mut self, snapshot: &TelemetrySnapshot) {
        if self.anchor.is_some() || !snapshot.car_coordinates.is_loaded() {
            return;
        }
        let anchor = StartAnchor {
            position: snapshot.car_coordinates.rounded(),
            progress: snapshot.spline_position,
        };
        debug!(
            x = anchor.position.x,
            y = anchor.position.y,
            z = anchor.position.z,
            progress = anchor.progress,
            "Start anchor recorded"
        );
        self.anchor = Some(anchor);
    }

    /// Advance the tri-state and look for session resets
    pub fn observe(&mut self, snapshot: &TelemetrySnapshot) -> DetectorStep {
        let mut step = DetectorStep::default();
        let in_pit = snapshot.in_pit_area();

        if self.pit_exit == PitExit::Unknown && (in_pit || self.started_outside_pits) {
            if self.awaiting_start_confirmation {
                if self.check_start_pos(snapshot) {
                    self.pit_exit = PitExit::NotExited;
                    self.awaiting_start_confirmation = false;
                    step.start_confirmed = true;
                }
            } else {
                self.pit_exit = PitExit::NotExited;
            }
        }

        if !in_pit
            && self.pit_exit == PitExit::NotExited
            && snapshot.spline_position <= PIT_EXIT_PROGRESS_LIMIT
        {
            self.previous_lap = snapshot.lap_count;
            self.pit_exit = PitExit::Exited;
            step.pit_exited = true;
        }

        let pitted = in_pit && self.pit_exit == PitExit::Exited;
        let clock_jump = self.started_outside_pits
            && !self.awaiting_start_confirmation
            && self.clock_moved_backwards(snapshot);

        if clock_jump || pitted {
            self.pit_exit = PitExit::Unknown;
            self.previous_lap = snapshot.lap_count;
            self.clock_reference = Some(snapshot.session_clock());
            if clock_jump {
                self.awaiting_start_confirmation = true;
                step.reset = Some(ResetCause::ClockJump);
            } else {
                step.reset = Some(ResetCause::Pitted);
            }
        }

        if self.clock_reference.is_none() {
            self.clock_reference = Some(snapshot.session_clock());
        }

        step
    }

    /// Car back at the recorded start, or in the pit area
    ///
    /// Without an anchor only the pit-area test applies.
    pub fn check_start_pos(&self, snapshot: &TelemetrySnapshot) -> bool {
        if snapshot.in_pit_area() {
            return true;
        }
        self.anchor
            .map(|anchor| anchor.matches(snapshot))
            .unwrap_or(false)
    }

    /// Move the clock reference to this tick's clock
    pub fn latch_clock(&mut self, snapshot: &TelemetrySnapshot) {
        self.clock_reference = Some(snapshot.session_clock());
    }

    pub fn commit_lap(&mut self, lap: u32) {
        self.previous_lap = lap;
    }

    /// Force the tri-state back to unknown after a timing-invalidating edit
    pub fn invalidate(&mut self) {
        self.pit_exit = PitExit::Unknown;
    }

    pub fn pit_exit(&self) -> PitExit {
        self.pit_exit
    }

    pub fn previous_lap(&self) -> u32 {
        self.previous_lap
    }

    pub fn started_outside_pits(&self) -> bool {
        self.started_outside_pits
    }

    pub fn is_awaiting_start_confirmation(&self) -> bool {
        self.awaiting_start_confirmation
    }

    pub fn anchor(&self) -> Option<StartAnchor> {
        self.anchor
    }

    pub fn clock_reference(&self) -> Option<f64> {
        self.clock_reference
    }

    fn clock_moved_backwards(&self, snapshot: &TelemetrySnapshot) -> bool {
        let Some(reference) = self.clock_reference else {
            return false;
        };
        let clock = snapshot.session_clock();
        match snapshot.session_type.clock_direction() {
            Some(ClockDirection::Decreasing) => clock > reference,
            Some(ClockDirection::Increasing) => clock < reference,
            None => false,
        }
    }
}
