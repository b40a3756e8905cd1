//! Telemetry frame builder

use contracts::{Position, SessionType, TelemetrySnapshot};

/// Default world position used for scripted frames
pub const TRACK_POSITION: Position = Position {
    x: 152.25,
    y: 4.5,
    z: -310.75,
};

/// Builder over [`TelemetrySnapshot`] with live, loaded defaults
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    frame: TelemetrySnapshot,
}

impl FrameBuilder {
    /// Live car on track at `progress`
    pub fn on_track(progress: f64) -> Self {
        Self {
            frame: TelemetrySnapshot {
                spline_position: progress,
                car_coordinates: TRACK_POSITION,
                session_type: SessionType::Hotlap,
                is_live: true,
                ..Default::default()
            },
        }
    }

    /// Live car standing in its pit box
    pub fn in_pit_box(progress: f64) -> Self {
        let mut builder = Self::on_track(progress);
        builder.frame.in_pit_box = true;
        builder
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.frame.spline_position = progress;
        self
    }

    pub fn lap_time_ms(mut self, ms: u64) -> Self {
        self.frame.lap_time_ms = ms;
        self
    }

    /// Lap counter; `completed_laps` follows it
    pub fn lap(mut self, lap: u32) -> Self {
        self.frame.lap_count = lap;
        self.frame.completed_laps = lap;
        self
    }

    pub fn last_lap_ms(mut self, ms: u64) -> Self {
        self.frame.last_lap_ms = ms;
        self
    }

    pub fn session(mut self, session_type: SessionType, clock: f64) -> Self {
        self.frame.session_type = session_type;
        self.frame.session_time_left = clock;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.frame.car_coordinates = position;
        self
    }

    pub fn pit_lane(mut self, in_pit_lane: bool) -> Self {
        self.frame.in_pit_lane = in_pit_lane;
        self
    }

    pub fn live(mut self, is_live: bool) -> Self {
        self.frame.is_live = is_live;
        self
    }

    pub fn build(self) -> TelemetrySnapshot {
        self.frame
    }
}

impl From<TelemetrySnapshot> for FrameBuilder {
    fn from(frame: TelemetrySnapshot) -> Self {
        Self { frame }
    }
}
