//! Host telemetry contracts
//!
//! One [`TelemetrySnapshot`] is read per simulation tick; [`HostEnvironment`]
//! describes the loaded session and does not change while the plugin runs.

use serde::{Deserialize, Serialize};

/// 3D world position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// An axis at exactly zero means the car is still loading
    pub fn is_loaded(&self) -> bool {
        self.x != 0.0 && self.y != 0.0 && self.z != 0.0
    }

    /// Round each axis to millimetres
    pub fn rounded(&self) -> Self {
        let round = |v: f64| (v * 1000.0).round() / 1000.0;
        Self::new(round(self.x), round(self.y), round(self.z))
    }

    pub fn axes(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Session type as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Practice,
    Qualifying,
    Race,
    Hotlap,
    TimeAttack,
    Drift,
    Drag,
    /// Any code outside the documented range
    Other,
}

/// Direction the host's session clock normally moves in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDirection {
    /// Remaining time counts down
    Decreasing,
    /// Clock counts up
    Increasing,
}

impl SessionType {
    /// Map the host's integer session code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SessionType::Practice,
            1 => SessionType::Qualifying,
            2 => SessionType::Race,
            3 => SessionType::Hotlap,
            4 => SessionType::TimeAttack,
            5 => SessionType::Drift,
            6 => SessionType::Drag,
            _ => SessionType::Other,
        }
    }

    /// Expected clock monotonicity; `None` disables clock-based reset detection
    pub fn clock_direction(self) -> Option<ClockDirection> {
        match self {
            SessionType::Practice | SessionType::Race => Some(ClockDirection::Decreasing),
            SessionType::Other => None,
            _ => Some(ClockDirection::Increasing),
        }
    }
}

/// Per-tick telemetry of the local player's car
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Normalized spline position in `[0, 1]`
    pub spline_position: f64,
    /// Elapsed time of the current lap in milliseconds
    pub lap_time_ms: u64,
    /// Lap counter of the car
    pub lap_count: u32,
    /// Completed laps as reported by the session graphics
    pub completed_laps: u32,
    /// Time of the last completed lap in milliseconds
    pub last_lap_ms: u64,
    /// World coordinates of the car
    pub car_coordinates: Position,
    /// Car is in its pit box
    pub in_pit_box: bool,
    /// Car is in the pit lane
    pub in_pit_lane: bool,
    /// Current session type
    pub session_type: SessionType,
    /// Session clock as reported by the host; the sign is not meaningful
    pub session_time_left: f64,
    /// Live gameplay (false during replays)
    pub is_live: bool,
}

impl TelemetrySnapshot {
    /// Pit box or pit lane
    pub fn in_pit_area(&self) -> bool {
        self.in_pit_box || self.in_pit_lane
    }

    pub fn lap_time_secs(&self) -> f64 {
        self.lap_time_ms as f64 / 1000.0
    }

    pub fn last_lap_secs(&self) -> f64 {
        self.last_lap_ms as f64 / 1000.0
    }

    /// Magnitude of the session clock
    pub fn session_clock(&self) -> f64 {
        self.session_time_left.abs()
    }
}

/// Static description of the loaded session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostEnvironment {
    pub track_name: String,
    /// Empty when the track has no sub-layout
    pub track_layout: String,
    pub car_name: String,
    /// Track ships AI navigation data
    pub has_ai_line: bool,
    /// Host extension version code
    pub extension_version: u32,
}

impl HostEnvironment {
    pub fn track_key(&self) -> TrackKey {
        TrackKey {
            track: self.track_name.clone(),
            layout: self.track_layout.clone(),
            car: self.car_name.clone(),
        }
    }
}

/// Identity of a persisted record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackKey {
    pub track: String,
    /// Empty string means the record lives directly under the track
    pub layout: String,
    pub car: String,
}

impl TrackKey {
    pub fn new(track: impl Into<String>, layout: impl Into<String>, car: impl Into<String>) -> Self {
        Self {
            track: track.into(),
            layout: layout.into(),
            car: car.into(),
        }
    }

    pub fn has_layout(&self) -> bool {
        !self.layout.is_empty()
    }
}

impl std::fmt::Display for TrackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_layout() {
            write!(f, "{}/{} ({})", self.track, self.layout, self.car)
        } else {
            write!(f, "{} ({})", self.track, self.car)
        }
    }
}
