//! Progress classifier
//!
//! Raw spline position is noisy around the start/finish wrap and can arrive
//! out of tick order. A sample only counts as forward motion when it stays
//! inside a tolerance band around the last accepted sample.

/// Samples at or below this position always pass the tolerance band
pub const NEAR_START_PROGRESS: f64 = 0.05;

/// Largest accepted jump, as a fraction of the previous position
pub const FORWARD_TOLERANCE_RATIO: f64 = 0.30;

/// Classification of one progress sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Progress advanced; sectors may be crossed
    Forward,
    /// Same position as the last accepted sample
    Stationary,
    /// Progress moved back inside the tolerance band
    Backward,
    /// Jump outside the tolerance band (teleport, lap wrap, stale sample)
    Discontinuous,
}

impl Motion {
    /// Whether timing may advance on this sample
    pub fn advances(self) -> bool {
        matches!(self, Motion::Forward)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Motion::Forward => "forward",
            Motion::Stationary => "stationary",
            Motion::Backward => "backward",
            Motion::Discontinuous => "discontinuous",
        }
    }
}

/// Forward-motion gate over successive progress samples
#[derive(Debug, Clone, Default)]
pub struct ProgressClassifier {
    /// Last sample classified forward
    reference: Option<f64>,
}

impl ProgressClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `sample` and move the reference on forward motion
    pub fn classify(&mut self, sample: f64) -> Motion {
        let Some(previous) = self.reference else {
            self.reference = Some(sample);
            return Motion::Forward;
        };

        let within_band = sample <= NEAR_START_PROGRESS
            || previous == 0.0
            || (sample - previous).abs() <= previous * FORWARD_TOLERANCE_RATIO;

        if !within_band {
            return Motion::Discontinuous;
        }

        if sample > previous {
            self.reference = Some(sample);
            Motion::Forward
        } else if sample == previous {
            Motion::Stationary
        } else {
            Motion::Backward
        }
    }

    /// Forget the reference so the next sample is accepted as-is
    pub fn clear(&mut self) {
        self.reference = None;
    }

    pub fn reference(&self) -> Option<f64> {
        self.reference
    }
}
