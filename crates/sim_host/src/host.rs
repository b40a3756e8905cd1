//! Scripted simulation host

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{ContractError, HostEnvironment, SimHost, TelemetrySnapshot};
use tracing::trace;

/// Failure injection for [`ScriptedHost`]
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// 1-based snapshot reads that return `HostUnavailable`
    pub fail_reads: Vec<u64>,
}

/// Host that replays queued telemetry frames
///
/// Each `snapshot` pops the next frame; once the queue is empty the last frame
/// repeats, like a paused simulation.
pub struct ScriptedHost {
    config: MockConfig,
    environment: HostEnvironment,
    frames: Mutex<VecDeque<TelemetrySnapshot>>,
    last: Mutex<TelemetrySnapshot>,
    connected: AtomicBool,
    reads: AtomicU64,
}

impl ScriptedHost {
    pub fn new(environment: HostEnvironment) -> Self {
        Self::with_config(environment, MockConfig::default())
    }

    pub fn with_config(environment: HostEnvironment, config: MockConfig) -> Self {
        Self {
            config,
            environment,
            frames: Mutex::new(VecDeque::new()),
            last: Mutex::new(TelemetrySnapshot::default()),
            connected: AtomicBool::new(true),
            reads: AtomicU64::new(0),
        }
    }

    pub fn push_frame(&self, frame: TelemetrySnapshot) {
        lock(&self.frames).push_back(frame);
    }

    pub fn push_frames(&self, frames: impl IntoIterator<Item = TelemetrySnapshot>) {
        lock(&self.frames).extend(frames);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Frames not yet read
    pub fn remaining(&self) -> usize {
        lock(&self.frames).len()
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl SimHost for ScriptedHost {
    fn environment(&self) -> HostEnvironment {
        self.environment.clone()
    }

    fn is_car_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Result<TelemetrySnapshot, ContractError> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.config.fail_reads.contains(&read) {
            return Err(ContractError::host_unavailable(format!(
                "scripted failure on read {read}"
            )));
        }

        let mut last = lock(&self.last);
        if let Some(frame) = lock(&self.frames).pop_front() {
            *last = frame;
        }
        trace!(read, progress = last.spline_position, "Scripted frame");
        Ok(last.clone())
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameBuilder;

    #[test]
    fn test_frames_replay_then_repeat() {
        let host = ScriptedHost::new(HostEnvironment::default());
        host.push_frames([
            FrameBuilder::on_track(0.1).build(),
            FrameBuilder::on_track(0.2).build(),
        ]);

        assert_eq!(host.snapshot().unwrap().spline_position, 0.1);
        assert_eq!(host.snapshot().unwrap().spline_position, 0.2);
        assert_eq!(host.snapshot().unwrap().spline_position, 0.2);
        assert_eq!(host.remaining(), 0);
        assert_eq!(host.read_count(), 3);
    }

    #[test]
    fn test_failure_injection() {
        let host = ScriptedHost::with_config(
            HostEnvironment::default(),
            MockConfig {
                fail_reads: vec![2],
            },
        );
        host.push_frames([
            FrameBuilder::on_track(0.1).build(),
            FrameBuilder::on_track(0.2).build(),
        ]);

        assert!(host.snapshot().is_ok());
        assert!(matches!(
            host.snapshot(),
            Err(ContractError::HostUnavailable { .. })
        ));
        assert_eq!(host.snapshot().unwrap().spline_position, 0.2);
    }

    #[test]
    fn test_connection_probe() {
        let host = ScriptedHost::new(HostEnvironment::default());
        assert!(host.is_car_connected());
        host.set_connected(false);
        assert!(!host.is_car_connected());
    }
}
