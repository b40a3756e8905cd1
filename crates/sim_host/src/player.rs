//! Recording audio player

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use contracts::{ContractError, CuePlayer};

use crate::host::lock;

/// Player that records requested assets instead of playing them
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    played: Mutex<Vec<PathBuf>>,
    fail: AtomicBool,
    /// Simulated playback length
    duration: Duration,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Make subsequent plays fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn play_count(&self) -> usize {
        lock(&self.played).len()
    }

    pub fn played(&self) -> Vec<PathBuf> {
        lock(&self.played).clone()
    }
}

impl CuePlayer for RecordingPlayer {
    async fn play(&self, asset: &Path) -> Result<(), ContractError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ContractError::audio(
                asset.display().to_string(),
                "scripted failure",
            ));
        }
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        lock(&self.played).push(asset.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_fails() {
        let player = RecordingPlayer::new();
        player.play(Path::new("new_best.wav")).await.unwrap();
        assert_eq!(player.played(), vec![PathBuf::from("new_best.wav")]);

        player.set_failing(true);
        assert!(matches!(
            player.play(Path::new("new_best.wav")).await,
            Err(ContractError::Audio { .. })
        ));
        assert_eq!(player.play_count(), 1);
    }
}
