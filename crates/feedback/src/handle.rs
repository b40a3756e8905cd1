//! FeedbackHandle - bounded cue queue with a worker task

use std::sync::Arc;

use contracts::{Color, CuePlayer, OverlaySurface};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::cue::{Cue, FLASH_CYCLES, FLASH_STEP};
use crate::error::FeedbackError;
use crate::metrics::FeedbackMetrics;
use crate::pager::Pager;

/// Default cue queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Collaborators a cue may touch
struct CueTargets<P> {
    surface: Arc<dyn OverlaySurface>,
    player: Arc<P>,
    pager: Arc<Pager>,
}

/// Handle to a running feedback worker
pub struct FeedbackHandle {
    tx: mpsc::Sender<Cue>,
    metrics: Arc<FeedbackMetrics>,
    worker_handle: JoinHandle<()>,
}

impl FeedbackHandle {
    /// Spawn the worker on the current runtime
    pub fn spawn<P>(
        surface: Arc<dyn OverlaySurface>,
        player: Arc<P>,
        pager: Arc<Pager>,
        queue_capacity: usize,
    ) -> Self
    where
        P: CuePlayer + Sync + 'static,
    {
        Self::spawn_on(&Handle::current(), surface, player, pager, queue_capacity)
    }

    /// Spawn the worker on `runtime`
    pub fn spawn_on<P>(
        runtime: &Handle,
        surface: Arc<dyn OverlaySurface>,
        player: Arc<P>,
        pager: Arc<Pager>,
        queue_capacity: usize,
    ) -> Self
    where
        P: CuePlayer + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(FeedbackMetrics::new());

        let targets = Arc::new(CueTargets {
            surface,
            player,
            pager,
        });
        let worker_metrics = Arc::clone(&metrics);
        let worker_handle = runtime.spawn(async move {
            feedback_worker(rx, targets, worker_metrics).await;
        });

        Self {
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn metrics(&self) -> &Arc<FeedbackMetrics> {
        &self.metrics
    }

    /// Queue a cue without blocking the tick
    ///
    /// # Errors
    /// Returns `QueueFull` or `WorkerClosed`; the cue is dropped either way.
    pub fn try_send(&self, cue: Cue) -> Result<(), FeedbackError> {
        let kind = cue.kind();
        let result = match self.tx.try_send(cue) {
            Ok(()) => {
                self.metrics.inc_queued();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped();
                warn!(kind, "Feedback queue full, cue dropped");
                Err(FeedbackError::QueueFull { kind })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.metrics.inc_dropped();
                error!(kind, "Feedback worker closed unexpectedly");
                Err(FeedbackError::WorkerClosed { kind })
            }
        };
        observability::record_cue(kind, result.is_ok());
        result
    }

    /// Close the queue and wait for running cues to finish
    #[instrument(name = "feedback_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Feedback worker panicked");
        }
        debug!("FeedbackHandle shutdown complete");
    }
}

/// Worker task: one child task per cue so a flash never delays a sound
#[instrument(name = "feedback_worker_loop", skip_all)]
async fn feedback_worker<P>(
    mut rx: mpsc::Receiver<Cue>,
    targets: Arc<CueTargets<P>>,
    metrics: Arc<FeedbackMetrics>,
) where
    P: CuePlayer + Sync + 'static,
{
    debug!("Feedback worker started");
    let mut running = JoinSet::new();

    loop {
        tokio::select! {
            cue = rx.recv() => match cue {
                Some(cue) => {
                    running.spawn(run_cue(Arc::clone(&targets), cue, Arc::clone(&metrics)));
                }
                None => break,
            },
            Some(joined) = running.join_next(), if !running.is_empty() => {
                if let Err(e) = joined {
                    error!(error = ?e, "Cue task panicked");
                }
            }
        }
    }

    while let Some(joined) = running.join_next().await {
        if let Err(e) = joined {
            error!(error = ?e, "Cue task panicked");
        }
    }
    debug!("Feedback worker stopped");
}

async fn run_cue<P>(targets: Arc<CueTargets<P>>, cue: Cue, metrics: Arc<FeedbackMetrics>)
where
    P: CuePlayer + Sync + 'static,
{
    match cue {
        Cue::Flash { widget, settle } => {
            for _ in 0..FLASH_CYCLES {
                targets.surface.set_color(widget, Color::RED);
                sleep(FLASH_STEP).await;
                targets.surface.set_color(widget, Color::WHITE);
                sleep(FLASH_STEP).await;
            }
            targets.surface.set_color(widget, settle);
        }
        Cue::NewBestSound { asset } => {
            if let Err(e) = targets.player.play(&asset).await {
                metrics.inc_failed();
                warn!(asset = %asset.display(), error = %e, "New best sound failed");
                return;
            }
        }
        Cue::AdvancePage { delay } => {
            sleep(delay).await;
            let page = targets.pager.advance();
            targets.pager.render(targets.surface.as_ref());
            debug!(page, "Timing page advanced");
        }
    }
    metrics.inc_completed();
}
