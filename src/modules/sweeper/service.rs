use std::{sync::Arc, time::Duration};

use log::info;
use tokio::sync::oneshot;

use crate::{backend::MetadataBackend, context::Context, error::MetadataResult, utils};

const LOG_TARGET: &str = "expiry_sweeper";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    /// Listed as expired but already gone or no longer expired when re-read.
    pub skipped: usize,
    pub failed: usize,
}

/// Periodically removes uploads whose ttl has elapsed.
#[derive(Clone)]
pub struct ExpirySweeper {
    backend: Arc<dyn MetadataBackend>,
}

impl ExpirySweeper {
    pub fn with_dependencies(backend: Arc<dyn MetadataBackend>) -> Self {
        info!(target: LOG_TARGET, "ExpirySweeper initialized with dependencies");
        ExpirySweeper { backend }
    }

    /// One pass over the expired uploads. A failure on one upload is counted
    /// and the pass moves on; only a failing scan aborts it.
    pub async fn sweep_once(&self, ctx: &Context) -> MetadataResult<SweepReport> {
        let ids = self.backend.get_uploads_to_remove(ctx).await?;
        let mut report = SweepReport::default();

        // the scan is a snapshot, so each upload is re-read before removal
        for id in ids {
            let upload = match self.backend.get(ctx, &id).await {
                Ok(upload) => upload,
                Err(err) if err.is_not_found() => {
                    report.skipped += 1;
                    continue;
                }
                Err(_) => {
                    report.failed += 1;
                    continue;
                }
            };

            if !upload.is_expired_at(utils::unix_now()) {
                report.skipped += 1;
                continue;
            }

            match self.backend.remove(ctx, &upload).await {
                Ok(()) => report.removed += 1,
                Err(_) => report.failed += 1,
            }
        }

        Ok(report)
    }

    /// Sweeps every `period` until `shutdown` fires or its sender is dropped.
    pub async fn run(self, period: Duration, mut shutdown: oneshot::Receiver<()>) {
        info!(target: LOG_TARGET, "Starting expiry sweeper with a period of {:?}", period);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(period) => {
                    let ctx = Context::new();
                    match self.sweep_once(&ctx).await {
                        Ok(report) => info!(
                            target: LOG_TARGET,
                            "[{}] Removed {} expired upload(s), skipped {}, failed {}",
                            ctx.request_id(), report.removed, report.skipped, report.failed
                        ),
                        // a failed pass is retried on the next tick
                        Err(err) => log::warn!(
                            target: LOG_TARGET,
                            "[{}] Failed to sweep expired uploads : {}", ctx.request_id(), err
                        ),
                    }
                }
                _ = &mut shutdown => {
                    break;
                }
            }
        }

        info!(target: LOG_TARGET, "Expiry sweeper shut down");
    }
}
