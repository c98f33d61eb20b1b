//! Render processor: per-request orchestration with an optional
//! admission gate and metrics collection.

use std::sync::Arc;
use std::time::Instant;

use builder_core::config::AppConfig;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::command::CommandBuilder;
use crate::error::RenderError;
use crate::metrics::{MetricsSnapshot, RenderMetrics};
use crate::models::RenderRequest;
use crate::reporter::{self, RenderReport};
use crate::runner::{JobRunner, ProcessRunner};
use crate::validator::RequestValidator;

/// Drives render requests from validation to report.
///
/// Cheap to clone; clones share the builder, runner, gate and metrics.
#[derive(Clone)]
pub struct RenderProcessor {
    builder: Arc<CommandBuilder>,
    runner: Arc<dyn JobRunner>,
    /// Bounds concurrently running processes; `None` means unbounded.
    limiter: Option<Arc<Semaphore>>,
    metrics: Arc<RenderMetrics>,
}

impl RenderProcessor {
    /// Processor running real child processes as configured.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner::from_settings(&config.render)))
    }

    /// Processor with a caller-supplied runner.
    pub fn with_runner(config: &AppConfig, runner: Arc<dyn JobRunner>) -> Self {
        Self {
            builder: Arc::new(CommandBuilder::new(config)),
            runner,
            limiter: config
                .render
                .concurrency_limit()
                .map(|n| Arc::new(Semaphore::new(n))),
            metrics: Arc::new(RenderMetrics::new()),
        }
    }

    /// Validate raw parameters, counting rejections.
    pub fn validate(
        &self,
        post_count: Option<&str>,
        color: Option<&str>,
    ) -> Result<RenderRequest, RenderError> {
        RequestValidator::validate(post_count, color).inspect_err(|e| {
            self.metrics.record_rejected();
            debug!(error = %e, "Rejected render request");
        })
    }

    /// Run `request` on its own task.
    ///
    /// The render continues even if the caller goes away, and a panic
    /// inside it surfaces as [`RenderError::Join`] instead of unwinding
    /// into the caller.
    pub async fn submit(&self, request: RenderRequest) -> Result<RenderReport, RenderError> {
        let processor = self.clone();
        tokio::spawn(async move { processor.execute(request).await }).await?
    }

    /// Build, admit, run and report a single render job.
    #[instrument(skip(self), fields(job_id))]
    pub async fn execute(&self, request: RenderRequest) -> Result<RenderReport, RenderError> {
        let job_id = Uuid::now_v7();
        tracing::Span::current().record("job_id", job_id.to_string());

        let spec = self.builder.build(&request);
        tokio::fs::create_dir_all(self.builder.output_dir()).await?;

        let (_permit, waited) = self.admit().await?;
        self.metrics.record_started(waited);

        let start = Instant::now();
        let outcome = match self.runner.run(&spec).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.record_aborted();
                return Err(e);
            }
        };
        let elapsed = start.elapsed();
        self.metrics.record_finished(&outcome, elapsed);

        info!(
            outcome = outcome.label(),
            output = %spec.output_path.display(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Render job finished"
        );

        Ok(reporter::report(outcome, &spec.output_path))
    }

    /// Take a slot on the admission gate, if there is one. Reports
    /// whether the request had to wait.
    async fn admit(&self) -> Result<(Option<OwnedSemaphorePermit>, bool), RenderError> {
        let Some(limiter) = &self.limiter else {
            return Ok((None, false));
        };

        if let Ok(permit) = Arc::clone(limiter).try_acquire_owned() {
            return Ok((Some(permit), false));
        }

        self.metrics.record_waiting();
        debug!("All render slots busy, waiting");
        let permit = Arc::clone(limiter).acquire_owned().await.map_err(|_| {
            RenderError::SemaphoreClosed {
                reason: "render limiter".to_string(),
            }
        })?;
        Ok((Some(permit), true))
    }

    /// Free slots on the admission gate; `None` when unbounded.
    pub fn available_slots(&self) -> Option<usize> {
        self.limiter.as_ref().map(|l| l.available_permits())
    }

    /// The shared metrics collector.
    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// A metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
