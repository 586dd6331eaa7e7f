//! The provisioner: preflight every item, then process items strictly in
//! order, folding each outcome into a [`RunReport`].

use crate::error::{Error, Result};
use crate::model::{Outcome, RunReport, WorkItem};
use crate::telemetry::metrics;
use crate::telemetry::run::{record_outcome, start_item_span};
use opentelemetry::KeyValue;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, warn};

/// Sequential, idempotent batch runner.
#[derive(Debug, Clone, Default)]
pub struct Provisioner {
    timeout: Option<Duration>,
}

impl Provisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound each item's check + action. An item that exceeds the limit is
    /// recorded as a transport failure; the run continues.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Run all items and return the report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] (or [`Error::Config`]) when any
    /// item's preflight fails. No item has been attempted in that case.
    /// Per-item failures never surface here.
    pub async fn run(&self, items: Vec<WorkItem>) -> Result<RunReport> {
        self.run_with(items, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_item` after each item settles.
    pub async fn run_with<F>(&self, items: Vec<WorkItem>, mut on_item: F) -> Result<RunReport>
    where
        F: FnMut(&WorkItem, &Outcome),
    {
        for item in &items {
            item.action
                .preflight()
                .await
                .map_err(|e| into_precondition(&item.name, e))?;
        }

        info!(items = items.len(), "provisioning run started");
        let mut report = RunReport::new();

        for item in &items {
            let outcome = self.process(item).await;
            on_item(item, &outcome);
            report.record(&item.name, outcome);
        }

        report.finish();
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failed.len(),
            "provisioning run finished"
        );
        Ok(report)
    }

    async fn process(&self, item: &WorkItem) -> Outcome {
        let span = start_item_span(&item.name, &item.target, item.action.kind());
        let start = Instant::now();

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt(item))
                .instrument(span.clone())
                .await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Transport(format!(
                    "timed out after {}ms",
                    limit.as_millis()
                ))),
            },
            None => attempt(item).instrument(span.clone()).await,
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                span.in_scope(|| warn!(item = %item.name, error = %e, "item failed"));
                Outcome::Failed(e.to_string())
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        record_outcome(&span, &outcome, duration_ms);

        let labels = [
            KeyValue::new("kind", item.action.kind()),
            KeyValue::new("outcome", outcome.as_str()),
        ];
        metrics::items_processed().add(1, &labels);
        metrics::item_duration_ms().record(duration_ms as f64, &labels);

        outcome
    }
}

async fn attempt(item: &WorkItem) -> Result<Outcome> {
    if item.action.is_provisioned().await? {
        return Ok(Outcome::Skipped);
    }
    if item.action.provision().await? {
        Ok(Outcome::Succeeded)
    } else {
        Ok(Outcome::Skipped)
    }
}

fn into_precondition(name: &str, error: Error) -> Error {
    if error.is_fatal() {
        error
    } else {
        Error::Precondition(format!("{name}: {error}"))
    }
}
