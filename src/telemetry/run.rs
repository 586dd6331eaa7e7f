//! Provisioning span helpers.
//!
//! One span per work item; the outcome is recorded on the span when the
//! item settles.

use crate::model::Outcome;
use tracing::Span;

/// Start a span for a single work item.
///
/// The `item.outcome` field is declared empty and filled in by
/// [`record_outcome`].
pub fn start_item_span(name: &str, target: &str, kind: &str) -> Span {
    tracing::info_span!(
        "provision.item",
        "item.name" = name,
        "item.target" = target,
        "item.kind" = kind,
        "item.outcome" = tracing::field::Empty,
    )
}

/// Record an item's terminal outcome on its span.
pub fn record_outcome(span: &Span, outcome: &Outcome, duration_ms: u64) {
    span.record("item.outcome", outcome.as_str());
    span.in_scope(|| match outcome {
        Outcome::Failed(error) => {
            tracing::info!(outcome = outcome.as_str(), duration_ms, error = %error, "item_settled")
        }
        _ => tracing::info!(outcome = outcome.as_str(), duration_ms, "item_settled"),
    });
}
