//! Metric instrument factories for provisioner.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"provisioner"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for provisioner instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("provisioner")
}

/// Counter: work items processed.
/// Labels: `kind` ("http" | "sql"), `outcome` ("skipped" | "succeeded" | "failed").
pub fn items_processed() -> Counter<u64> {
    meter()
        .u64_counter("provisioner.items.processed")
        .with_description("Number of work items processed")
        .build()
}

/// Histogram: per-item duration in milliseconds, check and action included.
/// Labels: `kind`, `outcome`.
pub fn item_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("provisioner.item.duration_ms")
        .with_description("Work item duration in milliseconds")
        .with_unit("ms")
        .build()
}
