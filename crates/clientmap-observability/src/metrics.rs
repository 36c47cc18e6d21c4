//! Metrics collection with Prometheus
//!
//! - Geocoding lookups by provider and outcome
//! - Record writes by operation and outcome
//! - Live subscriptions currently attached

use prometheus::{IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for ClientMap
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Geocoding lookups (`provider`, `outcome`: found/empty/error)
    pub geocode_requests_total: IntCounterVec,

    /// Record writes (`operation`: create/update/delete, `outcome`: ok/error)
    pub record_writes_total: IntCounterVec,

    /// Open live snapshot streams
    pub live_subscriptions: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let geocode_requests_total = IntCounterVec::new(
            Opts::new(
                "clientmap_geocode_requests_total",
                "Total number of geocoding lookups",
            ),
            &["provider", "outcome"],
        )?;

        let record_writes_total = IntCounterVec::new(
            Opts::new(
                "clientmap_record_writes_total",
                "Total number of client record writes",
            ),
            &["operation", "outcome"],
        )?;

        let live_subscriptions = IntGauge::new(
            "clientmap_live_subscriptions",
            "Number of open live record subscriptions",
        )?;

        registry.register(Box::new(geocode_requests_total.clone()))?;
        registry.register(Box::new(record_writes_total.clone()))?;
        registry.register(Box::new(live_subscriptions.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            geocode_requests_total,
            record_writes_total,
            live_subscriptions,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_geocode(&self, provider: &str, outcome: &str) {
        self.geocode_requests_total
            .with_label_values(&[provider, outcome])
            .inc();
    }

    pub fn record_write(&self, operation: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.record_writes_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Track one live subscription until the returned guard is dropped
    pub fn live_subscription(&self) -> LiveSubscriptionGuard {
        self.live_subscriptions.inc();
        LiveSubscriptionGuard {
            gauge: self.live_subscriptions.clone(),
        }
    }
}

/// Decrements the live subscription gauge on drop
pub struct LiveSubscriptionGuard {
    gauge: IntGauge,
}

impl Drop for LiveSubscriptionGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}
