//! Per-operation request and error counters.

use prometheus::{IntCounterVec, Opts, Registry};
use std::collections::BTreeMap;

/// Label distinguishing operations within one counter family.
pub const OPERATION_LABEL: &str = "operation";

/// A family of increment-only counters keyed by operation.
///
/// Backed by a Prometheus `IntCounterVec` registered on a caller-supplied
/// [`Registry`]. A counter starts at zero the first time its operation is
/// incremented and lives for as long as the family does.
///
/// # Example
///
/// ```
/// use prometheus::Registry;
/// use shared::telemetry::CounterRegistry;
///
/// let registry = Registry::new();
/// let counters =
///     CounterRegistry::register(&registry, "catalog_requests_total", "Requests").unwrap();
/// assert_eq!(counters.increment("catalog"), 1);
/// assert_eq!(counters.increment("catalog"), 2);
/// assert_eq!(counters.get("catalog"), 2);
/// assert_eq!(counters.get("add_course"), 0);
/// ```
#[derive(Clone)]
pub struct CounterRegistry {
    counters: IntCounterVec,
}

impl CounterRegistry {
    /// Creates the counter family `name` and registers it on `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid metric name or a family with
    /// the same name is already registered.
    pub fn register(registry: &Registry, name: &str, help: &str) -> prometheus::Result<Self> {
        let counters = IntCounterVec::new(Opts::new(name, help), &[OPERATION_LABEL])?;
        registry.register(Box::new(counters.clone()))?;
        Ok(Self { counters })
    }

    /// Increments `operation` by one and returns the new value.
    pub fn increment(&self, operation: &str) -> u64 {
        let counter = self.counters.with_label_values(&[operation]);
        counter.inc();
        counter.get()
    }

    /// Returns the current value of `operation` without changing it.
    #[must_use]
    pub fn get(&self, operation: &str) -> u64 {
        self.snapshot().get(operation).copied().unwrap_or(0)
    }

    /// Returns every counter that has been incremented, sorted by operation.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        let mut values = BTreeMap::new();
        for family in prometheus::core::Collector::collect(&self.counters) {
            for metric in family.get_metric() {
                let Some(label) = metric
                    .get_label()
                    .iter()
                    .find(|l| l.get_name() == OPERATION_LABEL)
                else {
                    continue;
                };
                // Counter values are whole numbers stored as f64.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let value = metric.get_counter().value() as u64;
                values.insert(label.get_value().to_string(), value);
            }
        }
        values
    }
}

impl std::fmt::Debug for CounterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterRegistry")
            .field("counters", &self.snapshot())
            .finish()
    }
}
