// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::InstrumentationScope;
use opentelemetry::metrics::{Counter, MeterProvider};

const SCOPE_NAME: &str = env!("CARGO_PKG_NAME");
const SCOPE_VERSION: &str = env!("CARGO_PKG_VERSION");
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

const EVENT_COUNTER_NAME: &str = "resilience.event";

/// Creates the counter breakers report transitions and rejected calls to.
///
/// Breakers built from the same provider share one instrument; they are told apart by the
/// [`STRATEGY_NAME`][super::STRATEGY_NAME] attribute.
pub(crate) fn event_counter(provider: &dyn MeterProvider) -> Counter<u64> {
    let scope = InstrumentationScope::builder(SCOPE_NAME)
        .with_version(SCOPE_VERSION)
        .with_schema_url(SCHEMA_URL)
        .build();

    provider
        .meter_with_scope(scope)
        .u64_counter(EVENT_COUNTER_NAME)
        .with_description("Circuit breaker transitions and rejected calls.")
        .with_unit("{event}")
        .build()
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
#[cfg(not(miri))]
mod tests {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::metrics::data::ResourceMetrics;
    use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};
    use testing_aids::MetricTester;

    use super::*;

    #[test]
    fn counter_is_scoped_to_crate() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build();

        event_counter(&provider).add(1, &[]);
        provider.force_flush().unwrap();

        let metrics = exporter.get_finished_metrics().unwrap();
        let scope_metrics: Vec<_> = metrics.iter().flat_map(ResourceMetrics::scope_metrics).collect();

        assert_eq!(scope_metrics.len(), 1);
        let scope = scope_metrics[0].scope();
        assert_eq!(scope.name(), "tripwire");
        assert_eq!(scope.version(), Some(SCOPE_VERSION));
        assert_eq!(scope.schema_url(), Some(SCHEMA_URL));

        let names: Vec<_> = scope_metrics[0].metrics().map(|metric| metric.name().to_string()).collect();
        assert_eq!(names, ["resilience.event"]);
    }

    #[test]
    fn counters_from_one_provider_share_instrument() {
        let tester = MetricTester::new();

        event_counter(tester.meter_provider()).add(1, &[KeyValue::new("resilience.strategy.name", "orders")]);
        event_counter(tester.meter_provider()).add(1, &[KeyValue::new("resilience.strategy.name", "billing")]);

        tester.assert_attributes(
            &[
                KeyValue::new("resilience.strategy.name", "orders"),
                KeyValue::new("resilience.strategy.name", "billing"),
            ],
            Some(2),
        );
    }
}
