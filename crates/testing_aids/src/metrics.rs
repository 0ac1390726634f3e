// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, Metric, MetricData, ResourceMetrics, ScopeMetrics};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};

/// Collects metrics in memory and asserts on the attributes of their data points.
#[derive(Debug)]
pub struct MetricTester {
    exporter: InMemoryMetricExporter,
    provider: SdkMeterProvider,
}

impl Default for MetricTester {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricTester {
    /// Creates a tester backed by a fresh in-memory exporter.
    #[must_use]
    pub fn new() -> Self {
        let in_memory = InMemoryMetricExporter::default();

        Self {
            exporter: in_memory.clone(),
            provider: SdkMeterProvider::builder().with_periodic_exporter(in_memory).build(),
        }
    }

    /// The provider to hand to the code under test.
    #[must_use]
    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    /// Flushes pending measurements and returns the attributes of every data point.
    ///
    /// # Panics
    ///
    /// Panics if the provider cannot be flushed or the exporter cannot be read.
    #[must_use]
    pub fn collect_attributes(&self) -> Vec<KeyValue> {
        self.provider.force_flush().expect("flushing the in-memory meter provider");

        self.exporter
            .get_finished_metrics()
            .expect("reading the in-memory exporter")
            .iter()
            .flat_map(ResourceMetrics::scope_metrics)
            .flat_map(ScopeMetrics::metrics)
            .flat_map(attributes_of)
            .collect()
    }

    /// Asserts that every attribute in `expected` was reported.
    ///
    /// When `count` is given, also asserts the total number of collected attributes.
    ///
    /// # Panics
    ///
    /// Panics if an attribute is missing or the count does not match.
    pub fn assert_attributes(&self, expected: &[KeyValue], count: Option<usize>) {
        let attributes = self.collect_attributes();

        for attr in expected {
            assert!(
                attributes.contains(attr),
                "attribute {attr:?} not found in collected attributes: {attributes:?}"
            );
        }

        if let Some(count) = count {
            assert_eq!(attributes.len(), count, "unexpected attributes: {attributes:?}");
        }
    }
}

fn attributes_of(metric: &Metric) -> Vec<KeyValue> {
    macro_rules! points {
        ($data:expr) => {
            match $data {
                MetricData::Gauge(data) => data.data_points().flat_map(|v| v.attributes().cloned()).collect(),
                MetricData::Sum(data) => data.data_points().flat_map(|v| v.attributes().cloned()).collect(),
                MetricData::Histogram(data) => data.data_points().flat_map(|v| v.attributes().cloned()).collect(),
                MetricData::ExponentialHistogram(data) => data.data_points().flat_map(|v| v.attributes().cloned()).collect(),
            }
        };
    }

    match metric.data() {
        AggregatedMetrics::F64(data) => points!(data),
        AggregatedMetrics::U64(data) => points!(data),
        AggregatedMetrics::I64(data) => points!(data),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use opentelemetry::metrics::MeterProvider;

    use super::*;

    #[test]
    fn collects_counter_attributes() {
        let tester = MetricTester::new();
        let counter = tester.meter_provider().meter("test").u64_counter("events").build();

        counter.add(1, &[KeyValue::new("event", "opened")]);

        tester.assert_attributes(&[KeyValue::new("event", "opened")], Some(1));
    }

    #[test]
    fn empty_without_measurements() {
        let tester = MetricTester::default();

        assert!(tester.collect_attributes().is_empty());
    }
}
