// Copyright 2026 ringcache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;

use crate::metrics::{BoxedCounter, RegistryOps};

/// Per-group operation counters.
#[derive(Debug)]
pub struct Metrics {
    /* group get */
    /// Calls to `get` with a non-empty key.
    pub get: BoxedCounter,
    /// Gets served by the local cache.
    pub hit: BoxedCounter,
    /// Gets that missed the local cache.
    pub miss: BoxedCounter,
    /// Loads executed by a coalescing leader.
    pub load: BoxedCounter,

    /* peers */
    /// Values fetched from a remote owner.
    pub peer_load: BoxedCounter,
    /// Remote fetches that failed and fell back to the local source.
    pub peer_error: BoxedCounter,

    /* data source */
    /// Values produced by the data source.
    pub source_load: BoxedCounter,
    /// Data source failures.
    pub source_error: BoxedCounter,
}

impl Metrics {
    /// Register the counters of group `name` in `registry`.
    pub fn new(name: impl Into<Cow<'static, str>>, registry: &dyn RegistryOps) -> Self {
        let name = name.into();

        let op_total = registry.register_counter_vec(
            "ringcache_group_op_total".into(),
            "ringcache group operations".into(),
            &["name", "op"],
        );
        let counter = |op: &'static str| op_total.counter(&[name.clone(), op.into()]);

        Self {
            get: counter("get"),
            hit: counter("hit"),
            miss: counter("miss"),
            load: counter("load"),
            peer_load: counter("peer_load"),
            peer_error: counter("peer_error"),
            source_load: counter("source_load"),
            source_error: counter("source_error"),
        }
    }

    /// Counters that record nothing.
    #[cfg(test)]
    pub fn noop() -> Self {
        use super::registry::noop::NoopMetricsRegistry;

        Self::new("test", &NoopMetricsRegistry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_metrics() {
        let metrics = Metrics::noop();
        metrics.get.increase(1);
        metrics.source_error.increase(1);
    }

    #[cfg(feature = "prometheus")]
    #[test]
    fn test_prometheus_metrics() {
        use prometheus::{Registry, TextEncoder};

        use crate::metrics::registry::prometheus::PrometheusMetricsRegistry;

        let prometheus = Registry::new();
        let registry = PrometheusMetricsRegistry::new(prometheus.clone());

        let scores = Metrics::new("scores", &registry);
        let names = Metrics::new("names", &registry);
        scores.get.increase(3);
        scores.hit.increase(2);
        names.get.increase(1);

        let text = TextEncoder::new().encode_to_string(&prometheus.gather()).unwrap();
        assert!(text.contains(r#"ringcache_group_op_total{name="scores",op="get"} 3"#), "{text}");
        assert!(text.contains(r#"ringcache_group_op_total{name="scores",op="hit"} 2"#), "{text}");
        assert!(text.contains(r#"ringcache_group_op_total{name="names",op="get"} 1"#), "{text}");
        assert!(text.contains(r#"ringcache_group_op_total{name="names",op="miss"} 0"#), "{text}");
    }
}
