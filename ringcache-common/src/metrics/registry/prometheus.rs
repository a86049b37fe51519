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

use std::{
    borrow::Cow,
    collections::HashMap,
    hash::{Hash, Hasher},
    sync::{Arc, LazyLock},
};

use itertools::Itertools;
use parking_lot::Mutex;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::metrics::{
    registry::noop::NoopMetricsRegistry, BoxedCounter, BoxedCounterVec, CounterOps, CounterVecOps, RegistryOps,
};

/// Counter vectors already registered, per registry.
///
/// Every group registers the same metric names, the prometheus registry rejects a second registration.
static METRICS: LazyLock<Mutex<HashMap<PrometheusMetricsRegistry, HashMap<Metadata, IntCounterVec>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct Metadata {
    name: Cow<'static, str>,
    desc: Cow<'static, str>,
    label_names: &'static [&'static str],
}

fn get_or_register_counter_vec(registry: &PrometheusMetricsRegistry, metadata: Metadata) -> Option<IntCounterVec> {
    let mut metrics = METRICS.lock();
    let vecs = metrics.entry(registry.clone()).or_default();
    if let Some(vec) = vecs.get(&metadata) {
        return Some(vec.clone());
    }

    let opts = Opts::new(metadata.name.to_string(), metadata.desc.to_string());
    let vec = IntCounterVec::new(opts, metadata.label_names).ok()?;
    registry.registry.register(Box::new(vec.clone())).ok()?;
    vecs.insert(metadata, vec.clone());
    Some(vec)
}

impl CounterOps for IntCounter {
    fn increase(&self, val: u64) {
        self.inc_by(val);
    }
}

impl CounterVecOps for IntCounterVec {
    fn counter(&self, labels: &[Cow<'static, str>]) -> BoxedCounter {
        let labels = labels.iter().map(Cow::as_ref).collect_vec();
        match self.get_metric_with_label_values(&labels) {
            Ok(counter) => Box::new(counter),
            Err(_) => Box::new(NoopMetricsRegistry),
        }
    }
}

/// Metrics registry that records into a [`prometheus::Registry`].
#[derive(Debug, Clone)]
pub struct PrometheusMetricsRegistry {
    registry: Arc<Registry>,
}

impl PartialEq for PrometheusMetricsRegistry {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }
}

impl Eq for PrometheusMetricsRegistry {}

impl Hash for PrometheusMetricsRegistry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.registry).hash(state);
    }
}

impl PrometheusMetricsRegistry {
    /// Create a Prometheus metrics registry.
    ///
    /// Clone the returned registry to share it between groups. Wrapping the same [`Registry`] twice makes the second
    /// wrapper fail to register the metric names the first one already owns, its counters then record nothing.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

impl RegistryOps for PrometheusMetricsRegistry {
    /// Counter vectors that cannot be registered (invalid or conflicting names) degrade to no-op counters.
    fn register_counter_vec(
        &self,
        name: Cow<'static, str>,
        desc: Cow<'static, str>,
        label_names: &'static [&'static str],
    ) -> BoxedCounterVec {
        let metadata = Metadata {
            name,
            desc,
            label_names,
        };
        match get_or_register_counter_vec(self, metadata) {
            Some(vec) => Box::new(vec),
            None => Box::new(NoopMetricsRegistry),
        }
    }
}

#[cfg(test)]
mod tests {
    use prometheus::TextEncoder;

    use super::*;

    fn case(registry: &PrometheusMetricsRegistry) {
        let cv = registry.register_counter_vec("test_counter_1".into(), "test counter 1".into(), &["name", "op"]);
        let c = cv.counter(&["scores".into(), "hit".into()]);
        c.increase(42);
    }

    #[test]
    fn test_prometheus_metrics_registry() {
        let registry = Registry::new();
        let p8s = PrometheusMetricsRegistry::new(registry.clone());
        case(&p8s);

        let text = TextEncoder::new().encode_to_string(&registry.gather()).unwrap();
        assert!(text.contains(r#"test_counter_1{name="scores",op="hit"} 42"#), "{text}");
    }

    #[test]
    fn test_shared_prometheus_metrics_registry() {
        let registry = Registry::new();
        let p8s1 = PrometheusMetricsRegistry::new(registry.clone());
        let p8s2 = p8s1.clone();
        case(&p8s1);
        case(&p8s2);

        let text = TextEncoder::new().encode_to_string(&registry.gather()).unwrap();
        assert!(text.contains(r#"test_counter_1{name="scores",op="hit"} 84"#), "{text}");
    }
}
