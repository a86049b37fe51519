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

/// The reason an entry left the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Evicted by the replacement policy to respect the byte or entry budget.
    Evict,
    /// Replaced by a newer value for the same key. The listener receives the old value.
    Replace,
    /// Removed explicitly by key.
    Remove,
    /// Dropped by clearing the whole cache.
    Clear,
}

/// Trait for the customized event listener.
///
/// The listener runs while the owning cache is locked. It must not call back into the cache that notified it.
///
/// Closures with the signature `Fn(Event, &str, &V)` are listeners.
pub trait EventListener<V>: Send + Sync + 'static {
    /// Called when a cache entry leaves the local cache with the reason.
    fn on_leave(&self, reason: Event, key: &str, value: &V);
}

impl<V, F> EventListener<V> for F
where
    F: Fn(Event, &str, &V) + Send + Sync + 'static,
{
    fn on_leave(&self, reason: Event, key: &str, value: &V) {
        self(reason, key, value)
    }
}
