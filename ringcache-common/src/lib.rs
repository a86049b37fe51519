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

//! Shared components and utils for ringcache.

/// Value traits the cache stores.
pub mod code;
/// Error model shared by every ringcache crate.
pub mod error;
/// Entry lifecycle events.
pub mod event;
/// Ring hash functions.
pub mod hasher;
/// Metrics abstraction and registries.
pub mod metrics;
/// Immutable byte values.
pub mod view;
