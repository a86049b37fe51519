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

/// Values stored in the local cache.
///
/// The weight is the number of bytes the value is charged against the cache byte budget. The entry weight is the
/// key length plus the value weight.
pub trait Value: Clone + Send + Sync + 'static {
    /// Bytes charged for the value.
    fn weight(&self) -> usize;
}

impl Value for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Value for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Value for bytes::Bytes {
    fn weight(&self) -> usize {
        self.len()
    }
}
