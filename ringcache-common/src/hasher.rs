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

use std::sync::Arc;

/// A hash function mapping bytes onto the 32-bit ring space.
pub trait RingHasher: Fn(&[u8]) -> u32 + Send + Sync + 'static {}
impl<T> RingHasher for T where T: Fn(&[u8]) -> u32 + Send + Sync + 'static {}

/// Shared ring hash function.
pub type ArcRingHasher = Arc<dyn RingHasher>;

/// CRC-32 (IEEE) checksum of `data`.
///
/// Fast and uniform enough for ring placement. Not suitable where collisions can be provoked on purpose.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_ieee_check_value() {
        // Standard check value of CRC-32/ISO-HDLC.
        assert_eq!(crc32_ieee(b"123456789"), 0xcbf4_3926);
        assert_eq!(crc32_ieee(b""), 0);
    }

    #[test]
    fn test_hasher_is_object_safe() {
        let hasher: ArcRingHasher = Arc::new(crc32_ieee);
        assert_eq!(hasher(b"Tom"), crc32_ieee(b"Tom"));
    }
}
