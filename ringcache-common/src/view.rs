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

use std::{borrow::Cow, fmt::Display};

use bytes::Bytes;

use crate::code::Value;

/// An immutable view of a cached value.
///
/// Clones share the underlying buffer, so a view can be handed to any number of readers without copying. The
/// buffer is only copied when the caller asks for an owned byte vector with [`ByteView::to_vec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Create a view that owns a private copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Length of the value in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A defensive copy of the value.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Borrow the value bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The value as a string, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(v: Vec<u8>) -> Self {
        Self { bytes: Bytes::from(v) }
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Display for ByteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl Value for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defensive_copy() {
        let view = ByteView::from(b"630".to_vec());

        let mut copy = view.to_vec();
        copy[0] = b'9';

        assert_eq!(view.as_slice(), b"630");
        assert_eq!(view.to_string(), "630");
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_copy_from_slice_detaches() {
        let mut source = b"589".to_vec();
        let view = ByteView::copy_from_slice(&source);
        source[0] = b'0';

        assert_eq!(view.as_slice(), b"589");
    }

    #[test]
    fn test_lossy_string() {
        let view = ByteView::from(vec![b'a', 0xff, b'b']);
        assert_eq!(view.to_string_lossy(), "a\u{fffd}b");
        assert!(!view.is_empty());
        assert!(ByteView::default().is_empty());
    }
}
