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

use std::ops::{Index, IndexMut};

/// Stable handle of a value in a [`Slab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(usize);

impl Token {
    /// Index of the slot the token points at.
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Vacant(usize),
    Occupied(T),
}

/// Pre-allocated storage with stable tokens and slot reuse.
///
/// Vacant slots form a free list, so insertion and removal are O(1).
#[derive(Debug, Clone)]
pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    len: usize,
    next: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    /// Create an empty slab.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            next: 0,
        }
    }

    /// Insert a value, returning its token.
    pub fn insert(&mut self, val: T) -> Token {
        let index = self.next;
        self.len += 1;

        if index == self.entries.len() {
            self.entries.push(Entry::Occupied(val));
            self.next = index + 1;
        } else {
            self.next = match self.entries[index] {
                Entry::Vacant(next) => next,
                Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            self.entries[index] = Entry::Occupied(val);
        }

        Token(index)
    }

    /// Remove the value of `token`. Returns `None` if the slot is vacant.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        let index = token.index();
        let entry = self.entries.get_mut(index)?;

        if matches!(entry, Entry::Vacant(_)) {
            return None;
        }

        match std::mem::replace(entry, Entry::Vacant(self.next)) {
            Entry::Vacant(_) => unreachable!(),
            Entry::Occupied(val) => {
                self.len -= 1;
                self.next = index;
                Some(val)
            }
        }
    }

    /// Get the value of `token`.
    pub fn get(&self, token: Token) -> Option<&T> {
        match self.entries.get(token.index()) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Get the mutable value of `token`.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        match self.entries.get_mut(token.index()) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every value. Tokens handed out before are invalidated.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
        self.next = 0;
    }
}

impl<T> Index<Token> for Slab<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the slot of `token` is vacant.
    fn index(&self, token: Token) -> &T {
        match self.get(token) {
            Some(val) => val,
            None => panic!("invalid slab token: {}", token.index()),
        }
    }
}

impl<T> IndexMut<Token> for Slab<T> {
    fn index_mut(&mut self, token: Token) -> &mut T {
        match self.get_mut(token) {
            Some(val) => val,
            None => panic!("invalid slab token: {}", token.index()),
        }
    }
}
