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

use std::{fmt::Debug, sync::Arc};

use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex};
use ringcache_common::error::{Error, ErrorKind, Result};

/// A recovery in flight. Waiters block on `cond` until `result` is filled by the leader.
struct Call<T> {
    result: Mutex<Option<Result<T>>>,
    cond: Condvar,
}

impl<T> Call<T>
where
    T: Clone,
{
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            cond: Condvar::new(),
        }
    }

    fn wait(&self) -> Result<T> {
        let mut result = self.result.lock();
        loop {
            if let Some(result) = result.as_ref() {
                return result.clone();
            }
            self.cond.wait(&mut result);
        }
    }

    /// Fill the result and wake every waiter. Only the first completion counts.
    fn complete(&self, f: impl FnOnce() -> Result<T>) {
        let mut result = self.result.lock();
        if result.is_none() {
            *result = Some(f());
            self.cond.notify_all();
        }
    }
}

/// Completes and unregisters the call of the leader, also when the recovery function unwinds.
struct Leader<'a, T>
where
    T: Clone,
{
    coalescer: &'a Coalescer<T>,
    key: &'a str,
    call: Arc<Call<T>>,
}

impl<T> Drop for Leader<'_, T>
where
    T: Clone,
{
    fn drop(&mut self) {
        self.call.complete(|| {
            Err(Error::new(ErrorKind::Panicked, "coalesced call panicked").with_context("key", self.key))
        });
        self.coalescer.calls.lock().remove(self.key);
    }
}

/// Deduplicates concurrent recoveries of the same key.
///
/// Across overlapping [`Coalescer::call`]s for one key the recovery function runs once, every caller observes a clone
/// of its result. The registry lock is never held while the function runs, so recoveries of different keys proceed in
/// parallel.
pub struct Coalescer<T> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T> Debug for Coalescer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coalescer")
            .field("inflight", &self.calls.lock().len())
            .finish()
    }
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> Coalescer<T>
where
    T: Clone,
{
    /// Create an empty coalescer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` for `key` unless a call for `key` is already in flight, in which case wait for its result.
    ///
    /// Calls that do not overlap each run `f`. If the leading `f` panics, the waiters receive an
    /// [`ErrorKind::Panicked`] error and the panic keeps unwinding in the leader.
    pub fn call<F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(call) = calls.get(key) {
                let call = call.clone();
                drop(calls);
                return call.wait();
            }
            let call = Arc::new(Call::new());
            calls.insert(key.to_string(), call.clone());
            call
        };

        let leader = Leader {
            coalescer: self,
            key,
            call,
        };
        let result = f();
        leader.call.complete(|| result.clone());
        drop(leader);
        result
    }

    /// Number of keys with a call in flight.
    pub fn inflight(&self) -> usize {
        self.calls.lock().len()
    }
}
