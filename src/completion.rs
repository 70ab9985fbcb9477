// Copyright 2024-2026, NVIDIA CORPORATION & AFFILIATES. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
//  * Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
//  * Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//  * Neither the name of NVIDIA CORPORATION nor the names of its
//    contributors may be used to endorse or promote products derived
//    from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS ``AS IS'' AND ANY
// EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED.  IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY
// OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Blocking synchronization between completion handlers and waiting threads.
//!
//! Completion handlers run on the client's runtime threads, while the code
//! that submitted the requests usually waits somewhere else. This module
//! provides the two hand-off shapes used by the demo binaries:
//!
//! * [`CompletionBarrier`] -- counts completions and blocks until an
//!   expected number has arrived.
//! * [`HandoffSlot`] -- transfers a single value from the handler thread to
//!   exactly one waiting consumer.
//!
//! Both are `Sync` and designed to be shared behind an [`std::sync::Arc`].

use std::sync::{Condvar, Mutex, PoisonError};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// CompletionBarrier
// ---------------------------------------------------------------------------

/// Counts completed requests and lets a thread block until a target count
/// is reached.
///
/// Every completion handler calls [`arrive`](Self::arrive) exactly once,
/// whether its request succeeded or failed. The submitting thread then calls
/// [`wait`](Self::wait) (or [`wait_exact`](Self::wait_exact)) with the number
/// of requests it sent.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use infer_client::completion::CompletionBarrier;
///
/// let barrier = Arc::new(CompletionBarrier::new());
/// for _ in 0..4 {
///     let barrier = Arc::clone(&barrier);
///     thread::spawn(move || barrier.arrive());
/// }
/// assert_eq!(barrier.wait(4), 4);
/// ```
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    count: Mutex<usize>,
    condvar: Condvar,
}

impl CompletionBarrier {
    /// Creates a barrier with a completion count of zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completion and wakes any waiting threads.
    ///
    /// The new count is published under the lock before the notification,
    /// so a waiter can never observe the wakeup without the count.
    pub fn arrive(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        drop(count);
        self.condvar.notify_all();
    }

    /// Returns the number of completions recorded so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks the calling thread until at least `target` completions have
    /// been recorded, then returns the count observed at wakeup.
    ///
    /// Returns immediately when the target has already been reached,
    /// including `wait(0)` on a fresh barrier. Spurious wakeups are
    /// absorbed by re-checking the count.
    pub fn wait(&self, target: usize) -> usize {
        let guard = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        let guard = self
            .condvar
            .wait_while(guard, |count| *count < target)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    /// Blocks until at least `target` completions arrive and verifies that
    /// the count matches exactly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CompletionMismatch`] when more completions than
    /// `target` were recorded by the time the wait finished, which usually
    /// means a handler ran more than once or the barrier is shared by more
    /// requests than the caller accounted for.
    pub fn wait_exact(&self, target: usize) -> Result<()> {
        let completed = self.wait(target);
        if completed == target {
            Ok(())
        } else {
            Err(Error::CompletionMismatch {
                expected: target,
                completed,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// HandoffSlot
// ---------------------------------------------------------------------------

/// A single-value slot that carries one result from a completion handler to
/// one waiting thread.
///
/// The handler calls [`publish`](Self::publish); the consumer blocks in
/// [`take`](Self::take) and receives the value. Taking empties the slot, so
/// the same slot can carry one value per request when requests are issued
/// strictly one at a time.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use infer_client::completion::HandoffSlot;
///
/// let slot = Arc::new(HandoffSlot::new());
/// let publisher = Arc::clone(&slot);
/// thread::spawn(move || {
///     publisher.publish("done").ok();
/// });
/// assert_eq!(slot.take(), "done");
/// ```
#[derive(Debug, Default)]
pub struct HandoffSlot<T> {
    slot: Mutex<Option<T>>,
    condvar: Condvar,
}

impl<T> HandoffSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            condvar: Condvar::new(),
        }
    }

    /// Places a value into the slot and wakes one waiting consumer.
    ///
    /// # Errors
    ///
    /// When the slot is already occupied the value is handed back unchanged,
    /// so the caller can decide what to do with it. This happens when a
    /// previous result was never taken.
    pub fn publish(&self, value: T) -> std::result::Result<(), T> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(value);
        }
        *slot = Some(value);
        drop(slot);
        self.condvar.notify_one();
        Ok(())
    }

    /// Blocks the calling thread until a value is published, then removes
    /// and returns it.
    pub fn take(&self) -> T {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            slot = self
                .condvar
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Removes and returns the value if one is present, without blocking.
    #[must_use]
    pub fn try_take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn barrier_counts_across_threads() {
        let barrier = Arc::new(CompletionBarrier::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                barrier.arrive();
            }));
        }

        assert_eq!(barrier.wait(8), 8);
        assert_eq!(barrier.completed(), 8);

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn barrier_wait_returns_when_already_reached() {
        let barrier = CompletionBarrier::new();
        barrier.arrive();
        barrier.arrive();

        // The target was reached before wait was called.
        assert_eq!(barrier.wait(2), 2);
        assert_eq!(barrier.wait(1), 2);
    }

    #[test]
    fn barrier_wait_zero_is_immediate() {
        let barrier = CompletionBarrier::new();
        assert_eq!(barrier.wait(0), 0);
    }

    #[test]
    fn barrier_wait_exact_detects_overcount() {
        let barrier = CompletionBarrier::new();
        for _ in 0..4 {
            barrier.arrive();
        }

        assert!(matches!(
            barrier.wait_exact(3),
            Err(Error::CompletionMismatch {
                expected: 3,
                completed: 4,
            })
        ));
    }

    #[test]
    fn barrier_wait_exact_accepts_exact_count() {
        let barrier = Arc::new(CompletionBarrier::new());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || barrier.arrive()));
        }

        barrier.wait_exact(4).unwrap();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn handoff_transfers_value_across_threads() {
        let slot: Arc<HandoffSlot<Vec<i32>>> = Arc::new(HandoffSlot::new());
        let publisher = Arc::clone(&slot);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            publisher.publish(vec![1, 2, 3]).unwrap();
        });

        assert_eq!(slot.take(), vec![1, 2, 3]);
        handle.join().unwrap();
    }

    #[test]
    fn handoff_publish_before_take() {
        let slot = HandoffSlot::new();
        slot.publish(42).unwrap();
        assert_eq!(slot.take(), 42);
    }

    #[test]
    fn handoff_rejects_second_publish_until_taken() {
        let slot = HandoffSlot::new();
        slot.publish("first").unwrap();
        assert_eq!(slot.publish("second"), Err("second"));

        assert_eq!(slot.take(), "first");

        // Emptied by take, the slot accepts a value again.
        slot.publish("third").unwrap();
        assert_eq!(slot.take(), "third");
    }

    #[test]
    fn handoff_try_take_does_not_block() {
        let slot: HandoffSlot<u8> = HandoffSlot::new();
        assert_eq!(slot.try_take(), None);

        slot.publish(7).unwrap();
        assert_eq!(slot.try_take(), Some(7));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn handoff_preserves_identity() {
        let slot: Arc<HandoffSlot<Arc<String>>> = Arc::new(HandoffSlot::new());
        let original = Arc::new(String::from("payload"));

        slot.publish(Arc::clone(&original)).unwrap();
        let taken = slot.take();

        assert!(Arc::ptr_eq(&original, &taken));
    }
}
