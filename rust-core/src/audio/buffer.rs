//! Bounded sample buffer that yields fixed-size overlapping windows
//!
//! Backed by a heap ring buffer. The producer and consumer halves stay
//! together in one owner, so the buffer is single-threaded by construction.

use log::{debug, warn};
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use serde::{Deserialize, Serialize};

use crate::error::{AcousticError, Result};

/// What to do when an append does not fit in the remaining capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest buffered samples to make room
    #[default]
    DropOldest,

    /// Refuse the whole chunk and leave the buffer untouched
    Reject,
}

/// Streaming window buffer
pub struct WindowBuffer {
    producer: HeapProducer<f64>,
    consumer: HeapConsumer<f64>,
    capacity: usize,
    overflow: OverflowPolicy,
    dropped: u64,
}

impl WindowBuffer {
    /// Create new window buffer
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of retained samples (at least 1)
    /// * `overflow` - Policy applied when an append exceeds free space
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        let (producer, consumer) = HeapRb::<f64>::new(capacity).split();

        Self {
            producer,
            consumer,
            capacity,
            overflow,
            dropped: 0,
        }
    }

    /// Append samples to the end of the stream
    pub fn append(&mut self, samples: &[f64]) -> Result<()> {
        let free = self.producer.free_len();

        if samples.len() > free {
            match self.overflow {
                OverflowPolicy::Reject => {
                    return Err(AcousticError::BufferOverflow {
                        incoming: samples.len(),
                        free,
                    });
                }
                OverflowPolicy::DropOldest => {
                    let excess = samples.len() - free;
                    let evicted = self.consumer.skip(excess.min(self.consumer.len()));
                    let truncated = samples.len().saturating_sub(self.capacity);
                    self.dropped += (evicted + truncated) as u64;
                    warn!(
                        "Window buffer full ({} samples), dropped {} oldest samples",
                        self.capacity,
                        evicted + truncated
                    );

                    // Chunk larger than the whole ring: keep only its tail
                    let samples = &samples[truncated..];
                    self.producer.push_slice(samples);
                    return Ok(());
                }
            }
        }

        self.producer.push_slice(samples);
        Ok(())
    }

    /// Check whether a full window is buffered
    pub fn has_window(&self, window_length: usize) -> bool {
        self.consumer.len() >= window_length
    }

    /// Copy the first `window_length` samples without advancing the stream
    pub fn take_window(&self, window_length: usize) -> Result<Vec<f64>> {
        let available = self.consumer.len();
        if window_length > available {
            return Err(AcousticError::Precondition {
                requested: window_length,
                available,
            });
        }

        let (head, tail) = self.consumer.as_slices();
        let mut window = Vec::with_capacity(window_length);
        let from_head = window_length.min(head.len());
        window.extend_from_slice(&head[..from_head]);
        window.extend_from_slice(&tail[..window_length - from_head]);

        Ok(window)
    }

    /// Discard `hop_length` samples from the front of the stream
    pub fn advance(&mut self, hop_length: usize) -> Result<()> {
        let available = self.consumer.len();
        if hop_length > available {
            return Err(AcousticError::Precondition {
                requested: hop_length,
                available,
            });
        }

        self.consumer.skip(hop_length);
        Ok(())
    }

    /// Grow the ring so it can retain at least `required` samples.
    /// Buffered samples are preserved; the ring never shrinks.
    pub fn ensure_capacity(&mut self, required: usize) {
        if required <= self.capacity {
            return;
        }

        let mut buffered = vec![0.0; self.consumer.len()];
        let read = self.consumer.pop_slice(&mut buffered);
        buffered.truncate(read);

        let (mut producer, consumer) = HeapRb::<f64>::new(required).split();
        producer.push_slice(&buffered);

        debug!(
            "Window buffer grown from {} to {} samples ({} kept)",
            self.capacity,
            required,
            buffered.len()
        );

        self.producer = producer;
        self.consumer = consumer;
        self.capacity = required;
    }

    /// Discard all buffered samples
    pub fn clear(&mut self) {
        let len = self.consumer.len();
        self.consumer.skip(len);
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples that can be appended without eviction
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }

    /// Overflow policy in effect
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Total samples evicted by `OverflowPolicy::DropOldest`
    pub fn dropped_samples(&self) -> u64 {
        self.dropped
    }
}
